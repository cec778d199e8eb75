use super::chart::OutputFormat;
use super::{PlotArgs, DEFAULT_CSV, VERSION};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// The command line of the plotting app.
pub fn command() -> Command {
    let arg_csvin = Arg::new("input_csvfile")
        .help("name of the csv file with the MPU6050 samples")
        .short('f')
        .long("csvfile")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_CSV);
    let arg_outdir = Arg::new("outdir")
        .help("directory for the two charts, by default the directory of the csv file")
        .short('o')
        .long("outdir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf));
    let arg_format = Arg::new("format")
        .help("chart file format")
        .long("format")
        .num_args(1)
        .value_parser(["svg", "html"])
        .default_value("svg");
    let arg_show = Arg::new("show")
        .help("also open each chart in the browser")
        .long("show")
        .action(ArgAction::SetTrue);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("mpu_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the accelerometer and gyroscope samples of the MPU6050 logger")
        .arg(arg_csvin)
        .arg(arg_outdir)
        .arg(arg_format)
        .arg(arg_show)
        .arg(arg_verbose)
}

/// Map parsed matches to the plotting arguments.
/// Input and format always have a value because a default is set, therefore it is safe to unwrap them.
pub fn plot_args(cli_args: &ArgMatches) -> PlotArgs {
    let csvin: PathBuf = cli_args
        .get_one::<PathBuf>("input_csvfile")
        .unwrap()
        .to_owned();
    let outdir: Option<PathBuf> = cli_args.get_one::<PathBuf>("outdir").cloned();
    // the value parser only lets svg and html through
    let format: OutputFormat = cli_args
        .get_one::<String>("format")
        .and_then(|f| f.parse().ok())
        .unwrap_or(OutputFormat::Svg);
    PlotArgs {
        csvin,
        outdir,
        format,
        show: cli_args.get_flag("show"),
        verbose: cli_args.get_flag("verbose"),
    }
}

/// Takes the CLI arguments that control the plotting of the samples.
pub fn parse_cli() -> PlotArgs {
    plot_args(&command().get_matches())
}
