use log::info;
use mpu_datalog::logger::init_logger;
use mpu_datalog::mpu_plot::parse_cli;
use mpu_datalog::run;

fn main() {
    let args = parse_cli();
    init_logger(args.verbose);
    match run(&args) {
        Ok(written) => info!("done, {} charts written", written.len()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
