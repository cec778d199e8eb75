use crate::chart::{Chart, ChartSpec, OutputFormat};
use crate::error::MpuPlotError;
use crate::utils::output_paths;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
pub mod chart;
pub mod error;
pub mod logger;
pub mod mpu_plot;
pub mod utils;

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
/// File name written by the recording firmware.
pub const DEFAULT_CSV: &str = "mpu_data.csv";
pub const MIN_COLUMNS: usize = 7;
pub const COL_SAMPLE: usize = 0;
pub const COLS_ACCEL: [usize; 3] = [1, 2, 3];
pub const COLS_GYRO: [usize; 3] = [4, 5, 6];

/// The parsed sample log, row-major, one row per sample.
/// Only built through the loaders, which guarantee at least one row and MIN_COLUMNS columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    values: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

/// The seven signals extracted from the sample table, each of length nrows.
#[derive(Debug, Clone, PartialEq)]
pub struct Channels {
    pub sample: Vec<f64>,
    /// acceleration in g, X Y Z
    pub accel: [Vec<f64>; 3],
    /// angular velocity in deg/s, X Y Z
    pub gyro: [Vec<f64>; 3],
}

impl SampleTable {
    /// Read the sample table from a csv file, see `from_reader`.
    pub fn from_csv<P>(fin: P) -> Result<SampleTable, MpuPlotError>
    where
        P: AsRef<Path>,
    {
        let fin = fin.as_ref();
        let file = File::open(fin).map_err(|e| MpuPlotError::io(fin, e))?;
        SampleTable::from_reader(file)
    }

    /// Parse comma separated rows, skipping the header line, `#` comments and blank lines.
    /// Fields that are missing, not valid UTF-8 or not numbers become NAN instead of aborting the parse.
    /// The first data row fixes the width, any row with a different width is an error.
    pub fn from_reader<R: Read>(rdr: R) -> Result<SampleTable, MpuPlotError> {
        let mut csv_rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .from_reader(rdr);
        let mut values: Vec<f64> = Vec::new();
        let mut ncols: Option<usize> = None;
        let mut nrows = 0usize;
        for record in csv_rdr.byte_records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            // whitespace only lines are trimmed down to empty fields
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            let width = *ncols.get_or_insert(record.len());
            if record.len() != width {
                return Err(MpuPlotError::invalid_input(format!(
                    "line {} has {} columns instead of {}",
                    line,
                    record.len(),
                    width
                )));
            }
            for (col, field) in record.iter().enumerate() {
                match std::str::from_utf8(field).ok().and_then(|f| f.parse::<f64>().ok()) {
                    Some(v) => values.push(v),
                    None => {
                        warn!(
                            "could not parse {:?} at line {}, column {}; set to NAN",
                            String::from_utf8_lossy(field),
                            line,
                            col
                        );
                        values.push(f64::NAN);
                    }
                }
            }
            nrows += 1;
        }
        let ncols = ncols.unwrap_or(0);
        if nrows == 0 {
            return Err(MpuPlotError::invalid_input("found no data rows after the header"));
        }
        if ncols < MIN_COLUMNS {
            return Err(MpuPlotError::invalid_input(format!(
                "found {} columns, at least {} are required",
                ncols, MIN_COLUMNS
            )));
        }
        if ncols > MIN_COLUMNS {
            debug!("ignoring {} extra columns", ncols - MIN_COLUMNS);
        }
        Ok(SampleTable {
            values,
            nrows,
            ncols,
        })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.nrows {
            Some(&self.values[i * self.ncols..(i + 1) * self.ncols])
        } else {
            None
        }
    }

    /// Copy of column j, None if out of range.
    pub fn column(&self, j: usize) -> Option<Vec<f64>> {
        if j < self.ncols {
            Some(self.values.chunks(self.ncols).map(|r| r[j]).collect())
        } else {
            None
        }
    }

    /// Extract the sample index and the six sensor channels by fixed column index.
    pub fn channels(&self) -> Channels {
        // the loaders guarantee ncols >= MIN_COLUMNS
        let col = |j: usize| -> Vec<f64> { self.values.chunks(self.ncols).map(|r| r[j]).collect() };
        Channels {
            sample: col(COL_SAMPLE),
            accel: COLS_ACCEL.map(col),
            gyro: COLS_GYRO.map(col),
        }
    }
}

impl fmt::Display for SampleTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "sample table {} x {}", self.nrows, self.ncols)?;
        for r in self.values.chunks(self.ncols).take(5) {
            let row: Vec<String> = r.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", row.join(","))?;
        }
        if self.nrows > 5 {
            writeln!(f, "... {} more rows", self.nrows - 5)?;
        }
        Ok(())
    }
}

impl Channels {
    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    pub fn accel_chart(&self) -> Result<Chart<'_>, MpuPlotError> {
        let [x, y, z] = &self.accel;
        Chart::new(
            ChartSpec::accelerometer(),
            &self.sample,
            [x.as_slice(), y.as_slice(), z.as_slice()],
        )
    }

    pub fn gyro_chart(&self) -> Result<Chart<'_>, MpuPlotError> {
        let [x, y, z] = &self.gyro;
        Chart::new(
            ChartSpec::gyroscope(),
            &self.sample,
            [x.as_slice(), y.as_slice(), z.as_slice()],
        )
    }
}

/// What to read, where to write and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub csvin: PathBuf,
    pub outdir: Option<PathBuf>,
    pub format: OutputFormat,
    pub show: bool,
    pub verbose: bool,
}

impl PlotArgs {
    pub fn new<P: Into<PathBuf>>(csvin: P) -> PlotArgs {
        PlotArgs {
            csvin: csvin.into(),
            outdir: None,
            format: OutputFormat::Svg,
            show: false,
            verbose: false,
        }
    }
}

/// Load and validate the sample log, then render the accelerometer and the gyroscope charts, in this order.
/// Nothing is rendered if the input is invalid.
/// Return the paths of the written charts.
pub fn run(args: &PlotArgs) -> Result<Vec<PathBuf>, MpuPlotError> {
    info!("> read data from {}", args.csvin.display());
    let table = SampleTable::from_csv(&args.csvin)?;
    let (nrows, ncols) = table.shape();
    info!("> loaded {} samples with {} columns", nrows, ncols);
    debug!("{}", table);
    let channels = table.channels();

    let (accel_out, gyro_out) =
        output_paths(&args.csvin, args.outdir.as_deref(), args.format.extension());
    if let Some(dir) = &args.outdir {
        fs::create_dir_all(dir).map_err(|e| MpuPlotError::io(dir, e))?;
    }

    let charts = [
        (channels.accel_chart()?, accel_out),
        (channels.gyro_chart()?, gyro_out),
    ];
    let mut written: Vec<PathBuf> = Vec::with_capacity(charts.len());
    for (chart, fout) in charts {
        chart.render(args.format, &fout)?;
        info!("> saved {} to {}", chart.spec.title, fout.display());
        if args.show {
            chart.show();
        }
        written.push(fout);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    // fixtures are in ./test, run tests with:
    // cargo test -- --nocapture
    // to see the tables printed to stdout

    const SCENARIO: &str = "sample,ax,ay,az,gx,gy,gz\n\
                            1,0.1,0.2,9.8,0.0,0.0,0.0\n\
                            2,0.1,0.2,9.7,0.01,0.0,-0.01\n";

    fn f64eq_with_nan_eq(a: f64, b: f64) -> bool {
        (a.is_nan() && b.is_nan()) || (a == b)
    }

    fn f64vec_compare(va: &[f64], vb: &[f64]) -> bool {
        (va.len() == vb.len()) && va.iter().zip(vb).all(|(a, b)| f64eq_with_nan_eq(*a, *b))
    }

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("mpu_datalog_run_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn scenario_two_rows() {
        let table = SampleTable::from_reader(SCENARIO.as_bytes()).unwrap();
        println!("{}", table);
        assert_eq!(table.shape(), (2, 7));
        let ch = table.channels();
        assert_eq!(ch.sample, vec![1., 2.]);
        assert_eq!(ch.accel, [vec![0.1, 0.1], vec![0.2, 0.2], vec![9.8, 9.7]]);
        assert_eq!(ch.gyro, [vec![0.0, 0.01], vec![0.0, 0.0], vec![0.0, -0.01]]);
        assert_eq!(ch.len(), 2);
    }

    #[test]
    fn firmware_log_fixture() {
        let table = SampleTable::from_csv("./test/mpu_data.csv").unwrap();
        let (nrows, ncols) = table.shape();
        assert_eq!((nrows, ncols), (10, 7));
        let ch = table.channels();
        assert_eq!(ch.sample, (0..10).map(|n| n as f64).collect::<Vec<f64>>());
        for v in ch.accel.iter().chain(ch.gyro.iter()) {
            assert_eq!(v.len(), nrows);
        }
        assert_eq!(table.row(0).unwrap()[3], 1.0012);
        assert!(table.row(10).is_none());
    }

    #[test]
    fn five_columns_is_invalid_input() {
        let err = SampleTable::from_csv("./test/five_columns.csv").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("found 5 columns"));
    }

    #[test]
    fn header_only_is_invalid_input() {
        let err = SampleTable::from_csv("./test/header_only.csv").unwrap_err();
        assert!(err.is_invalid_input());
        let err = SampleTable::from_reader("".as_bytes()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SampleTable::from_csv("./test/does_not_exist.csv").unwrap_err();
        match err {
            MpuPlotError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("./test/does_not_exist.csv"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn malformed_values_become_nan() {
        let table = SampleTable::from_csv("./test/with_gaps.csv").unwrap();
        assert_eq!(table.shape(), (5, 7));
        let ch = table.channels();
        assert!(f64vec_compare(&ch.sample, &[0., 1., 2., 3., 4.]));
        assert!(f64vec_compare(&ch.accel[0], &[0.01, f64::NAN, 0.03, 0.04, 0.05]));
        assert!(f64vec_compare(&ch.gyro[2], &[1.5, 1.4, f64::NAN, 1.2, 1.1]));
    }

    #[test]
    fn undecodable_bytes_become_nan() {
        let csv: &[u8] = b"h\n1,0,0,\xff,0,0,0\n2,0.1,0.2,9.8,0,0,\xfe\xff\n";
        let table = SampleTable::from_reader(csv).unwrap();
        assert_eq!(table.shape(), (2, 7));
        let ch = table.channels();
        assert!(f64vec_compare(&ch.accel[2], &[f64::NAN, 9.8]));
        assert!(f64vec_compare(&ch.gyro[2], &[0., f64::NAN]));
        assert_eq!(ch.sample, vec![1., 2.]);
    }

    #[test]
    fn whitespace_only_lines_are_skipped() {
        let csv = "h\n1,0,0,1,0,0,0\n   \n\t\n2,0,0,1,0,0,0\n";
        let table = SampleTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.shape(), (2, 7));
        assert_eq!(table.channels().sample, vec![1., 2.]);
    }

    #[test]
    fn ragged_row_is_rejected() {
        let csv = "h\n1,0,0,1,0,0,0\n2,0,0,1,0\n";
        let err = SampleTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("line 3 has 5 columns instead of 7"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = "n,ax,ay,az,gx,gy,gz,temp\n\
                   1,0.1,0.2,0.3,1,2,3,36.5\n\
                   2,0.4,0.5,0.6,4,5,6,36.6\n";
        let table = SampleTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.shape(), (2, 8));
        let ch = table.channels();
        assert_eq!(ch.gyro[2], vec![3., 6.]);
        assert_eq!(table.column(7), Some(vec![36.5, 36.6]));
        assert_eq!(table.column(8), None);
    }

    #[test]
    fn comments_blank_lines_and_spaces() {
        let csv = "n,ax,ay,az,gx,gy,gz\n\
                   # recording started\n\
                   \n\
                   1, 0.1, 0.2, 0.3, 1, 2, 3\n";
        let table = SampleTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.shape(), (1, 7));
        assert_eq!(table.row(0).unwrap(), &[1., 0.1, 0.2, 0.3, 1., 2., 3.]);
    }

    #[test]
    fn loading_twice_gives_same_channels() {
        let a = SampleTable::from_csv("./test/with_gaps.csv").unwrap().channels();
        let b = SampleTable::from_csv("./test/with_gaps.csv").unwrap().channels();
        assert!(f64vec_compare(&a.sample, &b.sample));
        for (va, vb) in a.accel.iter().chain(a.gyro.iter()).zip(b.accel.iter().chain(b.gyro.iter())) {
            assert!(f64vec_compare(va, vb));
        }
    }

    #[test]
    fn charts_use_the_right_channels() {
        let ch = SampleTable::from_reader(SCENARIO.as_bytes()).unwrap().channels();
        let accel = ch.accel_chart().unwrap();
        assert_eq!(accel.x, &[1., 2.]);
        assert_eq!(accel.series[2], &[9.8, 9.7]);
        assert_eq!(accel.spec, ChartSpec::accelerometer());
        let gyro = ch.gyro_chart().unwrap();
        assert_eq!(gyro.series[0], &[0.0, 0.01]);
        assert_eq!(gyro.series[2], &[0.0, -0.01]);
        assert_eq!(gyro.spec, ChartSpec::gyroscope());
    }

    #[test]
    fn run_writes_accel_then_gyro() {
        let dir = out_dir("svg");
        let mut args = PlotArgs::new("./test/mpu_data.csv");
        args.outdir = Some(dir.clone());
        let written = run(&args).unwrap();
        assert_eq!(
            written,
            vec![dir.join("mpu_data_accel.svg"), dir.join("mpu_data_gyro.svg")]
        );
        assert!(fs::read_to_string(&written[0]).unwrap().contains("Accel Y"));
        assert!(fs::read_to_string(&written[1]).unwrap().contains("Gyro Y"));
    }

    #[test]
    fn run_writes_html() {
        let dir = out_dir("html");
        let mut args = PlotArgs::new("./test/with_gaps.csv");
        args.outdir = Some(dir.clone());
        args.format = OutputFormat::Html;
        let written = run(&args).unwrap();
        assert_eq!(written[1], dir.join("with_gaps_gyro.html"));
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn run_renders_nothing_on_invalid_input() {
        let dir = out_dir("invalid");
        let mut args = PlotArgs::new("./test/five_columns.csv");
        args.outdir = Some(dir.clone());
        let err = run(&args).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!dir.join("five_columns_accel.svg").exists());
        assert!(!dir.join("five_columns_gyro.svg").exists());
    }
}
