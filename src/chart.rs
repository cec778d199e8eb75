use crate::error::MpuPlotError;
use crate::utils::{finite_runs, padded_range};
use log::debug;
use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Series colours for the X, Y and Z axes.
const SERIES_RGB: [RGBColor; 3] = [RGBColor(255, 0, 0), RGBColor(0, 128, 0), RGBColor(0, 0, 255)];
const SERIES_HEX: [&str; 3] = ["#ff0000", "#008000", "#0000ff"];

/// Fraction of the y span added above and below the data.
const Y_PAD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Html => "html",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Titles, labels and styling of one sensor chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub labels: [&'static str; 3],
    pub line_style: LineStyle,
    /// canvas width and height in pixels
    pub size: (u32, u32),
}

impl ChartSpec {
    pub fn accelerometer() -> ChartSpec {
        ChartSpec {
            title: "Accelerometer — X, Y, Z axes",
            x_desc: "Sample number",
            y_desc: "Acceleration (g)",
            labels: ["Accel X", "Accel Y", "Accel Z"],
            line_style: LineStyle::Solid,
            size: (1000, 500),
        }
    }

    pub fn gyroscope() -> ChartSpec {
        ChartSpec {
            title: "Gyroscope — X, Y, Z axes",
            x_desc: "Sample number",
            y_desc: "Angular velocity (°/s)",
            labels: ["Gyro X", "Gyro Y", "Gyro Z"],
            line_style: LineStyle::Dashed,
            size: (1000, 500),
        }
    }
}

/// Three series plotted against the sample index.
/// Borrows the channel vectors, nothing is copied until rendering.
#[derive(Debug, Clone, Copy)]
pub struct Chart<'a> {
    pub spec: ChartSpec,
    pub x: &'a [f64],
    pub series: [&'a [f64]; 3],
}

impl<'a> Chart<'a> {
    /// All series must be as long as the sample index.
    pub fn new(
        spec: ChartSpec,
        x: &'a [f64],
        series: [&'a [f64]; 3],
    ) -> Result<Chart<'a>, MpuPlotError> {
        for (s, label) in series.iter().zip(spec.labels) {
            if s.len() != x.len() {
                return Err(MpuPlotError::invalid_input(format!(
                    "series {} has {} values but there are {} samples",
                    label,
                    s.len(),
                    x.len()
                )));
            }
        }
        Ok(Chart { spec, x, series })
    }

    /// Write the chart to `fout` in the given format.
    pub fn render<P>(&self, format: OutputFormat, fout: P) -> Result<(), MpuPlotError>
    where
        P: AsRef<Path>,
    {
        let fout = fout.as_ref();
        match format {
            OutputFormat::Svg => self.plot_svg(fout).map_err(|e| MpuPlotError::Render {
                chart: self.spec.title.to_owned(),
                reason: e.to_string(),
            }),
            OutputFormat::Html => {
                let html = self.to_plotly().to_html();
                fs::write(fout, html).map_err(|e| MpuPlotError::io(fout, e))
            }
        }
    }

    /// Open the chart in the system browser.
    pub fn show(&self) {
        self.to_plotly().show();
    }

    /// Plot the three series to svg, breaking the lines at NaN values.
    pub fn plot_svg(&self, fout: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = &self.spec;
        let (xmin, xmax) = padded_range(self.x.iter(), 0.);
        let (ymin, ymax) = padded_range(self.series.iter().flat_map(|s| s.iter()), Y_PAD);
        debug!(
            "{}: x range {}..{}, y range {}..{}",
            spec.title, xmin, xmax, ymin, ymax
        );
        let root = SVGBackend::new(fout, spec.size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(RGBColor(200, 200, 200).mix(0.4).stroke_width(1))
            .bold_line_style(RGBColor(100, 100, 100).mix(0.5).stroke_width(1))
            .label_style(("sans-serif", 14))
            .x_desc(spec.x_desc)
            .y_desc(spec.y_desc)
            .draw()?;
        for (i, (ys, label)) in self.series.iter().zip(spec.labels).enumerate() {
            let style = SERIES_RGB[i].stroke_width(2);
            let mut runs = finite_runs(self.x, ys);
            debug!("{}: {} line segments", label, runs.len());
            if runs.is_empty() {
                // keep the legend entry for a series without valid data
                runs.push(Vec::new());
            }
            for (n, run) in runs.into_iter().enumerate() {
                let anno = match spec.line_style {
                    LineStyle::Solid => chart.draw_series(LineSeries::new(run, style))?,
                    LineStyle::Dashed => {
                        chart.draw_series(DashedLineSeries::new(run, 8, 5, style))?
                    }
                };
                if n == 0 {
                    anno.label(label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], style)
                    });
                }
            }
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 14))
            .draw()?;
        root.present()?;
        Ok(())
    }

    /// Build the interactive plotly version of the chart.
    /// NaN values are serialized as null, which plotly draws as gaps.
    pub fn to_plotly(&self) -> Plot {
        let spec = &self.spec;
        let dash = match spec.line_style {
            LineStyle::Solid => DashType::Solid,
            LineStyle::Dashed => DashType::Dash,
        };
        let mut plot = Plot::new();
        for ((ys, label), color) in self.series.iter().zip(spec.labels).zip(SERIES_HEX) {
            let trace = Scatter::new(self.x.to_vec(), ys.to_vec())
                .mode(Mode::Lines)
                .name(label)
                .line(Line::new().color(color).dash(dash.clone()));
            plot.add_trace(trace);
        }
        let layout = Layout::new()
            .title(Title::new(spec.title))
            .x_axis(Axis::new().title(Title::new(spec.x_desc)).show_grid(true))
            .y_axis(Axis::new().title(Title::new(spec.y_desc)).show_grid(true))
            .show_legend(true)
            .width(spec.size.0 as usize)
            .height(spec.size.1 as usize);
        plot.set_layout(layout);
        plot
    }
}
