// ABOUTME: Plot slide renderer for the slide-report application
// ABOUTME: Reads x;y data files and embeds them as a rendered line chart

use super::{titled_slide, Renderer};
use crate::chart::{ChartFormat, Figure};
use crate::errors::{ReportError, Result};
use crate::pptx::{Layout, Rect, Slide, EMU_PER_INCH};
use crate::record::Record;
use crate::session::DocumentSession;
use crate::utils;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 1.38in, 1.18in, 6.4in x 4.8in
pub const PLOT_FRAME: Rect = Rect {
    x: 138 * EMU_PER_INCH / 100,
    y: 118 * EMU_PER_INCH / 100,
    cx: 64 * EMU_PER_INCH / 10,
    cy: 48 * EMU_PER_INCH / 10,
};

/// Chart slide drawn from a semicolon-delimited `x;y` data file
pub struct PlotRenderer {
    data_dir: Option<PathBuf>,
}

impl PlotRenderer {
    /// `data_dir` anchors relative data file paths
    pub fn new(data_dir: Option<&Path>) -> Self {
        Self {
            data_dir: data_dir.map(Path::to_path_buf),
        }
    }
}

impl Renderer for PlotRenderer {
    fn name(&self) -> &'static str {
        "plot"
    }

    fn layout(&self) -> Layout {
        Layout::TitleOnly
    }

    fn build(&self, record: &Record, _session: &mut DocumentSession) -> Result<Slide> {
        let mut slide = titled_slide(self.layout(), record)?;
        let path = utils::resolve_relative_to(self.data_dir.as_deref(), record.content_str()?);
        let configuration = record.plot_configuration()?;
        let (xs, ys) = load_plot_data(&path)?;
        debug!("Plotting {} points from {:?}", xs.len(), path);

        let mut figure = Figure::default();
        figure.plot(&xs, &ys)?;
        figure.set_axis_labels(&configuration.x_label, &configuration.y_label);
        let buffer = figure.render(ChartFormat::Png)?;

        slide.add_picture(buffer, PLOT_FRAME)?;
        Ok(slide)
    }
}

/// Read a plot data file into its x and y columns
pub fn load_plot_data(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    utils::validate_file_exists(path)?;
    let text = fs::read_to_string(path).map_err(ReportError::FileReadError)?;
    parse_plot_data(&text, path)
}

/// Parse `x;y` rows in file order. Blank lines and `#` comments are skipped.
pub fn parse_plot_data(text: &str, path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let row = line.split('#').next().unwrap_or_default().trim();
        if row.is_empty() {
            continue;
        }
        let error = |message: String| ReportError::PlotDataError {
            path: path.to_path_buf(),
            line: i + 1,
            message,
        };

        let fields: Vec<&str> = row.split(';').map(str::trim).collect();
        if fields.len() != 2 {
            return Err(error(format!(
                "expected 2 columns, found {}",
                fields.len()
            )));
        }
        let mut values = [0.0f64; 2];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| error(format!("'{}' is not a number", field)))?;
        }
        xs.push(values[0]);
        ys.push(values[1]);
    }

    Ok((xs, ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_plot_data_in_file_order() {
        let (xs, ys) = parse_plot_data("1;2\n3;4\n", Path::new("data.csv")).unwrap();
        assert_eq!(xs, vec![1.0, 3.0]);
        assert_eq!(ys, vec![2.0, 4.0]);
    }

    #[test]
    fn test_parse_plot_data_skips_blanks_and_comments() {
        let text = "# cycles;stress\n\n 10 ; 250.5 \n1e3;-4 # tail\n";
        let (xs, ys) = parse_plot_data(text, Path::new("data.csv")).unwrap();
        assert_eq!(xs, vec![10.0, 1000.0]);
        assert_eq!(ys, vec![250.5, -4.0]);
    }

    #[test]
    fn test_parse_plot_data_rejects_malformed_rows() {
        match parse_plot_data("1;2\n3;x\n", Path::new("data.csv")) {
            Err(ReportError::PlotDataError { line, message, .. }) => {
                assert_eq!(line, 2);
                assert!(message.contains("'x'"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            parse_plot_data("1;2;3\n", Path::new("data.csv")),
            Err(ReportError::PlotDataError { line: 1, .. })
        ));
        assert!(matches!(
            parse_plot_data("5\n", Path::new("data.csv")),
            Err(ReportError::PlotDataError { .. })
        ));
        assert!(parse_plot_data("nan;1\n", Path::new("data.csv")).is_err());
    }

    #[test]
    fn test_build_adds_one_chart_picture() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("data.csv"), "1;2\n3;4\n").unwrap();
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();

        let record = Record::from_value(
            0,
            json!({
                "type": "plot",
                "title": "Fatigue",
                "content": "data.csv",
                "configuration": {"x-label": "X", "y-label": "Y"}
            }),
        );
        let slide = PlotRenderer::new(Some(dir.path()))
            .build(&record, &mut session)
            .expect("Failed to build plot slide");

        assert_eq!(slide.layout(), Layout::TitleOnly);
        assert_eq!(slide.title(), Some("Fatigue"));
        let pictures: Vec<_> = slide.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert!(!pictures[0].data.is_empty());
        assert_eq!(pictures[0].frame, PLOT_FRAME);
    }

    #[test]
    fn test_missing_data_file_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let record = Record::from_value(
            1,
            json!({
                "type": "plot",
                "title": "Missing",
                "content": "nope.csv",
                "configuration": {"x-label": "X", "y-label": "Y"}
            }),
        );
        assert!(matches!(
            PlotRenderer::new(Some(dir.path())).build(&record, &mut session),
            Err(ReportError::PathNotFoundError(_))
        ));
    }
}
