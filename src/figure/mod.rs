use crate::{
    report::{self, PieData, Report, SizeMetric},
    style::{FigureStyle, DEFAULT_STYLE},
};
use anyhow::{bail, Result};
use kurbo::Size;
use piet::RenderContext;
use std::{fs, io, path::Path};

mod render;

/// Logical size of the whole figure: 15x8 inches at 100 dpi.
pub const FIGURE_SIZE: Size = Size::new(1500., 800.);

/// Everything needed to draw the chart, derived once from a [`Report`].
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    /// Text breakdown for the left panel, one line per `\n`.
    pub summary: String,
    pub pie: PieData,
}

impl Figure {
    pub fn from_report(report: &Report, metric: SizeMetric) -> Result<Self, report::Error> {
        let unit = match metric {
            SizeMetric::Raw => "MiB",
            SizeMetric::Compressed => "MiB, compressed",
        };
        Ok(Self {
            title: format!("Pallet sizes for {} [{unit}]", capitalize(&report.network)),
            summary: report::text_summary(report, metric)?,
            pie: report::pie_data(report, metric)?,
        })
    }

    pub fn render<RC: RenderContext>(&self, ctx: &mut RC) -> Result<(), piet::Error> {
        self.render_with_style(&DEFAULT_STYLE, ctx)
    }

    pub fn render_with_style<RC: RenderContext>(
        &self,
        style: &FigureStyle,
        ctx: &mut RC,
    ) -> Result<(), piet::Error> {
        render::render(self, style, ctx)
    }

    pub fn to_svg(&self, writer: impl io::Write, style: Option<&FigureStyle>) -> Result<()> {
        let mut rc = piet_svg::RenderContext::new(FIGURE_SIZE);
        self.render_with_style(style.unwrap_or(&DEFAULT_STYLE), &mut rc)?;
        rc.finish()?;
        rc.write(writer)?;
        Ok(())
    }

    pub fn to_svg_string(&self, style: Option<&FigureStyle>) -> Result<String> {
        let mut buf = vec![];
        self.to_svg(&mut buf, style)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn to_svg_file(&self, filename: impl AsRef<Path>, style: Option<&FigureStyle>) -> Result<()> {
        let file = io::BufWriter::new(fs::File::create(filename)?);
        self.to_svg(file, style)
    }

    #[cfg(feature = "png")]
    pub fn to_png_file(
        &self,
        filename: impl AsRef<Path>,
        px_scale: f64,
        style: Option<&FigureStyle>,
    ) -> Result<()> {
        let mut device = piet_common::Device::new()?;
        let width = (FIGURE_SIZE.width * px_scale) as usize;
        let height = (FIGURE_SIZE.height * px_scale) as usize;
        let mut bitmap = device.bitmap_target(width, height, px_scale)?;
        let mut rc = bitmap.render_context();
        self.render_with_style(style.unwrap_or(&DEFAULT_STYLE), &mut rc)?;
        rc.finish()?;
        drop(rc);

        bitmap.save_to_file(filename)?;
        Ok(())
    }

    /// Writes the figure in the format named by the file extension.
    pub fn to_file(&self, filename: impl AsRef<Path>, style: Option<&FigureStyle>) -> Result<()> {
        let filename = filename.as_ref();
        let extension = filename
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => self.to_svg_file(filename, style),
            #[cfg(feature = "png")]
            Some("png") => self.to_png_file(filename, 1., style),
            _ => bail!(
                "unsupported output format for {} (expected .svg{})",
                filename.display(),
                if cfg!(feature = "png") { " or .png" } else { "" }
            ),
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const REPORT: &str = r#"
    {
        "network": "kUSAMA",
        "pallets": [
            {
                "name": "System",
                "size": 6291456,
                "storage": [{ "name": "Account", "key_len": 1048576, "value_len": 4194304 }]
            },
            { "name": "Balances", "size": 2097152 },
            { "name": "Dust", "size": 10 }
        ]
    }
    "#;

    #[test]
    fn capitalizes_network() {
        assert_eq!(capitalize("polkadot"), "Polkadot");
        assert_eq!(capitalize("KUSAMA"), "Kusama");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn builds_from_report() {
        let report = Report::from_str(REPORT).unwrap();
        let figure = Figure::from_report(&report, SizeMetric::Raw).unwrap();

        assert_eq!(figure.title, "Pallet sizes for Kusama [MiB]");
        assert!(figure.summary.starts_with("System (6.0 MiB)\n Account (5.0 MiB)\n"));
        assert_eq!(figure.pie.labels, vec!["System 6", "Balances 2", "Other 0"]);
        assert_eq!(figure.pie.total(), 6291456 + 2097152 + 10);
    }

    #[test]
    fn svg_has_title_labels_and_no_percentages() {
        let report = Report::from_str(REPORT).unwrap();
        let figure = Figure::from_report(&report, SizeMetric::Raw).unwrap();

        let svg = figure.to_svg_string(None).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Pallet sizes for Kusama [MiB]"));
        for label in &figure.pie.labels {
            assert!(svg.contains(label.as_str()), "missing label {label:?}");
        }
        // slices are 75% and 25% of the total
        assert!(!svg.contains("75%"));
        assert!(!svg.contains("25%"));
    }

    #[test]
    fn svg_draws_every_slice_twice() {
        let report = Report::from_str(REPORT).unwrap();
        let three = Figure::from_report(&report, SizeMetric::Raw).unwrap();
        assert_eq!(three.pie.len(), 3);
        let one = Figure {
            pie: PieData {
                sizes: vec![three.pie.total()],
                labels: vec!["System 8".to_owned()],
            },
            ..three.clone()
        };

        let paths = |figure: &Figure| figure.to_svg_string(None).unwrap().matches("<path").count();
        // ring and labelled pie each add one wedge per slice; everything else is shared
        assert_eq!(paths(&three) - paths(&one), 2 * (three.pie.len() - one.pie.len()));
    }

    #[test]
    fn rejects_unknown_extension() {
        let report = Report::from_str(REPORT).unwrap();
        let figure = Figure::from_report(&report, SizeMetric::Raw).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = figure.to_file(dir.path().join("chart.bmp"), None).unwrap_err();
        assert!(err.to_string().contains("unsupported output format"));
    }
}
