//! Static horizontal bar chart of one output's saliencies.
//!
//! [`BarChart`] is the backend-neutral description; a [`ChartBackend`]
//! draws it. [`SvgBackend`] writes a standalone SVG document.

use super::style::{DEFAULT_STYLE, SignColour, escape_html};
use crate::error::LimeError;
use crate::saliency::Saliency;
use std::io::Write;

/// One bar: a feature and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// A horizontal bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    /// Bars in feature order; the first bar is drawn at the bottom.
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Chart of `saliency` coloured by score sign.
    pub fn from_saliency(decision: &str, saliency: &Saliency) -> Self {
        let bars = saliency
            .per_feature_importance
            .iter()
            .map(|pfi| Bar {
                label: pfi.feature.name.clone(),
                value: pfi.score,
                color: SignColour::for_score(pfi.score)
                    .primary(&DEFAULT_STYLE)
                    .to_string(),
            })
            .collect();
        Self {
            title: format!("LIME explanation of {decision}"),
            bars,
        }
    }

    /// Value range covering every bar and zero.
    fn extent(&self) -> (f64, f64) {
        let (lo, hi) = self
            .bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if hi - lo <= f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }
}

/// A rendering backend for bar charts. Drawing blocks until complete.
pub trait ChartBackend {
    fn draw(&mut self, chart: &BarChart) -> Result<(), LimeError>;
}

/// Layout of the generated SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    pub width: u32,
    pub bar_height: u32,
    pub label_width: u32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 640,
            bar_height: 28,
            label_width: 160,
        }
    }
}

const TITLE_HEIGHT: u32 = 40;
const AXIS_HEIGHT: u32 = 30;
const RIGHT_MARGIN: u32 = 20;

/// Render `chart` to an SVG document.
pub fn render_svg(chart: &BarChart, options: &SvgOptions) -> String {
    let plot_left = options.label_width as f64;
    let plot_width = (options.width.saturating_sub(options.label_width + RIGHT_MARGIN)).max(1) as f64;
    let n = chart.bars.len() as u32;
    let height = TITLE_HEIGHT + n * options.bar_height + AXIS_HEIGHT;
    let (lo, hi) = chart.extent();
    let x_of = |v: f64| plot_left + (v - lo) / (hi - lo) * plot_width;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{height}\" viewBox=\"0 0 {w} {height}\">\n",
        w = options.width
    );
    svg.push_str(&format!(
        "  <text class=\"title\" x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
        options.width as f64 / 2.0,
        escape_html(&chart.title)
    ));

    let bar_h = options.bar_height as f64;
    for (i, bar) in chart.bars.iter().enumerate() {
        // matplotlib-style barh: index 0 sits at the bottom.
        let slot = (n - 1 - i as u32) as f64;
        let y = TITLE_HEIGHT as f64 + slot * bar_h;
        let value = if bar.value.is_finite() { bar.value } else { 0.0 };
        let (x0, x1) = (x_of(0.0_f64.min(value)), x_of(0.0_f64.max(value)));
        svg.push_str(&format!(
            "  <rect class=\"bar\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{}: {:.4}</title></rect>\n",
            x0,
            y + bar_h * 0.1,
            x1 - x0,
            bar_h * 0.8,
            bar.color,
            escape_html(&bar.label),
            bar.value
        ));
        svg.push_str(&format!(
            "  <text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-size=\"12\">{}</text>\n",
            plot_left - 6.0,
            y + bar_h / 2.0,
            escape_html(&bar.label)
        ));
    }

    let axis_y = (TITLE_HEIGHT + n * options.bar_height) as f64;
    let zero_x = x_of(0.0);
    svg.push_str(&format!(
        "  <line class=\"zero\" x1=\"{zero_x:.1}\" y1=\"{}\" x2=\"{zero_x:.1}\" y2=\"{axis_y:.1}\" stroke=\"#000\"/>\n",
        TITLE_HEIGHT
    ));
    svg.push_str(&format!(
        "  <line class=\"axis\" x1=\"{plot_left:.1}\" y1=\"{axis_y:.1}\" x2=\"{:.1}\" y2=\"{axis_y:.1}\" stroke=\"#000\"/>\n",
        plot_left + plot_width
    ));
    for tick in [lo, 0.0, hi] {
        svg.push_str(&format!(
            "  <text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{:.2}</text>\n",
            x_of(tick),
            axis_y + 16.0,
            tick
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Writes each drawn chart as SVG to `writer`.
pub struct SvgBackend<W: Write> {
    writer: W,
    options: SvgOptions,
}

impl<W: Write> SvgBackend<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            options: SvgOptions::default(),
        }
    }

    pub fn with_options(writer: W, options: SvgOptions) -> Self {
        Self { writer, options }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartBackend for SvgBackend<W> {
    fn draw(&mut self, chart: &BarChart) -> Result<(), LimeError> {
        let svg = render_svg(chart, &self.options);
        self.writer.write_all(svg.as_bytes())?;
        self.writer.flush()?;
        tracing::debug!(title = %chart.title, bars = chart.bars.len(), "Rendered SVG chart");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Feature;
    use crate::saliency::FeatureImportance;

    fn saliency() -> Saliency {
        Saliency::new(vec![
            FeatureImportance::new(Feature::numerical("age", 40.0), 0.6, 1.0),
            FeatureImportance::new(Feature::numerical("debt", 1200.0), -0.2, 1.0),
            FeatureImportance::new(Feature::numerical("zero", 0.0), 0.0, 1.0),
        ])
    }

    #[test]
    fn test_bar_chart_from_saliency() {
        let chart = BarChart::from_saliency("approved", &saliency());
        assert_eq!(chart.title, "LIME explanation of approved");
        let colors: Vec<_> = chart.bars.iter().map(|b| b.color.as_str()).collect();
        assert_eq!(colors, vec!["#13ba3c", "#ee0000", "#13ba3c"]);
        assert_eq!(chart.bars[1].label, "debt");
    }

    #[test]
    fn test_extent_includes_zero() {
        let chart = BarChart::from_saliency("o", &saliency());
        assert_eq!(chart.extent(), (-0.2, 0.6));

        let flat = BarChart {
            title: "flat".into(),
            bars: vec![],
        };
        assert_eq!(flat.extent(), (-0.5, 0.5));
    }

    #[test]
    fn test_svg_backend_writes_document() {
        let chart = BarChart::from_saliency("approved", &saliency());
        let mut backend = SvgBackend::new(Vec::new());
        backend.draw(&chart).unwrap();
        let svg = String::from_utf8(backend.into_inner()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect class=\"bar\"").count(), 3);
        assert!(svg.contains("LIME explanation of approved"));
        assert!(svg.contains("fill=\"#ee0000\""));
    }

    #[test]
    fn test_first_bar_drawn_lowest() {
        let chart = BarChart::from_saliency("o", &saliency());
        let svg = render_svg(&chart, &SvgOptions::default());
        let age = svg.find(">age</text>").unwrap();
        let zero = svg.find(">zero</text>").unwrap();
        // Labels are emitted in feature order but positioned bottom-up.
        assert!(age < zero);
        assert!(svg.contains("y=\"110.0\" text-anchor=\"end\" dominant-baseline=\"middle\" font-size=\"12\">age"));
    }
}
