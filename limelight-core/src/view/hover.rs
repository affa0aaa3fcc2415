//! Interactive hover charts, one per output.
//!
//! A [`HoverChart`] is a data source plus presentation settings. It is not
//! displayed here: callers either embed [`HoverChart::to_chart_config`] into
//! their own page or write out [`HoverChart::to_html`].

use super::style::{
    DEFAULT_STYLE, SignColour, bold_green_html, bold_red_html, escape_html, feature_html,
    output_html,
};
use crate::error::LimeError;
use crate::saliency::Saliency;
use handlebars::Handlebars;
use serde::Serialize;

/// One bar of a hover chart with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverRow {
    pub feature: String,
    pub saliency: f64,
    pub color: String,
    pub color_faded: String,
    /// Score to two decimals wrapped in bold green or red HTML.
    pub saliency_colored: String,
}

/// Hover-enabled horizontal bar chart for a single output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverChart {
    pub output: String,
    pub title: String,
    pub rows: Vec<HoverRow>,
    /// Tooltip template; `@feature` and `@saliency_colored` are filled per row.
    /// The output name is already escaped; feature names are escaped on fill.
    pub tooltip: String,
    pub x_label: String,
    pub y_label: String,
}

impl HoverChart {
    pub fn from_saliency(output: &str, saliency: &Saliency) -> Self {
        let rows = saliency
            .per_feature_importance
            .iter()
            .map(|pfi| {
                let sign = SignColour::for_score(pfi.score);
                let score_text = format!("{:.2}", pfi.score);
                HoverRow {
                    feature: pfi.feature.name.clone(),
                    saliency: pfi.score,
                    color: sign.primary(&DEFAULT_STYLE).to_string(),
                    color_faded: sign.faded(&DEFAULT_STYLE).to_string(),
                    saliency_colored: match sign {
                        SignColour::Positive => bold_green_html(&score_text),
                        SignColour::Negative => bold_red_html(&score_text),
                    },
                }
            })
            .collect();

        Self {
            output: output.to_string(),
            title: "Lime Feature Importances".to_string(),
            rows,
            tooltip: format!(
                "<h3>LIME</h3> {} saliency to {}: @saliency_colored",
                feature_html(FEATURE_FIELD),
                output_html(&escape_html(output).replace('@', "&#64;"))
            ),
            x_label: "Saliency Value".to_string(),
            y_label: "Feature".to_string(),
        }
    }

    /// Tooltip text for row `index` with placeholders filled in.
    ///
    /// Placeholders are filled in a single left-to-right pass, so text
    /// substituted for one field is never rescanned for another.
    pub fn tooltip_for(&self, index: usize) -> Option<String> {
        self.rows.get(index).map(|row| {
            let feature = escape_html(&row.feature);
            let mut filled = String::with_capacity(self.tooltip.len() + feature.len());
            let mut rest = self.tooltip.as_str();
            while let Some(at) = rest.find('@') {
                filled.push_str(&rest[..at]);
                rest = &rest[at..];
                if let Some(tail) = rest.strip_prefix(SALIENCY_FIELD) {
                    filled.push_str(&row.saliency_colored);
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix(FEATURE_FIELD) {
                    filled.push_str(&feature);
                    rest = tail;
                } else {
                    filled.push('@');
                    rest = &rest[1..];
                }
            }
            filled.push_str(rest);
            filled
        })
    }

    /// Chart.js configuration for a horizontal bar chart.
    pub fn to_chart_config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "bar",
            "data": {
                "labels": self.rows.iter().map(|r| &r.feature).collect::<Vec<_>>(),
                "datasets": [{
                    "label": self.output,
                    "data": self.rows.iter().map(|r| r.saliency).collect::<Vec<_>>(),
                    "backgroundColor": self.rows.iter().map(|r| &r.color_faded).collect::<Vec<_>>(),
                    "borderColor": self.rows.iter().map(|r| &r.color).collect::<Vec<_>>(),
                    "hoverBackgroundColor": self.rows.iter().map(|r| &r.color).collect::<Vec<_>>(),
                    "borderWidth": 1,
                    "barPercentage": 0.75,
                }]
            },
            "options": {
                "indexAxis": "y",
                "responsive": true,
                "maintainAspectRatio": false,
                "plugins": {
                    "title": { "display": true, "text": self.title },
                    "legend": { "display": false },
                    "tooltip": { "enabled": false },
                    "zeroLine": { "color": ZERO_LINE_COLOUR, "lineWidth": 1 }
                },
                "scales": {
                    "x": {
                        "beginAtZero": true,
                        "title": { "display": true, "text": self.x_label }
                    },
                    "y": { "title": { "display": true, "text": self.y_label } }
                }
            }
        })
    }

    /// Standalone HTML page showing the chart with HTML tooltips.
    pub fn to_html(&self) -> Result<String, LimeError> {
        let tooltips: Vec<String> = (0..self.rows.len())
            .filter_map(|i| self.tooltip_for(i))
            .collect();
        let data = serde_json::json!({
            "title": self.title,
            "output": self.output,
            "config_json": script_safe_json(&self.to_chart_config())?,
            "tooltips_json": script_safe_json(&serde_json::json!(tooltips))?,
        });

        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string("hover_chart", HOVER_PAGE_TEMPLATE)
            .map_err(|e| LimeError::render(format!("Invalid hover chart template: {e}")))?;
        handlebars
            .render("hover_chart", &data)
            .map_err(|e| LimeError::render(format!("Hover chart rendering failed: {e}")))
    }
}

const FEATURE_FIELD: &str = "@feature";
const SALIENCY_FIELD: &str = "@saliency_colored";

/// Reference line drawn at zero saliency.
const ZERO_LINE_COLOUR: &str = "#000000";

/// JSON that can sit inside a `<script>` element.
fn script_safe_json(value: &serde_json::Value) -> Result<String, LimeError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

const HOVER_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}} - {{output}}</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<style>
  html, body { height: 100%; margin: 0; }
  #chart-wrap { position: relative; height: 100%; width: 100%; }
  #hover-tip { position: absolute; pointer-events: none; background: #fff;
               border: 1px solid #ccc; padding: 4px 8px; opacity: 0; }
</style>
</head>
<body>
<div id="chart-wrap">
  <canvas id="saliency-chart"></canvas>
  <div id="hover-tip"></div>
</div>
<script>
  const config = {{{config_json}}};
  const tooltips = {{{tooltips_json}}};
  config.options.plugins.tooltip.external = function (context) {
    const tip = document.getElementById("hover-tip");
    const model = context.tooltip;
    if (model.opacity === 0 || !model.dataPoints || !model.dataPoints.length) {
      tip.style.opacity = 0;
      return;
    }
    tip.innerHTML = tooltips[model.dataPoints[0].dataIndex];
    tip.style.left = model.caretX + "px";
    tip.style.top = model.caretY + "px";
    tip.style.opacity = 1;
  };
  const zeroLine = {
    id: "zeroLine",
    afterDatasetsDraw(chart, args, options) {
      const x = chart.scales.x.getPixelForValue(0);
      const area = chart.chartArea;
      if (x < area.left || x > area.right) {
        return;
      }
      const ctx = chart.ctx;
      ctx.save();
      ctx.strokeStyle = options.color;
      ctx.lineWidth = options.lineWidth;
      ctx.beginPath();
      ctx.moveTo(x, area.top);
      ctx.lineTo(x, area.bottom);
      ctx.stroke();
      ctx.restore();
    }
  };
  new Chart(document.getElementById("saliency-chart"), { ...config, plugins: [zeroLine] });
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Feature;
    use crate::saliency::FeatureImportance;

    fn chart() -> HoverChart {
        let saliency = Saliency::new(vec![
            FeatureImportance::new(Feature::numerical("age", 40.0), 0.456, 1.0),
            FeatureImportance::new(Feature::numerical("debt", 900.0), -0.3, 1.0),
        ]);
        HoverChart::from_saliency("approved", &saliency)
    }

    #[test]
    fn test_derived_columns() {
        let chart = chart();
        assert_eq!(chart.rows.len(), 2);
        assert_eq!(chart.rows[0].color, "#13ba3c");
        assert_eq!(chart.rows[0].color_faded, "#88dc9d");
        assert_eq!(
            chart.rows[0].saliency_colored,
            "<b style='color:#13ba3c'>0.46</b>"
        );
        assert_eq!(chart.rows[1].color, "#ee0000");
        assert_eq!(chart.rows[1].color_faded, "#f67f7f");
        assert_eq!(
            chart.rows[1].saliency_colored,
            "<b style='color:#ee0000'>-0.30</b>"
        );
    }

    #[test]
    fn test_tooltip_text() {
        let chart = chart();
        assert!(chart.tooltip.starts_with("<h3>LIME</h3> "));
        assert!(chart.tooltip.contains("<b>@feature</b>"));
        assert!(chart.tooltip.contains("<b>approved</b>"));
        assert!(chart.tooltip.ends_with(": @saliency_colored"));

        let filled = chart.tooltip_for(1).unwrap();
        assert!(filled.contains("<b>debt</b>"));
        assert!(filled.ends_with("<b style='color:#ee0000'>-0.30</b>"));
        assert!(chart.tooltip_for(2).is_none());
    }

    #[test]
    fn test_chart_config() {
        let config = chart().to_chart_config();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["options"]["indexAxis"], "y");
        assert_eq!(config["data"]["labels"][1], "debt");
        assert_eq!(config["data"]["datasets"][0]["data"][1], -0.3);
        assert_eq!(
            config["data"]["datasets"][0]["backgroundColor"][1],
            "#f67f7f"
        );
        assert_eq!(
            config["options"]["plugins"]["title"]["text"],
            "Lime Feature Importances"
        );
        assert_eq!(
            config["options"]["scales"]["x"]["title"]["text"],
            "Saliency Value"
        );
    }

    #[test]
    fn test_chart_config_zero_line() {
        let config = chart().to_chart_config();
        assert_eq!(config["options"]["scales"]["x"]["beginAtZero"], true);
        assert_eq!(config["options"]["plugins"]["zeroLine"]["color"], "#000000");
        let html = chart().to_html().unwrap();
        assert!(html.contains("id: \"zeroLine\""));
        assert!(html.contains("plugins: [zeroLine]"));
    }

    #[test]
    fn test_tooltip_escapes_names() {
        let saliency = Saliency::new(vec![FeatureImportance::new(
            Feature::numerical("<img src=x onerror=alert(1)>", 1.0),
            0.5,
            1.0,
        )]);
        let chart = HoverChart::from_saliency("<script>", &saliency);
        assert!(chart.tooltip.contains("<b>&lt;script&gt;</b>"));

        let filled = chart.tooltip_for(0).unwrap();
        assert!(!filled.contains("<img"));
        assert!(!filled.contains("<script>"));
        assert!(filled.contains("<b>&lt;img src=x onerror=alert(1)&gt;</b>"));

        let html = chart.to_html().unwrap();
        let tooltips = html
            .lines()
            .find(|line| line.trim_start().starts_with("const tooltips ="))
            .unwrap();
        assert!(!tooltips.contains("<img"));
        assert!(tooltips.contains("&lt;img"));
    }

    #[test]
    fn test_tooltip_fills_placeholders_once() {
        let saliency = Saliency::new(vec![FeatureImportance::new(
            Feature::numerical("x@saliency_colored", 1.0),
            0.5,
            1.0,
        )]);
        let chart = HoverChart::from_saliency("out@feature", &saliency);
        assert!(chart.tooltip.contains("<b>out&#64;feature</b>"));
        let filled = chart.tooltip_for(0).unwrap();
        assert!(filled.contains("<b>x@saliency_colored</b>"));
        assert!(filled.ends_with(": <b style='color:#13ba3c'>0.50</b>"));
        assert_eq!(filled.matches("0.50").count(), 1);
    }

    #[test]
    fn test_to_html_page() {
        let html = chart().to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Lime Feature Importances - approved</title>"));
        assert!(html.contains("\"indexAxis\":\"y\""));
        // Tooltip markup stays inside the script without closing it early.
        assert!(html.contains("<h3>LIME<\\/h3>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
