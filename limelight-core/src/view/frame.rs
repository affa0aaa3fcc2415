//! Column-oriented tabular view of saliency results.
//!
//! A [`SaliencyFrame`] holds named columns that may have different lengths:
//! each output contributes one column group sized to its own feature count
//! and nothing is reindexed. Missing cells render as blanks.

use super::style::escape_html;
use std::fmt;

/// Cell values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Float(Vec<f64>),
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Float(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Text(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Formatted cell at `row`, or `None` past the end of this column.
    pub fn cell(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Text(v) => v.get(row).cloned(),
            ColumnData::Float(v) => v.get(row).map(|x| format_float(*x)),
        }
    }
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else {
        format!("{x:.6}")
    }
}

/// Tabular saliency view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaliencyFrame {
    columns: Vec<Column>,
}

impl SaliencyFrame {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn float_column(&self, name: &str) -> Option<&[f64]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn text_column(&self, name: &str) -> Option<&[String]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Text(v)) => Some(v),
            _ => None,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Length of the longest column.
    pub fn height(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Wrap the frame for HTML rendering.
    pub fn style(self) -> StyledFrame {
        StyledFrame { frame: self }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        (0..self.height())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.cell(row).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for SaliencyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                rows.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c.name, w = *w))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}

/// A frame prepared for HTML display.
///
/// No cell styles are applied; the rendered table carries exactly the data
/// of the wrapped frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledFrame {
    frame: SaliencyFrame,
}

impl StyledFrame {
    pub fn frame(&self) -> &SaliencyFrame {
        &self.frame
    }

    pub fn into_frame(self) -> SaliencyFrame {
        self.frame
    }

    /// Render to an HTML table string.
    pub fn render(&self) -> String {
        let mut html = String::from("<table class=\"saliency-table\">\n<thead><tr>\n");
        for name in self.frame.column_names() {
            html.push_str(&format!("  <th>{}</th>\n", escape_html(name)));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in self.frame.rows() {
            html.push_str("<tr>\n");
            for cell in row {
                html.push_str(&format!("  <td>{}</td>\n", escape_html(&cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unaligned() -> SaliencyFrame {
        SaliencyFrame::new(vec![
            Column::text("A_features", vec!["x".into(), "y".into()]),
            Column::float("A_score", vec![0.5, -0.25]),
            Column::text("B_features", vec!["x".into()]),
            Column::float("B_score", vec![f64::NAN]),
        ])
    }

    #[test]
    fn test_dimensions() {
        let frame = unaligned();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("B_score").unwrap().len(), 1);
        assert_eq!(frame.float_column("A_score").unwrap(), &[0.5, -0.25]);
        assert!(frame.float_column("A_features").is_none());
        assert_eq!(frame.text_column("B_features").unwrap(), &["x".to_string()]);
    }

    #[test]
    fn test_display_leaves_blank_cells() {
        let text = unaligned().to_string();
        assert_eq!(
            text,
            "A_features    A_score  B_features  B_score\n\
             \x20        x   0.500000           x      NaN\n\
             \x20        y  -0.250000\n"
        );
    }

    #[test]
    fn test_styled_render() {
        let html = unaligned().style().render();
        assert!(html.starts_with("<table class=\"saliency-table\">"));
        assert!(html.contains("<th>A_features</th>"));
        assert!(html.contains("<td>-0.250000</td>"));
        assert!(html.contains("<td></td>"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_render_escapes_names() {
        let frame = SaliencyFrame::new(vec![Column::text("<o>_features", vec!["a&b".into()])]);
        let html = frame.style().render();
        assert!(html.contains("<th>&lt;o&gt;_features</th>"));
        assert!(html.contains("<td>a&amp;b</td>"));
    }
}
