//! Views over saliency results: tables, static charts and hover charts.

pub mod chart;
pub mod frame;
pub mod hover;
pub mod style;

pub use chart::{Bar, BarChart, ChartBackend, SvgBackend, SvgOptions, render_svg};
pub use frame::{Column, ColumnData, SaliencyFrame, StyledFrame};
pub use hover::{HoverChart, HoverRow};
pub use style::{DEFAULT_STYLE, SignColour, Style};

/// Anything that can present an explanation as a table.
pub trait ExplanationVisualiser {
    fn as_dataframe(&self) -> SaliencyFrame;
}
