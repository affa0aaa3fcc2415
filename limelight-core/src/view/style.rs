//! Colour scheme and HTML snippets shared by every saliency view.

/// Colour palette for saliency views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub positive_primary_colour: &'static str,
    pub positive_primary_colour_faded: &'static str,
    pub negative_primary_colour: &'static str,
    pub negative_primary_colour_faded: &'static str,
    pub neutral_primary_colour: &'static str,
    pub feature_colour: &'static str,
    pub output_colour: &'static str,
}

pub const DEFAULT_STYLE: Style = Style {
    positive_primary_colour: "#13ba3c",
    positive_primary_colour_faded: "#88dc9d",
    negative_primary_colour: "#ee0000",
    negative_primary_colour_faded: "#f67f7f",
    neutral_primary_colour: "#ffffff",
    feature_colour: "#1f5f99",
    output_colour: "#7a3f9d",
};

/// Which side of zero a score falls on. Zero is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignColour {
    Positive,
    Negative,
}

impl SignColour {
    pub fn for_score(score: f64) -> Self {
        if score < 0.0 {
            SignColour::Negative
        } else {
            SignColour::Positive
        }
    }

    pub fn primary(self, style: &Style) -> &'static str {
        match self {
            SignColour::Positive => style.positive_primary_colour,
            SignColour::Negative => style.negative_primary_colour,
        }
    }

    pub fn faded(self, style: &Style) -> &'static str {
        match self {
            SignColour::Positive => style.positive_primary_colour_faded,
            SignColour::Negative => style.negative_primary_colour_faded,
        }
    }
}

pub fn bold_green_html(text: &str) -> String {
    format!(
        "<b style='color:{}'>{}</b>",
        DEFAULT_STYLE.positive_primary_colour, text
    )
}

pub fn bold_red_html(text: &str) -> String {
    format!(
        "<b style='color:{}'>{}</b>",
        DEFAULT_STYLE.negative_primary_colour, text
    )
}

pub fn feature_html(name: &str) -> String {
    format!(
        "<span style='color:{}'><b>{}</b></span>",
        DEFAULT_STYLE.feature_colour, name
    )
}

pub fn output_html(name: &str) -> String {
    format!(
        "<span style='color:{}'><b>{}</b></span>",
        DEFAULT_STYLE.output_colour, name
    )
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
