//! Read-only views over one explanation result.

use crate::error::LimeError;
use crate::saliency::{Saliency, SaliencyResults};
use crate::view::{
    BarChart, ChartBackend, Column, ExplanationVisualiser, HoverChart, SaliencyFrame, StyledFrame,
};
use std::collections::BTreeMap;

/// Wraps the saliencies of one LIME explanation.
///
/// Returned by [`LimeExplainer::explain`](crate::explainer::LimeExplainer::explain).
/// Every view is computed on demand from the wrapped results, which are
/// never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct LimeResults {
    saliency_results: SaliencyResults,
}

impl LimeResults {
    pub fn new(saliency_results: SaliencyResults) -> Self {
        Self { saliency_results }
    }

    pub fn saliency_results(&self) -> &SaliencyResults {
        &self.saliency_results
    }

    pub fn into_inner(self) -> SaliencyResults {
        self.saliency_results
    }

    /// Saliencies keyed by output name.
    pub fn map(&self) -> BTreeMap<&str, &Saliency> {
        self.saliency_results
            .saliencies
            .iter()
            .map(|(name, saliency)| (name.as_str(), saliency))
            .collect()
    }

    fn saliency(&self, decision: &str) -> Result<&Saliency, LimeError> {
        self.saliency_results
            .get(decision)
            .ok_or_else(|| LimeError::UnknownOutput(decision.to_string()))
    }

    /// The results as a table.
    ///
    /// For each output the frame contains:
    ///
    /// * `{output}_features`: the name of each input feature
    /// * `{output}_score`: the LIME saliency of that feature
    /// * `{output}_value`: the original value of the feature
    /// * `{output}_confidence`: the confidence of the reported saliency
    pub fn as_dataframe(&self) -> SaliencyFrame {
        let mut columns = Vec::with_capacity(self.saliency_results.len() * 4);
        for (output, saliency) in self.map() {
            let pfis = &saliency.per_feature_importance;
            columns.push(Column::text(
                format!("{output}_features"),
                pfis.iter().map(|p| p.feature.name.clone()).collect(),
            ));
            columns.push(Column::float(
                format!("{output}_score"),
                pfis.iter().map(|p| p.score).collect(),
            ));
            columns.push(Column::float(
                format!("{output}_value"),
                pfis.iter().map(|p| p.feature.value.as_number()).collect(),
            ));
            columns.push(Column::float(
                format!("{output}_confidence"),
                pfis.iter().map(|p| p.confidence).collect(),
            ));
        }
        SaliencyFrame::new(columns)
    }

    /// The same table prepared for HTML display. No styles are applied.
    pub fn as_html(&self) -> StyledFrame {
        self.as_dataframe().style()
    }

    /// Static bar chart for one output.
    pub fn bar_chart(&self, decision: &str) -> Result<BarChart, LimeError> {
        Ok(BarChart::from_saliency(decision, self.saliency(decision)?))
    }

    /// Draw the saliencies of `decision` on `backend`.
    pub fn plot(&self, decision: &str, backend: &mut dyn ChartBackend) -> Result<(), LimeError> {
        let chart = self.bar_chart(decision)?;
        backend.draw(&chart)
    }

    /// One hover chart per output. Nothing is displayed.
    pub fn hover_charts(&self) -> BTreeMap<String, HoverChart> {
        self.map()
            .into_iter()
            .map(|(name, saliency)| (name.to_string(), HoverChart::from_saliency(name, saliency)))
            .collect()
    }
}

impl ExplanationVisualiser for LimeResults {
    fn as_dataframe(&self) -> SaliencyFrame {
        LimeResults::as_dataframe(self)
    }
}

impl From<SaliencyResults> for LimeResults {
    fn from(results: SaliencyResults) -> Self {
        Self::new(results)
    }
}
