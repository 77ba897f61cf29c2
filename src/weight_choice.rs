use serde::{Deserialize, Serialize};

/// Run-dependent choice of LHE weights
///
/// Determined once per run from the LHE header and shared read-only
/// by all streams processing events of that run.
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct WeightChoice {
    /// Ids of the scale variation weights in (μR, μF) order
    pub scale_weight_ids: Vec<String>,
    /// Description of the scale variation weights
    pub scale_weights_doc: String,
    /// Ids of the weights of the selected PDF error set
    pub pdf_weight_ids: Vec<String>,
    /// Description of the PDF variation weights
    pub pdf_weights_doc: String,
}

impl WeightChoice {
    /// A choice without any scale or PDF weights
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scale_weight_ids.is_empty() && self.pdf_weight_ids.is_empty()
    }
}
