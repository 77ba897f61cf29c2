use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

/// Settings for the generator weight tables
///
/// The serialised names follow the usual module parameter names,
/// e.g.
///
/// ```yaml
/// genEvent: generator
/// lheInfo: externalLHEProducer
/// preferredPDFs: [306000, 260000]
/// namedWeightIDs: [rwgt_1]
/// namedWeightLabels: [mass_up]
/// ```
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, TypedBuilder)]
pub struct Config {
    /// Label of the generator event information
    #[serde(rename = "genEvent")]
    #[builder(setter(into))]
    pub gen_event: String,
    /// Label of the LHE event and run information
    #[serde(rename = "lheInfo")]
    #[builder(setter(into))]
    pub lhe_info: String,
    /// LHA ids of PDF sets in order of preference
    #[serde(rename = "preferredPDFs", default)]
    #[builder(default)]
    pub preferred_pdfs: Vec<u32>,
    /// Ids of weights that are stored individually
    #[serde(rename = "namedWeightIDs", default)]
    #[builder(default)]
    pub named_weight_ids: Vec<String>,
    /// Column labels for the weights in `named_weight_ids`
    #[serde(rename = "namedWeightLabels", default)]
    #[builder(default)]
    pub named_weight_labels: Vec<String>,
    /// Log details for the first run header and the first LHE event
    #[serde(default)]
    #[builder(default)]
    pub debug: bool,
}

impl Config {
    /// Check consistency of the settings
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.named_weight_ids.len() != self.named_weight_labels.len() {
            return Err(ConfigError::NamedWeightMismatch {
                ids: self.named_weight_ids.len(),
                labels: self.named_weight_labels.len(),
            });
        }
        Ok(self)
    }

    /// Read and validate settings in YAML format
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()
    }

    /// Read and validate settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref()).map_err(ConfigError::Open)?;
        Self::from_reader(file)
    }
}

/// Invalid settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Named weight ids and labels do not match up
    #[error("Size mismatch between namedWeightIDs ({ids}) & namedWeightLabels ({labels})")]
    NamedWeightMismatch {
        /// Number of ids
        ids: usize,
        /// Number of labels
        labels: usize,
    },
    /// Failed to open settings file
    #[error("Failed to open settings file")]
    Open(#[source] std::io::Error),
    /// Malformed settings
    #[error("Failed to parse settings")]
    Yaml(#[from] serde_yaml::Error),
}
