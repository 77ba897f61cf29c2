use serde::{Deserialize, Serialize};

/// Generator-level event information
#[derive(Deserialize, Serialize)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GenEventInfo {
    weight: f64,
}

impl GenEventInfo {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }

    /// Nominal generator weight
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A single named weight of an LHE event
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightRecord {
    pub id: String,
    pub wgt: f64,
}

impl WeightRecord {
    pub fn new(id: impl Into<String>, wgt: f64) -> Self {
        Self { id: id.into(), wgt }
    }
}

/// Les Houches event information
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LheEvent {
    original_xwgtup: f64,
    weights: Vec<WeightRecord>,
}

impl LheEvent {
    pub fn new(original_xwgtup: f64, weights: Vec<WeightRecord>) -> Self {
        Self {
            original_xwgtup,
            weights,
        }
    }

    /// Nominal weight `originalXWGTUP` as given in the LHE record
    pub fn original_xwgtup(&self) -> f64 {
        self.original_xwgtup
    }

    /// Weights in the order of the LHE record
    pub fn weights(&self) -> &[WeightRecord] {
        &self.weights
    }
}

/// One event as seen by the weight tables
///
/// The generator information is required when building tables. The
/// LHE information is optional.
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub gen: Option<GenEventInfo>,
    pub lhe: Option<LheEvent>,
}

impl Event {
    /// Event with only a generator weight
    pub fn gen_only(weight: f64) -> Self {
        Self {
            gen: Some(GenEventInfo::new(weight)),
            lhe: None,
        }
    }

    /// Event with generator and LHE information
    pub fn with_lhe(weight: f64, lhe: LheEvent) -> Self {
        Self {
            gen: Some(GenEventInfo::new(weight)),
            lhe: Some(lhe),
        }
    }
}

/// A tagged block of the LHE header
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct HeaderBlock {
    tag: String,
    lines: Vec<String>,
}

impl HeaderBlock {
    pub fn new(tag: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            lines,
        }
    }

    /// Construct a block by splitting `text` into lines
    pub fn from_text(tag: impl Into<String>, text: &str) -> Self {
        Self::new(tag, text.lines().map(|l| l.to_owned()).collect())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Les Houches run information
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct LheRunInfo {
    headers: Vec<HeaderBlock>,
}

impl LheRunInfo {
    pub fn new(headers: Vec<HeaderBlock>) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &[HeaderBlock] {
        &self.headers
    }
}

/// Run-level payload
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Run {
    pub number: u32,
    pub lhe: Option<LheRunInfo>,
}

impl Run {
    pub fn new(number: u32, lhe: Option<LheRunInfo>) -> Self {
        Self { number, lhe }
    }
}
