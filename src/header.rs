use std::cmp::Ordering;

use itertools::Itertools;
use lazy_static::lazy_static;
use log::{log, Level};
use noisy_float::prelude::*;
use regex::Regex;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{event::LheRunInfo, util::OneShot, weight_choice::WeightChoice};

/// Tag of the header blocks containing weight definitions
pub const INITRWGT_TAG: &str = "initrwgt";

const SCALE_DOC_PREFIX: &str =
    "LHE scale variation weights (w_var / w_nominal); ";
const PDF_DOC_PREFIX: &str =
    "LHE pdf variation weights (w_var / w_nominal) for LHA IDs ";

lazy_static! {
    static ref WEIGHTGROUP_RE: Regex =
        Regex::new(r"<weightgroup(?P<attr>\s[^>]*)?>").unwrap();
    static ref GROUP_NAME_RE: Regex = Regex::new(
        r#"\bname\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#
    )
    .unwrap();
    static ref END_WEIGHTGROUP_RE: Regex =
        Regex::new(r"</weightgroup>").unwrap();
    static ref SCALE_WEIGHT_RE: Regex = Regex::new(
        r#"<weight\s+id=["'](?P<id>\d+)["']>\s*(?P<label>muR=(?P<mur>\S+)\s+muF=(?P<muf>\S+)(\s+.*)?)</weight>"#
    )
    .unwrap();
    static ref PDF_WEIGHT_RE: Regex = Regex::new(
        r#"<weight\s+id=["'](?P<id>\d+)["']>\s*PDF set\s*=\s*(?P<lhaid>\d+)\s*</weight>"#
    )
    .unwrap();
}

/// Weight groups with special treatment
///
/// Groups with any other name are skipped.
#[derive(Copy, Clone, Debug, Display, EnumString, Eq, PartialEq, Hash)]
pub enum WeightGroup {
    #[strum(serialize = "scale_variation")]
    ScaleVariation,
    #[strum(serialize = "PDF_variation")]
    PdfVariation,
}

/// Name of the weight group opened in `line`, if any
///
/// A group without a `name` attribute has an empty name.
pub fn weight_group_name(line: &str) -> Option<&str> {
    let group = WEIGHTGROUP_RE.captures(line)?;
    let Some(attr) = group.name("attr") else {
        return Some("");
    };
    let name = GROUP_NAME_RE
        .captures(attr.as_str())
        .and_then(|c| c.name("dq").or_else(|| c.name("sq")))
        .map(|m| m.as_str())
        .unwrap_or_default();
    Some(name)
}

fn is_group_end(line: &str) -> bool {
    END_WEIGHTGROUP_RE.is_match(line)
}

/// A QCD scale variation weight
///
/// Ordered by (μR, μF), with the weight id as tie breaker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScaleVarWeight {
    pub id: String,
    pub label: String,
    pub scales: (N32, N32),
}

impl ScaleVarWeight {
    /// Parse a scale weight definition
    ///
    /// Returns `Ok(None)` if `line` is not a scale weight definition.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let Some(w) = SCALE_WEIGHT_RE.captures(line) else {
            return Ok(None);
        };
        let mur = parse_scale(&w["mur"], line)?;
        let muf = parse_scale(&w["muf"], line)?;
        Ok(Some(Self {
            id: w["id"].to_owned(),
            label: w["label"].to_owned(),
            scales: (mur, muf),
        }))
    }
}

impl PartialOrd for ScaleVarWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScaleVarWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scales
            .cmp(&other.scales)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.label.cmp(&other.label))
    }
}

fn parse_scale(value: &str, line: &str) -> Result<N32, ParseError> {
    value
        .parse::<f32>()
        .ok()
        .and_then(N32::try_new)
        .ok_or_else(|| ParseError::ScaleFactor {
            value: value.to_owned(),
            line: line.to_owned(),
        })
}

/// Weights of a PDF error set with contiguous LHA ids
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdfSetWeights {
    lha_ids: (u32, u32),
    ids: Vec<String>,
}

impl PdfSetWeights {
    /// A new set consisting of a single weight
    pub fn new(id: String, lha_id: u32) -> Self {
        Self {
            lha_ids: (lha_id, lha_id),
            ids: vec![id],
        }
    }

    /// Extend the set if `lha_id` directly follows the last LHA id
    ///
    /// Returns whether the weight was added.
    pub fn maybe_add(&mut self, id: &str, lha_id: u32) -> bool {
        if self.lha_ids.1.checked_add(1) == Some(lha_id) {
            self.lha_ids.1 = lha_id;
            self.ids.push(id.to_owned());
            true
        } else {
            false
        }
    }

    /// First LHA id of the set
    pub fn first(&self) -> u32 {
        self.lha_ids.0
    }

    /// Last LHA id of the set
    pub fn last(&self) -> u32 {
        self.lha_ids.1
    }

    /// Weight ids, ordered by LHA id
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Parse a PDF weight definition into weight id and LHA id
///
/// Returns `Ok(None)` if `line` is not a PDF weight definition.
pub fn parse_pdf_weight(line: &str) -> Result<Option<(String, u32)>, ParseError> {
    let Some(w) = PDF_WEIGHT_RE.captures(line) else {
        return Ok(None);
    };
    let lha_id = &w["lhaid"];
    let Ok(lha_id) = lha_id.parse() else {
        return Err(ParseError::LhaId {
            value: lha_id.to_owned(),
            line: line.to_owned(),
        });
    };
    Ok(Some((w["id"].to_owned(), lha_id)))
}

/// Weight definitions found in one `initrwgt` block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BlockWeights {
    scale: Vec<ScaleVarWeight>,
    pdf: Vec<PdfSetWeights>,
}

impl BlockWeights {
    fn add_pdf(&mut self, id: String, lha_id: u32) {
        if let Some(set) = self.pdf.last_mut() {
            if set.maybe_add(&id, lha_id) {
                return;
            }
        }
        self.pdf.push(PdfSetWeights::new(id, lha_id))
    }
}

/// Parser for the weight definitions in the LHE header
///
/// Finds the ids of scale variation weights and selects the PDF
/// error set with the highest priority.
#[derive(Debug)]
pub struct HeaderParser {
    preferred_pdfs: Vec<u32>,
    debug: OneShot,
}

impl HeaderParser {
    /// New parser
    ///
    /// PDF error sets are selected according to the first LHA id of
    /// the set, in the order given by `preferred_pdfs`. If `debug` is
    /// set, the first call to [HeaderParser::parse] logs its progress.
    pub fn new(preferred_pdfs: Vec<u32>, debug: bool) -> Self {
        Self {
            preferred_pdfs,
            debug: OneShot::new(debug),
        }
    }

    /// Determine the weight choice for a run
    ///
    /// Without LHE run information, the choice is empty.
    pub fn parse(
        &self,
        run_info: Option<&LheRunInfo>,
    ) -> Result<WeightChoice, ParseError> {
        let lvl = if self.debug.fire() {
            Level::Info
        } else {
            Level::Trace
        };
        let mut choice = WeightChoice::new();
        let Some(run_info) = run_info else {
            log!(lvl, "No LHE run information, no LHE weights selected");
            return Ok(choice);
        };
        for block in run_info.headers() {
            if block.tag() != INITRWGT_TAG {
                log!(lvl, "Skipping LHE header with tag {}", block.tag());
                continue;
            }
            log!(lvl, "Found LHE header with tag {}", block.tag());
            let weights = scan_block(block.lines(), lvl)?;
            self.choose_scale(&mut choice, weights.scale, lvl);
            self.choose_pdf(&mut choice, &weights.pdf, lvl);
        }
        Ok(choice)
    }

    fn choose_scale(
        &self,
        choice: &mut WeightChoice,
        mut scale: Vec<ScaleVarWeight>,
        lvl: Level,
    ) {
        scale.sort();
        log!(lvl, "Found {} scale variations", scale.len());
        for sw in &scale {
            log!(
                lvl,
                "    id {}: scales ren = {:5.2}  fact = {:5.2}  text = {}",
                sw.id,
                sw.scales.0.raw(),
                sw.scales.1.raw(),
                sw.label
            );
        }
        if scale.is_empty() {
            return;
        }
        let labels = scale
            .iter()
            .enumerate()
            .map(|(n, sw)| format!("[{n}] is {}", sw.label))
            .join("; ");
        choice.scale_weights_doc = format!("{SCALE_DOC_PREFIX}{labels}");
        choice
            .scale_weight_ids
            .extend(scale.into_iter().map(|sw| sw.id));
    }

    fn choose_pdf(
        &self,
        choice: &mut WeightChoice,
        sets: &[PdfSetWeights],
        lvl: Level,
    ) {
        log!(lvl, "Found {} PDF set errors", sets.len());
        for set in sets {
            log!(
                lvl,
                "lhaIDs {:6} - {:6} ({:3} weights: {}, ... )",
                set.first(),
                set.last(),
                set.len(),
                set.ids().first().map(|s| s.as_str()).unwrap_or_default()
            );
        }
        let selected = self.preferred_pdfs.iter().find_map(|&lha_id| {
            sets.iter().find(|set| set.first() == lha_id)
        });
        if let Some(set) = selected {
            log!(lvl, "Selected PDF set starting at LHA id {}", set.first());
            choice.pdf_weight_ids = set.ids().to_vec();
            choice.pdf_weights_doc =
                format!("{PDF_DOC_PREFIX}{} - {}", set.first(), set.last());
        }
    }
}

fn scan_block(lines: &[String], lvl: Level) -> Result<BlockWeights, ParseError> {
    let mut weights = BlockWeights::default();
    let mut lines = lines.iter().map(|l| l.as_str()).peekable();
    while let Some(line) = lines.next() {
        log!(lvl, "{line}");
        let Some(name) = weight_group_name(line) else {
            continue;
        };
        log!(lvl, ">>> Looks like the beginning of a weight group for {name}");
        let group: Option<WeightGroup> = name.parse().ok();
        while let Some(&line) = lines.peek() {
            log!(lvl, "    {line}");
            match group {
                Some(WeightGroup::ScaleVariation) => {
                    if let Some(sw) = ScaleVarWeight::parse(line)? {
                        log!(
                            lvl,
                            "    >>> Scale weight {} for {} , {}",
                            sw.id,
                            sw.scales.0.raw(),
                            sw.scales.1.raw()
                        );
                        weights.scale.push(sw);
                        lines.next();
                        continue;
                    }
                }
                Some(WeightGroup::PdfVariation) => {
                    if let Some((id, lha_id)) = parse_pdf_weight(line)? {
                        log!(lvl, "    >>> PDF weight {id} for {lha_id}");
                        weights.add_pdf(id, lha_id);
                        lines.next();
                        continue;
                    }
                }
                None => {}
            }
            if is_group_end(line) {
                log!(lvl, ">>> Looks like the end of a weight group");
                lines.next();
                break;
            }
            if weight_group_name(line).is_some() {
                // leave the line for the outer loop
                log!(
                    lvl,
                    ">>> Looks like the beginning of a new weight group, assuming the end of the previous one is missing"
                );
                break;
            }
            lines.next();
        }
    }
    Ok(weights)
}

/// Error parsing the LHE header
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed renormalisation or factorisation scale factor
    #[error("Failed to parse scale factor `{value}` in LHE header line `{line}`")]
    ScaleFactor {
        /// The value that could not be parsed
        value: String,
        /// The header line
        line: String,
    },
    /// LHA id out of range
    #[error("LHA id `{value}` in LHE header line `{line}` is out of range")]
    LhaId {
        /// The value that could not be parsed
        value: String,
        /// The header line
        line: String,
    },
}
