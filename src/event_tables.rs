use log::{log, warn, Level};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{Config, ConfigError},
    counter::Counter,
    event::{Event, LheEvent},
    table::FlatTable,
    util::OneShot,
    weight_choice::WeightChoice,
};

/// Name of the table with the generator weight
pub const GEN_WEIGHT_TABLE: &str = "genWeight";
/// Name of the table with the scale variation weights
pub const SCALE_TABLE: &str = "LHEScaleWeight";
/// Name of the table with the PDF variation weights
pub const PDF_TABLE: &str = "LHEPdfWeight";
/// Name of the table with the nominal LHE weight and named weights
pub const NAMED_TABLE: &str = "LHEWeight";

/// Instance label of the scale variation table
pub const SCALE_INSTANCE: &str = "LHEScale";
/// Instance label of the PDF variation table
pub const PDF_INSTANCE: &str = "LHEPdf";
/// Instance label of the named weight table
pub const NAMED_INSTANCE: &str = "LHENamed";

/// Name of the column with the nominal LHE weight
pub const ORIGINAL_XWGTUP: &str = "originalXWGTUP";

/// Weight tables for a single event
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventTables {
    pub gen_weight: FlatTable,
    pub lhe_scale: FlatTable,
    pub lhe_pdf: FlatTable,
    pub lhe_named: FlatTable,
}

impl EventTables {
    /// All tables together with their instance labels
    pub fn instances(&self) -> [(&'static str, &FlatTable); 4] {
        [
            ("", &self.gen_weight),
            (SCALE_INSTANCE, &self.lhe_scale),
            (PDF_INSTANCE, &self.lhe_pdf),
            (NAMED_INSTANCE, &self.lhe_named),
        ]
    }
}

/// Builds the per-event weight tables and updates the stream counter
#[derive(Debug)]
pub struct EventTableBuilder {
    gen_event: String,
    named_weight_ids: Vec<String>,
    named_weight_labels: Vec<String>,
    debug: OneShot,
    no_lhe_warning: OneShot,
}

impl EventTableBuilder {
    /// Construct from the given settings
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let config = config.clone().validate()?;
        Ok(Self {
            gen_event: config.gen_event,
            named_weight_ids: config.named_weight_ids,
            named_weight_labels: config.named_weight_labels,
            debug: OneShot::new(config.debug),
            no_lhe_warning: OneShot::new(true),
        })
    }

    pub fn named_weight_ids(&self) -> &[String] {
        &self.named_weight_ids
    }

    pub fn named_weight_labels(&self) -> &[String] {
        &self.named_weight_labels
    }

    /// Allow one more warning about missing LHE information
    pub fn rearm_warning(&self) {
        self.no_lhe_warning.rearm()
    }

    /// Build the tables for `event` and count it in `counter`
    pub fn fill(
        &self,
        counter: &mut Counter,
        choice: &WeightChoice,
        event: &Event,
    ) -> Result<EventTables, EventError> {
        let Some(gen) = &event.gen else {
            return Err(EventError::MissingGenInfo(self.gen_event.clone()));
        };
        let weight = gen.weight();

        let mut gen_weight = FlatTable::new(1, GEN_WEIGHT_TABLE, true);
        gen_weight.set_doc("generator weight");
        gen_weight.add_column_value("", weight, "generator weight");

        let (lhe_scale, lhe_pdf, lhe_named) = match &event.lhe {
            Some(lhe) => self.fill_lhe(counter, choice, weight, lhe),
            None => {
                counter.inc_gen_only(weight);
                if self.no_lhe_warning.fire() {
                    warn!("No LHE event information, so there will be no LHE tables");
                }
                (
                    FlatTable::new(1, SCALE_TABLE, true),
                    FlatTable::new(1, PDF_TABLE, true),
                    FlatTable::new(1, NAMED_TABLE, true),
                )
            }
        };
        Ok(EventTables {
            gen_weight,
            lhe_scale,
            lhe_pdf,
            lhe_named,
        })
    }

    fn fill_lhe(
        &self,
        counter: &mut Counter,
        choice: &WeightChoice,
        gen_weight: f64,
        lhe: &LheEvent,
    ) -> (FlatTable, FlatTable, FlatTable) {
        let lvl = if self.debug.fire() {
            Level::Info
        } else {
            Level::Trace
        };
        let scale_ids = &choice.scale_weight_ids;
        let pdf_ids = &choice.pdf_weight_ids;
        let named_ids = &self.named_weight_ids;

        let w0 = lhe.original_xwgtup();
        let mut w_scale = vec![1.; scale_ids.len()];
        let mut w_pdf = vec![1.; pdf_ids.len()];
        let mut w_named = vec![1.; named_ids.len()];
        for weight in lhe.weights() {
            let rel = weight.wgt / w0;
            log!(
                lvl,
                "Weight  {:+9.5}   rel {:+9.5}   for id {}",
                weight.wgt,
                rel,
                weight.id
            );
            set_matching(scale_ids, &weight.id, &mut w_scale, rel);
            set_matching(pdf_ids, &weight.id, &mut w_pdf, rel);
            set_matching(named_ids, &weight.id, &mut w_named, rel);
        }

        let mut scale = FlatTable::new(w_scale.len(), SCALE_TABLE, false);
        scale.add_column("", &w_scale, choice.scale_weights_doc.as_str());

        let mut pdf = FlatTable::new(w_pdf.len(), PDF_TABLE, false);
        pdf.add_column("", &w_pdf, choice.pdf_weights_doc.as_str());

        let mut named = FlatTable::new(1, NAMED_TABLE, true);
        named.add_column_value(
            ORIGINAL_XWGTUP,
            w0,
            "Nominal event weight in the LHE file",
        );
        let labelled = self.named_weight_labels.iter().zip(named_ids);
        for ((label, id), w) in labelled.zip(&w_named) {
            named.add_column_value(
                label.as_str(),
                *w,
                format!("LHE weight for id {id}, relative to nominal"),
            );
        }

        counter.inc_lhe(gen_weight, &w_scale, &w_pdf, &w_named);
        (scale, pdf, named)
    }
}

fn set_matching(ids: &[String], id: &str, values: &mut [f64], value: f64) {
    if let Some(pos) = ids.iter().position(|i| i == id) {
        values[pos] = value;
    }
}

/// Error building event tables
#[derive(Debug, Error)]
pub enum EventError {
    /// The generator event information is missing
    #[error("No generator event information with label {0}")]
    MissingGenInfo(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WeightRecord;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> Config {
        Config::builder()
            .gen_event("generator")
            .lhe_info("externalLHEProducer")
            .named_weight_ids(vec!["PSw0".to_owned(), "PSw1".to_owned()])
            .named_weight_labels(vec!["isrUp".to_owned(), "fsrUp".to_owned()])
            .debug(true)
            .build()
    }

    fn choice() -> WeightChoice {
        WeightChoice {
            scale_weight_ids: vec!["1001".to_owned(), "1002".to_owned()],
            scale_weights_doc: "scale".to_owned(),
            pdf_weight_ids: vec!["2001".to_owned()],
            pdf_weights_doc: "pdf".to_owned(),
        }
    }

    fn lhe_event(w0: f64, weights: &[(&str, f64)]) -> LheEvent {
        let weights = weights
            .iter()
            .map(|&(id, wgt)| WeightRecord::new(id, wgt))
            .collect();
        LheEvent::new(w0, weights)
    }

    #[test]
    fn without_lhe() {
        let builder = EventTableBuilder::new(&config()).unwrap();
        let mut counter = Counter::new();
        let tables = builder
            .fill(&mut counter, &choice(), &Event::gen_only(3.))
            .unwrap();
        assert_eq!(tables.gen_weight.name(), GEN_WEIGHT_TABLE);
        assert_eq!(tables.gen_weight.values(""), Some([3f32].as_slice()));
        for table in [&tables.lhe_scale, &tables.lhe_pdf, &tables.lhe_named] {
            assert_eq!(table.nrows(), 1);
            assert!(table.singleton());
            assert!(table.columns().is_empty());
        }
        assert_eq!(counter.num(), 1);
        assert!(counter.sum_scale().is_empty());
        assert!(!builder.no_lhe_warning.is_armed());
        builder.rearm_warning();
        assert!(builder.no_lhe_warning.is_armed());
    }

    #[test]
    fn missing_gen_info() {
        let builder = EventTableBuilder::new(&config()).unwrap();
        let mut counter = Counter::new();
        let err = builder
            .fill(&mut counter, &choice(), &Event::default())
            .unwrap_err();
        assert!(matches!(err, EventError::MissingGenInfo(label) if label == "generator"));
        assert!(counter.is_empty());
    }

    #[test]
    fn normalised_weights() {
        log_init();
        let builder = EventTableBuilder::new(&config()).unwrap();
        let mut counter = Counter::new();
        let lhe = lhe_event(
            2.,
            &[
                ("1001", 3.),
                ("2001", 1.),
                ("PSw0", 2.4),
                ("PSw1", 1.6),
                ("extra", 18.),
                ("2001", 4.),
            ],
        );
        let tables = builder
            .fill(&mut counter, &choice(), &Event::with_lhe(0.5, lhe))
            .unwrap();

        assert_eq!(tables.lhe_scale.name(), SCALE_TABLE);
        assert!(!tables.lhe_scale.singleton());
        assert_eq!(tables.lhe_scale.values(""), Some([1.5f32, 1.].as_slice()));
        assert_eq!(tables.lhe_scale.columns()[0].doc, "scale");
        // later duplicates win
        assert_eq!(tables.lhe_pdf.values(""), Some([2f32].as_slice()));

        let named = &tables.lhe_named;
        assert_eq!(named.nrows(), 1);
        assert_eq!(named.values(ORIGINAL_XWGTUP), Some([2f32].as_slice()));
        assert_eq!(named.values("isrUp"), Some([1.2f32].as_slice()));
        assert_eq!(named.values("fsrUp"), Some([0.8f32].as_slice()));
        assert_eq!(named.columns().len(), 3);
        assert_eq!(
            named.column("isrUp").unwrap().doc,
            "LHE weight for id PSw0, relative to nominal"
        );

        assert_eq!(counter.num(), 1);
        assert_eq!(counter.sumw(), 0.5);
        assert_eq!(counter.sum_scale(), [0.75, 0.5]);
        assert_eq!(counter.sum_pdf(), [1.]);
        assert_eq!(counter.sum_named(), [0.6, 0.4]);
    }

    #[test]
    fn empty_choice() {
        let builder = EventTableBuilder::new(&config()).unwrap();
        let mut counter = Counter::new();
        let lhe = lhe_event(1., &[("1001", 3.)]);
        let tables = builder
            .fill(&mut counter, &WeightChoice::new(), &Event::with_lhe(1., lhe))
            .unwrap();
        assert_eq!(tables.lhe_scale.nrows(), 0);
        assert!(tables.lhe_scale.values("").unwrap().is_empty());
        assert!(counter.sum_scale().is_empty());
        assert_eq!(counter.sum_named(), [1., 1.]);
    }

    #[test]
    fn instances() {
        let builder = EventTableBuilder::new(&config()).unwrap();
        let tables = builder
            .fill(&mut Counter::new(), &choice(), &Event::gen_only(1.))
            .unwrap();
        let labels: Vec<_> = tables.instances().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["", "LHEScale", "LHEPdf", "LHENamed"]);
    }
}
