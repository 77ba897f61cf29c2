use serde::{Deserialize, Serialize};

use crate::{sum::ExtSum, traits::Merge};

/// Running sums of generator weights
///
/// Each processing stream owns one counter. `sum_scale`, `sum_pdf`
/// and `sum_named` accumulate `w0 * w_var[i]`, where `w_var[i]` is
/// already relative to the nominal weight. An empty vector means that
/// no event with LHE information was counted yet.
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Counter {
    num: u64,
    sumw: ExtSum,
    sumw2: ExtSum,
    sum_scale: Vec<ExtSum>,
    sum_pdf: Vec<ExtSum>,
    sum_named: Vec<ExtSum>,
}

impl Counter {
    /// An empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all sums
    pub fn clear(&mut self) {
        self.num = 0;
        self.sumw = ExtSum::new();
        self.sumw2 = ExtSum::new();
        self.sum_scale.clear();
        self.sum_pdf.clear();
        self.sum_named.clear();
    }

    /// Count an event with only a generator weight
    pub fn inc_gen_only(&mut self, w: f64) {
        self.num += 1;
        self.sumw += w;
        self.sumw2 += w * w;
    }

    /// Count an event with generator weight `w0` and relative variations
    pub fn inc_lhe(
        &mut self,
        w0: f64,
        w_scale: &[f64],
        w_pdf: &[f64],
        w_named: &[f64],
    ) {
        self.inc_gen_only(w0);
        accumulate(&mut self.sum_scale, w0, w_scale);
        accumulate(&mut self.sum_pdf, w0, w_pdf);
        accumulate(&mut self.sum_named, w0, w_named);
    }

    /// Number of counted events
    pub fn num(&self) -> u64 {
        self.num
    }

    /// Sum of generator weights
    pub fn sumw(&self) -> f64 {
        self.sumw.value()
    }

    /// Sum of squared generator weights
    pub fn sumw2(&self) -> f64 {
        self.sumw2.value()
    }

    /// Sums of generator weight times relative scale variation
    pub fn sum_scale(&self) -> Vec<f64> {
        values(&self.sum_scale)
    }

    /// Sums of generator weight times relative PDF variation
    pub fn sum_pdf(&self) -> Vec<f64> {
        values(&self.sum_pdf)
    }

    /// Sums of generator weight times relative named weight
    pub fn sum_named(&self) -> Vec<f64> {
        values(&self.sum_named)
    }

    pub fn is_empty(&self) -> bool {
        self.num == 0
    }
}

impl Merge for Counter {
    fn merge(&mut self, other: &Self) {
        self.num += other.num;
        self.sumw.merge(&other.sumw);
        self.sumw2.merge(&other.sumw2);
        merge_sums(&mut self.sum_scale, &other.sum_scale);
        merge_sums(&mut self.sum_pdf, &other.sum_pdf);
        merge_sums(&mut self.sum_named, &other.sum_named);
    }
}

fn accumulate(sums: &mut Vec<ExtSum>, w0: f64, var: &[f64]) {
    if var.is_empty() {
        return;
    }
    if sums.is_empty() {
        sums.resize(var.len(), ExtSum::new());
    }
    debug_assert_eq!(sums.len(), var.len());
    for (sum, w) in sums.iter_mut().zip(var) {
        *sum += w0 * w;
    }
}

fn merge_sums(sums: &mut Vec<ExtSum>, other: &[ExtSum]) {
    if other.is_empty() {
        return;
    }
    if sums.is_empty() {
        sums.resize(other.len(), ExtSum::new());
    }
    assert_eq!(
        sums.len(),
        other.len(),
        "number of weight variations differs between counters"
    );
    for (sum, o) in sums.iter_mut().zip(other) {
        sum.merge(o);
    }
}

fn values(sums: &[ExtSum]) -> Vec<f64> {
    sums.iter().map(ExtSum::value).collect()
}
