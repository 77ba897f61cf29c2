use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::traits::Merge;

/// Compensated floating-point sum
///
/// Keeps a running sum together with a Neumaier correction term, so
/// adding up many weights of very different magnitudes does not lose
/// the small contributions.
#[derive(Deserialize, Serialize)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ExtSum {
    sum: f64,
    comp: f64,
}

impl ExtSum {
    /// An empty sum
    pub const fn new() -> Self {
        Self { sum: 0., comp: 0. }
    }

    /// Add a single term
    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.comp += (self.sum - t) + x;
        } else {
            self.comp += (x - t) + self.sum;
        }
        self.sum = t;
    }

    /// The accumulated value
    pub fn value(&self) -> f64 {
        self.sum + self.comp
    }
}

impl Merge for ExtSum {
    fn merge(&mut self, other: &Self) {
        self.add(other.sum);
        self.comp += other.comp;
    }
}

impl AddAssign<f64> for ExtSum {
    fn add_assign(&mut self, x: f64) {
        self.add(x)
    }
}

impl FromIterator<f64> for ExtSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = Self::new();
        for x in iter {
            sum += x;
        }
        sum
    }
}
