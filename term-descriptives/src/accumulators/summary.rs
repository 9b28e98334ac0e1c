//! Descriptive summary record and the accumulator that produces it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Distribution, FrequencyTable, OrderStatistics, ParametricStatistics};
use crate::error::{DescriptivesError, Result};

/// Full descriptive summary of a distribution.
///
/// Fields follow presence rules rather than sentinel values:
/// `var`, `stdev` and `stderr` appear only with at least two observations and
/// a non-zero variance; the five-number fields appear with at least one
/// observation; an empty distribution produces an empty record. Absent fields
/// are left out of the serialized form. Present fields are always finite
/// numbers: JSON has no spelling for `inf` or `NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum_of_squares: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_quartile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_quartile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl DescriptiveSummary {
    /// True when no observation contributed to this summary.
    pub fn is_empty(&self) -> bool {
        self.n.is_none()
    }

    /// Serializes the record as a JSON object.
    ///
    /// Fails with `Serialization` if a present field is not finite, since
    /// serde_json would write it as `null` and break the presence rules.
    pub fn to_json(&self) -> Result<String> {
        if let Some(field) = self.non_finite_field() {
            return Err(DescriptivesError::Serialization(format!(
                "summary field '{field}' is not finite"
            )));
        }
        Ok(serde_json::to_string(self)?)
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("sum", self.sum),
            ("sum_of_squares", self.sum_of_squares),
            ("mean", self.mean),
            ("var", self.var),
            ("stdev", self.stdev),
            ("stderr", self.stderr),
            ("min", self.min),
            ("first_quartile", self.first_quartile),
            ("median", self.median),
            ("third_quartile", self.third_quartile),
            ("max", self.max),
        ]
        .into_iter()
        .find(|(_, value)| value.is_some_and(|value| !value.is_finite()))
        .map(|(field, _)| field)
    }

    /// Parses a record previously produced by [`DescriptiveSummary::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for DescriptiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Accumulator behind `descriptives(x)`, `mode(x)` and `mode_freq(x)`.
///
/// Owns one frequency table; parametric and order statistics are both read
/// from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptives {
    freq: FrequencyTable,
}

impl Descriptives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator over an existing table.
    pub fn from_table(freq: FrequencyTable) -> Self {
        Self { freq }
    }

    /// Per-row update.
    pub fn update(&mut self, value: f64) {
        self.freq.record(value);
    }

    /// Folds a partial accumulator (another partition's rows) into this one.
    pub fn merge(&mut self, other: &Descriptives) {
        self.freq.merge(&other.freq);
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.freq
    }

    pub fn table_mut(&mut self) -> &mut FrequencyTable {
        &mut self.freq
    }

    /// Computes the full summary. Reads the table only, so repeated calls
    /// without intervening updates return identical records.
    pub fn describe(&self) -> DescriptiveSummary {
        let mut summary = DescriptiveSummary::default();

        if let Some(sums) = self.parametric_sums() {
            summary.n = Some(sums.n);
            // Sums of large finite values can overflow; those fields are left out.
            summary.sum = Some(sums.sum).filter(|sum| sum.is_finite());
            summary.sum_of_squares = Some(sums.sum_of_squares).filter(|sumsq| sumsq.is_finite());
            summary.mean = Some(sums.mean()).filter(|mean| mean.is_finite());

            if let Some(var) = sums.variance(false).filter(|var| *var != 0.0) {
                let stdev = var.sqrt();
                summary.var = Some(var);
                summary.stdev = Some(stdev);
                summary.stderr = Some(stdev / ((sums.n - 1) as f64).sqrt());
            }
        }

        let [min, first_quartile, median, third_quartile, max] = self.five_number_summary();
        summary.min = min;
        summary.first_quartile = first_quartile;
        summary.median = median;
        summary.third_quartile = third_quartile;
        summary.max = max;

        summary
    }

    /// Finalizes into the JSON form returned by `descriptives(x)`.
    pub fn to_json(&self) -> Result<String> {
        self.describe().to_json()
    }
}

impl Distribution for Descriptives {
    fn frequencies(&self) -> &FrequencyTable {
        &self.freq
    }
}

impl Extend<f64> for Descriptives {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.freq.extend(iter);
    }
}

impl FromIterator<f64> for Descriptives {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from_table(iter.into_iter().collect())
    }
}
