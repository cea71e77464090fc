use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::generic_types::Label;

/// Confusion counters, safe to bump from several classification tasks at once.
/// `Real` is the positive class.
#[derive(Debug, Default)]
pub struct ConfusionCounters {
    true_positive: AtomicU64,
    false_positive: AtomicU64,
    true_negative: AtomicU64,
    false_negative: AtomicU64,
}

impl ConfusionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one decision against its ground truth. Touches exactly one counter.
    pub fn record(&self, decision: Label, truth: Label) {
        let counter = match (decision, truth) {
            (Label::Real, Label::Real) => &self.true_positive,
            (Label::Spam, Label::Real) => &self.false_negative,
            (Label::Real, Label::Spam) => &self.false_positive,
            (Label::Spam, Label::Spam) => &self.true_negative,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the counters. Only meaningful once every recording task has joined.
    pub fn snapshot(&self) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positive: self.true_positive.load(Ordering::Relaxed),
            false_positive: self.false_positive.load(Ordering::Relaxed),
            true_negative: self.true_negative.load(Ordering::Relaxed),
            false_negative: self.false_negative.load(Ordering::Relaxed),
        }
    }

    pub fn summarize(&self) -> Summary {
        self.snapshot().summarize()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn summarize(&self) -> Summary {
        let tp = self.true_positive;
        let fp = self.false_positive;
        let tn = self.true_negative;
        let fn_ = self.false_negative;
        Summary {
            specificity: Metric::ratio(tn, tn + fp),
            sensitivity: Metric::ratio(tp, tp + fn_),
            accuracy: Metric::ratio(tp + tn, self.total()),
            false_positive_rate: Metric::ratio(fp, tn + fp),
            false_negative_rate: Metric::ratio(fn_, tp + fn_),
            counters: *self,
        }
    }
}

/// A derived rate, or `Undefined` when its denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    Undefined,
}

impl Metric {
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Metric::Undefined
        } else {
            Metric::Value(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.6}", v),
            Metric::Undefined => write!(f, "undefined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub specificity: Metric,
    pub sensitivity: Metric,
    pub accuracy: Metric,
    pub false_positive_rate: Metric,
    pub false_negative_rate: Metric,
    pub counters: ConfusionMatrix,
}

impl Summary {
    /// Names of the headline metrics that could not be computed.
    pub fn undefined_metrics(&self) -> Vec<&'static str> {
        [
            ("specificity", self.specificity),
            ("sensitivity", self.sensitivity),
            ("accuracy", self.accuracy),
        ]
        .into_iter()
        .filter(|(_, m)| !m.is_defined())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "specificity: {}, sensitivity: {}, accuracy: {}",
            self.specificity, self.sensitivity, self.accuracy
        )
    }
}
