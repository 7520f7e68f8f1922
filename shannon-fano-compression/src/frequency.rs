use std::{cmp::Ordering, collections::BTreeMap};

use itertools::Itertools;

use crate::error::CodecError;

/// Occurrence counts of every distinct byte of a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel {
    counts: BTreeMap<u8, u64>,
    total: u64,
}

impl FrequencyModel {
    pub fn from_text(text: &[u8]) -> Result<Self, CodecError> {
        if text.is_empty() {
            return Err(CodecError::EmptyInput);
        }

        let counts = text
            .iter()
            .into_grouping_map_by(|&&symbol| symbol)
            .fold(0_u64, |acc, _key, _value| acc + 1)
            .into_iter()
            .collect::<BTreeMap<_, _>>();

        Ok(Self {
            counts,
            total: text.len() as u64,
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn alphabet_size(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or_default()
    }

    pub fn probability(&self, symbol: u8) -> f64 {
        self.count(symbol) as f64 / self.total as f64
    }

    /// The probability distribution in ascending symbol order.
    pub fn probabilities(&self) -> Vec<(u8, f64)> {
        self.counts
            .iter()
            .map(|(&symbol, &count)| (symbol, count as f64 / self.total as f64))
            .collect_vec()
    }

    /// Symbols with their counts, most probable first. Equal counts are
    /// ordered by ascending symbol so the result is fully deterministic.
    pub fn sorted_by_probability(&self) -> Vec<(u8, u64)> {
        self.counts
            .iter()
            .map(|(&symbol, &count)| (symbol, count))
            .sorted_by(cmp_probability_desc)
            .collect_vec()
    }
}

fn cmp_probability_desc(a: &(u8, u64), b: &(u8, u64)) -> Ordering {
    if a.1 == b.1 {
        return a.0.cmp(&b.0);
    }
    b.1.cmp(&a.1)
}
