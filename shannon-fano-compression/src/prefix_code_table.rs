use std::{
    collections::{btree_map, BTreeMap, HashMap},
    ops::{Index, Range},
};

use itertools::Itertools;
use log::{debug, trace};

use crate::{bits::Code, error::CodecError, frequency::FrequencyModel};

/// What to do with an input made of a single distinct symbol, whose
/// Shannon–Fano code would otherwise be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SingleSymbolPolicy {
    /// Give the symbol the one bit code `1`.
    #[default]
    Placeholder,
    Reject,
}

/// Symbol to code mapping, iterated in ascending symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable(BTreeMap<u8, Code>);

impl CodeTable {
    pub fn build(model: &FrequencyModel, policy: SingleSymbolPolicy) -> Result<Self, CodecError> {
        let sorted = model.sorted_by_probability();
        let weights = sorted.iter().map(|&(_, count)| count).collect_vec();

        if sorted.len() == 1 && policy == SingleSymbolPolicy::Reject {
            return Err(CodecError::DegenerateAlphabet);
        }

        // one slot per sorted position, each filled exactly once
        let mut codes: Vec<Option<Code>> = vec![None; sorted.len()];
        let mut pending: Vec<(Range<usize>, Code)> = vec![(0..sorted.len(), Code::new())];

        while let Some((range, prefix)) = pending.pop() {
            match range.len() {
                0 => {}
                1 if prefix.is_empty() => codes[range.start] = Some(prefix.extended(true)),
                1 => codes[range.start] = Some(prefix),
                2 => {
                    codes[range.start] = Some(prefix.extended(true));
                    codes[range.start + 1] = Some(prefix.extended(false));
                }
                _ => {
                    let split = range.start + find_split_index(&weights[range.clone()]);
                    trace!("splitting {range:?} at {split} under prefix {prefix}");
                    pending.push((split..range.end, prefix.extended(false)));
                    pending.push((range.start..split, prefix.extended(true)));
                }
            }
        }

        let table = sorted
            .iter()
            .zip(codes)
            .filter_map(|(&(symbol, _), code)| code.map(|code| (symbol, code)))
            .collect::<BTreeMap<_, _>>();

        debug!(
            "built code table for {} symbols, longest code is {} bits",
            table.len(),
            table.values().map(Code::len).max().unwrap_or_default()
        );

        Ok(Self(table))
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.0.get(&symbol)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u8, Code> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.0.values().map(Code::len).max().unwrap_or_default()
    }

    pub fn min_code_len(&self) -> usize {
        self.0.values().map(Code::len).min().unwrap_or_default()
    }

    /// Checks that no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        // after sorting, a prefix always sorts right before some code that
        // extends it, so comparing neighbours is enough
        self.0
            .values()
            .sorted()
            .tuple_windows()
            .all(|(a, b)| !a.is_prefix_of(b))
    }

    pub fn reverse(&self) -> ReverseCodeTable {
        ReverseCodeTable(
            self.0
                .iter()
                .map(|(&symbol, code)| (code.clone(), symbol))
                .collect(),
        )
    }

    /// Code length weighted by each symbol's probability, in bits per symbol.
    pub fn average_code_length(&self, model: &FrequencyModel) -> f64 {
        self.0
            .iter()
            .map(|(&symbol, code)| model.probability(symbol) * code.len() as f64)
            .sum()
    }
}

impl Index<u8> for CodeTable {
    type Output = Code;

    fn index(&self, symbol: u8) -> &Self::Output {
        &self.0[&symbol]
    }
}

impl FromIterator<(u8, Code)> for CodeTable {
    fn from_iter<T: IntoIterator<Item = (u8, Code)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Code to symbol lookup used while decoding.
#[derive(Debug, Clone, Default)]
pub struct ReverseCodeTable(HashMap<Code, u8>);

impl ReverseCodeTable {
    pub fn get(&self, code: &Code) -> Option<u8> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Index `k` splitting `weights` into `[0, k)` and `[k, n)` with the most
/// balanced total weight. Only a strictly smaller difference moves the
/// split, so the earliest best index wins.
pub fn find_split_index(weights: &[u64]) -> usize {
    let total: u64 = weights.iter().sum();
    let mut left_sum = 0;
    let mut min_diff = total;
    let mut split_index = 0;

    for (i, weight) in weights.iter().enumerate() {
        left_sum += weight;
        let right_sum = total - left_sum;
        let diff = left_sum.abs_diff(right_sum);

        if diff < min_diff {
            min_diff = diff;
            split_index = i + 1;
        }
    }

    split_index
}
