use serde::Serialize;

use crate::{frequency::FrequencyModel, prefix_code_table::CodeTable};

const RAW_BITS_PER_SYMBOL: f64 = 8.0;

/// Shannon entropy of the model in bits per symbol.
pub fn entropy(model: &FrequencyModel) -> f64 {
    -model
        .probabilities()
        .into_iter()
        .map(|(_, p)| p * p.log2())
        .sum::<f64>()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    pub symbol_count: u64,
    pub alphabet_size: usize,
    pub entropy: f64,
    pub average_code_length: f64,
    pub raw_redundancy: f64,
    pub encoded_redundancy: f64,
    pub payload_bits: usize,
    pub artifact_bytes: usize,
    pub compression_ratio: f64,
}

impl CompressionStats {
    pub fn new(
        model: &FrequencyModel,
        table: &CodeTable,
        payload_bits: usize,
        artifact_bytes: usize,
    ) -> Self {
        let entropy = entropy(model);
        let average_code_length = table.average_code_length(model);

        Self {
            symbol_count: model.total(),
            alphabet_size: model.alphabet_size(),
            entropy,
            average_code_length,
            raw_redundancy: 1.0 - entropy / RAW_BITS_PER_SYMBOL,
            encoded_redundancy: 1.0 - entropy / average_code_length,
            payload_bits,
            artifact_bytes,
            compression_ratio: model.total() as f64 / artifact_bytes as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::entropy;
    use crate::{
        frequency::FrequencyModel,
        prefix_code_table::{CodeTable, SingleSymbolPolicy},
    };

    #[rstest]
    #[case(b"ab".to_vec(), 1.0)]
    #[case(b"abcd".to_vec(), 2.0)]
    #[case(b"abcdefgh".to_vec(), 3.0)]
    #[case(b"aaaa".to_vec(), 0.0)]
    fn test_entropy(#[case] text: Vec<u8>, #[case] expected: f64) {
        let model = FrequencyModel::from_text(&text).unwrap();
        assert!((entropy(&model) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(b"AAAABBBCCD".to_vec())]
    #[case(b"abcde".to_vec())]
    #[case(b"abcdefgh".to_vec())]
    #[case(b"aabbccddeeffgghhi".to_vec())]
    #[case(include_bytes!("../tests/lorem.txt").to_vec())]
    #[case((0..=255).collect())]
    fn test_average_code_length_is_bounded_by_entropy(#[case] text: Vec<u8>) {
        let model = FrequencyModel::from_text(&text).unwrap();
        let table = CodeTable::build(&model, SingleSymbolPolicy::default()).unwrap();
        let h = entropy(&model);
        let average = table.average_code_length(&model);

        assert!(average + 1e-9 >= h, "average {average} below entropy {h}");
        assert!(average < h + 1.0, "average {average} too far above entropy {h}");
    }
}
