use bytes::Bytes;
use log::debug;

use crate::{
    artifact::Artifact,
    bits::pack,
    error::CodecError,
    frequency::FrequencyModel,
    prefix_code_table::{CodeTable, SingleSymbolPolicy},
    stats::CompressionStats,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    pub single_symbol: SingleSymbolPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn encode(&self, text: &[u8]) -> Result<Encoded, CodecError> {
        let model = FrequencyModel::from_text(text)?;
        let table = CodeTable::build(&model, self.config.single_symbol)?;

        let payload_bits = text.iter().map(|&symbol| table[symbol].len()).sum::<usize>();
        let payload = pack(text.iter().flat_map(|&symbol| table[symbol].iter()));

        let artifact = Artifact::new(model.total(), table, Bytes::from(payload));
        let bytes = artifact.to_bytes()?;
        debug!(
            "encoded {} symbols into {payload_bits} payload bits, {} bytes in total",
            model.total(),
            bytes.len()
        );

        Ok(Encoded {
            model,
            artifact,
            bytes,
            payload_bits,
        })
    }
}

/// Result of one encode call.
#[derive(Debug, Clone)]
pub struct Encoded {
    model: FrequencyModel,
    artifact: Artifact,
    bytes: Bytes,
    payload_bits: usize,
}

impl Encoded {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn table(&self) -> &CodeTable {
        self.artifact.table()
    }

    pub fn model(&self) -> &FrequencyModel {
        &self.model
    }

    pub fn symbol_count(&self) -> u64 {
        self.artifact.symbol_count()
    }

    pub fn payload_bits(&self) -> usize {
        self.payload_bits
    }

    pub fn stats(&self) -> CompressionStats {
        CompressionStats::new(
            &self.model,
            self.artifact.table(),
            self.payload_bits,
            self.bytes.len(),
        )
    }
}

pub fn encode(text: &[u8]) -> Result<Encoded, CodecError> {
    Encoder::default().encode(text)
}

pub fn decode(artifact: &[u8]) -> Result<Vec<u8>, CodecError> {
    let artifact = Artifact::from_bytes(artifact)?;
    debug!(
        "decoding {} symbols with a {} entry code table",
        artifact.symbol_count(),
        artifact.table().len()
    );
    artifact.decode_payload()
}
