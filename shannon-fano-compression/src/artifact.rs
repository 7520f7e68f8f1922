use std::collections::BTreeMap;

use bit_vec::BitVec;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::debug;

use crate::{
    bits::{packed_len, Code},
    error::CodecError,
    prefix_code_table::CodeTable,
};

const HEADER_LEN: usize = 16;
const ENTRY_HEADER_LEN: usize = 2;
const MAX_TABLE_SIZE: u64 = 256;

/// The serialized form of an encoded text:
///
/// ```text
/// [symbol_count: u64 le][table_size: u64 le]
/// table_size x [symbol: u8][code_len: u8][code bits, ceil(code_len / 8) bytes]
/// [payload bits, msb first, zero padded]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    symbol_count: u64,
    table: CodeTable,
    payload: Bytes,
}

impl Artifact {
    pub fn new(symbol_count: u64, table: CodeTable, payload: Bytes) -> Self {
        Self {
            symbol_count,
            table,
            payload,
        }
    }

    pub fn symbol_count(&self) -> u64 {
        self.symbol_count
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let table_len = self
            .table
            .iter()
            .map(|(_, code)| ENTRY_HEADER_LEN + packed_len(code.len()))
            .sum::<usize>();
        let mut buf = BytesMut::with_capacity(HEADER_LEN + table_len + self.payload.len());

        buf.put_u64_le(self.symbol_count);
        buf.put_u64_le(self.table.len() as u64);

        for (&symbol, code) in self.table.iter() {
            let length = u8::try_from(code.len()).map_err(|_| CodecError::CodeTooLong {
                symbol,
                length: code.len(),
            })?;
            buf.put_u8(symbol);
            buf.put_u8(length);
            buf.put_slice(&code.to_packed_bytes());
        }

        buf.put_slice(&self.payload);
        debug!(
            "serialized {} symbols: {} table bytes, {} payload bytes",
            self.symbol_count,
            table_len,
            self.payload.len()
        );

        Ok(buf.freeze())
    }

    pub fn from_bytes(content: &[u8]) -> Result<Self, CodecError> {
        let mut buf = content;

        if buf.remaining() < HEADER_LEN {
            return Err(CodecError::malformed(format!(
                "header needs {HEADER_LEN} bytes, got {}",
                buf.remaining()
            )));
        }
        let symbol_count = buf.get_u64_le();
        let table_size = buf.get_u64_le();

        if table_size > MAX_TABLE_SIZE {
            return Err(CodecError::malformed(format!(
                "table declares {table_size} entries, at most {MAX_TABLE_SIZE} symbols exist"
            )));
        }
        if symbol_count > 0 && table_size == 0 {
            return Err(CodecError::malformed(format!(
                "{symbol_count} symbols declared with an empty code table"
            )));
        }

        let mut table = BTreeMap::new();
        for entry in 0..table_size {
            let (symbol, code) = read_entry(&mut buf).map_err(|err| match err {
                CodecError::MalformedArtifact(reason) => {
                    CodecError::malformed(format!("table entry {entry}: {reason}"))
                }
                err => err,
            })?;
            if table.insert(symbol, code).is_some() {
                return Err(CodecError::malformed(format!(
                    "symbol {symbol:#04x} appears twice in the code table"
                )));
            }
        }

        let table = table.into_iter().collect::<CodeTable>();
        if !table.is_prefix_free() {
            return Err(CodecError::malformed("code table is not prefix free"));
        }

        Ok(Self {
            symbol_count,
            table,
            payload: Bytes::copy_from_slice(buf),
        })
    }

    /// Decodes the payload back into exactly `symbol_count` symbols.
    pub fn decode_payload(&self) -> Result<Vec<u8>, CodecError> {
        let truncated = |decoded: usize| CodecError::TruncatedStream {
            expected: self.symbol_count,
            decoded: decoded as u64,
        };

        let available_bits = self.payload.len() as u64 * 8;
        let min_required_bits = self
            .symbol_count
            .saturating_mul(self.table.min_code_len() as u64);
        if min_required_bits > available_bits {
            return Err(truncated(0));
        }

        if self.symbol_count > 0 && self.table.is_empty() {
            return Err(CodecError::malformed("no code table to decode symbols with"));
        }

        let reverse = self.table.reverse();
        let max_code_len = self.table.max_code_len();
        let bits = BitVec::from_bytes(&self.payload);

        let mut decoded = Vec::with_capacity(self.symbol_count.min(available_bits) as usize);
        let mut candidate = Code::new();
        let mut consumed_bits = 0;

        for bit in bits.iter() {
            if decoded.len() as u64 == self.symbol_count {
                break;
            }
            consumed_bits += 1;
            candidate.push(bit);

            if let Some(symbol) = reverse.get(&candidate) {
                decoded.push(symbol);
                candidate = Code::new();
            } else if candidate.len() >= max_code_len {
                return Err(CodecError::malformed(format!(
                    "bits {candidate} at offset {} match no code",
                    consumed_bits - candidate.len()
                )));
            }
        }

        if (decoded.len() as u64) < self.symbol_count {
            return Err(truncated(decoded.len()));
        }

        let trailing = self.payload.len() - packed_len(consumed_bits);
        if trailing > 0 {
            return Err(CodecError::malformed(format!(
                "{trailing} unused bytes after the last symbol"
            )));
        }

        Ok(decoded)
    }
}

fn read_entry(buf: &mut &[u8]) -> Result<(u8, Code), CodecError> {
    if buf.remaining() < ENTRY_HEADER_LEN {
        return Err(CodecError::malformed("entry header is cut short"));
    }
    let symbol = buf.get_u8();
    let code_len = buf.get_u8() as usize;

    if code_len == 0 {
        return Err(CodecError::malformed(format!(
            "symbol {symbol:#04x} has an empty code"
        )));
    }

    let byte_len = packed_len(code_len);
    if buf.remaining() < byte_len {
        return Err(CodecError::malformed(format!(
            "code of symbol {symbol:#04x} needs {byte_len} bytes, got {}",
            buf.remaining()
        )));
    }
    let code = Code::from_packed(&buf[..byte_len], code_len)
        .ok_or_else(|| CodecError::malformed(format!("cannot unpack code of {symbol:#04x}")))?;
    buf.advance(byte_len);

    Ok((symbol, code))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::Artifact;
    use crate::{bits::Code, error::CodecError, prefix_code_table::CodeTable};

    fn table(entries: &[(u8, &str)]) -> CodeTable {
        entries
            .iter()
            .map(|&(symbol, code)| (symbol, code.parse::<Code>().unwrap()))
            .collect()
    }

    fn header(symbol_count: u64, table_size: u64) -> Vec<u8> {
        let mut bytes = symbol_count.to_le_bytes().to_vec();
        bytes.extend(table_size.to_le_bytes());
        bytes
    }

    #[test]
    fn test_layout() {
        let artifact = Artifact::new(
            3,
            table(&[(b'a', "1"), (b'b', "0")]),
            Bytes::from_static(&[0b1010_0000]),
        );
        let bytes = artifact.to_bytes().unwrap();

        let mut expected = header(3, 2);
        expected.extend([b'a', 1, 0b1000_0000, b'b', 1, 0b0000_0000, 0b1010_0000]);
        assert_eq!(bytes.as_ref(), expected.as_slice());

        let parsed = Artifact::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, artifact);
        assert_eq!(parsed.decode_payload().unwrap(), b"aba");
    }

    #[test]
    fn test_long_codes_span_several_bytes() {
        let long = "0".repeat(12);
        let artifact = Artifact::new(
            1,
            table(&[(b'x', "1"), (b'y', long.as_str()), (b'z', "01")]),
            Bytes::from_static(&[0, 0]),
        );
        let bytes = artifact.to_bytes().unwrap();
        let parsed = Artifact::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.table().get(b'y').unwrap().to_string(), long);
        assert_eq!(parsed.decode_payload().unwrap(), b"y");
    }

    #[test]
    fn test_entry_order_does_not_matter() {
        let mut bytes = header(4, 3);
        bytes.extend([b'c', 2, 0b0000_0000]);
        bytes.extend([b'a', 1, 0b1000_0000]);
        bytes.extend([b'b', 2, 0b0100_0000]);
        // a b c a -> 1 01 00 1
        bytes.push(0b1010_0100);

        let artifact = Artifact::from_bytes(&bytes).unwrap();
        assert_eq!(artifact.decode_payload().unwrap(), b"abca");
    }

    #[test]
    fn test_padding_bits_are_never_decoded() {
        // "b" is code 0, so the zero padding would decode as more b's
        let artifact = Artifact::new(
            2,
            table(&[(b'a', "1"), (b'b', "0")]),
            Bytes::from_static(&[0b1000_0000]),
        );
        assert_eq!(artifact.decode_payload().unwrap(), b"ab");
    }

    #[test]
    fn test_empty_artifact() {
        let artifact = Artifact::from_bytes(&header(0, 0)).unwrap();
        assert!(artifact.table().is_empty());
        assert_eq!(artifact.decode_payload().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_short_header() {
        let result = Artifact::from_bytes(&[0; 15]);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_oversized_table() {
        let result = Artifact::from_bytes(&header(1, 257));
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_table_shorter_than_declared() {
        let mut bytes = header(1, 2);
        bytes.extend([b'a', 1, 0b1000_0000]);
        let result = Artifact::from_bytes(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));

        let mut bytes = header(1, 1);
        bytes.extend([b'a', 9, 0xff]);
        let result = Artifact::from_bytes(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_zero_length_code() {
        let mut bytes = header(1, 1);
        bytes.extend([b'a', 0]);
        let result = Artifact::from_bytes(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_duplicate_symbols_and_codes() {
        let mut bytes = header(1, 2);
        bytes.extend([b'a', 1, 0b1000_0000, b'a', 1, 0b0000_0000]);
        let result = Artifact::from_bytes(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));

        let mut bytes = header(1, 2);
        bytes.extend([b'a', 1, 0b1000_0000, b'b', 1, 0b1000_0000]);
        let result = Artifact::from_bytes(&bytes);
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_symbols_without_table() {
        let result = Artifact::from_bytes(&header(5, 0));
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_unmatched_bits() {
        // the only code is 1, a 0 bit can never be matched
        let artifact = Artifact::new(1, table(&[(b'z', "1")]), Bytes::from_static(&[0]));
        let result = artifact.decode_payload();
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_trailing_bytes() {
        let artifact = Artifact::new(
            1,
            table(&[(b'a', "1"), (b'b', "0")]),
            Bytes::from_static(&[0b1000_0000, 0]),
        );
        let result = artifact.decode_payload();
        assert!(matches!(result, Err(CodecError::MalformedArtifact(_))));
    }

    #[test]
    fn test_payload_too_short() {
        let artifact = Artifact::new(
            9,
            table(&[(b'a', "1"), (b'b', "0")]),
            Bytes::from_static(&[0xff]),
        );
        assert_eq!(
            artifact.decode_payload(),
            Err(CodecError::TruncatedStream {
                expected: 9,
                decoded: 0
            })
        );

        // enough bits for nine one-bit codes, but the codes are longer
        let artifact = Artifact::new(
            9,
            table(&[(b'a', "1"), (b'b', "01"), (b'c', "00")]),
            Bytes::from_static(&[0, 0]),
        );
        assert_eq!(
            artifact.decode_payload(),
            Err(CodecError::TruncatedStream {
                expected: 9,
                decoded: 8
            })
        );
    }
}
