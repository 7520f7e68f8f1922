use std::{fmt, str::FromStr};

use bit_vec::BitVec;

use crate::error::CodecError;

/// Packs bits into bytes, most significant bit first. The last byte is
/// padded with zero bits.
pub fn pack(bits: impl IntoIterator<Item = bool>) -> Vec<u8> {
    bits.into_iter().collect::<BitVec>().to_bytes()
}

/// Expands exactly `bit_len` bits out of `bytes`, most significant bit
/// first. Returns `None` when `bytes` holds fewer bits than requested.
pub fn unpack(bytes: &[u8], bit_len: usize) -> Option<BitVec> {
    if bit_len > bytes.len() * 8 {
        return None;
    }
    let mut bits = BitVec::from_bytes(bytes);
    bits.truncate(bit_len);
    Some(bits)
}

pub fn packed_len(bit_len: usize) -> usize {
    bit_len.div_ceil(8)
}

/// A single code word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(BitVec);

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> bit_vec::Iter<'_> {
        self.0.iter()
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    /// A copy of this code with one more bit appended.
    pub fn extended(&self, bit: bool) -> Self {
        let mut code = self.clone();
        code.push(bit);
        code
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len() <= other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }

    pub fn to_packed_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub fn from_packed(bytes: &[u8], bit_len: usize) -> Option<Self> {
        unpack(bytes, bit_len).map(Code)
    }
}

impl From<BitVec> for Code {
    fn from(bits: BitVec) -> Self {
        Code(bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|ch| match ch {
                '1' => Ok(true),
                '0' => Ok(false),
                ch => Err(CodecError::malformed(format!(
                    "invalid bit character {ch:?} in code {s:?}"
                ))),
            })
            .collect::<Result<BitVec, _>>()
            .map(Code)
    }
}
