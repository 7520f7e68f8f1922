//! Shannon–Fano prefix coding of byte texts, with a self-describing binary
//! artifact holding the code table and the bit-packed payload.
//!
//! ```
//! let encoded = shannon_fano_compression::encode(b"AAAABBBCCD")?;
//! let decoded = shannon_fano_compression::decode(encoded.bytes())?;
//! assert_eq!(decoded, b"AAAABBBCCD");
//! # Ok::<(), shannon_fano_compression::CodecError>(())
//! ```

pub mod artifact;
pub mod bits;
pub mod encode_decode;
pub mod error;
pub mod frequency;
pub mod prefix_code_table;
pub mod stats;

pub use artifact::Artifact;
pub use encode_decode::{decode, encode, Encoded, Encoder, EncoderConfig};
pub use error::CodecError;
pub use prefix_code_table::{CodeTable, SingleSymbolPolicy};
pub use stats::CompressionStats;
