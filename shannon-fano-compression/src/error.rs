use derive_more::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[display(fmt = "cannot build a code for empty input")]
    EmptyInput,

    #[display(fmt = "input has a single distinct symbol and no placeholder code is allowed")]
    DegenerateAlphabet,

    #[display(fmt = "malformed artifact: {}", _0)]
    MalformedArtifact(String),

    #[display(
        fmt = "payload ended after {} of {} symbols",
        decoded,
        expected
    )]
    TruncatedStream { expected: u64, decoded: u64 },

    #[display(
        fmt = "code for symbol {:#04x} is {} bits long, at most 255 can be stored",
        symbol,
        length
    )]
    CodeTooLong { symbol: u8, length: usize },
}

impl std::error::Error for CodecError {}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedArtifact(reason.into())
    }
}
