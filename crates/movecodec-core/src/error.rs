//! Error types for the movecodec encode/decode pipeline.

use thiserror::Error;

/// Errors that can occur while serializing or deserializing a value.
///
/// Every failure is a distinct kind; nothing in the codec is retried
/// internally. Decode-side variants carry the absolute byte offset where
/// the violation was detected, and structural variants carry the field
/// name or variant index, so a failure can be diagnosed without
/// re-running the decode.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset}: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEndOfInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("{remaining} trailing byte(s) after decoding {schema}")]
    TrailingBytes { schema: String, remaining: usize },

    #[error("non-canonical ULEB128 encoding at offset {offset}")]
    NonCanonicalVarint { offset: usize },

    #[error("ULEB128 value at offset {offset} exceeds the length cap")]
    VarintOverflow { offset: usize },

    #[error("invalid boolean byte {byte:#04x} at offset {offset}")]
    InvalidBoolean { byte: u8, offset: usize },

    #[error("invalid option tag {byte:#04x} at offset {offset}")]
    InvalidOptionTag { byte: u8, offset: usize },

    #[error("address width mismatch: expected {expected} byte(s), got {got}")]
    InvalidAddressWidth { expected: usize, got: usize },

    #[error("unknown schema '{name}'")]
    UnknownSchema { name: String },

    #[error("'{name}' expects {expected} type argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("missing field '{field}' in value for struct '{struct_name}'")]
    MissingField { struct_name: String, field: String },

    #[error("'{variant}' is not a variant of enum '{enum_name}'")]
    UnknownVariant { enum_name: String, variant: String },

    #[error("variant index {index} out of range for enum '{enum_name}' ({count} variant(s))")]
    VariantIndexOutOfRange {
        enum_name: String,
        index: u64,
        count: usize,
    },

    #[error("recursion limit of {limit} exceeded")]
    RecursionLimitExceeded { limit: usize },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("integer value {value} does not fit in {ty}")]
    IntegerOverflow { ty: String, value: String },

    #[error("cannot parse '{value}' as an unsigned integer")]
    InvalidInteger { value: String },

    #[error("invalid UTF-8 in string payload at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unresolved type parameter T{index} reached the codec")]
    UnresolvedTypeParam { index: usize },

    #[error("in field '{field}': {source}")]
    InField {
        field: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error("at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<CodecError>,
    },

    #[error("in variant '{variant}': {source}")]
    InVariant {
        variant: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wrap an error with the struct field it occurred in.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        CodecError::InField {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Wrap an error with the sequence index it occurred at.
    pub fn at_index(self, index: usize) -> Self {
        CodecError::AtIndex {
            index,
            source: Box::new(self),
        }
    }

    /// Wrap an error with the enum variant it occurred in.
    pub fn in_variant(self, variant: impl Into<String>) -> Self {
        CodecError::InVariant {
            variant: variant.into(),
            source: Box::new(self),
        }
    }

    /// Unwrap context layers down to the root cause.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::InField { source, .. }
            | CodecError::AtIndex { source, .. }
            | CodecError::InVariant { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Errors from building a schema registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("type '{name}' is already registered with a different definition")]
    AlreadyExists { name: String },

    #[error("catalog parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
