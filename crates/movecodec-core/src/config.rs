//! Codec limits.

/// Resource bounds applied to a single encode/decode call.
///
/// The codec is pure and fast; the only bound it needs is a recursion
/// guard so malicious or malformed input cannot drive unbounded stack
/// growth through self-referential schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting depth of the schema walk. Depth grows per nested
    /// type, not per sequence element, so wide-but-flat values never
    /// approach the bound.
    pub max_depth: usize,
}

impl CodecConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
