//! Decode configuration.

/// Default limit on nested arrays, maps and instance-variable wrappers.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of containers and wrappers before decoding fails with
    /// `Error::MaxDepthExceeded`.
    pub max_depth: usize,
}

impl DecodeOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}
