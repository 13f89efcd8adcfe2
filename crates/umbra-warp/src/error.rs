use std::fmt;

/// The readback did not hold exactly 16 `[x, y]` samples.
///
/// Only the length is checked. A grid read back in the wrong order fits
/// silently to the wrong surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGridError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for SampleGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample grid needs {} interleaved floats, got {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for SampleGridError {}
