use std::fmt;

use umbra_warp::SampleGridError;

/// Result of a framebuffer completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Nothing is attached.
    MissingAttachment,
    /// An attachment names an unknown texture, a layer out of range, or a
    /// texture of the wrong kind for its slot.
    IncompleteAttachment,
    /// Colour and depth attachments differ in size.
    IncompleteDimensions,
}

impl FramebufferStatus {
    #[inline]
    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }

    pub fn message(self) -> &'static str {
        match self {
            FramebufferStatus::Complete => "framebuffer complete",
            FramebufferStatus::MissingAttachment => "framebuffer has no attachments",
            FramebufferStatus::IncompleteAttachment => "framebuffer attachment incomplete",
            FramebufferStatus::IncompleteDimensions => "framebuffer attachments differ in size",
        }
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Failures of the shadow subsystem.
///
/// None of these are fatal to the process. During setup they disable the
/// light's shadow; during a frame they make the light reuse its cached warp.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowError {
    /// A texture or framebuffer could not be created or attached.
    ResourceCreation { name: String, reason: String },
    /// The explicit completeness check failed.
    IncompleteFramebuffer { framebuffer: String, status: FramebufferStatus },
    /// Mapping the sample readback failed.
    Readback { reason: String },
    /// The readback had the wrong number of values.
    SampleGrid(SampleGridError),
    /// Rejected configuration value.
    InvalidConfig { field: &'static str, reason: String },
}

impl ShadowError {
    pub(crate) fn resource(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ShadowError::ResourceCreation { name: name.into(), reason: reason.into() }
    }
}

impl fmt::Display for ShadowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowError::ResourceCreation { name, reason } => {
                write!(f, "failed to create '{name}': {reason}")
            }
            ShadowError::IncompleteFramebuffer { framebuffer, status } => {
                write!(f, "framebuffer '{framebuffer}': {status}")
            }
            ShadowError::Readback { reason } => write!(f, "sample readback failed: {reason}"),
            ShadowError::SampleGrid(e) => write!(f, "{e}"),
            ShadowError::InvalidConfig { field, reason } => {
                write!(f, "invalid shadow config `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ShadowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShadowError::SampleGrid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SampleGridError> for ShadowError {
    fn from(e: SampleGridError) -> Self {
        ShadowError::SampleGrid(e)
    }
}
