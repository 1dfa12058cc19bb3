//! Decode variants.

use std::fmt;
use transcode_core::{Error, Result};

/// Resolution at which a decoder reconstructs pictures.
///
/// Thumbnail variants skip most of the inverse transform and produce a
/// picture reduced by a fixed factor in each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Downscale {
    /// Full resolution.
    #[default]
    Full,
    /// Half-resolution thumbnail decode.
    Half,
    /// Quarter-resolution thumbnail decode.
    Quarter,
}

impl Downscale {
    /// Linear reduction factor.
    pub fn factor(&self) -> u32 {
        match self {
            Self::Full => 1,
            Self::Half => 2,
            Self::Quarter => 4,
        }
    }

    /// Picture dimensions after reduction, rounded up.
    pub fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let factor = self.factor();
        (width.div_ceil(factor), height.div_ceil(factor))
    }
}

impl TryFrom<u32> for Downscale {
    type Error = Error;

    fn try_from(factor: u32) -> Result<Self> {
        match factor {
            1 => Ok(Self::Full),
            2 => Ok(Self::Half),
            4 => Ok(Self::Quarter),
            other => Err(Error::Config(format!(
                "Downscale factor of {other} is not supported ([1, 2, 4])"
            ))),
        }
    }
}

impl fmt::Display for Downscale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/{}", self.factor())
    }
}
