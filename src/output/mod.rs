//! Output naming and staged writing module

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

pub mod naming;
pub mod writer;

pub use naming::OutputNamingResolver;
pub use writer::StagedOutput;

/// What to do when the natural output name is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, ... until a free name is found
    Version,
    /// Refuse to pick another name
    Fail,
}

impl FromStr for CollisionPolicy {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "version" => Ok(CollisionPolicy::Version),
            "fail" => Ok(CollisionPolicy::Fail),
            _ => Err(EmbedError::InvalidConfig {
                message: format!("Invalid collision policy: {}. Valid policies: version, fail", s),
            }),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Version => f.write_str("version"),
            CollisionPolicy::Fail => f.write_str("fail"),
        }
    }
}

/// Output location and naming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output directory; the video's own directory when unset
    pub dir: Option<PathBuf>,
    /// Appended to the video's base name
    pub suffix: String,
    /// Container extension
    pub extension: String,
    /// Collision handling
    pub collision: CollisionPolicy,
    /// Highest numeric suffix tried under [`CollisionPolicy::Version`]
    pub max_versions: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: None,
            suffix: "_dual_subbed".to_string(),
            extension: "mp4".to_string(),
            collision: CollisionPolicy::Version,
            max_versions: 999,
        }
    }
}
