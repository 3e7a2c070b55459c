//! Grouped widget options, loadable from RON.

use crate::drag::DragOptions;
use crate::tree_view::TreeViewOptions;

pub const CONFIG_VERSION: u32 = 1;

/// Everything a host app may want to tune about the folder tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FolderTreeConfig {
    pub version: u32,
    pub drag: DragOptions,
    pub view: TreeViewOptions,
}

impl Default for FolderTreeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            drag: DragOptions::default(),
            view: TreeViewOptions::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported config version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[cfg(feature = "serde")]
    #[error("ron serialize error: {0}")]
    RonSerialize(#[from] ron::Error),

    #[cfg(feature = "serde")]
    #[error("ron deserialize error: {0}")]
    RonDeserialize(#[from] ron::error::SpannedError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "serde")]
fn pretty_ron_config() -> ron::ser::PrettyConfig {
    ron::ser::PrettyConfig::new().depth_limit(8)
}

#[cfg(feature = "serde")]
impl FolderTreeConfig {
    /// Missing fields take their default values.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron_str)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                expected: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, pretty_ron_config())?)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
