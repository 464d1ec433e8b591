//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cce-tree/cce-tree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `CCETREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ArenaConfig;

/// Shape of the tree to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeSettings {
    /// Maximum children per node
    pub branching_factor: usize,
    /// Layers below the root for complete builds
    pub depth: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            branching_factor: 2,
            depth: 3,
        }
    }
}

/// Node arena growth policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArenaSettings {
    /// Node slots added per block
    pub block_nodes: usize,
    /// Block cap; unset means the arena grows without limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<usize>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            block_nodes: ArenaConfig::DEFAULT_BLOCK_NODES,
            max_blocks: None,
        }
    }
}

impl From<&ArenaSettings> for ArenaConfig {
    fn from(settings: &ArenaSettings) -> Self {
        ArenaConfig {
            block_nodes: settings.block_nodes,
            max_blocks: settings.max_blocks,
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// Every field is optional so a layer only overrides what it specifies.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree: RawTreeSettings,
    pub arena: RawArenaSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeSettings {
    pub branching_factor: Option<usize>,
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawArenaSettings {
    pub block_nodes: Option<usize>,
    pub max_blocks: Option<usize>,
}

/// Unified configuration for cce-tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tree: TreeSettings,
    pub arena: ArenaSettings,
}

/// Get the XDG config directory for cce-tree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cce-tree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cce-tree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base).
    ///
    /// Every option the overlay specifies wins; the rest is kept.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree: TreeSettings {
                branching_factor: overlay
                    .tree
                    .branching_factor
                    .unwrap_or(self.tree.branching_factor),
                depth: overlay.tree.depth.unwrap_or(self.tree.depth),
            },
            arena: ArenaSettings {
                block_nodes: overlay.arena.block_nodes.unwrap_or(self.arena.block_nodes),
                max_blocks: overlay.arena.max_blocks.or(self.arena.max_blocks),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/cce-tree/cce-tree.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `CCETREE_*` prefix
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers(global_config_path().as_deref(), config_file, None)
    }

    /// Load settings from explicit layers.
    ///
    /// # Arguments
    /// * `global_file` - Global config; skipped when absent on disk
    /// * `config_file` - Optional explicit config file; it must exist
    /// * `env` - Environment source; `None` reads the process environment
    pub fn load_layers(
        global_file: Option<&Path>,
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_file.filter(|path| path.exists()) {
            debug!("load: global config {}", global_path.display());
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            debug!("load: config file {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply `CCETREE_*` environment variables as explicit overrides.
    ///
    /// `source` replaces the process environment when given, e.g.
    /// `CCETREE_TREE__BRANCHING_FACTOR=4` or `CCETREE_ARENA__MAX_BLOCKS=2`.
    pub fn apply_env_overrides(
        mut settings: Self,
        source: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CCETREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(source),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_usize(&config, "tree.branching_factor")? {
            settings.tree.branching_factor = val;
        }
        if let Some(val) = env_usize(&config, "tree.depth")? {
            settings.tree.depth = val;
        }
        if let Some(val) = env_usize(&config, "arena.block_nodes")? {
            settings.arena.block_nodes = val;
        }
        if let Some(val) = env_usize(&config, "arena.max_blocks")? {
            settings.arena.max_blocks = Some(val);
        }

        Ok(settings)
    }

    /// Reject settings that cannot produce a tree.
    pub fn validate(&self) -> ApplicationResult<()> {
        if self.tree.branching_factor == 0 {
            return Err(ApplicationError::Config {
                message: "tree.branching_factor must be greater than zero".into(),
            });
        }
        ArenaConfig::from(&self.arena)
            .validate()
            .map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cce-tree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cce-tree/cce-tree.toml
#   File:   --config <path>
#   Env:    CCETREE_* environment variables, e.g. CCETREE_TREE__DEPTH=4

[tree]
# Maximum number of children per node
# branching_factor = 2

# Layers below the root for complete builds
# depth = 3

[arena]
# Node slots added each time the arena grows
# block_nodes = 1024

# Maximum number of blocks; unset means unbounded
# max_blocks = 16
"#
        .to_string()
    }
}

/// Numeric override for `key`; `None` when the variable is not set.
fn env_usize(config: &Config, key: &str) -> ApplicationResult<Option<usize>> {
    match config.get::<usize>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("environment override {key}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
