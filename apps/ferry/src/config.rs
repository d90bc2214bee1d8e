//! Configuration for the ferry binary.
//!
//! Loaded from `--config <file>` when given, otherwise from `ferry.toml` in
//! the working directory when present. Every section is optional and
//! command-line flags override file values.
//!
//! ```toml
//! [parser]
//! include_dirs = ["include"]
//!
//! [traversal]
//! follow_includes = true
//! include_patterns = []
//! exclude_patterns = ["/usr/"]
//!
//! [policy]
//! accepted_types = ["int"]
//! resolve_structs = true
//! ```

use ferry_core::{AggregatorOptions, FerryError, StandardPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ferry.toml";

/// Front-end configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Directories searched for `#include` targets.
    pub include_dirs: Vec<PathBuf>,
}

/// Include-graph traversal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub follow_includes: bool,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            follow_includes: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Standard policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Extra simple type names accepted as-is.
    pub accepted_types: Vec<String>,
    /// Delegate unknown names to struct acceptance.
    pub resolve_structs: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            accepted_types: Vec::new(),
            resolve_structs: true,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FerryConfig {
    pub parser: ParserConfig,
    pub traversal: TraversalConfig,
    pub policy: PolicyConfig,
}

impl FerryConfig {
    /// Load the explicit file, or `ferry.toml` from `cwd` if it exists.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, FerryError> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, FerryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FerryError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::parse(&content)
            .map_err(|e| FerryError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The policy this configuration describes.
    #[must_use]
    pub fn policy(&self) -> StandardPolicy {
        StandardPolicy::new()
            .with_extra_types(self.policy.accepted_types.iter().cloned())
            .with_struct_resolution(self.policy.resolve_structs)
    }

    /// Aggregator options, before command-line overrides.
    #[must_use]
    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            include_dirs: self.parser.include_dirs.clone(),
            follow_includes: self.traversal.follow_includes,
            include_patterns: self.traversal.include_patterns.clone(),
            exclude_patterns: self.traversal.exclude_patterns.clone(),
        }
    }
}
