//! Graph definition file (`tangle.toml`).
//!
//! ```toml
//! [policy]
//! healthy_threshold = 0.8
//! degraded_threshold = 0.5
//!
//! [[component]]
//! id = "architect"
//! description = "Plans every build"
//! cascade = "all"
//! probe = { kind = "path_exists", path = "plans/" }
//!
//! [[component]]
//! id = "constructor"
//! depends_on = ["architect"]
//! [component.probe]
//! kind = "command"
//! program = "make"
//! args = ["-q", "build"]
//! timeout_ms = 2000
//! ```
//!
//! Relative probe paths resolve against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tangle_core::{CascadeOverride, ComponentSpec, HealthPolicy};

use crate::probes::BoundProbe;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDefinition {
    #[serde(default)]
    pub policy: HealthPolicy,
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDefinition {
    pub id: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cascade: Option<CascadeDefinition>,
    #[serde(default)]
    pub probe: ProbeDefinition,
}

/// `cascade = "all"` or `cascade = ["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CascadeDefinition {
    Keyword(CascadeKeyword),
    Components(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeKeyword {
    All,
}

impl From<CascadeDefinition> for CascadeOverride {
    fn from(def: CascadeDefinition) -> Self {
        match def {
            CascadeDefinition::Keyword(CascadeKeyword::All) => Self::All,
            CascadeDefinition::Components(ids) => Self::Components(ids),
        }
    }
}

/// Probe declaration, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeDefinition {
    Static {
        #[serde(default = "default_true")]
        healthy: bool,
        #[serde(default)]
        issues: Vec<String>,
    },
    PathExists {
        path: PathBuf,
    },
    FileNonempty {
        path: PathBuf,
    },
    DirNotEmpty {
        path: PathBuf,
    },
    EnvVar {
        name: String,
    },
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

impl Default for ProbeDefinition {
    fn default() -> Self {
        Self::Static {
            healthy: true,
            issues: Vec::new(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    5000
}

impl ProbeDefinition {
    /// Turn the declaration into a runnable probe, resolving relative paths
    /// against `base_dir`.
    pub fn bind(self, base_dir: &Path) -> BoundProbe {
        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };
        match self {
            Self::Static { healthy, issues } => BoundProbe::Static { healthy, issues },
            Self::PathExists { path } => BoundProbe::PathExists(resolve(path)),
            Self::FileNonempty { path } => BoundProbe::FileNonempty(resolve(path)),
            Self::DirNotEmpty { path } => BoundProbe::DirNotEmpty(resolve(path)),
            Self::EnvVar { name } => BoundProbe::EnvVar(name),
            Self::Command {
                program,
                args,
                timeout_ms,
            } => BoundProbe::Command {
                program,
                args,
                timeout_ms,
                working_dir: base_dir.to_path_buf(),
            },
        }
    }
}

impl GraphDefinition {
    /// Component declarations with probes bound, in file order.
    pub fn into_specs(self, base_dir: &Path) -> Vec<ComponentSpec> {
        self.components
            .into_iter()
            .map(|component| {
                let mut spec = ComponentSpec::new(component.id, component.probe.bind(base_dir))
                    .depends_on(component.depends_on);
                if let Some(cascade) = component.cascade {
                    spec = spec.cascade(cascade.into());
                }
                if let Some(description) = component.description {
                    spec = spec.description(description);
                }
                spec
            })
            .collect()
    }
}

/// Parse a definition from TOML text.
pub fn parse_definition(content: &str) -> Result<GraphDefinition> {
    toml::from_str::<GraphDefinition>(content).context("invalid graph definition")
}

/// Read and parse the definition at `path`.
pub fn load_definition(path: &Path) -> Result<GraphDefinition> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_definition(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Directory relative probe paths resolve against.
pub fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
