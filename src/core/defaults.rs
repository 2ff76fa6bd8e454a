use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths;

/// Root configuration structure for polyglot.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolyglotConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via polyglot.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    #[serde(default = "default_vcs")]
    pub vcs: String,

    #[serde(default = "default_push_on_commit")]
    pub push_on_commit: bool,

    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,

    #[serde(default = "default_slug_max_length")]
    pub slug_max_length: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            vcs: default_vcs(),
            push_on_commit: default_push_on_commit(),
            name_max_length: default_name_max_length(),
            slug_max_length: default_slug_max_length(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_vcs() -> String {
    "git".to_string()
}

fn default_push_on_commit() -> bool {
    true
}

fn default_name_max_length() -> usize {
    100
}

fn default_slug_max_length() -> usize {
    100
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If polyglot.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults(root: &Path) -> Defaults {
    load_config(root).defaults
}

/// Load the full polyglot.json config, falling back to defaults on any error.
pub fn load_config(root: &Path) -> PolyglotConfig {
    load_config_from_file(root).unwrap_or_default()
}

fn load_config_from_file(root: &Path) -> crate::Result<PolyglotConfig> {
    let path = paths::config_json(root);

    if !path.exists() {
        return Err(crate::Error::internal_unexpected("polyglot.json not found"));
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))
}

/// Save config to polyglot.json file (creates if missing).
pub fn save_config(root: &Path, config: &PolyglotConfig) -> crate::Result<()> {
    let path = paths::config_json(root);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("serialize polyglot.json".to_string()))
    })?;

    fs::write(&path, content).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })?;

    Ok(())
}

/// Check if polyglot.json file exists
pub fn config_exists(root: &Path) -> bool {
    paths::config_json(root).exists()
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

/// Update one default from its textual form.
pub fn set_default(defaults: &mut Defaults, key: &str, value: &str) -> crate::Result<()> {
    let invalid = |problem: &str| {
        crate::Error::config_invalid_value(key, Some(value.to_string()), problem)
    };

    match key {
        "vcs" => {
            if value.trim().is_empty() {
                return Err(invalid("vcs cannot be empty"));
            }
            defaults.vcs = value.trim().to_string();
        }
        "push_on_commit" => {
            defaults.push_on_commit = value
                .parse()
                .map_err(|_| invalid("expected true or false"))?;
        }
        "name_max_length" | "slug_max_length" => {
            let n: usize = value
                .parse()
                .map_err(|_| invalid("expected a positive integer"))?;
            // Room for the " NNN" duplicate suffix.
            if n < 5 {
                return Err(invalid("must be at least 5"));
            }
            if key == "name_max_length" {
                defaults.name_max_length = n;
            } else {
                defaults.slug_max_length = n;
            }
        }
        _ => return Err(invalid("unknown key")),
    }
    Ok(())
}
