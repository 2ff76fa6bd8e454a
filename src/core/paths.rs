use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "POLYGLOT_HOME";

/// Base polyglot data directory.
///
/// `$POLYGLOT_HOME` wins when set (with `~` and `$VAR` expansion), otherwise
/// the universal `~/.config/polyglot/` (`%APPDATA%\polyglot` on Windows).
pub fn polyglot() -> Result<PathBuf> {
    if let Ok(custom) = env::var(HOME_ENV) {
        if !custom.trim().is_empty() {
            let expanded = shellexpand::full(&custom).map_err(|e| {
                Error::config_invalid_value(HOME_ENV, Some(custom.clone()), e.to_string())
            })?;
            return Ok(PathBuf::from(expanded.as_ref()));
        }
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("polyglot"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("polyglot"))
    }
}

/// Global polyglot.json config file under a data root
pub fn config_json(root: &Path) -> PathBuf {
    root.join("polyglot.json")
}

/// Projects directory
pub fn projects(root: &Path) -> PathBuf {
    root.join("projects")
}

/// Project record path
pub fn project(root: &Path, slug: &str) -> PathBuf {
    projects(root).join(format!("{}.json", slug))
}

/// Components directory of one project
pub fn components(root: &Path, project: &str) -> PathBuf {
    root.join("components").join(project)
}

/// Component record path
pub fn component(root: &Path, project: &str, slug: &str) -> PathBuf {
    components(root, project).join(format!("{}.json", slug))
}

/// Known languages list
pub fn languages_json(root: &Path) -> PathBuf {
    root.join("languages.json")
}

/// Checkout directory of a project
pub fn project_checkouts(root: &Path, project: &str) -> PathBuf {
    root.join("vcs").join(project)
}

/// Checkout directory of a component
pub fn component_checkout(root: &Path, project: &str, slug: &str) -> PathBuf {
    project_checkouts(root, project).join(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_paths_are_nested_under_root() {
        let root = Path::new("/data");
        assert_eq!(project(root, "web"), PathBuf::from("/data/projects/web.json"));
        assert_eq!(
            component(root, "web", "ui"),
            PathBuf::from("/data/components/web/ui.json")
        );
        assert_eq!(
            component_checkout(root, "web", "ui"),
            PathBuf::from("/data/vcs/web/ui")
        );
    }
}
