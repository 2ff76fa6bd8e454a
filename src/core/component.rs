use crate::config::ConfigEntity;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Scheme of repository back-references to another component's checkout.
pub const LINK_SCHEME: &str = "polyglot://";

/// True when `repo` points at another component instead of a VCS URL.
pub fn is_repo_link(repo: &str) -> bool {
    repo.starts_with(LINK_SCHEME)
}

/// Back-reference to the checkout of `project/component`.
pub fn repo_link(project: &str, component: &str) -> String {
    format!("{}{}/{}", LINK_SCHEME, project, component)
}

/// Split `polyglot://project/component` into its two slugs.
pub fn parse_repo_link(repo: &str) -> Option<(&str, &str)> {
    let rest = repo.strip_prefix(LINK_SCHEME)?;
    let (project, component) = rest.split_once('/')?;
    if project.is_empty() || component.is_empty() || component.contains('/') {
        return None;
    }
    Some((project, component))
}

/// A trackable translation unit bound to a file mask within a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Component {
    #[serde(default)]
    pub slug: String,
    pub name: String,
    pub project: String,

    /// VCS URL, or a `polyglot://` back-reference for shared checkouts.
    pub repo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub push: String,
    pub branch: String,

    pub filemask: String,
    /// Monolingual base file; empty for bilingual formats.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    pub file_format: String,
    pub vcs: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_regex: Option<String>,
    #[serde(default = "default_push_on_commit")]
    pub push_on_commit: bool,

    /// Add-on id -> accepted settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub addons: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_push_on_commit() -> bool {
    true
}

impl Component {
    pub fn is_linked(&self) -> bool {
        is_repo_link(&self.repo)
    }

    /// Back-reference other components use to share this checkout.
    pub fn link(&self) -> String {
        repo_link(&self.project, &self.slug)
    }
}

impl ConfigEntity for Component {
    fn id(&self) -> &str {
        &self.slug
    }
    fn set_id(&mut self, id: String) {
        self.slug = id;
    }
    fn not_found_error(id: String, suggestions: Vec<String>) -> Error {
        Error::component_not_found(id, suggestions)
    }
    fn entity_type() -> &'static str {
        "component"
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation_invalid_argument(
                "name",
                "Component name cannot be empty",
                Some(self.slug.clone()),
                None,
            ));
        }

        if self.is_linked() && parse_repo_link(&self.repo).is_none() {
            return Err(Error::validation_invalid_argument(
                "repo",
                format!("Invalid repository link: {}", self.repo),
                Some(self.slug.clone()),
                None,
            ));
        }

        if !self.filemask.contains('*') {
            return Err(Error::validation_invalid_argument(
                "filemask",
                "File mask does not contain * as a language placeholder!",
                Some(self.slug.clone()),
                None,
            ));
        }

        if let Some(pattern) = &self.language_regex {
            Regex::new(pattern).map_err(|e| {
                Error::validation_invalid_argument(
                    "language_regex",
                    format!("Failed to compile regular expression \"{}\": {}", pattern, e),
                    Some(self.slug.clone()),
                    None,
                )
            })?;
        }

        Ok(())
    }
}
