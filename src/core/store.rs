//! Persistent store of projects, components and languages under one data root.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::component::{self, Component};
use crate::config;
use crate::defaults::{self, Defaults};
use crate::error::{Error, Result};
use crate::language::{self, Language};
use crate::paths;
use crate::project::Project;

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store at `$POLYGLOT_HOME` or the platform config directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(paths::polyglot()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn defaults(&self) -> Defaults {
        defaults::load_defaults(&self.root)
    }

    // Projects

    pub fn project(&self, slug: &str) -> Result<Project> {
        config::load(&paths::projects(&self.root), slug)
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        config::list(&paths::projects(&self.root))
    }

    pub fn create_project(&self, project: &Project) -> Result<()> {
        config::create(&paths::projects(&self.root), project)
    }

    /// Directory holding the project's checkouts.
    pub fn project_path(&self, project: &str) -> PathBuf {
        paths::project_checkouts(&self.root, project)
    }

    // Components

    fn components_dir(&self, project: &str) -> PathBuf {
        paths::components(&self.root, project)
    }

    pub fn component(&self, project: &str, slug: &str) -> Result<Component> {
        let mut component: Component = config::load(&self.components_dir(project), slug)?;
        component.project = project.to_string();
        Ok(component)
    }

    pub fn components(&self, project: &str) -> Result<Vec<Component>> {
        let mut items: Vec<Component> = config::list(&self.components_dir(project))?;
        for item in &mut items {
            item.project = project.to_string();
        }
        Ok(items)
    }

    pub fn component_exists(&self, project: &str, slug: &str) -> bool {
        config::exists(&self.components_dir(project), slug)
    }

    /// True if any component of `project` already uses `name` or `slug`.
    pub fn component_conflicts(&self, project: &str, name: &str, slug: &str) -> Result<bool> {
        if self.component_exists(project, slug) {
            return Ok(true);
        }
        Ok(self
            .components(project)?
            .iter()
            .any(|c| c.name == name || c.slug == slug))
    }

    pub fn create_component(&self, component: &Component) -> Result<()> {
        self.project(&component.project)?;
        config::create(&self.components_dir(&component.project), component)
    }

    pub fn save_component(&self, component: &Component) -> Result<()> {
        config::save(&self.components_dir(&component.project), component)
    }

    /// Component a `polyglot://project/component` link points at.
    pub fn linked_component(&self, link: &str) -> Result<Component> {
        let (project, slug) = component::parse_repo_link(link)
            .ok_or_else(|| Error::component_not_found(link, Vec::new()))?;
        self.component(project, slug)
    }

    /// Working copy of `component`, following repository links.
    pub fn checkout_path(&self, component: &Component) -> Result<PathBuf> {
        let mut current = component.clone();
        let mut seen = HashSet::new();

        while current.is_linked() {
            if !seen.insert(current.link()) {
                return Err(Error::validation_invalid_argument(
                    "repo",
                    format!("Repository links form a cycle at {}", current.link()),
                    Some(component.slug.clone()),
                    None,
                ));
            }
            current = self.linked_component(&current.repo)?;
        }

        Ok(paths::component_checkout(
            &self.root,
            &current.project,
            &current.slug,
        ))
    }

    // Languages

    pub fn languages(&self) -> Result<Vec<Language>> {
        language::load(&self.root)
    }

    pub fn known_language_count(&self, codes: &BTreeSet<String>) -> Result<usize> {
        Ok(language::count_known(&self.languages()?, codes))
    }
}
