//! Component add-ons and their configuration.

pub mod forms;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use glob::MatchOptions;
use regex::RegexBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::template::{self, Context, TemplateVars};

pub use forms::{Cleaned, Cleaning, Field, FieldKind, FormData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum AddonKind {
    Generate,
    GettextCustomize,
    GettextMo,
    JsonCustomize,
    PropertiesSort,
    Discovery,
}

impl AddonKind {
    pub const ALL: [AddonKind; 6] = [
        AddonKind::Discovery,
        AddonKind::Generate,
        AddonKind::GettextCustomize,
        AddonKind::GettextMo,
        AddonKind::JsonCustomize,
        AddonKind::PropertiesSort,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AddonKind::Generate => "generate",
            AddonKind::GettextCustomize => "gettext.customize",
            AddonKind::GettextMo => "gettext.mo",
            AddonKind::JsonCustomize => "json.customize",
            AddonKind::PropertiesSort => "properties.sort",
            AddonKind::Discovery => "discovery",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AddonKind::Generate => "Statistics generator",
            AddonKind::GettextCustomize => "Customize gettext output",
            AddonKind::GettextMo => "Generate MO files",
            AddonKind::JsonCustomize => "Customize JSON output",
            AddonKind::PropertiesSort => "Formats the Java properties file",
            AddonKind::Discovery => "Component discovery",
        }
    }

    pub fn parse(id: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "addon",
                    format!("Unknown add-on: {}", id),
                    Some(id.to_string()),
                    Some(Self::ALL.iter().map(|k| k.id().to_string()).collect()),
                )
            })
    }
}

impl From<AddonKind> for &'static str {
    fn from(kind: AddonKind) -> Self {
        kind.id()
    }
}

impl fmt::Display for AddonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Receives validated settings. Opaque to the forms beyond these two calls.
pub trait Addon {
    fn configure(&mut self, kind: AddonKind, settings: Value) -> Result<()>;

    /// Translation context templates are test-rendered against.
    fn sample_context(&self) -> Result<Context>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "settings", rename_all = "snake_case")]
pub enum FormOutcome {
    Saved(Value),
    Preview(Value),
}

/// Validate `data` for `kind` and hand the result to `addon`.
///
/// A discovery form that turns into a preview does not reach the acceptor.
pub fn submit(kind: AddonKind, addon: &mut dyn Addon, data: &mut FormData) -> Result<FormOutcome> {
    match forms::clean(kind, addon, data)? {
        Cleaning::Preview(cleaned) => Ok(FormOutcome::Preview(Value::Object(cleaned))),
        Cleaning::Ready(cleaned) => {
            let settings = Value::Object(cleaned);
            addon.configure(kind, settings.clone())?;
            Ok(FormOutcome::Saved(settings))
        }
    }
}

/// Add-on acceptor that stores settings on a component record.
pub struct ComponentAddon<'a> {
    store: &'a Store,
    component: Component,
}

impl<'a> ComponentAddon<'a> {
    pub fn new(store: &'a Store, component: Component) -> Self {
        Self { store, component }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }
}

impl Addon for ComponentAddon<'_> {
    fn configure(&mut self, kind: AddonKind, settings: Value) -> Result<()> {
        self.component.addons.insert(kind.id().to_string(), settings);
        self.store.save_component(&self.component)
    }

    fn sample_context(&self) -> Result<Context> {
        let project = self.store.project(&self.component.project)?;
        let language = self
            .store
            .languages()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::internal_unexpected("No languages are defined"))?;

        let filename = self.component.filemask.replacen('*', &language.code, 1);
        let stem = Path::new(&filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut context = Context::new();
        for (key, value) in [
            (TemplateVars::PROJECT_NAME, project.name),
            (TemplateVars::PROJECT_SLUG, project.slug),
            (TemplateVars::COMPONENT_NAME, self.component.name.clone()),
            (TemplateVars::COMPONENT_SLUG, self.component.slug.clone()),
            (TemplateVars::LANGUAGE_CODE, language.code),
            (TemplateVars::LANGUAGE_NAME, language.name),
            (TemplateVars::FILENAME, filename),
            (TemplateVars::STEM, stem),
        ] {
            context.insert(key.to_string(), value);
        }
        Ok(context)
    }
}

/// Files the discovery add-on would group into one component.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiscoveredComponent {
    /// Value of the `component` group.
    pub component: String,
    /// Rendered name template.
    pub name: String,
    /// Rendered base file template; empty for bilingual files.
    pub base_file: String,
    /// Language code -> relative path.
    pub files: BTreeMap<String, String>,
}

/// Match every file under `root` against a discovery expression.
pub fn discovery_preview(
    root: &Path,
    pattern: &str,
    name_template: &str,
    base_file_template: &str,
) -> Result<Vec<DiscoveredComponent>> {
    let regex = RegexBuilder::new(pattern).build().map_err(|e| {
        Error::validation_invalid_argument(
            "match",
            format!("Failed to compile regular expression: {}", e),
            Some(pattern.to_string()),
            None,
        )
    })?;
    crate::filemask::require_groups(&regex, &["component", "language"])?;

    let mut found: BTreeMap<String, DiscoveredComponent> = BTreeMap::new();

    for path in walk_files(root)? {
        let Some(caps) = regex.captures(&path) else {
            continue;
        };
        if caps.get(0).map(|m| m.start()) != Some(0) {
            continue;
        }
        let (Some(component), Some(language)) = (caps.name("component"), caps.name("language"))
        else {
            continue;
        };

        let entry = match found.entry(component.as_str().to_string()) {
            std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::btree_map::Entry::Vacant(e) => {
                let context = forms::discovery_context(component.as_str());
                e.insert(DiscoveredComponent {
                    component: component.as_str().to_string(),
                    name: template::render(name_template, &context)?,
                    base_file: template::render(base_file_template, &context)?,
                    files: BTreeMap::new(),
                })
            }
        };
        entry
            .files
            .insert(language.as_str().to_string(), path.clone());
    }

    Ok(found.into_values().collect())
}

/// Relative `/`-separated paths of all non-hidden files under `root`.
fn walk_files(root: &Path) -> Result<Vec<String>> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&root.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let entries = glob::glob_with(&pattern, options)
        .map_err(|e| Error::internal_unexpected(format!("Invalid scan pattern: {}", e.msg)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    Ok(files
        .iter()
        .filter_map(|path| path.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Project;
    use std::fs;
    use tempfile::tempdir;

    struct Recorder {
        configured: Vec<(AddonKind, Value)>,
    }

    impl Addon for Recorder {
        fn configure(&mut self, kind: AddonKind, settings: Value) -> Result<()> {
            self.configured.push((kind, settings));
            Ok(())
        }

        fn sample_context(&self) -> Result<Context> {
            Ok(Context::new())
        }
    }

    fn discovery_data(extra: &[(&str, &str)]) -> FormData {
        let mut data = FormData::new();
        data.insert(
            "match".to_string(),
            r"(?P<component>[^/]*)/(?P<language>[^/.]*)\.po".to_string(),
        );
        for (k, v) in extra {
            data.insert(k.to_string(), v.to_string());
        }
        data
    }

    #[test]
    fn parse_known_and_unknown_kinds() {
        assert_eq!(AddonKind::parse("json.customize").unwrap(), AddonKind::JsonCustomize);
        let err = AddonKind::parse("nope").unwrap_err();
        assert!(err.details["tried"].as_array().unwrap().len() == 6);
    }

    #[test]
    fn discovery_preview_does_not_reach_acceptor() {
        let mut addon = Recorder { configured: Vec::new() };
        let mut data = discovery_data(&[]);

        let outcome = submit(AddonKind::Discovery, &mut addon, &mut data).unwrap();
        assert!(matches!(outcome, FormOutcome::Preview(_)));
        assert!(addon.configured.is_empty());

        // Resubmitting the mutated data without confirming fails.
        assert!(submit(AddonKind::Discovery, &mut addon, &mut data).is_err());
        assert!(addon.configured.is_empty());

        data.insert("confirm".to_string(), "true".to_string());
        let outcome = submit(AddonKind::Discovery, &mut addon, &mut data).unwrap();
        assert!(matches!(outcome, FormOutcome::Saved(_)));
        assert_eq!(addon.configured.len(), 1);
        assert_eq!(addon.configured[0].1["preview"], false);
        assert_eq!(data["preview"], "false");
    }

    #[test]
    fn settingless_addons_save_empty_object() {
        let mut addon = Recorder { configured: Vec::new() };
        let outcome = submit(AddonKind::GettextMo, &mut addon, &mut FormData::new()).unwrap();
        assert_eq!(outcome, FormOutcome::Saved(serde_json::json!({})));
    }

    #[test]
    fn component_addon_persists_settings() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path());
        store.create_project(&Project::new("web", "Web")).unwrap();
        let component = Component {
            slug: "docs".to_string(),
            name: "Docs".to_string(),
            project: "web".to_string(),
            repo: "https://example.com/r.git".to_string(),
            branch: "main".to_string(),
            filemask: "po/*.po".to_string(),
            file_format: "po".to_string(),
            vcs: "git".to_string(),
            push_on_commit: true,
            ..Default::default()
        };
        store.create_component(&component).unwrap();

        let mut addon = ComponentAddon::new(&store, component);
        let context = addon.sample_context().unwrap();
        assert_eq!(context["project_name"], "Web");
        assert!(context["filename"].starts_with("po/"));

        let mut data = FormData::new();
        data.insert("indent".to_string(), "2".to_string());
        submit(AddonKind::JsonCustomize, &mut addon, &mut data).unwrap();

        let saved = store.component("web", "docs").unwrap();
        assert_eq!(saved.addons["json.customize"]["indent"], 2);
    }

    #[test]
    fn preview_groups_files_by_component() {
        let dir = tempdir().unwrap();
        for path in ["docs/cs.po", "docs/de.po", "app/cs.po", "README.md", ".git/x/y.po"] {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, "").unwrap();
        }

        let found = discovery_preview(
            dir.path(),
            r"(?P<component>[^/]*)/(?P<language>[^/.]*)\.po",
            "{{ component|title }}",
            "",
        )
        .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].component, "app");
        assert_eq!(found[1].name, "Docs");
        assert_eq!(found[1].files.len(), 2);
        assert_eq!(found[1].files["de"], "docs/de.po");
    }
}
