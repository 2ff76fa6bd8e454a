//! Bulk import of components from a repository.
//!
//! One checkout is shared by every imported component: the main component
//! owns the working copy, the others point at it through a
//! `polyglot://project/main` link.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use serde::Serialize;

use crate::component::{self, Component};
use crate::error::{Error, ImportDetails, Result};
use crate::file_format;
use crate::filemask::{ComponentMatcher, FileMask};
use crate::local_files::{self, FileSystem};
use crate::project::Project;
use crate::slugify;
use crate::store::Store;
use crate::vcs::VcsRegistry;

/// Numbered names tried for a duplicate before giving up.
pub const MAX_SLUG_ATTEMPTS: u32 = 999;

pub const DEFAULT_NAME_TEMPLATE: &str = "%s";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub project: String,
    pub repo: String,
    pub branch: String,
    pub filemask: String,

    pub name_template: String,
    pub base_file_template: String,
    pub component_regexp: Option<String>,
    pub file_format: String,
    pub language_regex: Option<String>,
    pub skip_duplicates: bool,
    pub license: Option<String>,
    pub license_url: Option<String>,
    /// Falls back to the configured default.
    pub vcs: Option<String>,
    pub push_url: Option<String>,
    pub push_url_same: bool,
    /// Falls back to the configured default.
    pub push_on_commit: Option<bool>,
    pub main_component: Option<String>,
}

impl ImportOptions {
    pub fn new(
        project: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        filemask: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            repo: repo.into(),
            branch: branch.into(),
            filemask: filemask.into(),
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
            base_file_template: String::new(),
            component_regexp: None,
            file_format: "auto".to_string(),
            language_regex: None,
            skip_duplicates: true,
            license: None,
            license_url: None,
            vcs: None,
            push_url: None,
            push_url_same: false,
            push_on_commit: None,
            main_component: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ImportSummary {
    pub project: String,
    /// Link shared by every non-main component.
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_component: Option<String>,
    pub reused_main: bool,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub matched_files: usize,
    pub languages: Vec<String>,
}

/// Validated options with configured defaults applied.
struct Plan {
    mask: FileMask,
    matcher: ComponentMatcher,
    vcs: String,
    push_url: String,
    push_on_commit: bool,
    name_len: usize,
    slug_len: usize,
}

struct ComponentNames {
    name: String,
    template: String,
    slug: String,
}

impl Plan {
    fn names_for(&self, options: &ImportOptions, matched: &str) -> Result<ComponentNames> {
        let name = slugify::truncate_chars(
            &format_string(&options.name_template, matched),
            self.name_len,
        );
        let slug = slugify::slugify_capped(&name, self.slug_len)?;
        Ok(ComponentNames {
            template: format_string(&options.base_file_template, matched),
            name,
            slug,
        })
    }
}

struct Matches {
    files: usize,
    names: BTreeSet<String>,
    languages: BTreeSet<String>,
}

/// Substitute `%s` with `value` when the template contains it.
pub fn format_string(template: &str, value: &str) -> String {
    if template.contains("%s") {
        template.replace("%s", value)
    } else {
        template.to_string()
    }
}

pub struct Importer<'a> {
    store: &'a Store,
    registry: &'a VcsRegistry,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a Store, registry: &'a VcsRegistry) -> Self {
        Self { store, registry }
    }

    pub fn run(&self, options: &ImportOptions) -> Result<ImportSummary> {
        let plan = self.parse_options(options)?;
        let project = self.store.project(&options.project)?;

        let mut summary = ImportSummary {
            project: project.slug.clone(),
            ..Default::default()
        };

        let remaining = if component::is_repo_link(&options.repo) {
            let linked = self
                .store
                .linked_component(&options.repo)
                .map_err(|_| Error::component_not_found(&options.repo, Vec::new()))?;
            let checkout = self.store.checkout_path(&linked)?;
            let matches = self.enumerate(&checkout, &plan, options)?;
            record(&mut summary, &matches);

            summary.repo = options.repo.clone();
            summary.main_component = Some(linked.slug);
            matches.names.into_iter().collect()
        } else {
            self.import_initial(&project, &plan, options, &mut summary)?
        };

        for matched in remaining {
            let ComponentNames {
                mut name,
                template,
                mut slug,
            } = plan.names_for(options, &matched)?;

            if self.store.component_conflicts(&project.slug, &name, &slug)? {
                if options.skip_duplicates {
                    log_status!("import", "Component {} already exists, skipping", name);
                    summary.skipped.push(name);
                    continue;
                }
                (name, slug) = self.find_usable_slug(&project.slug, &name, plan.slug_len)?;
            }

            log_status!("import", "Creating component {}", name);
            let component = build_component(
                &plan,
                options,
                &project.slug,
                &matched,
                ComponentNames {
                    name,
                    template,
                    slug,
                },
                summary.repo.clone(),
                String::new(),
            );
            self.store.create_component(&component)?;
            summary.created.push(component.slug);
        }

        Ok(summary)
    }

    fn parse_options(&self, options: &ImportOptions) -> Result<Plan> {
        let custom = options
            .component_regexp
            .as_deref()
            .map(ComponentMatcher::custom)
            .transpose()?;

        if !file_format::is_supported(&options.file_format) {
            return Err(Error::validation_invalid_argument(
                "file_format",
                format!("Invalid file format: {}", options.file_format),
                Some(options.file_format.clone()),
                Some(file_format::ids().into_iter().map(String::from).collect()),
            ));
        }

        let defaults = self.store.defaults();
        let vcs = options.vcs.clone().unwrap_or(defaults.vcs);
        self.registry.get(&vcs)?;

        let mask = FileMask::parse(&options.filemask)?;
        let matcher = match custom {
            Some(matcher) => matcher,
            None => mask.matcher()?,
        };

        if let Some(pattern) = &options.language_regex {
            regex::Regex::new(pattern).map_err(|e| {
                Error::validation_invalid_argument(
                    "language_regex",
                    format!("Failed to compile regular expression \"{}\": {}", pattern, e),
                    Some(pattern.clone()),
                    None,
                )
            })?;
        }

        let push_url = if options.push_url_same {
            options.repo.clone()
        } else {
            options.push_url.clone().unwrap_or_default()
        };

        Ok(Plan {
            mask,
            matcher,
            vcs,
            push_url,
            push_on_commit: options.push_on_commit.unwrap_or(defaults.push_on_commit),
            name_len: defaults.name_max_length,
            slug_len: defaults.slug_max_length,
        })
    }

    /// Clone into a temporary checkout, pick the main component and move the
    /// checkout under its slug. Returns the names still to be created.
    fn import_initial(
        &self,
        project: &Project,
        plan: &Plan,
        options: &ImportOptions,
        summary: &mut ImportSummary,
    ) -> Result<Vec<String>> {
        let project_path = self.store.project_path(&project.slug);
        local_files::local().ensure_dir(&project_path)?;

        let workdir = tempfile::Builder::new()
            .prefix("import-")
            .tempdir_in(&project_path)
            .map_err(|e| {
                Error::internal_io(
                    e.to_string(),
                    Some(format!("create checkout in {}", project_path.display())),
                )
            })?;
        make_world_readable(workdir.path())?;

        let backend = self.registry.get(&plan.vcs)?;
        log_status!("import", "Cloning {} repository...", backend.name());
        let repository = backend.clone_repo(&options.repo, workdir.path())?;

        log_status!("import", "Updating working copy in {} repository...", backend.name());
        {
            let _lock = repository.lock()?;
            repository.configure_branch(&options.branch)?;
        }

        let matches = self.enumerate(workdir.path(), plan, options)?;
        record(summary, &matches);
        let mut names: Vec<String> = matches.names.into_iter().collect();

        let main = match &options.main_component {
            Some(requested) => {
                let pos = names.iter().position(|n| n == requested).ok_or_else(|| {
                    Error::validation_invalid_argument(
                        "main_component",
                        "Specified --main-component was not found in matches!",
                        Some(requested.clone()),
                        Some(names.clone()),
                    )
                })?;
                names.remove(pos)
            }
            None => names
                .pop()
                .ok_or_else(|| Error::internal_unexpected("No component names matched"))?,
        };

        let main_names = plan.names_for(options, &main)?;
        summary.repo = component::repo_link(&project.slug, &main_names.slug);
        summary.main_component = Some(main_names.slug.clone());

        if self.store.component_exists(&project.slug, &main_names.slug) {
            log_status!(
                "import",
                "Component {} already exists, skipping and using it as main component",
                main_names.name
            );
            summary.reused_main = true;
            return Ok(names);
        }

        log_status!("import", "Creating component {} as main one", main_names.name);
        let target = project_path.join(&main_names.slug);
        if target.exists() {
            return Err(Error::internal_io(
                "Checkout directory already exists",
                Some(target.display().to_string()),
            ));
        }
        fs::rename(workdir.path(), &target).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("move checkout to {}", target.display())))
        })?;
        let _ = workdir.into_path();

        let component = build_component(
            plan,
            options,
            &project.slug,
            &main,
            main_names,
            options.repo.clone(),
            plan.push_url.clone(),
        );
        self.store.create_component(&component)?;
        summary.created.push(component.slug);

        Ok(names)
    }

    fn enumerate(&self, root: &Path, plan: &Plan, options: &ImportOptions) -> Result<Matches> {
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&root.to_string_lossy()),
            plan.mask.glob_pattern()
        );
        let match_options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let paths = glob::glob_with(&pattern, match_options).map_err(|e| {
            Error::validation_invalid_argument(
                "filemask",
                format!("Invalid file mask: {}", e.msg),
                Some(options.filemask.clone()),
                None,
            )
        })?;

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => files.push(relative_path(root, &path)),
                Err(e) => log_status!("import", "Skipping unreadable path: {}", e),
            }
        }
        log_status!("import", "Found {} matching files", files.len());

        let details = |languages: Vec<String>| ImportDetails {
            project: options.project.clone(),
            filemask: options.filemask.clone(),
            matched_files: Some(files.len()),
            languages,
        };

        if files.is_empty() {
            return Err(Error::import_no_matches(details(Vec::new())));
        }

        let mut names = BTreeSet::new();
        let mut languages = BTreeSet::new();
        for file in &files {
            match plan.matcher.captures(file) {
                Some(found) => {
                    names.insert(found.name);
                    languages.insert(found.language);
                }
                None => log_status!("import", "Skipping {}", file),
            }
        }
        log_status!("import", "Found {} components", names.len());
        log_status!("import", "Found {} languages", languages.len());

        if self.store.known_language_count(&languages)? == 0 {
            return Err(Error::import_no_languages(details(
                languages.into_iter().collect(),
            )));
        }

        Ok(Matches {
            files: files.len(),
            names,
            languages,
        })
    }

    /// First free `"<name> NNN"` in the project, checked against names and slugs.
    fn find_usable_slug(&self, project: &str, name: &str, slug_len: usize) -> Result<(String, String)> {
        let base = slugify::truncate_chars(name, slug_len.saturating_sub(4));
        for i in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = format!("{} {:03}", base, i);
            let slug = slugify::slugify_capped(&candidate, slug_len)?;
            if !self.store.component_conflicts(project, &candidate, &slug)? {
                return Ok((candidate, slug));
            }
        }
        Err(Error::import_slug_exhausted(name, MAX_SLUG_ATTEMPTS))
    }
}

fn record(summary: &mut ImportSummary, matches: &Matches) {
    summary.matched_files = matches.files;
    summary.languages = matches.languages.iter().cloned().collect();
}

fn build_component(
    plan: &Plan,
    options: &ImportOptions,
    project: &str,
    matched: &str,
    names: ComponentNames,
    repo: String,
    push: String,
) -> Component {
    Component {
        slug: names.slug,
        name: names.name,
        project: project.to_string(),
        repo,
        push,
        branch: options.branch.clone(),
        filemask: plan.mask.for_component(matched),
        template: names.template,
        file_format: options.file_format.clone(),
        vcs: plan.vcs.clone(),
        license: options.license.clone(),
        license_url: options.license_url.clone(),
        language_regex: options.language_regex.clone(),
        push_on_commit: plan.push_on_commit,
        addons: Default::default(),
        created_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// `path` relative to `root`, `/`-separated.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn make_world_readable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("chmod {}", path.display())))
    })
}

#[cfg(not(unix))]
fn make_world_readable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::tempdir;

    #[test]
    fn format_string_substitutes_only_with_placeholder() {
        assert_eq!(format_string("%s", "docs"), "docs");
        assert_eq!(format_string("App %s", "docs"), "App docs");
        assert_eq!(format_string("Fixed", "docs"), "Fixed");
        assert_eq!(format_string("", "docs"), "");
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/data/checkout");
        let path = root.join("po").join("cs").join("docs.po");
        assert_eq!(relative_path(root, &path), "po/cs/docs.po");
    }

    fn store_with_component(name: &str, slug: &str) -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path());
        store.create_project(&Project::new("web", "Web")).unwrap();
        store
            .create_component(&Component {
                slug: slug.to_string(),
                name: name.to_string(),
                project: "web".to_string(),
                repo: "https://example.com/r.git".to_string(),
                branch: "main".to_string(),
                filemask: "po/*.po".to_string(),
                file_format: "po".to_string(),
                vcs: "git".to_string(),
                push_on_commit: true,
                ..Default::default()
            })
            .unwrap();
        (dir, store)
    }

    #[test]
    fn usable_slug_skips_taken_numbers() {
        let (_dir, store) = store_with_component("docs 001", "docs-001");
        let registry = VcsRegistry::with_defaults();
        let importer = Importer::new(&store, &registry);

        let (name, slug) = importer.find_usable_slug("web", "docs", 100).unwrap();
        assert_eq!(name, "docs 002");
        assert_eq!(slug, "docs-002");
    }

    #[test]
    fn usable_slug_gives_up_after_all_numbers_are_taken() {
        let (dir, store) = store_with_component("docs", "docs");
        for i in 1..=MAX_SLUG_ATTEMPTS {
            let path = crate::paths::component(dir.path(), "web", &format!("docs-{:03}", i));
            fs::write(path, "{}").unwrap();
        }
        let registry = VcsRegistry::with_defaults();
        let importer = Importer::new(&store, &registry);

        let err = importer.find_usable_slug("web", "docs", 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImportSlugExhausted);
        assert!(!store.component_exists("web", "docs-1000"));
        let records = fs::read_dir(crate::paths::components(dir.path(), "web"))
            .unwrap()
            .count();
        assert_eq!(records, 1 + MAX_SLUG_ATTEMPTS as usize);
    }

    #[test]
    fn usable_slug_base_leaves_room_for_suffix() {
        let (_dir, store) = store_with_component("unrelated", "unrelated");
        let registry = VcsRegistry::with_defaults();
        let importer = Importer::new(&store, &registry);

        let (name, slug) = importer.find_usable_slug("web", "abcdefghij", 8).unwrap();
        assert_eq!(name, "abcd 001");
        assert_eq!(slug, "abcd-001");
    }

    #[test]
    fn invalid_options_fail_before_project_lookup() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path());
        let registry = VcsRegistry::with_defaults();
        let importer = Importer::new(&store, &registry);

        let mut options = ImportOptions::new("missing", "https://x/r.git", "main", "po/*/**.po");
        options.file_format = "doc".to_string();
        let err = importer.run(&options).unwrap_err();
        assert_eq!(err.message, "Invalid file format: doc");

        let mut options = ImportOptions::new("missing", "https://x/r.git", "main", "po/*/**.po");
        options.vcs = Some("cvs".to_string());
        assert_eq!(importer.run(&options).unwrap_err().message, "Invalid vcs: cvs");

        let options = ImportOptions::new("missing", "https://x/r.git", "main", "po/*.po");
        assert_eq!(
            importer.run(&options).unwrap_err().code,
            ErrorCode::ValidationInvalidArgument
        );

        let options = ImportOptions::new("missing", "https://x/r.git", "main", "po/*/**.po");
        assert_eq!(importer.run(&options).unwrap_err().code, ErrorCode::ProjectNotFound);
    }
}
