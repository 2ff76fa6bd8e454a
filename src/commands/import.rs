use clap::Args;

use polyglot::import::{ImportOptions, ImportSummary, Importer, DEFAULT_NAME_TEMPLATE};
use polyglot::vcs::VcsRegistry;

use super::CmdResult;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Existing project slug
    pub project: String,
    /// VCS repository URL, or polyglot://project/component to reuse a checkout
    pub repo: String,
    /// VCS repository branch
    pub branch: String,
    /// File mask, `**` marks the component name and `*` the language
    pub filemask: String,

    /// Name template for new components, `%s` is replaced by the match
    #[arg(long, default_value = DEFAULT_NAME_TEMPLATE)]
    pub name_template: String,

    /// Regular expression with `name` and `language` groups used instead of the mask
    #[arg(long, value_name = "REGEX")]
    pub component_regexp: Option<String>,

    /// Base file template for monolingual formats, `%s` is replaced by the match
    #[arg(long, default_value = "")]
    pub base_file_template: String,

    /// File format id
    #[arg(long, default_value = "auto")]
    pub file_format: String,

    /// Language filter regular expression
    #[arg(long, value_name = "REGEX")]
    pub language_regex: Option<String>,

    /// Rename duplicate components instead of skipping them
    #[arg(long)]
    pub no_skip_duplicates: bool,

    #[arg(long)]
    pub license: Option<String>,

    #[arg(long)]
    pub license_url: Option<String>,

    /// Version control system (default from config)
    #[arg(long)]
    pub vcs: Option<String>,

    /// Push URL for the main component
    #[arg(long, conflicts_with = "push_url_same")]
    pub push_url: Option<String>,

    /// Use the repository URL as push URL
    #[arg(long)]
    pub push_url_same: bool,

    /// Push changes on every commit (default from config)
    #[arg(long, overrides_with = "disable_push_on_commit")]
    pub push_on_commit: bool,

    /// Do not push changes on commit
    #[arg(long)]
    pub disable_push_on_commit: bool,

    /// Match used as the component owning the checkout
    #[arg(long)]
    pub main_component: Option<String>,
}

impl ImportArgs {
    fn push_on_commit(&self) -> Option<bool> {
        if self.disable_push_on_commit {
            Some(false)
        } else if self.push_on_commit {
            Some(true)
        } else {
            None
        }
    }

    fn into_options(self) -> ImportOptions {
        let push_on_commit = self.push_on_commit();
        let mut options = ImportOptions::new(self.project, self.repo, self.branch, self.filemask);
        options.name_template = self.name_template;
        options.component_regexp = self.component_regexp;
        options.base_file_template = self.base_file_template;
        options.file_format = self.file_format;
        options.language_regex = self.language_regex;
        options.skip_duplicates = !self.no_skip_duplicates;
        options.license = self.license;
        options.license_url = self.license_url;
        options.vcs = self.vcs;
        options.push_url = self.push_url;
        options.push_url_same = self.push_url_same;
        options.push_on_commit = push_on_commit;
        options.main_component = self.main_component;
        options
    }
}

pub fn run(args: ImportArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ImportSummary> {
    let store = global.store()?;
    let registry = VcsRegistry::with_defaults();
    let summary = Importer::new(&store, &registry).run(&args.into_options())?;
    Ok((summary, 0))
}
