use clap::{Args, Subcommand};
use serde::Serialize;

use polyglot::language::Language;

use super::CmdResult;

#[derive(Args)]
pub struct LanguageArgs {
    #[command(subcommand)]
    command: LanguageCommand,
}

#[derive(Subcommand)]
enum LanguageCommand {
    /// List known languages
    List,
}

#[derive(Debug, Serialize)]
pub struct LanguageOutput {
    command: String,
    /// True when the list comes from languages.json.
    custom: bool,
    languages: Vec<Language>,
}

pub fn run(args: LanguageArgs, global: &crate::commands::GlobalArgs) -> CmdResult<LanguageOutput> {
    let store = global.store()?;

    match args.command {
        LanguageCommand::List => Ok((
            LanguageOutput {
                command: "language.list".to_string(),
                custom: polyglot::paths::languages_json(store.root()).exists(),
                languages: store.languages()?,
            },
            0,
        )),
    }
}
