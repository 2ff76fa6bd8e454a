use clap::{Args, Subcommand};
use serde::Serialize;

use polyglot::defaults::{self, Defaults, PolyglotConfig};
use polyglot::paths;

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore polyglot.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Set a default (vcs, push_on_commit, name_max_length, slug_max_length)
    Set {
        key: String,
        value: String,
    },
    /// Show the path to polyglot.json
    Path,
}

#[derive(Debug, Default, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PolyglotConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

pub fn run(args: ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let store = global.store()?;
    let root = store.root();

    match args.command {
        ConfigCommand::Show { builtin: true } => Ok((
            ConfigOutput {
                command: "config.show".to_string(),
                defaults: Some(defaults::builtin_defaults()),
                ..Default::default()
            },
            0,
        )),
        ConfigCommand::Show { builtin: false } => Ok((
            ConfigOutput {
                command: "config.show".to_string(),
                config: Some(defaults::load_config(root)),
                ..Default::default()
            },
            0,
        )),
        ConfigCommand::Set { key, value } => {
            let mut config = defaults::load_config(root);
            defaults::set_default(&mut config.defaults, &key, &value)?;
            defaults::save_config(root, &config)?;
            Ok((
                ConfigOutput {
                    command: "config.set".to_string(),
                    config: Some(config),
                    ..Default::default()
                },
                0,
            ))
        }
        ConfigCommand::Path => Ok((
            ConfigOutput {
                command: "config.path".to_string(),
                path: Some(paths::config_json(root).display().to_string()),
                exists: Some(defaults::config_exists(root)),
                ..Default::default()
            },
            0,
        )),
    }
}
