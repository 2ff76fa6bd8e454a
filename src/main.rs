use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{addon, component, config, import, language, project};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "polyglot")]
#[command(version = VERSION)]
#[command(about = "Bulk import translation components and configure their add-ons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import components from a repository by file mask
    Import(import::ImportArgs),
    /// Manage projects
    #[command(visible_alias = "projects")]
    Project(project::ProjectArgs),
    /// Inspect components
    #[command(visible_alias = "components")]
    Component(component::ComponentArgs),
    /// Configure component add-ons
    Addon(addon::AddonArgs),
    /// Known languages
    Language(language::LanguageArgs),
    /// Manage global polyglot configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
