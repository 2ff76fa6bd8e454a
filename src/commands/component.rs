use clap::{Args, Subcommand};
use serde::Serialize;

use polyglot::component::Component;

use super::CmdResult;

#[derive(Args)]
pub struct ComponentArgs {
    #[command(subcommand)]
    command: ComponentCommand,
}

#[derive(Subcommand)]
enum ComponentCommand {
    /// List components of a project
    List {
        /// Project slug
        project: String,
    },
    /// Show a component
    Show {
        /// Project slug
        project: String,
        /// Component slug
        slug: String,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct ComponentOutput {
    command: String,
    project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Vec<Component>>,
    /// Resolved working copy, after following repository links.
    #[serde(skip_serializing_if = "Option::is_none")]
    checkout: Option<String>,
}

pub fn run(
    args: ComponentArgs,
    global: &crate::commands::GlobalArgs,
) -> CmdResult<ComponentOutput> {
    let store = global.store()?;

    match args.command {
        ComponentCommand::List { project } => {
            store.project(&project)?;
            let components = store.components(&project)?;
            Ok((
                ComponentOutput {
                    command: "component.list".to_string(),
                    project,
                    components: Some(components),
                    ..Default::default()
                },
                0,
            ))
        }
        ComponentCommand::Show { project, slug } => {
            let component = store.component(&project, &slug)?;
            let checkout = store.checkout_path(&component)?;
            Ok((
                ComponentOutput {
                    command: "component.show".to_string(),
                    project,
                    component: Some(component),
                    checkout: Some(checkout.display().to_string()),
                    ..Default::default()
                },
                0,
            ))
        }
    }
}
