use clap::{Args, Subcommand};
use serde::Serialize;

use polyglot::project::Project;

use super::CmdResult;

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    command: ProjectCommand,
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List all projects
    List,
    /// Show a project
    Show {
        /// Project slug
        slug: String,
    },
    /// Create a new project
    Create {
        /// Project slug
        slug: String,
        /// Human readable name
        #[arg(long)]
        name: String,
        /// Project website
        #[arg(long)]
        web: Option<String>,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct ProjectOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<Vec<Project>>,
}

pub fn run(args: ProjectArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ProjectOutput> {
    let store = global.store()?;

    match args.command {
        ProjectCommand::List => Ok((
            ProjectOutput {
                command: "project.list".to_string(),
                projects: Some(store.projects()?),
                ..Default::default()
            },
            0,
        )),
        ProjectCommand::Show { slug } => Ok((
            ProjectOutput {
                command: "project.show".to_string(),
                project: Some(store.project(&slug)?),
                ..Default::default()
            },
            0,
        )),
        ProjectCommand::Create { slug, name, web } => {
            let mut project = Project::new(slug, name);
            project.web = web;
            store.create_project(&project)?;
            Ok((
                ProjectOutput {
                    command: "project.create".to_string(),
                    project: Some(project),
                    ..Default::default()
                },
                0,
            ))
        }
    }
}
