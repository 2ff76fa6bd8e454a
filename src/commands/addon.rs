use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use polyglot::addon::{self, AddonKind, ComponentAddon, DiscoveredComponent, Field, FormOutcome};

use super::CmdResult;

#[derive(Args)]
pub struct AddonArgs {
    #[command(subcommand)]
    command: AddonCommand,
}

#[derive(Subcommand)]
enum AddonCommand {
    /// List add-ons and their settings
    List,
    /// Validate settings and store them on a component
    Configure {
        /// Project slug
        project: String,
        /// Component slug
        component: String,
        /// Add-on id (e.g. json.customize, discovery)
        addon: String,
        /// Settings as a JSON object (supports @file and - for stdin)
        #[arg(long, value_name = "JSON")]
        json: Option<String>,
        /// Single setting as key=value (repeatable, overrides --json)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Confirm the components matched by a discovery preview
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct AddonListItem {
    id: &'static str,
    name: &'static str,
    fields: Vec<Field>,
}

#[derive(Debug, Default, Serialize)]
pub struct AddonOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    addons: Option<Vec<AddonListItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    addon: Option<AddonKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<Value>,
    /// Components a discovery preview matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<Vec<DiscoveredComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

pub fn run(args: AddonArgs, global: &crate::commands::GlobalArgs) -> CmdResult<AddonOutput> {
    match args.command {
        AddonCommand::List => Ok((
            AddonOutput {
                command: "addon.list".to_string(),
                addons: Some(
                    AddonKind::ALL
                        .iter()
                        .map(|kind| AddonListItem {
                            id: kind.id(),
                            name: kind.name(),
                            fields: addon::forms::fields(*kind),
                        })
                        .collect(),
                ),
                ..Default::default()
            },
            0,
        )),
        AddonCommand::Configure {
            project,
            component,
            addon,
            json,
            set,
            confirm,
        } => {
            let kind = AddonKind::parse(&addon)?;
            let mut data = super::merge_form_sources(json.as_deref(), &set)?;
            if confirm {
                data.insert("preview".to_string(), "true".to_string());
                data.insert("confirm".to_string(), "true".to_string());
            }

            let store = global.store()?;
            let record = store.component(&project, &component)?;
            let checkout = store.checkout_path(&record)?;
            let mut acceptor = ComponentAddon::new(&store, record);

            match addon::submit(kind, &mut acceptor, &mut data)? {
                FormOutcome::Saved(settings) => Ok((
                    AddonOutput {
                        command: "addon.configure".to_string(),
                        addon: Some(kind),
                        component: Some(acceptor.component().link()),
                        saved: Some(true),
                        settings: Some(settings),
                        ..Default::default()
                    },
                    0,
                )),
                FormOutcome::Preview(settings) => {
                    let text = |key: &str| {
                        settings
                            .get(key)
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    };
                    let matches = if checkout.is_dir() {
                        addon::discovery_preview(
                            &checkout,
                            &text("match"),
                            &text("name_template"),
                            &text("base_file_template"),
                        )?
                    } else {
                        Vec::new()
                    };
                    Ok((
                        AddonOutput {
                            command: "addon.configure".to_string(),
                            addon: Some(kind),
                            component: Some(acceptor.component().link()),
                            saved: Some(false),
                            settings: Some(settings),
                            matches: Some(matches),
                            hint: Some(
                                "Review the matched components and re-run with --confirm"
                                    .to_string(),
                            ),
                            ..Default::default()
                        },
                        0,
                    ))
                }
            }
        }
    }
}
