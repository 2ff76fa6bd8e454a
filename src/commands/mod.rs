use serde_json::Value;

use polyglot::addon::FormData;
use polyglot::store::Store;

pub type CmdResult<T> = polyglot::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

impl GlobalArgs {
    /// Store under `$POLYGLOT_HOME` or the default data directory.
    pub(crate) fn store(&self) -> polyglot::Result<Store> {
        Store::open_default()
    }
}

// ============================================================================
// Form Input Parsing (CLI layer)
// ============================================================================

/// Parse `key=value` pairs into form data.
fn parse_kv_pairs(pairs: &[String]) -> polyglot::Result<FormData> {
    let mut data = FormData::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            polyglot::Error::validation_invalid_argument(
                "set",
                format!("Expected key=value, got '{}'", pair),
                Some(pair.clone()),
                None,
            )
        })?;
        data.insert(key.trim().to_string(), value.to_string());
    }
    Ok(data)
}

/// Form fields are submitted as text; scalars keep their literal spelling.
fn form_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Merge a JSON object spec with `key=value` pairs. Pairs override the spec.
pub fn merge_form_sources(spec: Option<&str>, pairs: &[String]) -> polyglot::Result<FormData> {
    let mut data = FormData::new();

    if let Some(spec) = spec {
        let raw = polyglot::read_json_spec_to_string(spec)?;
        let parsed: Value = serde_json::from_str(&raw).map_err(|e| {
            polyglot::Error::validation_invalid_json(e, Some("parse JSON spec".to_string()))
        })?;
        let Value::Object(map) = parsed else {
            return Err(polyglot::Error::validation_invalid_argument(
                "json",
                "Add-on settings must be a JSON object",
                None,
                None,
            ));
        };
        for (key, value) in &map {
            if let Some(text) = form_value(value) {
                data.insert(key.clone(), text);
            }
        }
    }

    data.extend(parse_kv_pairs(pairs)?);
    Ok(data)
}

pub mod addon;
pub mod component;
pub mod config;
pub mod import;
pub mod language;
pub mod project;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (polyglot::Result<serde_json::Value>, i32) {
    crate::tty::status("polyglot is working...");

    match command {
        crate::Commands::Import(args) => dispatch!(args, global, import),
        crate::Commands::Project(args) => dispatch!(args, global, project),
        crate::Commands::Component(args) => dispatch!(args, global, component),
        crate::Commands::Addon(args) => dispatch!(args, global, addon),
        crate::Commands::Language(args) => dispatch!(args, global, language),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_override_json_spec() {
        let data = merge_form_sources(
            Some(r#"{"indent": 4, "sort_keys": true, "skip": null}"#),
            &["indent=2".to_string()],
        )
        .unwrap();
        assert_eq!(data["indent"], "2");
        assert_eq!(data["sort_keys"], "true");
        assert!(!data.contains_key("skip"));
    }

    #[test]
    fn pair_without_equals_is_rejected() {
        assert!(merge_form_sources(None, &["indent".to_string()]).is_err());
    }

    #[test]
    fn value_may_contain_equals() {
        let data = merge_form_sources(None, &["match=(?P<x>a=b)".to_string()]).unwrap();
        assert_eq!(data["match"], "(?P<x>a=b)");
    }

    #[test]
    fn non_object_spec_is_rejected() {
        assert!(merge_form_sources(Some("[1,2]"), &[]).is_err());
    }
}
