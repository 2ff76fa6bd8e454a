//! Typed configuration forms for component add-ons.
//!
//! Submitted values arrive as strings. Cleaning converts them to JSON values
//! and collects every field problem before failing.

use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Addon, AddonKind};
use crate::error::{Error, FieldError, Result};
use crate::file_format;
use crate::filemask;
use crate::template::{self, Context, TemplateVars};

/// Submitted form values, mutated in place by multi-step forms.
pub type FormData = BTreeMap<String, String>;

/// Cleaned values keyed by field name.
pub type Cleaned = Map<String, Value>;

pub const REQUIRED: &str = "This field is required.";
pub const CONFIRM_REQUIRED: &str = "Please confirm matched components.";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Choice { choices: Vec<String> },
    IntegerChoice { choices: Vec<i64> },
    Integer { min: Option<i64> },
    Boolean,
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl Field {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            initial: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Convert one submitted value. Absent values fall back to `initial`.
    fn clean(&self, raw: Option<&str>) -> std::result::Result<Value, String> {
        let raw = raw.or(self.initial.as_deref()).unwrap_or_default().trim();

        if let FieldKind::Boolean = self.kind {
            return Ok(Value::Bool(parse_bool(raw)));
        }

        if raw.is_empty() {
            if self.required {
                return Err(REQUIRED.to_string());
            }
            return Ok(match self.kind {
                FieldKind::Integer { .. } | FieldKind::IntegerChoice { .. } => Value::Null,
                _ => Value::String(String::new()),
            });
        }

        match &self.kind {
            FieldKind::Text => Ok(Value::String(raw.to_string())),
            FieldKind::Choice { choices } => {
                if choices.iter().any(|c| c == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(invalid_choice(raw))
                }
            }
            FieldKind::IntegerChoice { choices } => match raw.parse::<i64>() {
                Ok(n) if choices.contains(&n) => Ok(Value::from(n)),
                _ => Err(invalid_choice(raw)),
            },
            FieldKind::Integer { min } => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| "Enter a whole number.".to_string())?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!(
                            "Ensure this value is greater than or equal to {}.",
                            min
                        ));
                    }
                }
                Ok(Value::from(n))
            }
            FieldKind::Boolean => Ok(Value::Bool(parse_bool(raw))),
        }
    }
}

fn invalid_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}

/// Checkbox semantics: anything but an explicit false value is true.
pub fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "off" | "no"
    )
}

pub fn fields(kind: AddonKind) -> Vec<Field> {
    match kind {
        AddonKind::Generate => vec![
            Field::new("filename", "Name of generated file", FieldKind::Text).required(),
            Field::new("template", "Content of generated file", FieldKind::Text).required(),
        ],
        AddonKind::GettextCustomize => vec![Field::new(
            "width",
            "Long lines wrapping",
            FieldKind::IntegerChoice {
                choices: vec![77, 65535, -1],
            },
        )
        .required()
        .initial("77")],
        AddonKind::JsonCustomize => vec![
            Field::new("sort_keys", "Sort JSON keys", FieldKind::Boolean),
            Field::new("indent", "JSON indentation", FieldKind::Integer { min: Some(0) })
                .required()
                .initial("4"),
        ],
        AddonKind::Discovery => vec![
            Field::new(
                "match",
                "Regular expression to match translation files",
                FieldKind::Text,
            )
            .required(),
            Field::new(
                "file_format",
                "File format",
                FieldKind::Choice {
                    choices: file_format::ids().into_iter().map(String::from).collect(),
                },
            )
            .required()
            .initial("auto"),
            Field::new("name_template", "Customize the component name", FieldKind::Text)
                .required()
                .initial("{{ component }}"),
            Field::new(
                "base_file_template",
                "Define the monolingual base filename",
                FieldKind::Text,
            ),
            Field::new(
                "remove",
                "Remove components for non existing files",
                FieldKind::Boolean,
            ),
            Field::new(
                "confirm",
                "Please review the above matches and confirm the selection",
                FieldKind::Boolean,
            ),
            Field::new("preview", "Preview", FieldKind::Boolean),
        ],
        AddonKind::GettextMo | AddonKind::PropertiesSort => Vec::new(),
    }
}

/// Result of the cross-field step.
#[derive(Debug, Clone, PartialEq)]
pub enum Cleaning {
    Ready(Cleaned),
    /// Discovery wants the operator to review matches first.
    Preview(Cleaned),
}

/// Field validation, then kind-specific checks, then cross-field rules.
pub fn clean(kind: AddonKind, addon: &dyn Addon, data: &mut FormData) -> Result<Cleaning> {
    let mut cleaned = Cleaned::new();
    let mut errors = Vec::new();

    for field in fields(kind) {
        match field.clean(data.get(field.name).map(String::as_str)) {
            Ok(value) => {
                cleaned.insert(field.name.to_string(), value);
            }
            Err(problem) => errors.push(FieldError {
                field: field.name.to_string(),
                problem,
            }),
        }
    }

    match kind {
        AddonKind::Generate => {
            let context = addon.sample_context()?;
            check_renders(&cleaned, &["filename", "template"], &context, &mut errors);
        }
        AddonKind::Discovery => {
            if let Some(Value::String(pattern)) = cleaned.get("match") {
                if let Err(problem) = validate_match(pattern) {
                    errors.push(FieldError {
                        field: "match".to_string(),
                        problem,
                    });
                }
            }
            let context = discovery_context("test");
            check_renders(
                &cleaned,
                &["name_template", "base_file_template"],
                &context,
                &mut errors,
            );
        }
        _ => {}
    }

    if !errors.is_empty() {
        return Err(Error::validation_multiple_errors(errors));
    }

    match kind {
        AddonKind::Discovery => confirm_preview(data, cleaned),
        _ => Ok(Cleaning::Ready(cleaned)),
    }
}

fn check_renders(
    cleaned: &Cleaned,
    names: &[&str],
    context: &Context,
    errors: &mut Vec<FieldError>,
) {
    for name in names {
        // Skip fields that already failed.
        let Some(Value::String(value)) = cleaned.get(*name) else {
            continue;
        };
        if let Err(err) = template::validate_render(value, context, name) {
            errors.push(FieldError {
                field: name.to_string(),
                problem: err.message,
            });
        }
    }
}

/// Context the discovery templates are rendered with.
pub fn discovery_context(component: &str) -> Context {
    let mut context = Context::new();
    context.insert(TemplateVars::COMPONENT.to_string(), component.to_string());
    context
}

fn validate_match(pattern: &str) -> std::result::Result<(), String> {
    let regex = RegexBuilder::new(pattern)
        .build()
        .map_err(|e| format!("Failed to compile regular expression: {}", e))?;
    filemask::require_groups(&regex, &["component", "language"]).map_err(|e| e.message)
}

/// First submission turns into a preview; the second needs `confirm`.
fn confirm_preview(data: &mut FormData, mut cleaned: Cleaned) -> Result<Cleaning> {
    let preview = cleaned.get("preview") == Some(&Value::Bool(true));
    let confirm = cleaned.get("confirm") == Some(&Value::Bool(true));

    if preview && !confirm {
        return Err(Error::validation_multiple_errors(vec![FieldError {
            field: "confirm".to_string(),
            problem: CONFIRM_REQUIRED.to_string(),
        }]));
    }

    let next_preview = !preview;
    set_flag(data, &mut cleaned, "preview", next_preview);
    set_flag(data, &mut cleaned, "confirm", false);

    if next_preview {
        Ok(Cleaning::Preview(cleaned))
    } else {
        Ok(Cleaning::Ready(cleaned))
    }
}

fn set_flag(data: &mut FormData, cleaned: &mut Cleaned, name: &str, value: bool) {
    data.insert(name.to_string(), value.to_string());
    cleaned.insert(name.to_string(), Value::Bool(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    struct Recorder {
        configured: Vec<(AddonKind, Value)>,
    }

    impl Addon for Recorder {
        fn configure(&mut self, kind: AddonKind, settings: Value) -> Result<()> {
            self.configured.push((kind, settings));
            Ok(())
        }

        fn sample_context(&self) -> Result<Context> {
            let mut context = Context::new();
            context.insert("language_code".to_string(), "cs".to_string());
            Ok(context)
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            configured: Vec::new(),
        }
    }

    fn data(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn problems(err: &Error) -> Vec<(String, String)> {
        err.field_errors()
            .into_iter()
            .map(|e| (e.field, e.problem))
            .collect()
    }

    #[test]
    fn generate_requires_both_fields() {
        let err = clean(AddonKind::Generate, &recorder(), &mut FormData::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationMultipleErrors);
        assert_eq!(
            problems(&err),
            vec![
                ("filename".to_string(), REQUIRED.to_string()),
                ("template".to_string(), REQUIRED.to_string()),
            ]
        );
    }

    #[test]
    fn generate_rejects_broken_template() {
        let mut submitted = data(&[("filename", "po/{{ language_code }}.txt"), ("template", "{{ x")]);
        let err = clean(AddonKind::Generate, &recorder(), &mut submitted).unwrap_err();
        let found = problems(&err);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "template");
    }

    #[test]
    fn gettext_width_defaults_and_choices() {
        let cleaned = clean(AddonKind::GettextCustomize, &recorder(), &mut FormData::new()).unwrap();
        assert_eq!(cleaned, Cleaning::Ready(serde_json::from_value(serde_json::json!({"width": 77})).unwrap()));

        let mut submitted = data(&[("width", "-1")]);
        assert!(clean(AddonKind::GettextCustomize, &recorder(), &mut submitted).is_ok());

        let mut submitted = data(&[("width", "80")]);
        let err = clean(AddonKind::GettextCustomize, &recorder(), &mut submitted).unwrap_err();
        assert!(problems(&err)[0].1.starts_with("Select a valid choice"));
    }

    #[test]
    fn json_indent_has_lower_bound() {
        let mut submitted = data(&[("indent", "-2"), ("sort_keys", "on")]);
        let err = clean(AddonKind::JsonCustomize, &recorder(), &mut submitted).unwrap_err();
        assert_eq!(
            problems(&err),
            vec![(
                "indent".to_string(),
                "Ensure this value is greater than or equal to 0.".to_string()
            )]
        );

        let mut submitted = data(&[("indent", "abc")]);
        let err = clean(AddonKind::JsonCustomize, &recorder(), &mut submitted).unwrap_err();
        assert_eq!(problems(&err)[0].1, "Enter a whole number.");
    }

    #[test]
    fn json_defaults() {
        let Cleaning::Ready(cleaned) =
            clean(AddonKind::JsonCustomize, &recorder(), &mut FormData::new()).unwrap()
        else {
            panic!("expected ready");
        };
        assert_eq!(cleaned["indent"], 4);
        assert_eq!(cleaned["sort_keys"], false);
    }

    #[test]
    fn discovery_match_needs_named_groups() {
        let mut submitted = data(&[("match", r"(?P<component>[^/]*)\.po")]);
        let err = clean(AddonKind::Discovery, &recorder(), &mut submitted).unwrap_err();
        assert_eq!(problems(&err)[0].0, "match");
        assert!(problems(&err)[0].1.contains("language"));
    }

    #[test]
    fn discovery_rejects_bad_name_template() {
        let mut submitted = data(&[
            ("match", r"(?P<component>[^/]*)/(?P<language>[^/]*)\.po"),
            ("name_template", "{% if %}"),
        ]);
        let err = clean(AddonKind::Discovery, &recorder(), &mut submitted).unwrap_err();
        assert_eq!(problems(&err)[0].0, "name_template");
    }

    #[test]
    fn discovery_first_submission_becomes_preview() {
        let mut submitted = data(&[("match", r"(?P<component>[^/]*)/(?P<language>[^/]*)\.po")]);
        let outcome = clean(AddonKind::Discovery, &recorder(), &mut submitted).unwrap();
        assert!(matches!(outcome, Cleaning::Preview(_)));
        assert_eq!(submitted["preview"], "true");
        assert_eq!(submitted["confirm"], "false");
    }

    #[test]
    fn discovery_preview_without_confirm_fails() {
        let mut submitted = data(&[
            ("match", r"(?P<component>[^/]*)/(?P<language>[^/]*)\.po"),
            ("preview", "true"),
        ]);
        let err = clean(AddonKind::Discovery, &recorder(), &mut submitted).unwrap_err();
        assert_eq!(
            problems(&err),
            vec![("confirm".to_string(), CONFIRM_REQUIRED.to_string())]
        );
    }

    #[test]
    fn discovery_confirmed_preview_clears_flags() {
        let mut submitted = data(&[
            ("match", r"(?P<component>[^/]*)/(?P<language>[^/]*)\.po"),
            ("preview", "true"),
            ("confirm", "true"),
        ]);
        let Cleaning::Ready(cleaned) =
            clean(AddonKind::Discovery, &recorder(), &mut submitted).unwrap()
        else {
            panic!("expected ready");
        };
        assert_eq!(submitted["preview"], "false");
        assert_eq!(submitted["confirm"], "false");
        assert_eq!(cleaned["file_format"], "auto");
        assert_eq!(cleaned["name_template"], "{{ component }}");
    }

    #[test]
    fn parse_bool_follows_checkbox_rules() {
        assert!(parse_bool("on"));
        assert!(parse_bool("True"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }
}
