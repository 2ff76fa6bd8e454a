//! String template rendering.
//!
//! Supports `{{ variable }}` and `{{ variable|filter }}` placeholders.
//! Block tags (`{% ... %}`) are not supported and fail to parse. Braces
//! outside a tag are literal text.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::slugify;

pub type Context = BTreeMap<String, String>;

pub struct TemplateVars;

impl TemplateVars {
    pub const COMPONENT: &'static str = "component";
    pub const PROJECT_NAME: &'static str = "project_name";
    pub const PROJECT_SLUG: &'static str = "project_slug";
    pub const COMPONENT_NAME: &'static str = "component_name";
    pub const COMPONENT_SLUG: &'static str = "component_slug";
    pub const LANGUAGE_CODE: &'static str = "language_code";
    pub const LANGUAGE_NAME: &'static str = "language_name";
    pub const FILENAME: &'static str = "filename";
    pub const STEM: &'static str = "stem";
}

const FILTERS: &[&str] = &["lower", "upper", "title", "slugify"];

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Var { name: &'a str, filters: Vec<&'a str> },
}

fn syntax_error(template: &str, problem: impl Into<String>) -> Error {
    Error::validation_invalid_argument("template", problem, Some(template.to_string()), None)
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = template;

    loop {
        let var_at = rest.find("{{");
        let tag_at = rest.find("{%");

        if let Some(tag) = tag_at {
            if var_at.map_or(true, |var| tag < var) {
                return Err(syntax_error(
                    template,
                    format!("Template block tags are not supported: {}", &rest[tag..]),
                ));
            }
        }

        let Some(start) = var_at else {
            if !rest.is_empty() {
                segments.push(Segment::Text(rest));
            }
            return Ok(segments);
        };

        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }

        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| syntax_error(template, "Unclosed variable tag, expected \"}}\""))?;
        segments.push(parse_expression(template, &after[..end])?);
        rest = &after[end + 2..];
    }
}

fn parse_expression<'a>(template: &str, expr: &'a str) -> Result<Segment<'a>> {
    let mut parts = expr.split('|').map(str::trim);
    let name = parts.next().unwrap_or_default();

    if name.is_empty() {
        return Err(syntax_error(template, "Empty variable tag"));
    }
    if !is_identifier(name) {
        return Err(syntax_error(template, format!("Invalid variable name: {}", name)));
    }

    let filters: Vec<&str> = parts.collect();
    for filter in &filters {
        if !FILTERS.contains(filter) {
            return Err(syntax_error(template, format!("Invalid filter: '{}'", filter)));
        }
    }

    Ok(Segment::Var { name, filters })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn apply_filter(value: String, filter: &str) -> String {
    match filter {
        "lower" => value.to_lowercase(),
        "upper" => value.to_uppercase(),
        "title" => title_case(&value),
        "slugify" => slugify::slugify(&value).unwrap_or_default(),
        _ => value,
    }
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Render `template`. Unknown variables render as an empty string.
pub fn render(template: &str, context: &Context) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    for segment in parse(template)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Var { name, filters } => {
                let value = context.get(name).cloned().unwrap_or_default();
                let value = filters
                    .iter()
                    .fold(value, |acc, filter| apply_filter(acc, filter));
                out.push_str(&value);
            }
        }
    }
    Ok(out)
}

/// Render `template` for `field`, reporting syntax errors against that field.
pub fn validate_render(template: &str, context: &Context, field: &str) -> Result<String> {
    render(template, context).map_err(|err| {
        Error::validation_invalid_argument(
            field,
            format!("Failed to render template: {}", err.message),
            Some(template.to_string()),
            None,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_variables_with_and_without_spaces() {
        let context = ctx(&[("component", "docs")]);
        assert_eq!(render("{{ component }}", &context).unwrap(), "docs");
        assert_eq!(render("x-{{component}}.po", &context).unwrap(), "x-docs.po");
    }

    #[test]
    fn unknown_variables_render_empty() {
        assert_eq!(render("a{{ missing }}b", &Context::new()).unwrap(), "ab");
    }

    #[test]
    fn filters_chain_left_to_right() {
        let context = ctx(&[("component", "Main Docs")]);
        assert_eq!(render("{{ component|slugify }}", &context).unwrap(), "main-docs");
        assert_eq!(render("{{ component | upper }}", &context).unwrap(), "MAIN DOCS");
        assert_eq!(render("{{ component|lower|title }}", &context).unwrap(), "Main Docs");
    }

    #[test]
    fn unclosed_tag_fails() {
        let err = render("{{ component", &Context::new()).unwrap_err();
        assert!(err.message.contains("Unclosed"));
    }

    #[test]
    fn block_tags_fail() {
        assert!(render("{% if x %}y{% endif %}", &Context::new()).is_err());
    }

    #[test]
    fn empty_and_invalid_expressions_fail() {
        assert!(render("{{ }}", &Context::new()).is_err());
        assert!(render("{{ 1abc }}", &Context::new()).is_err());
        assert!(render("{{ x|reverse }}", &Context::new()).is_err());
    }

    #[test]
    fn stray_closing_braces_are_text() {
        let context = ctx(&[("language_code", "cs")]);
        let template = r#"{"stats": {"lang": "{{ language_code }}"}}"#;
        assert_eq!(
            validate_render(template, &context, "template").unwrap(),
            r#"{"stats": {"lang": "cs"}}"#
        );
        assert_eq!(render("a }} b", &Context::new()).unwrap(), "a }} b");
    }

    #[test]
    fn validate_render_reports_field() {
        let err = validate_render("{{", &Context::new(), "filename").unwrap_err();
        assert_eq!(err.details["field"], "filename");
        assert!(err.message.starts_with("Failed to render template"));
    }
}
