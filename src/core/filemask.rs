//! File mask to regular expression translation.
//!
//! A file mask is a shell glob in which `**` marks the component name and
//! every single `*` marks the language code, e.g.
//! `locale/*/LC_MESSAGES/**.po`. Every `*` after the first must capture
//! the same text as the first one, so masks compile to a backtracking
//! expression with a `language` back-reference.

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

const NAME_GROUP: &str = "name";
const LANGUAGE_GROUP: &str = "language";

/// A validated file mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMask {
    raw: String,
}

impl FileMask {
    /// Accepts masks with exactly one `**` and at least one other `*`.
    pub fn parse(mask: &str) -> Result<Self> {
        let runs = star_runs(mask);
        let doubles = runs.iter().filter(|&&n| n == 2).count();
        let singles = runs.iter().filter(|&&n| n == 1).count();

        if runs.iter().any(|&n| n > 2) || doubles != 1 || singles == 0 {
            return Err(Error::validation_invalid_argument(
                "filemask",
                "You need to specify double wildcard for component part of the match!",
                Some(mask.to_string()),
                None,
            ));
        }

        Ok(Self {
            raw: mask.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Pattern for filesystem globbing. `**` only spans one path segment,
    /// the same as a single `*`.
    pub fn glob_pattern(&self) -> String {
        self.raw.replace("**", "*")
    }

    /// The mask a created component is bound to.
    pub fn for_component(&self, name: &str) -> String {
        self.raw.replace("**", name)
    }

    /// Regular expression source with `name` and `language` groups.
    pub fn regex_source(&self) -> String {
        translate(&self.raw)
    }

    pub fn matcher(&self) -> Result<ComponentMatcher> {
        let source = self.regex_source();
        let regex = fancy_regex::Regex::new(&source).map_err(|e| {
            Error::validation_invalid_argument(
                "filemask",
                format!("Failed to translate file mask \"{}\": {}", self.raw, e),
                Some(self.raw.clone()),
                None,
            )
        })?;
        Ok(ComponentMatcher {
            engine: Engine::Mask(regex),
        })
    }
}

/// Lengths of consecutive `*` runs, in order of appearance.
fn star_runs(mask: &str) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0;
    for ch in mask.chars() {
        if ch == '*' {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

/// Glob to regex, one token at a time.
///
/// `**` becomes the `name` group, the first `*` the `language` group and
/// every later `*` a back-reference to `language`.
fn translate(mask: &str) -> String {
    let chars: Vec<char> = mask.chars().collect();
    let mut out = String::from(r"(?s)\A");
    let mut language_seen = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        i += 1;
        match ch {
            '*' => {
                let mut run = 1;
                while i < chars.len() && chars[i] == '*' {
                    run += 1;
                    i += 1;
                }
                if run >= 2 {
                    out.push_str(&format!("(?P<{}>.*)", NAME_GROUP));
                } else if !language_seen {
                    out.push_str(&format!("(?P<{}>.*)", LANGUAGE_GROUP));
                    language_seen = true;
                } else {
                    out.push_str(&format!(r"\k<{}>", LANGUAGE_GROUP));
                }
            }
            '?' => out.push('.'),
            '[' => match bracket_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            _ => push_literal(&mut out, ch),
        }
    }

    out.push_str(r"\z");
    out
}

fn push_literal(out: &mut String, ch: char) {
    if r"\.+*?()|[]{}^$".contains(ch) {
        out.push('\\');
    }
    out.push(ch);
}

/// Index of the `]` closing a bracket expression starting at `start`
/// (just after the `[`). A leading `!` and a leading `]` are literal.
fn bracket_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = body;
    if let Some(('!', tail)) = rest.split_first() {
        out.push('^');
        rest = tail;
    } else if let Some(('^', tail)) = rest.split_first() {
        out.push_str(r"\^");
        rest = tail;
    }
    for &ch in rest {
        match ch {
            // Nested classes and set operators in the regex crate.
            '\\' | '[' | ']' | '&' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push(']');
    out
}

/// Component name and language code derived from a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskMatch {
    pub name: String,
    pub language: String,
}

/// Compiled matcher for relative, `/`-separated paths.
#[derive(Debug, Clone)]
pub struct ComponentMatcher {
    engine: Engine,
}

#[derive(Debug, Clone)]
enum Engine {
    /// Translated file mask, anchored at both ends.
    Mask(fancy_regex::Regex),
    /// Operator expression, anchored at the start only.
    Custom(Regex),
}

impl ComponentMatcher {
    /// Operator-supplied expression with `name` and `language` groups.
    ///
    /// Compiled multi-line with `.` matching newlines, and matched from the
    /// start of the path only.
    pub fn custom(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| {
                Error::validation_invalid_argument(
                    "component_regexp",
                    format!("Failed to compile regular expression \"{}\": {}", pattern, e),
                    Some(pattern.to_string()),
                    None,
                )
            })?;

        require_groups(&regex, &[NAME_GROUP, LANGUAGE_GROUP]).map_err(|_| {
            Error::validation_invalid_argument(
                "component_regexp",
                "Component regular expression lacks named group \"name\" and/or \"language\"",
                Some(pattern.to_string()),
                None,
            )
        })?;

        Ok(Self {
            engine: Engine::Custom(regex),
        })
    }

    pub fn as_str(&self) -> &str {
        match &self.engine {
            Engine::Mask(regex) => regex.as_str(),
            Engine::Custom(regex) => regex.as_str(),
        }
    }

    /// Name and language of `path`, or `None` when the path does not match.
    pub fn captures(&self, path: &str) -> Option<MaskMatch> {
        let (name, language) = match &self.engine {
            Engine::Mask(regex) => {
                // Backtracking limit exhaustion counts as no match.
                let caps = regex.captures(path).ok()??;
                (
                    caps.name(NAME_GROUP)?.as_str(),
                    caps.name(LANGUAGE_GROUP)?.as_str(),
                )
            }
            Engine::Custom(regex) => {
                let caps = regex.captures(path)?;
                if caps.get(0)?.start() != 0 {
                    return None;
                }
                (
                    caps.name(NAME_GROUP)?.as_str(),
                    caps.name(LANGUAGE_GROUP)?.as_str(),
                )
            }
        };

        Some(MaskMatch {
            name: name.to_string(),
            language: language.to_string(),
        })
    }
}

/// Error naming the first group missing from `regex`.
pub fn require_groups(regex: &Regex, groups: &[&str]) -> Result<()> {
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    for group in groups {
        if !names.contains(group) {
            return Err(Error::validation_invalid_argument(
                "regex",
                format!("Regular expression is missing named group: {}", group),
                Some(regex.as_str().to_string()),
                None,
            ));
        }
    }
    Ok(())
}
