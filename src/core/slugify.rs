use unicode_normalization::UnicodeNormalization;

use crate::error::Error;
use crate::Result;

/// Derive a URL slug from a display name.
///
/// Accented letters are folded to ASCII through NFKD decomposition. ASCII
/// letters are lowercased, digits and `_` are kept, whitespace and `-` runs
/// collapse into a single `-`, everything else is dropped.
///
/// Fails when nothing survives, e.g. for names written only in non-Latin
/// scripts. An import stops at the first such component name.
pub fn slugify(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut prev_was_dash = false;

    for ch in trimmed.nfkd() {
        let normalized = match ch {
            'a'..='z' | '0'..='9' | '_' => Some(ch),
            'A'..='Z' => Some(ch.to_ascii_lowercase()),
            _ if ch.is_whitespace() || ch == '-' => Some('-'),
            _ => None,
        };

        if let Some(c) = normalized {
            if c == '-' {
                if out.is_empty() || prev_was_dash {
                    continue;
                }
                out.push('-');
                prev_was_dash = true;
            } else {
                out.push(c);
                prev_was_dash = false;
            }
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    if out.is_empty() {
        return Err(Error::validation_invalid_argument(
            "slug",
            format!("Cannot derive a slug from \"{}\"", value),
            Some(value.to_string()),
            None,
        ));
    }

    Ok(out)
}

/// Cap a string at `max` characters without splitting a character.
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Slugify and cap, trimming a dangling separator left by the cut.
pub fn slugify_capped(value: &str, max: usize) -> Result<String> {
    let slug = truncate_chars(&slugify(value)?, max);
    Ok(slug.trim_end_matches('-').to_string())
}

pub(crate) fn validate_slug(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation_invalid_argument(
            "slug",
            "Slug cannot be empty",
            None,
            None,
        ));
    }

    if id
        .chars()
        .any(|c| c.is_control() || c == '/' || c == '\\' || c == '.')
    {
        return Err(Error::validation_invalid_argument(
            "slug",
            "Slug contains invalid characters",
            Some(id.to_string()),
            None,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_name() {
        assert_eq!(slugify("My Component").unwrap(), "my-component");
    }

    #[test]
    fn slugify_keeps_numbers_and_underscores() {
        assert_eq!(slugify("help_pages v2").unwrap(), "help_pages-v2");
    }

    #[test]
    fn slugify_numbered_duplicate() {
        assert_eq!(slugify("Docs 001").unwrap(), "docs-001");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("foo -- bar").unwrap(), "foo-bar");
    }

    #[test]
    fn slugify_strips_special_chars() {
        assert_eq!(slugify("Hello! @World#").unwrap(), "hello-world");
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Čeština").unwrap(), "cestina");
        assert_eq!(slugify("Über Größe").unwrap(), "uber-groe");
        assert_eq!(slugify("ﬁle №1").unwrap(), "file-no1");
    }

    #[test]
    fn slugify_non_latin_fails() {
        assert!(slugify("日本語").is_err());
    }

    #[test]
    fn slugify_only_special_fails() {
        assert!(slugify("!@#$%").is_err());
        assert!(slugify("   ").is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("žluťoučký", 3), "žlu");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn capped_slug_drops_trailing_dash() {
        assert_eq!(slugify_capped("abc def", 4).unwrap(), "abc");
    }

    #[test]
    fn validate_slug_rejects_path_chars() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("foo/bar").is_err());
        assert!(validate_slug("..").is_err());
        assert!(validate_slug("po-files").is_ok());
    }
}
