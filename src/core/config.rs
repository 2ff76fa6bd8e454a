use crate::error::Error;
use crate::local_files::{self, FileSystem};
use crate::slugify;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

// ============================================================================
// JSON Parsing Utilities
// ============================================================================

/// Parse JSON string into typed value.
pub(crate) fn from_str<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_str(s)
        .map_err(|e| Error::validation_invalid_json(e, Some("parse json".to_string())))
}

/// Serialize value to pretty-printed JSON string.
pub(crate) fn to_string_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize json".to_string())))
}

/// Read JSON spec from string, file (@path), or stdin (-).
pub fn read_json_spec_to_string(spec: &str) -> Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(Error::validation_invalid_argument(
                "json",
                "Cannot read JSON from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        stdin
            .read_to_string(&mut buf)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(Error::validation_invalid_argument(
                "json",
                "Invalid JSON spec '@' (missing file path)",
                None,
                None,
            ));
        }

        return local_files::local().read(Path::new(path));
    }

    Ok(spec.to_string())
}

// ============================================================================
// Config Entity Trait
// ============================================================================

/// A record persisted as `<dir>/<id>.json`. The id lives in the file name,
/// not in the JSON body.
pub(crate) trait ConfigEntity: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn not_found_error(id: String, suggestions: Vec<String>) -> Error;
    fn entity_type() -> &'static str;

    /// Entity-specific validation. Called by `create()` and `save()`.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.json", id))
}

pub(crate) fn load<T: ConfigEntity>(dir: &Path, id: &str) -> Result<T> {
    let path = record_path(dir, id);
    if !path.exists() {
        let suggestions = find_similar_ids(dir, id);
        return Err(T::not_found_error(id.to_string(), suggestions));
    }
    let content = local_files::local().read(&path)?;
    let mut entity: T = from_str(&content)?;
    entity.set_id(id.to_string());
    Ok(entity)
}

pub(crate) fn list<T: ConfigEntity>(dir: &Path) -> Result<Vec<T>> {
    let entries = local_files::local().list(dir)?;

    let mut items: Vec<T> = entries
        .into_iter()
        .filter(|e| e.is_json() && !e.is_dir)
        .filter_map(|e| {
            let id = e.stem()?;
            let content = local_files::local().read(&e.path).ok()?;
            let mut entity: T = from_str(&content).ok()?;
            entity.set_id(id);
            Some(entity)
        })
        .collect();
    items.sort_by(|a, b| a.id().cmp(b.id()));
    Ok(items)
}

pub(crate) fn save<T: ConfigEntity>(dir: &Path, entity: &T) -> Result<()> {
    slugify::validate_slug(entity.id())?;
    entity.validate()?;

    let content = to_string_pretty(entity)?;
    local_files::local().write(&record_path(dir, entity.id()), &content)
}

/// Validates id and entity, refuses existing ids, then saves.
pub(crate) fn create<T: ConfigEntity>(dir: &Path, entity: &T) -> Result<()> {
    slugify::validate_slug(entity.id())?;
    entity.validate()?;

    if exists(dir, entity.id()) {
        return Err(Error::validation_invalid_argument(
            format!("{}.slug", T::entity_type()),
            format!("{} '{}' already exists", T::entity_type(), entity.id()),
            Some(entity.id().to_string()),
            None,
        ));
    }

    save(dir, entity)
}

pub(crate) fn exists(dir: &Path, id: &str) -> bool {
    record_path(dir, id).exists()
}

pub(crate) fn list_ids(dir: &Path) -> Result<Vec<String>> {
    let entries = local_files::local().list(dir)?;
    let mut ids: Vec<String> = entries
        .into_iter()
        .filter(|e| e.is_json() && !e.is_dir)
        .filter_map(|e| e.stem())
        .collect();
    ids.sort();
    Ok(ids)
}

// ============================================================================
// Fuzzy Matching
// ============================================================================

/// Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Find record ids similar to the given target.
/// Uses prefix matching, suffix matching, and Levenshtein distance.
/// Returns up to 3 matches prioritized by match quality.
pub(crate) fn find_similar_ids(dir: &Path, target: &str) -> Vec<String> {
    let existing = match list_ids(dir) {
        Ok(ids) => ids,
        Err(_) => return vec![],
    };

    let target_lower = target.to_lowercase();
    let mut matches: Vec<(String, usize)> = Vec::new();

    for id in existing {
        let id_lower = id.to_lowercase();

        if id_lower.starts_with(&target_lower) && id_lower != target_lower {
            matches.push((id, 0));
            continue;
        }

        if id_lower.ends_with(&target_lower) {
            matches.push((id, 1));
            continue;
        }

        let dist = levenshtein(&target_lower, &id_lower);
        if dist <= 3 && dist > 0 {
            matches.push((id, dist + 10)); // Offset to sort after prefix/suffix
        }
    }

    matches.sort_by_key(|(_, priority)| *priority);
    matches.into_iter().take(3).map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn similar_ids_prefer_prefix_matches() {
        let dir = tempfile::tempdir().unwrap();
        let fs = local_files::local();
        for id in ["website", "web", "docs", "wbe"] {
            fs.write(&dir.path().join(format!("{}.json", id)), "{}").unwrap();
        }

        let similar = find_similar_ids(dir.path(), "web");
        assert_eq!(similar.first().map(String::as_str), Some("website"));
        assert!(similar.contains(&"wbe".to_string()));
        assert!(!similar.contains(&"docs".to_string()));
    }

    #[test]
    fn json_spec_passes_plain_strings_through() {
        assert_eq!(read_json_spec_to_string("{\"a\":1}").unwrap(), "{\"a\":1}");
        assert!(read_json_spec_to_string("@").is_err());
    }
}
