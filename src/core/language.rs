//! Reference list of known language codes.
//!
//! The importer only uses it as a sanity check: at least one language token
//! derived from the file mask has to be a known code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config;
use crate::error::Result;
use crate::local_files::{self, FileSystem};
use crate::paths;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

const BUILTIN: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("en_GB", "English (United Kingdom)"),
    ("eo", "Esperanto"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("nb_NO", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("pt_BR", "Portuguese (Brazil)"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh_Hans", "Chinese (Simplified)"),
    ("zh_Hant", "Chinese (Traditional)"),
];

pub fn builtin() -> Vec<Language> {
    BUILTIN
        .iter()
        .map(|(code, name)| Language {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Known languages: `languages.json` under the data root when present,
/// otherwise the built-in list.
pub fn load(root: &Path) -> Result<Vec<Language>> {
    let path = paths::languages_json(root);
    if !path.exists() {
        return Ok(builtin());
    }
    let content = local_files::local().read(&path)?;
    config::from_str(&content)
}

/// How many of `codes` are known languages.
pub fn count_known(known: &[Language], codes: &BTreeSet<String>) -> usize {
    known.iter().filter(|l| codes.contains(&l.code)).count()
}
