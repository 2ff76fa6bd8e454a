//! Registry of supported translation file formats.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FileFormat {
    pub id: &'static str,
    pub name: &'static str,
}

const FORMATS: &[FileFormat] = &[
    FileFormat { id: "auto", name: "Automatic detection" },
    FileFormat { id: "po", name: "Gettext PO file" },
    FileFormat { id: "po-mono", name: "Gettext PO file (monolingual)" },
    FileFormat { id: "ts", name: "Qt Linguist Translation File" },
    FileFormat { id: "xliff", name: "XLIFF Translation File" },
    FileFormat { id: "po-xliff", name: "XLIFF Translation File with PO extensions" },
    FileFormat { id: "strings", name: "OS X Strings" },
    FileFormat { id: "strings-utf8", name: "OS X Strings (UTF-8)" },
    FileFormat { id: "properties", name: "Java Properties (ISO-8859-1)" },
    FileFormat { id: "properties-utf8", name: "Java Properties (UTF-8)" },
    FileFormat { id: "json", name: "JSON file" },
    FileFormat { id: "json-nested", name: "JSON nested structure file" },
    FileFormat { id: "webextension", name: "WebExtension JSON file" },
    FileFormat { id: "i18next", name: "i18next JSON file" },
    FileFormat { id: "aresource", name: "Android String Resource" },
    FileFormat { id: "php", name: "PHP strings" },
    FileFormat { id: "resx", name: ".Net resource file" },
    FileFormat { id: "csv", name: "CSV file" },
    FileFormat { id: "yaml", name: "YAML file" },
    FileFormat { id: "ruby-yaml", name: "Ruby YAML file" },
    FileFormat { id: "dtd", name: "DTD file" },
    FileFormat { id: "ini", name: "INI file" },
];

pub fn all() -> &'static [FileFormat] {
    FORMATS
}

pub fn get(id: &str) -> Option<&'static FileFormat> {
    FORMATS.iter().find(|format| format.id == id)
}

pub fn is_supported(id: &str) -> bool {
    get(id).is_some()
}

pub fn ids() -> Vec<&'static str> {
    FORMATS.iter().map(|format| format.id).collect()
}
