use crate::config::ConfigEntity;
use crate::error::{Error, Result};
use crate::validation;
use serde::{Deserialize, Serialize};

/// Named container of components, identified by its slug.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Project {
    #[serde(default)]
    pub slug: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Project {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            web: None,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

impl ConfigEntity for Project {
    fn id(&self) -> &str {
        &self.slug
    }
    fn set_id(&mut self, id: String) {
        self.slug = id;
    }
    fn not_found_error(id: String, suggestions: Vec<String>) -> Error {
        Error::project_not_found(id, suggestions)
    }
    fn entity_type() -> &'static str {
        "project"
    }

    fn validate(&self) -> Result<()> {
        validation::require_non_empty(&self.name, "name", "Project name cannot be empty")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        let project = Project::new("web", "  ");
        assert!(project.validate().is_err());
    }

    #[test]
    fn serialized_form_omits_missing_web() {
        let project = Project::new("web", "Website");
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["slug"], "web");
        assert!(json.get("web").is_none());
    }
}
