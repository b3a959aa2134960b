use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check_tags, Document};

/// A portfolio project card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_project"))]
pub struct Project {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub long_description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub github_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

fn validate_project(project: &Project) -> Result<(), ValidationError> {
    check_tags(&project.technologies)
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn order(&self) -> i32 {
        self.order
    }
}
