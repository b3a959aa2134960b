use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check_tags, schema_error, Document};

/// A work history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_experience"))]
pub struct Experience {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub position: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub start_date: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub order: i32,
}

fn validate_experience(exp: &Experience) -> Result<(), ValidationError> {
    if exp.current && exp.end_date.is_some() {
        return Err(schema_error(
            "current",
            "a current position cannot have an end date",
        ));
    }
    check_tags(&exp.technologies)
}

impl Document for Experience {
    const COLLECTION: &'static str = "experience";

    fn order(&self) -> i32 {
        self.order
    }
}
