use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Document;

/// A degree, course or certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Education {
    #[validate(length(min = 1, max = 200))]
    pub institution: String,
    #[validate(length(min = 1, max = 200))]
    pub degree: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub field: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub start_date: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub end_date: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub grade: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Document for Education {
    const COLLECTION: &'static str = "education";

    fn order(&self) -> i32 {
        self.order
    }
}
