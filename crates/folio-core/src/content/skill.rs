use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Skill {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    /// Self-assessed level, 0 to 100.
    #[validate(range(min = 0, max = 100))]
    pub proficiency: u8,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Document for Skill {
    const COLLECTION: &'static str = "skills";

    fn order(&self) -> i32 {
        self.order
    }
}
