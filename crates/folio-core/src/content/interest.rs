use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Interest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Document for Interest {
    const COLLECTION: &'static str = "interests";

    fn order(&self) -> i32 {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_only_passes() {
        let interest: Interest = serde_json::from_str(r#"{"title":"Chess"}"#).unwrap();
        assert!(interest.check().is_ok());
    }

    #[test]
    fn long_title_fails() {
        let interest = Interest {
            title: "x".repeat(101),
            description: None,
            icon: None,
            order: 0,
        };
        assert!(interest.check().is_err());
    }
}
