//! Portfolio content documents.
//!
//! Each document type maps to one collection in the [`ContentStore`](crate::store::ContentStore).
//! Validation rules are declared with `validator` derives; cross-field rules
//! live in a schema function next to the type.

pub mod education;
pub mod experience;
pub mod interest;
pub mod project;
pub mod skill;

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{CoreError, CoreResult};

pub use education::Education;
pub use experience::Experience;
pub use interest::Interest;
pub use project::Project;
pub use skill::Skill;

/// Names of every content collection, in the order the admin panel lists them.
pub const COLLECTIONS: [&str; 5] = [
    Project::COLLECTION,
    Experience::COLLECTION,
    Education::COLLECTION,
    Skill::COLLECTION,
    Interest::COLLECTION,
];

/// A content type that can be stored in a named collection.
pub trait Document: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {
    /// Collection name, also used as the URL segment.
    const COLLECTION: &'static str;

    /// Display position; lower sorts first.
    fn order(&self) -> i32;

    /// Runs the validation rules, flattening failures into one message.
    fn check(&self) -> CoreResult<()> {
        self.validate()
            .map_err(|errors| CoreError::Validation(describe(&errors)))
    }
}

/// A stored document together with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

/// Renders validation errors as `field: reason; field: reason`, sorted by field.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect(errors, None, &mut parts);
    parts.sort();
    parts.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    out.push(format!("{path}: {}", reason(err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, Some(&format!("{path}[{idx}]")), out);
                }
            }
        }
    }
}

fn reason(err: &ValidationError) -> Cow<'_, str> {
    match &err.message {
        Some(msg) => msg.clone(),
        None => Cow::Borrowed(err.code.as_ref()),
    }
}

/// Builds a schema-level error with a human readable message.
pub(crate) fn schema_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Shared rule for tag-like lists (technologies): at most 50 entries, each 1..=50 chars.
pub(crate) fn check_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > 50 {
        return Err(schema_error("technologies", "at most 50 technologies allowed"));
    }
    if tags.iter().any(|t| t.trim().is_empty() || t.chars().count() > 50) {
        return Err(schema_error(
            "technologies",
            "each technology must be 1 to 50 characters",
        ));
    }
    Ok(())
}
