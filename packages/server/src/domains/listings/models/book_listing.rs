use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reply could not be turned into a [`BookListing`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingValidationError {
    #[error("book title must not be empty")]
    EmptyTitle,

    #[error("unknown book condition {0:?} (expected one of: like New, Excellent, Good, Fair)")]
    UnknownCondition(String),

    #[error("response does not match the listing schema: {0}")]
    Malformed(String),
}

/// Estimated physical condition of a used book.
///
/// The wire literals are fixed; `like New` keeps its lowercase `l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum BookCondition {
    #[serde(rename = "like New")]
    LikeNew,
    Excellent,
    Good,
    Fair,
}

impl BookCondition {
    pub const ALL: [BookCondition; 4] = [Self::LikeNew, Self::Excellent, Self::Good, Self::Fair];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LikeNew => "like New",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }

    /// Exact, case-sensitive match against the four literals.
    pub fn parse(value: &str) -> Result<Self, ListingValidationError> {
        Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == value)
            .ok_or_else(|| ListingValidationError::UnknownCondition(value.to_string()))
    }
}

impl fmt::Display for BookCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated listing for one used book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BookListing {
    /// Title of the book as printed on the cover
    #[serde(rename = "book_title")]
    pub title: String,

    /// Short, attractive description to help sell the book
    #[serde(rename = "book_description")]
    pub description: String,

    /// Estimated condition of the book
    #[serde(rename = "book_condition")]
    pub condition: BookCondition,
}

impl BookListing {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        condition: BookCondition,
    ) -> Result<Self, ListingValidationError> {
        let listing = Self {
            title: title.into(),
            description: description.into(),
            condition,
        };
        listing.validate()?;
        Ok(listing)
    }

    /// Parse and validate a raw model reply.
    pub fn from_json(raw: &str) -> Result<Self, ListingValidationError> {
        let value: serde_json::Value = serde_json::from_str(openai_client::strip_code_blocks(raw))
            .map_err(|e| ListingValidationError::Malformed(e.to_string()))?;

        // Report an out-of-set condition by name rather than as a serde variant error.
        if let Some(condition) = value.get("book_condition").and_then(|c| c.as_str()) {
            BookCondition::parse(condition)?;
        }

        let listing: Self = serde_json::from_value(value)
            .map_err(|e| ListingValidationError::Malformed(e.to_string()))?;
        listing.validate()?;
        Ok(listing)
    }

    fn validate(&self) -> Result<(), ListingValidationError> {
        if self.title.trim().is_empty() {
            return Err(ListingValidationError::EmptyTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openai_client::StructuredOutput;
    use serde_json::json;

    #[test]
    fn every_enumerated_condition_is_accepted() {
        for condition in BookCondition::ALL {
            assert_eq!(BookCondition::parse(condition.as_str()), Ok(condition));

            let raw = json!({
                "book_title": "Dune",
                "book_description": "Sci-fi classic",
                "book_condition": condition.as_str(),
            })
            .to_string();
            assert_eq!(BookListing::from_json(&raw).unwrap().condition, condition);
        }
    }

    #[test]
    fn other_condition_strings_are_rejected() {
        for value in ["Brand New", "like new", "Like New", "good", "", "Poor"] {
            assert_eq!(
                BookCondition::parse(value),
                Err(ListingValidationError::UnknownCondition(value.to_string())),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn brand_new_reply_is_a_condition_violation() {
        let raw = r#"{"book_title":"Dune","book_description":"Sci-fi classic...","book_condition":"Brand New"}"#;
        assert_eq!(
            BookListing::from_json(raw),
            Err(ListingValidationError::UnknownCondition("Brand New".into()))
        );
    }

    #[test]
    fn missing_or_extra_fields_are_rejected() {
        let missing = r#"{"book_title":"Dune","book_condition":"Good"}"#;
        assert!(matches!(
            BookListing::from_json(missing),
            Err(ListingValidationError::Malformed(_))
        ));

        let extra = r#"{"book_title":"Dune","book_description":"d","book_condition":"Good","price":3}"#;
        assert!(matches!(
            BookListing::from_json(extra),
            Err(ListingValidationError::Malformed(_))
        ));

        assert!(matches!(
            BookListing::from_json("not json"),
            Err(ListingValidationError::Malformed(_))
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            BookListing::new("   ", "desc", BookCondition::Fair),
            Err(ListingValidationError::EmptyTitle)
        );
        let raw = r#"{"book_title":"","book_description":"d","book_condition":"Fair"}"#;
        assert_eq!(BookListing::from_json(raw), Err(ListingValidationError::EmptyTitle));
    }

    #[test]
    fn fenced_reply_is_accepted() {
        let raw = "```json\n{\"book_title\":\"Emma\",\"book_description\":\"Austen\",\"book_condition\":\"like New\"}\n```";
        let listing = BookListing::from_json(raw).unwrap();
        assert_eq!(listing.title, "Emma");
        assert_eq!(listing.condition, BookCondition::LikeNew);
    }

    #[test]
    fn serializes_with_wire_names() {
        let listing = BookListing::new("Dune", "Sci-fi classic...", BookCondition::Good).unwrap();
        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            json!({
                "book_title": "Dune",
                "book_description": "Sci-fi classic...",
                "book_condition": "Good",
            })
        );
    }

    #[test]
    fn schema_requires_three_fields_and_enumerates_conditions() {
        let schema = BookListing::openai_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);

        let mut required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        required.sort_unstable();
        assert_eq!(required, vec!["book_condition", "book_description", "book_title"]);

        let condition = &schema["properties"]["book_condition"];
        assert_eq!(condition["type"], "string");
        assert_eq!(condition["enum"], json!(["like New", "Excellent", "Good", "Fair"]));
    }
}
