// Wire models for the primary API
// Field names follow the backend's JSON (Portuguese), Rust names are English

pub mod category;
pub mod expense;

pub use category::{Category, CategoryInput};
pub use expense::{Expense, ExpenseInput};

use serde::{Deserialize, Deserializer};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Records that can be reconciled by id in a cached list
pub trait Identified {
    fn id(&self) -> &str;
}

/// Accept identifiers sent as either JSON strings or numbers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trim optional free text; blank becomes `None`
pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shared name/description rules for category and expense forms
pub(crate) fn check_text(
    subject: &str,
    name: &str,
    description: Option<&str>,
) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("The {} name is required", subject));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "The name must be at most {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if description.map_or(0, |d| d.chars().count()) > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "The description must be at most {} characters",
            MAX_DESCRIPTION_LENGTH
        ));
    }
    Ok(())
}
