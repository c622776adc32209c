// Expense records and the create/update payload

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_text, deserialize_id, trim_optional, Identified};
use crate::error::ApiError;

/// Single expense as served by `/api/gastos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "valor")]
    pub amount: f64,

    #[serde(rename = "categoriaId", deserialize_with = "deserialize_id")]
    pub category_id: String,

    /// Denormalized by the server
    #[serde(rename = "categoriaNome", default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    /// Assigned by the server, kept verbatim
    #[serde(rename = "criadoEm", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Expense {
    /// Parse `criadoEm` (RFC 3339 or a zone-less ISO 8601 timestamp)
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

impl Identified for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /api/gastos` and `PUT /api/gastos/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "valor")]
    pub amount: f64,

    #[serde(rename = "categoriaId")]
    pub category_id: String,
}

impl ExpenseInput {
    pub fn new(name: impl Into<String>, amount: f64, category_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            amount,
            category_id: category_id.into(),
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            name: expense.name.clone(),
            description: expense.description.clone(),
            amount: expense.amount,
            category_id: expense.category_id.clone(),
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trim_optional(self.description),
            amount: self.amount,
            category_id: self.category_id.trim().to_string(),
        }
    }

    /// Form rules checked before submission
    ///
    /// Only checks that a category id is present; whether it exists is the
    /// server's call.
    pub fn validate(&self) -> Result<(), ApiError> {
        check_text("expense", &self.name, self.description.as_deref())
            .map_err(ApiError::Validation)?;

        if !self.amount.is_finite() {
            return Err(ApiError::Validation(
                "The amount is required and must be a valid number".to_string(),
            ));
        }
        if self.amount <= 0.0 {
            return Err(ApiError::Validation(
                "The amount must be greater than zero".to_string(),
            ));
        }
        if self.category_id.trim().is_empty() {
            return Err(ApiError::Validation("Select a category".to_string()));
        }

        Ok(())
    }
}
