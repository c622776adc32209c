// Category records and the create/update payload

use serde::{Deserialize, Serialize};

use super::expense::Expense;
use super::{check_text, deserialize_id, null_as_default, trim_optional, Identified};
use crate::error::ApiError;

/// Spending category as served by `/api/categorias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "icone", default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "gastoMensal", default, deserialize_with = "null_as_default")]
    pub monthly_budget: f64,

    /// Computed by the server
    #[serde(rename = "gastoAtual", default, deserialize_with = "null_as_default")]
    pub current_spend: f64,

    /// Computed by the server
    #[serde(rename = "totalGastos", default, deserialize_with = "null_as_default")]
    pub expense_count: u64,

    /// Only present on single-category fetches
    #[serde(rename = "gastos", default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Expense>>,
}

impl Category {
    /// Share of the monthly budget already spent, capped at 100
    ///
    /// Zero when no budget is set.
    pub fn spend_percentage(&self) -> f64 {
        if self.monthly_budget <= 0.0 {
            return 0.0;
        }
        (self.current_spend / self.monthly_budget * 100.0).min(100.0)
    }

    pub fn is_over_budget(&self) -> bool {
        self.current_spend > self.monthly_budget
    }

    /// How far spending exceeds the budget, zero when within it
    pub fn budget_overrun(&self) -> f64 {
        (self.current_spend - self.monthly_budget).max(0.0)
    }
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of `POST /api/categorias` and `PUT /api/categorias/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "icone", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "gastoMensal", skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Form payload for editing an existing category
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            icon: category.icon.clone(),
            description: category.description.clone(),
            monthly_budget: Some(category.monthly_budget),
        }
    }

    /// Trim text fields and drop blank optional ones
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            icon: trim_optional(self.icon),
            description: trim_optional(self.description),
            monthly_budget: self.monthly_budget,
        }
    }

    /// Form rules checked before submission
    pub fn validate(&self) -> Result<(), ApiError> {
        check_text("category", &self.name, self.description.as_deref())
            .map_err(ApiError::Validation)?;

        if let Some(budget) = self.monthly_budget {
            if !budget.is_finite() {
                return Err(ApiError::Validation(
                    "The monthly budget must be a valid number".to_string(),
                ));
            }
            if budget < 0.0 {
                return Err(ApiError::Validation(
                    "The monthly budget cannot be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}
