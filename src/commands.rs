// CLI front end
// Each subcommand drives one or more state container actions and renders
// the result as plain text.

use anyhow::{Context, Result};
use dialoguer::Password;
use std::io::Write;
use std::sync::Arc;

use crate::auth::{
    validate_login, validate_registration, AuthService, CredentialStore, SqliteCredentialStore,
};
use crate::config::{CategoryCommand, CategoryFields, Command, Config, ExpenseCommand};
use crate::http_client::ApiHttpClient;
use crate::models::{Category, CategoryInput, Expense, ExpenseInput};
use crate::state::{self, ActionResult, AuthState, CategoryState, ExpenseState};

/// The three containers, built once and shared by every command
pub struct App {
    pub auth: AuthState,
    pub categories: CategoryState,
    pub expenses: ExpenseState,
}

impl App {
    /// Open the credential database named in the config
    pub fn new(config: &Config) -> Result<Self> {
        let store = SqliteCredentialStore::open(&config.credentials_db_file)?;
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: &Config, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let timeout = config.request_timeout();

        let http = Arc::new(ApiHttpClient::new(
            &config.api_base_url,
            timeout,
            credentials.clone(),
        )?);
        let auth_service = AuthService::new(&config.auth_base_url, timeout, credentials.clone())?;
        tracing::debug!(
            api = %http.base_url(),
            auth = %config.auth_base_url,
            "Clients ready"
        );

        Ok(Self {
            auth: AuthState::restore(auth_service, credentials),
            categories: CategoryState::new(http.clone()),
            expenses: ExpenseState::new(http),
        })
    }

    /// Run one command, writing its output to `out`
    ///
    /// A failed action becomes an error carrying the user-facing message.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Register { login, password } => {
                let password = password_or_prompt(password, true)?;
                validate_registration(&login, &password)?;
                let profile = self.finish(self.auth.register(login.trim(), &password).await).await?;
                writeln!(out, "Registered and logged in as {} (id {})", profile.login, profile.id)?;
            }
            Command::Login { login, password } => {
                let password = password_or_prompt(password, false)?;
                validate_login(&login, &password)?;
                let profile = self.finish(self.auth.login(login.trim(), &password).await).await?;
                writeln!(out, "Logged in as {}", profile.login)?;
            }
            Command::Logout => {
                self.auth.logout().await;
                writeln!(out, "Logged out")?;
            }
            Command::Whoami => match self.auth.profile().await {
                Some(profile) => writeln!(out, "{} (id {})", profile.login, profile.id)?,
                None => writeln!(out, "Not logged in")?,
            },
            Command::Categories(command) => {
                self.require_session().await?;
                self.run_category(command, out).await?;
            }
            Command::Expenses(command) => {
                self.require_session().await?;
                self.run_expense(command, out).await?;
            }
            Command::Overview => {
                self.require_session().await?;
                self.overview(out).await?;
            }
        }
        Ok(())
    }

    async fn run_category<W: Write>(&self, command: CategoryCommand, out: &mut W) -> Result<()> {
        match command {
            CategoryCommand::List => {
                let categories = self.finish(self.categories.fetch_all().await).await?;
                if categories.is_empty() {
                    writeln!(out, "No categories")?;
                }
                for category in &categories {
                    write_category_line(out, category)?;
                }
            }
            CategoryCommand::Show { id } => {
                let category = self.finish(self.categories.fetch_one(&id).await).await?;
                write_category_line(out, &category)?;
                if let Some(description) = &category.description {
                    writeln!(out, "  {}", description)?;
                }
                for expense in category.expenses.iter().flatten() {
                    write!(out, "  ")?;
                    write_expense_line(out, expense)?;
                }
            }
            CategoryCommand::Create { name, fields } => {
                let input = apply_category_fields(CategoryInput::new(name), fields).normalized();
                input.validate()?;
                let category = self.finish(self.categories.create(&input).await).await?;
                writeln!(out, "Created category {} ({})", category.name, category.id)?;
            }
            CategoryCommand::Update { id, name, fields } => {
                let current = self.finish(self.categories.fetch_one(&id).await).await?;
                let mut input = apply_category_fields(CategoryInput::from_category(&current), fields);
                if let Some(name) = name {
                    input.name = name;
                }
                let input = input.normalized();
                input.validate()?;
                let category = self.finish(self.categories.update(&id, &input).await).await?;
                writeln!(out, "Updated category {} ({})", category.name, category.id)?;
            }
            CategoryCommand::Delete { id } => {
                self.finish(self.categories.delete(&id).await).await?;
                writeln!(out, "Deleted category {}", id)?;
            }
        }
        Ok(())
    }

    async fn run_expense<W: Write>(&self, command: ExpenseCommand, out: &mut W) -> Result<()> {
        match command {
            ExpenseCommand::List { category } => {
                let expenses = match category {
                    Some(category_id) => {
                        self.finish(self.expenses.load_by_category(&category_id).await).await?
                    }
                    None => self.finish(self.expenses.fetch_all().await).await?,
                };
                if expenses.is_empty() {
                    writeln!(out, "No expenses")?;
                }
                for expense in &expenses {
                    write_expense_line(out, expense)?;
                }
                let total: f64 = expenses.iter().map(|e| e.amount).sum();
                writeln!(out, "Total: {:.2}", total)?;
            }
            ExpenseCommand::Show { id } => {
                let expense = self.finish(self.expenses.fetch_one(&id).await).await?;
                write_expense_line(out, &expense)?;
                if let Some(description) = &expense.description {
                    writeln!(out, "  {}", description)?;
                }
            }
            ExpenseCommand::Create {
                name,
                amount,
                category,
                description,
            } => {
                let mut input = ExpenseInput::new(name, amount, category);
                input.description = description;
                let input = input.normalized();
                input.validate()?;
                let expense = self.finish(self.expenses.create(&input).await).await?;
                writeln!(out, "Created expense {} ({})", expense.name, expense.id)?;
            }
            ExpenseCommand::Update {
                id,
                name,
                amount,
                category,
                description,
            } => {
                let current = self.finish(self.expenses.fetch_one(&id).await).await?;
                let mut input = ExpenseInput::from_expense(&current);
                if let Some(name) = name {
                    input.name = name;
                }
                if let Some(amount) = amount {
                    input.amount = amount;
                }
                if let Some(category) = category {
                    input.category_id = category;
                }
                if description.is_some() {
                    input.description = description;
                }
                let input = input.normalized();
                input.validate()?;
                let expense = self.finish(self.expenses.update(&id, &input).await).await?;
                writeln!(out, "Updated expense {} ({})", expense.name, expense.id)?;
            }
            ExpenseCommand::Delete { id } => {
                self.finish(self.expenses.delete(&id).await).await?;
                writeln!(out, "Deleted expense {}", id)?;
            }
        }
        Ok(())
    }

    async fn overview<W: Write>(&self, out: &mut W) -> Result<()> {
        let (categories, expenses) = state::refresh_all(&self.categories, &self.expenses).await;
        let categories = self.finish(categories).await?;
        let expenses = self.finish(expenses).await?;

        writeln!(out, "Categories:")?;
        for category in &categories {
            write_category_line(out, category)?;
        }

        let over: Vec<&str> = categories
            .iter()
            .filter(|c| c.is_over_budget())
            .map(|c| c.name.as_str())
            .collect();
        if !over.is_empty() {
            writeln!(out, "Over budget: {}", over.join(", "))?;
        }

        writeln!(
            out,
            "{} expenses, total spent {:.2}",
            expenses.len(),
            self.expenses.total(None).await
        )?;
        Ok(())
    }

    async fn require_session(&self) -> Result<()> {
        if !self.auth.is_authenticated().await {
            anyhow::bail!("Not logged in. Run `expense-client login <login>` first.");
        }
        Ok(())
    }

    /// Turn a failed action into an error, dropping the in-memory session
    /// if the request ended it
    async fn finish<T>(&self, result: ActionResult<T>) -> Result<T> {
        match result.into_result() {
            Ok(data) => Ok(data),
            Err(message) => {
                self.auth.sync_with_store().await;
                Err(anyhow::anyhow!(message))
            }
        }
    }
}

fn apply_category_fields(mut input: CategoryInput, fields: CategoryFields) -> CategoryInput {
    if fields.icon.is_some() {
        input.icon = fields.icon;
    }
    if fields.description.is_some() {
        input.description = fields.description;
    }
    if fields.budget.is_some() {
        input.monthly_budget = fields.budget;
    }
    input
}

fn password_or_prompt(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

fn write_category_line<W: Write>(out: &mut W, category: &Category) -> Result<()> {
    let icon = category.icon.as_deref().unwrap_or("-");
    write!(
        out,
        "{}  {} {}  {:.2} / {:.2} ({:.0}%)  {} expenses",
        category.id,
        icon,
        category.name,
        category.current_spend,
        category.monthly_budget,
        category.spend_percentage(),
        category.expense_count
    )?;
    if category.is_over_budget() {
        write!(out, "  OVER BUDGET by {:.2}", category.budget_overrun())?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_expense_line<W: Write>(out: &mut W, expense: &Expense) -> Result<()> {
    let category = expense
        .category_name
        .as_deref()
        .unwrap_or(expense.category_id.as_str());
    let when = expense
        .created_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    writeln!(
        out,
        "{}  {}  {:.2}  [{}]  {}",
        expense.id, expense.name, expense.amount, category, when
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_category_fields_keeps_unset() {
        let base = CategoryInput {
            name: "Food".to_string(),
            icon: Some("🍔".to_string()),
            description: Some("meals".to_string()),
            monthly_budget: Some(100.0),
        };
        let updated = apply_category_fields(
            base.clone(),
            CategoryFields {
                budget: Some(250.0),
                ..CategoryFields::default()
            },
        );
        assert_eq!(updated.icon, base.icon);
        assert_eq!(updated.description, base.description);
        assert_eq!(updated.monthly_budget, Some(250.0));
    }

    #[test]
    fn test_write_expense_line() {
        let expense = Expense {
            id: "e1".to_string(),
            name: "Lunch".to_string(),
            description: None,
            amount: 12.5,
            category_id: "c1".to_string(),
            category_name: Some("Food".to_string()),
            created_at: Some("2025-01-12T10:30:00".to_string()),
        };
        let mut out = Vec::new();
        write_expense_line(&mut out, &expense).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "e1  Lunch  12.50  [Food]  2025-01-12 10:30\n"
        );
    }

    #[test]
    fn test_write_category_line_shows_overrun() {
        let mut category = Category {
            id: "c1".to_string(),
            name: "Food".to_string(),
            icon: None,
            description: None,
            monthly_budget: 100.0,
            current_spend: 130.5,
            expense_count: 3,
            expenses: None,
        };
        let mut out = Vec::new();
        write_category_line(&mut out, &category).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "c1  - Food  130.50 / 100.00 (100%)  3 expenses  OVER BUDGET by 30.50\n"
        );

        category.current_spend = 40.0;
        let mut out = Vec::new();
        write_category_line(&mut out, &category).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("OVER BUDGET"));
    }

    #[test]
    fn test_password_passed_through() {
        assert_eq!(password_or_prompt(Some("pw".to_string()), true).unwrap(), "pw");
    }
}
