use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Expense tracker command-line client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Primary API base URL
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_url: String,

    /// Authentication service base URL
    #[arg(long, env = "AUTH_BASE_URL", default_value = DEFAULT_AUTH_BASE_URL, global = true)]
    pub auth_url: String,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS, global = true)]
    pub http_timeout: u64,

    /// Path to the SQLite file holding the session
    #[arg(short = 'd', long, env = "CREDENTIALS_DB_FILE", global = true)]
    pub db_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an account and sign in
    Register {
        login: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in and store the session
    Login {
        login: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Manage expenses
    #[command(subcommand)]
    Expenses(ExpenseCommand),

    /// Budget usage per category and spending totals
    Overview,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CategoryCommand {
    List,
    Show {
        id: String,
    },
    Create {
        name: String,
        #[command(flatten)]
        fields: CategoryFields,
    },
    /// Change the given fields, keeping the rest
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: CategoryFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CategoryFields {
    #[arg(long)]
    pub icon: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Monthly budget
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ExpenseCommand {
    List {
        /// Only expenses of this category (filtered by the server)
        #[arg(long)]
        category: Option<String>,
    },
    Show {
        id: String,
    },
    Create {
        name: String,
        amount: f64,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the given fields, keeping the rest
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub auth_base_url: String,

    /// Milliseconds
    pub http_request_timeout: u64,

    pub credentials_db_file: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Split parsed arguments into settings and the command to run
    pub fn from_args(args: CliArgs) -> Result<(Self, Command)> {
        let credentials_db_file = match args.db_file {
            Some(path) => expand_tilde(&path),
            None => default_credentials_path()?,
        };

        let config = Config {
            api_base_url: args.api_url,
            auth_base_url: args.auth_url,
            http_request_timeout: args.http_timeout,
            credentials_db_file,
            log_level: args.log_level,
        };
        Ok((config, args.command))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.http_request_timeout)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }
        check_base_url("API_BASE_URL", &self.api_base_url)?;
        check_base_url("AUTH_BASE_URL", &self.auth_base_url)?;
        Ok(())
    }
}

fn check_base_url(name: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("{} must use http or https, got {}", name, other),
    }
}

/// `<data dir>/expense-client/credentials.sqlite3`
fn default_credentials_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .context("Cannot determine a data directory; set CREDENTIALS_DB_FILE")?;
    Ok(base.join("expense-client").join("credentials.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
