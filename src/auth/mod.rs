// Authentication module
// Session credentials, their storage, and the auth service client

mod credentials;
mod service;
mod types;

pub use credentials::{
    CredentialStore, MemoryCredentialStore, SqliteCredentialStore, PROFILE_KEY, TOKEN_KEY,
};
pub use service::AuthService;
pub use types::{validate_login, validate_registration, Profile};
