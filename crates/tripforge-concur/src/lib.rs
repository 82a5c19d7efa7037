pub mod auth;
pub mod client;
pub mod expense;
pub mod settings;
pub mod store;
pub mod submitter;

pub use auth::{ApiAccess, ConcurAuth, CredentialProvider, TokenState};
pub use submitter::RestSubmitter;
