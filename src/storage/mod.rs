pub mod json_backend;

pub use json_backend::JsonStorage;

use crate::errors::AccountError;

pub type Result<T> = std::result::Result<T, AccountError>;
