//! The module contains the errors the engine can throw.
//!
//! - [`KeyNotFound`] thrown when a row the caller relies on is missing.
//! - [`InvalidValue`] thrown when user supplied data does not pass validation.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidValue`]: EngineError::InvalidValue
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("{0}")]
    InvalidValue(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
