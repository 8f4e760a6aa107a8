//! Shared error types for the test bridge processes

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("No test class found for name: {class_name}")]
    ClassNotFound { class_name: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
