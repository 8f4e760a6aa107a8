//! Bridge-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The selection matched no tests; front ends map this to 404
    #[error("No test cases found")]
    NoTestCasesFound,

    #[error("No test class found for name: {class_name}")]
    ClassNotFound { class_name: String },

    #[error("Method selector '{method_name}' is ambiguous: {matched_classes} classes matched, expected exactly one")]
    MethodSelectorAmbiguous {
        method_name: String,
        matched_classes: usize,
    },

    #[error("Test engine failure: {message}")]
    EngineFailure { message: String },

    #[error("Shared component error")]
    SharedError(#[from] SharedError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
