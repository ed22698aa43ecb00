// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for the expense core.
//!
//! Every library operation returns [`ExpenseResult`]. The variants map onto
//! HTTP status classes through [`ExpenseError::status_code`], so a routing
//! layer never has to inspect messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Malformed, missing or out-of-range input. The message names the field.
    #[error("{0}")]
    Validation(String),

    /// No expense matches the id (and user, when scoped).
    #[error("expense not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type ExpenseResult<T> = Result<T, ExpenseError>;

impl ExpenseError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        ExpenseError::Validation(message.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ExpenseError::Validation(_) | ExpenseError::NotFound)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ExpenseError::Validation(_) => 400,
            ExpenseError::NotFound => 404,
            ExpenseError::Database(_) => 500,
        }
    }
}
