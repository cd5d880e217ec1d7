// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::models::RecordKind;

/// Failures raised by a storage backend. `Store` traps these at its boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("a budget for category '{0}' already exists")]
    DuplicateBudget(String),
    #[error("could not persist {0} records")]
    Storage(RecordKind),
}
