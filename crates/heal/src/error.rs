// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Errors produced by the heal engine and by the storage collaborators it drives.
///
/// Only [`Error::Cancelled`] aborts an erasure set pass. Not-found errors are
/// expected races between listing and healing and are never counted as failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Other error: {0}")]
    Other(String),

    #[error("Heal sequence cancelled")]
    Cancelled,

    #[error("Object not found: {bucket}/{object}")]
    ObjectNotFound { bucket: String, object: String },

    #[error("Version not found: {bucket}/{object} ({version_id})")]
    VersionNotFound {
        bucket: String,
        object: String,
        version_id: String,
    },

    #[error("Disk unavailable: {endpoint}: {message}")]
    DiskUnavailable { endpoint: String, message: String },

    #[error("Heal task failed: {message}")]
    HealTaskFailed { message: String },

    #[error("skip file")]
    SkipFile,

    #[error("Heal sequence not found: {client_token}")]
    SequenceNotFound { client_token: String },
}

/// A specialized Result type for heal operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create an Other error from any error type
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Other(error.into().to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Object or version vanished between listing and healing.
    pub fn is_not_found(&self) -> bool {
        is_err_object_not_found(self) || is_err_version_not_found(self)
    }
}

pub fn is_err_object_not_found(err: &Error) -> bool {
    matches!(err, Error::ObjectNotFound { .. })
}

pub fn is_err_version_not_found(err: &Error) -> bool {
    matches!(err, Error::VersionNotFound { .. })
}
