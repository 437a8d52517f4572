// Dweve idfkit - EnergyPlus Model Toolkit
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the idfkit object model.

use thiserror::Error;

/// An error raised while loading, editing or writing a model.
#[derive(Debug, Error)]
pub enum IdfError {
    /// An object or collection could not be found.
    #[error("{0}")]
    NotFound(String),

    /// An object with the same name already exists, or a unique type
    /// already has an instance.
    #[error("{0}")]
    DuplicateObject(String),

    /// Field values were rejected by the schema.
    #[error("{0}")]
    ValidationFailed(String),

    /// The object type is not part of the schema.
    #[error("{0}")]
    UnknownObjectType(String),

    /// A schema file exists but could not be read or parsed.
    #[error("{0}")]
    SchemaNotFound(String),

    /// No schema is available for the requested version.
    #[error("{0}")]
    VersionNotFound(String),

    /// A malformed version string.
    #[error("{0}")]
    InvalidVersion(String),

    /// Syntax error in an IDF or epJSON input.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl IdfError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::DuplicateObject(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    pub fn unknown_type(obj_type: &str) -> Self {
        Self::UnknownObjectType(format!("'{}' is not a known object type", obj_type))
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Short kind label, e.g. `ValueError`, used when an error has no
    /// dedicated presentation.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFoundError",
            Self::DuplicateObject(_) => "DuplicateObjectError",
            Self::ValidationFailed(_) => "ValidationFailedError",
            Self::UnknownObjectType(_) => "UnknownObjectTypeError",
            Self::SchemaNotFound(_) => "SchemaNotFoundError",
            Self::VersionNotFound(_) => "VersionNotFoundError",
            Self::InvalidVersion(_) => "ValueError",
            Self::Parse { .. } => "ParseError",
            Self::Io(_) => "IOError",
            Self::Json(_) => "JSONError",
        }
    }
}

/// Result type for idfkit operations.
pub type IdfResult<T> = Result<T, IdfError>;
