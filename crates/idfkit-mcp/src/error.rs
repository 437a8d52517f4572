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


//! Error types for the MCP server.

use idfkit_core::IdfError;
use idfkit_sim::SimError;
use idfkit_weather::WeatherError;
use serde_json::{json, Value};
use thiserror::Error;

const ENERGYPLUS_SUGGESTION: &str =
    "Install EnergyPlus or set the ENERGYPLUS_DIR environment variable.";

/// MCP server error type.
#[derive(Error, Debug)]
pub enum McpError {
    /// Model, schema or file format error.
    #[error("{0}")]
    Idf(#[from] IdfError),

    /// EnergyPlus run or output error.
    #[error("{0}")]
    Sim(#[from] SimError),

    /// Weather station lookup or download error.
    #[error("{0}")]
    Weather(#[from] WeatherError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The session lacks something the tool needs, such as a loaded model.
    #[error("{0}")]
    Session(String),

    /// An argument value was rejected.
    #[error("{0}")]
    Value(String),
}

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// Get the MCP error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Idf(_) | Self::Sim(_) | Self::Weather(_) => -32001,
            Self::Json(_) => -32700,
            Self::Io(_) => -32002,
            Self::InvalidRequest(_) => -32600,
            Self::ToolNotFound(_) => -32601,
            Self::InvalidArguments(_) | Self::Value(_) => -32602,
            Self::Session(_) => -32003,
        }
    }

    /// Short kind label used for errors without a dedicated message.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Idf(e) => e.kind_name(),
            Self::Sim(e) => e.kind_name(),
            Self::Weather(e) => e.kind_name(),
            Self::Json(_) => "JSONError",
            Self::Io(_) => "IOError",
            Self::InvalidRequest(_) => "InvalidRequestError",
            Self::ToolNotFound(_) => "ToolNotFoundError",
            Self::InvalidArguments(_) | Self::Value(_) => "ValueError",
            Self::Session(_) => "RuntimeError",
        }
    }

    /// The `{"error": ...}` object returned to the client for this failure.
    pub fn to_error_object(&self) -> Value {
        match self {
            Self::Idf(e) => idf_error_object(e),
            Self::Sim(SimError::Idf(e)) => idf_error_object(e),
            Self::Sim(SimError::EnergyPlusNotFound(_)) => json!({
                "error": "EnergyPlus not found",
                "suggestion": ENERGYPLUS_SUGGESTION,
            }),
            Self::Sim(SimError::Simulation(msg)) => {
                json!({ "error": format!("Simulation error: {}", msg) })
            }
            Self::Sim(SimError::NotFound(msg)) | Self::Weather(WeatherError::NotFound(msg)) => {
                json!({ "error": format!("Not found: {}", msg) })
            }
            Self::Sim(e @ SimError::NoSqlOutput) => json!({ "error": e.to_string() }),
            Self::Session(msg) => json!({ "error": msg }),
            other => json!({ "error": format!("{}: {}", other.kind_name(), other.detail()) }),
        }
    }

    /// Message without the variant prefix added by `Display`.
    fn detail(&self) -> String {
        match self {
            Self::Json(e) => e.to_string(),
            Self::Io(e) => e.to_string(),
            Self::InvalidRequest(m)
            | Self::ToolNotFound(m)
            | Self::InvalidArguments(m)
            | Self::Value(m)
            | Self::Session(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

fn idf_error_object(e: &IdfError) -> Value {
    match e {
        IdfError::ValidationFailed(msg) => json!({ "error": "Validation failed", "details": msg }),
        IdfError::NotFound(msg) => json!({ "error": format!("Not found: {}", msg) }),
        IdfError::SchemaNotFound(msg) => json!({ "error": format!("Schema not found: {}", msg) }),
        IdfError::VersionNotFound(msg) => json!({ "error": format!("Version not found: {}", msg) }),
        IdfError::UnknownObjectType(msg) => {
            json!({ "error": format!("Unknown object type: {}", msg) })
        }
        IdfError::DuplicateObject(msg) => json!({ "error": format!("Duplicate object: {}", msg) }),
        other => json!({ "error": format!("{}: {}", other.kind_name(), other) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf_error_objects() {
        let err = McpError::from(IdfError::validation("bad value"));
        assert_eq!(
            err.to_error_object(),
            json!({"error": "Validation failed", "details": "bad value"})
        );

        let err = McpError::from(IdfError::unknown_type("Nope"));
        assert_eq!(
            err.to_error_object()["error"],
            "Unknown object type: 'Nope' is not a known object type"
        );

        let err = McpError::from(IdfError::duplicate("Zone 'A' already exists"));
        assert_eq!(
            err.to_error_object()["error"],
            "Duplicate object: Zone 'A' already exists"
        );

        let err = McpError::from(IdfError::VersionNotFound("8.9.0".into()));
        assert_eq!(err.to_error_object()["error"], "Version not found: 8.9.0");
    }

    #[test]
    fn test_energyplus_missing() {
        let err = McpError::from(SimError::EnergyPlusNotFound("nowhere".into()));
        let obj = err.to_error_object();
        assert_eq!(obj["error"], "EnergyPlus not found");
        assert_eq!(obj["suggestion"], ENERGYPLUS_SUGGESTION);
    }

    #[test]
    fn test_sim_errors() {
        let err = McpError::from(SimError::Simulation("exit code 1".into()));
        assert_eq!(err.to_error_object()["error"], "Simulation error: exit code 1");

        let err = McpError::from(SimError::NotFound("Variable 'X' not found".into()));
        assert_eq!(err.to_error_object()["error"], "Not found: Variable 'X' not found");

        let err = McpError::from(SimError::Idf(IdfError::not_found("gone")));
        assert_eq!(err.to_error_object()["error"], "Not found: gone");
    }

    #[test]
    fn test_session_and_fallback() {
        let err = McpError::Session("No model loaded. Use load_model or new_model first.".into());
        assert_eq!(
            err.to_error_object(),
            json!({"error": "No model loaded. Use load_model or new_model first."})
        );

        let err = McpError::Value("limit must be positive".into());
        assert_eq!(err.to_error_object()["error"], "ValueError: limit must be positive");

        let err = McpError::from(IdfError::InvalidVersion("bad".into()));
        assert_eq!(err.to_error_object()["error"], "ValueError: bad");

        let err = McpError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.to_error_object()["error"], "IOError: missing");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(McpError::ToolNotFound("x".into()).code(), -32601);
        assert_eq!(McpError::InvalidArguments("x".into()).code(), -32602);
        assert_eq!(McpError::InvalidRequest("x".into()).code(), -32600);
    }
}
