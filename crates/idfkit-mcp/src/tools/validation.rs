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


//! Validation tools.

use crate::error::McpResult;
use crate::serializers::serialize_validation_result;
use crate::session::Session;
use crate::tools::helpers::parse_args;
use crate::tools::types::ValidateModelArgs;
use idfkit_validate::{validate_document, ValidationConfig};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// Execute validate_model tool.
pub fn execute_validate_model(args: Option<JsonValue>, session: &Session) -> McpResult<JsonValue> {
    let args: ValidateModelArgs = parse_args(args)?;
    let doc = session.require_model()?;

    let mut config = ValidationConfig::default().with_check_references(args.check_references);
    if let Some(types) = args.object_types {
        config = config.with_object_types(types);
    }
    let result = validate_document(doc, &config);
    debug!(
        "Validation: {} errors, {} warnings",
        result.errors.len(),
        result.warnings.len()
    );

    Ok(serialize_validation_result(&result))
}

/// Execute check_references tool.
pub fn execute_check_references(session: &Session) -> McpResult<JsonValue> {
    let doc = session.require_model()?;
    let dangling: Vec<JsonValue> = doc
        .dangling_references(&doc.valid_names())
        .into_iter()
        .map(|d| {
            json!({
                "source_type": d.obj_type,
                "source_name": d.obj_name,
                "field": d.field,
                "missing_target": d.target,
            })
        })
        .collect();

    Ok(json!({ "dangling_count": dangling.len(), "dangling_references": dangling }))
}
