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


//! Declarative macros for tool input schemas.
//!
//! # Examples
//!
//! ```text
//! let schema = tool_schema! {
//!     required: ["object_type"],
//!     properties: {
//!         object_type: schema_string!("EnergyPlus object type, e.g. 'Zone'"),
//!         limit: limit_arg!(50)
//!     }
//! };
//! ```

/// A `string` property.
#[macro_export]
macro_rules! schema_string {
    ($description:expr) => {
        serde_json::json!({
            "type": "string",
            "description": $description
        })
    };
    ($description:expr, default: $default:expr) => {
        serde_json::json!({
            "type": "string",
            "description": $description,
            "default": $default
        })
    };
}

/// A `boolean` property.
#[macro_export]
macro_rules! schema_bool {
    ($description:expr) => {
        serde_json::json!({
            "type": "boolean",
            "description": $description
        })
    };
    ($description:expr, default: $default:expr) => {
        serde_json::json!({
            "type": "boolean",
            "description": $description,
            "default": $default
        })
    };
}

/// An `integer` property.
#[macro_export]
macro_rules! schema_integer {
    ($description:expr) => {
        serde_json::json!({
            "type": "integer",
            "description": $description
        })
    };
    ($description:expr, default: $default:expr) => {
        serde_json::json!({
            "type": "integer",
            "description": $description,
            "default": $default,
            "minimum": 0
        })
    };
}

/// A `number` property with an inclusive range.
#[macro_export]
macro_rules! schema_number {
    ($description:expr, minimum: $min:expr, maximum: $max:expr) => {
        serde_json::json!({
            "type": "number",
            "description": $description,
            "minimum": $min,
            "maximum": $max
        })
    };
}

/// A `string` property restricted to fixed values.
#[macro_export]
macro_rules! schema_enum {
    ([$($variant:expr),+ $(,)?], $description:expr) => {
        serde_json::json!({
            "type": "string",
            "enum": [$($variant),+],
            "description": $description
        })
    };
    ([$($variant:expr),+ $(,)?], $description:expr, default: $default:expr) => {
        serde_json::json!({
            "type": "string",
            "enum": [$($variant),+],
            "description": $description,
            "default": $default
        })
    };
}

/// An array of strings.
#[macro_export]
macro_rules! schema_string_array {
    ($description:expr) => {
        serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": $description
        })
    };
}

/// A free-form object, e.g. field values keyed by field name.
#[macro_export]
macro_rules! schema_object {
    ($description:expr) => {
        serde_json::json!({
            "type": "object",
            "description": $description,
            "additionalProperties": true
        })
    };
}

/// An array of objects with the given item properties.
#[macro_export]
macro_rules! schema_object_array {
    (
        $description:expr,
        required: [$($req:expr),* $(,)?],
        properties: {
            $($field:ident: $schema:expr),+ $(,)?
        }
    ) => {
        serde_json::json!({
            "type": "array",
            "description": $description,
            "items": {
                "type": "object",
                "properties": {
                    $(stringify!($field): $schema),+
                },
                "required": [$($req),*]
            }
        })
    };
}

/// A complete tool input schema.
#[macro_export]
macro_rules! tool_schema {
    () => {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    };
    (
        required: [$($req:expr),* $(,)?],
        properties: {
            $($field:ident: $schema:expr),+ $(,)?
        }
    ) => {
        serde_json::json!({
            "type": "object",
            "properties": {
                $(stringify!($field): $schema),+
            },
            "required": [$($req),*]
        })
    };
}

/// The optional `version` argument of schema tools.
#[macro_export]
macro_rules! version_arg {
    () => {
        $crate::schema_string!(
            "EnergyPlus version as 'X.Y.Z' (default: the loaded model's version, else the latest)"
        )
    };
    ($description:expr) => {
        $crate::schema_string!($description)
    };
}

/// A result-count limit.
#[macro_export]
macro_rules! limit_arg {
    ($default:expr) => {
        $crate::schema_integer!("Maximum number of results to return", default: $default)
    };
}
