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

//! Reference graph helpers.
//!
//! A field whose schema declares an `object_list` holds the name of another
//! object. These helpers enumerate such fields, including those inside
//! extensible groups, and rewrite them on rename.

use crate::object::IdfObject;
use crate::schema::Schema;
use serde_json::Value;

/// A non-empty reference value found on an object.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceField<'a> {
    /// Field path; extensible items use `group[i].field`.
    pub field: String,
    pub target: &'a str,
    pub object_list: &'a [String],
}

/// A reference whose target does not exist in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub obj_type: String,
    pub obj_name: String,
    pub field: String,
    pub target: String,
}

/// All non-empty reference values on an object.
pub fn reference_fields<'a>(schema: &'a Schema, obj: &'a IdfObject) -> Vec<ReferenceField<'a>> {
    let Some(obj_schema) = schema.object(&obj.obj_type) else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for (key, value) in &obj.data {
        if let Some(field) = obj_schema.field(key) {
            if let (true, Some(target)) = (field.is_reference(), non_empty_str(value)) {
                refs.push(ReferenceField {
                    field: key.clone(),
                    target,
                    object_list: &field.object_list,
                });
            }
            continue;
        }

        let Some(group) = obj_schema.extensible.as_ref().filter(|g| &g.name == key) else {
            continue;
        };
        let Some(items) = value.as_array() else {
            continue;
        };
        for (i, item) in items.iter().enumerate() {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (item_key, item_value) in item {
                let Some(field) = group.field(item_key).filter(|f| f.is_reference()) else {
                    continue;
                };
                if let Some(target) = non_empty_str(item_value) {
                    refs.push(ReferenceField {
                        field: format!("{}[{}].{}", key, i, item_key),
                        target,
                        object_list: &field.object_list,
                    });
                }
            }
        }
    }
    refs
}

/// Whether any reference field on `obj` names `target` (case-insensitive).
pub fn references_name(schema: &Schema, obj: &IdfObject, target: &str) -> bool {
    reference_fields(schema, obj)
        .iter()
        .any(|r| r.target.eq_ignore_ascii_case(target))
}

/// Rewrite reference fields pointing at `old` into one of `lists`.
///
/// Returns the number of fields changed.
pub fn rewrite_references(
    schema: &Schema,
    obj: &mut IdfObject,
    old: &str,
    new: &str,
    lists: &[String],
) -> usize {
    let Some(obj_schema) = schema.object(&obj.obj_type) else {
        return 0;
    };
    let accepts = |object_list: &[String]| object_list.iter().any(|l| lists.contains(l));
    let matches = |v: &Value| v.as_str().is_some_and(|s| s.eq_ignore_ascii_case(old));

    let mut changed = 0;
    for (key, value) in obj.data.iter_mut() {
        if let Some(field) = obj_schema.field(key) {
            if field.is_reference() && accepts(&field.object_list) && matches(value) {
                *value = Value::String(new.to_string());
                changed += 1;
            }
            continue;
        }

        let Some(group) = obj_schema.extensible.as_ref().filter(|g| &g.name == key) else {
            continue;
        };
        let Some(items) = value.as_array_mut() else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            for (item_key, item_value) in item.iter_mut() {
                let rewrite = group
                    .field(item_key)
                    .is_some_and(|f| f.is_reference() && accepts(&f.object_list));
                if rewrite && matches(item_value) {
                    *item_value = Value::String(new.to_string());
                    changed += 1;
                }
            }
        }
    }
    changed
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
