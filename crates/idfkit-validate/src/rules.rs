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


//! Validation rules

use crate::diagnostic::ValidationIssue;
use idfkit_core::schema::{is_blank, ValueProblem};
use idfkit_core::{Document, FieldSchema, IdfObject, ObjectSchema};
use serde_json::Value;
use std::collections::HashSet;

/// What a validation run looks at.
pub struct ValidationContext<'a> {
    pub doc: &'a Document,
    /// Canonical types to check; `None` checks the whole model.
    pub object_types: Option<HashSet<String>>,
    /// Requested type names that the schema does not know.
    pub unknown_types: Vec<String>,
    pub check_references: bool,
}

impl<'a> ValidationContext<'a> {
    /// Build a context, resolving requested type names against the schema.
    pub fn new(doc: &'a Document, object_types: Option<&[String]>, check_references: bool) -> Self {
        let mut unknown_types = Vec::new();
        let object_types = object_types.map(|types| {
            types
                .iter()
                .filter_map(|t| match doc.schema().resolve_type(t) {
                    Some(canonical) => Some(canonical.to_string()),
                    None => {
                        unknown_types.push(t.clone());
                        None
                    }
                })
                .collect()
        });
        Self {
            doc,
            object_types,
            unknown_types,
            check_references,
        }
    }

    /// Whether every object type is in scope.
    pub fn is_whole_model(&self) -> bool {
        self.object_types.is_none()
    }

    pub fn in_scope(&self, obj_type: &str) -> bool {
        self.object_types
            .as_ref()
            .map_or(true, |types| types.contains(obj_type))
    }

    /// Objects in scope with their schema.
    pub fn objects(&self) -> impl Iterator<Item = (&'a IdfObject, &'a ObjectSchema)> + '_ {
        let doc = self.doc;
        let schema = doc.schema();
        doc.all_objects()
            .filter(|o| self.in_scope(&o.obj_type))
            .filter_map(move |o| schema.object(&o.obj_type).map(|s| (o, s)))
    }
}

/// Trait for validation rules
pub trait ValidationRule: Send + Sync {
    /// Issue code this rule reports, e.g. `E003`
    fn code(&self) -> &str;

    /// Rule description
    fn description(&self) -> &str;

    /// Run the rule
    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue>;
}

/// Visit every present field value on an object, extensible items included.
///
/// The callback receives the field path (`group[i].field` inside
/// extensible items), the field schema and the value.
fn for_each_value<F>(obj: &IdfObject, obj_schema: &ObjectSchema, mut f: F)
where
    F: FnMut(String, &FieldSchema, &Value),
{
    for (key, value) in &obj.data {
        if let Some(field) = obj_schema.field(key) {
            f(key.clone(), field, value);
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
                if let Some(field) = group.field(item_key) {
                    f(format!("{}[{}].{}", key, i, item_key), field, item_value);
                }
            }
        }
    }
}

/// Rule: object types must exist in the schema
pub struct UnknownTypeRule;

impl ValidationRule for UnknownTypeRule {
    fn code(&self) -> &str {
        "E001"
    }
    fn description(&self) -> &str {
        "Object type is not defined in the schema"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let schema = ctx.doc.schema();
        let mut issues: Vec<ValidationIssue> = ctx
            .unknown_types
            .iter()
            .map(|t| {
                ValidationIssue::error(
                    self.code(),
                    t.as_str(),
                    "",
                    format!("Unknown object type '{}'", t),
                )
            })
            .collect();
        for obj in ctx.doc.all_objects() {
            if ctx.in_scope(&obj.obj_type) && !schema.contains_type(&obj.obj_type) {
                issues.push(ValidationIssue::error(
                    self.code(),
                    obj.obj_type.as_str(),
                    obj.name.as_str(),
                    format!("Unknown object type '{}'", obj.obj_type),
                ));
            }
        }
        issues
    }
}

/// Rule: field names must exist on the object type
pub struct UnknownFieldRule;

impl ValidationRule for UnknownFieldRule {
    fn code(&self) -> &str {
        "E002"
    }
    fn description(&self) -> &str {
        "Field is not defined for the object type"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (obj, obj_schema) in ctx.objects() {
            for key in obj.data.keys() {
                let known = obj_schema.field(key).is_some()
                    || obj_schema.extensible.as_ref().is_some_and(|g| &g.name == key);
                if !known {
                    issues.push(
                        ValidationIssue::error(
                            self.code(),
                            obj.obj_type.as_str(),
                            obj.name.as_str(),
                            format!("Unknown field '{}'", key),
                        )
                        .with_field(key.as_str()),
                    );
                }
            }
        }
        issues
    }
}

/// Rule: required fields must have a value
pub struct RequiredFieldRule;

impl ValidationRule for RequiredFieldRule {
    fn code(&self) -> &str {
        "E003"
    }
    fn description(&self) -> &str {
        "Required field is missing or empty"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (obj, obj_schema) in ctx.objects() {
            let name_required = obj_schema.name_field.as_ref().is_some_and(|n| n.required);
            if name_required && obj.name.trim().is_empty() {
                issues.push(
                    ValidationIssue::error(
                        self.code(),
                        obj.obj_type.as_str(),
                        "",
                        "Object name is required",
                    )
                    .with_field("name"),
                );
            }
            for field in &obj_schema.required_fields {
                if obj.get(field).map_or(true, is_blank) {
                    issues.push(
                        ValidationIssue::error(
                            self.code(),
                            obj.obj_type.as_str(),
                            obj.name.as_str(),
                            format!("Required field '{}' is missing", field),
                        )
                        .with_field(field.as_str()),
                    );
                }
            }
        }
        issues
    }
}

/// Shared check for rules driven by [`FieldSchema::normalize`].
fn value_issues(
    ctx: &ValidationContext<'_>,
    code: &str,
    pick: fn(&FieldSchema, &Value) -> Option<String>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (obj, obj_schema) in ctx.objects() {
        for_each_value(obj, obj_schema, |path, field, value| {
            if is_blank(value) {
                return;
            }
            if let Some(message) = pick(field, value) {
                issues.push(
                    ValidationIssue::error(code, obj.obj_type.as_str(), obj.name.as_str(), message)
                        .with_field(path),
                );
            }
        });
    }
    issues
}

/// Rule: values must have the field's kind
pub struct ValueTypeRule;

impl ValidationRule for ValueTypeRule {
    fn code(&self) -> &str {
        "E004"
    }
    fn description(&self) -> &str {
        "Value does not match the field type"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        value_issues(ctx, self.code(), |field, value| match field.normalize(value) {
            Err(ValueProblem::WrongKind(msg)) => Some(format!("Invalid value: {}", msg)),
            _ => None,
        })
    }
}

/// Rule: choice fields must hold one of their keys
pub struct ChoiceRule;

impl ValidationRule for ChoiceRule {
    fn code(&self) -> &str {
        "E005"
    }
    fn description(&self) -> &str {
        "Value is not one of the allowed choices"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        value_issues(ctx, self.code(), |field, value| match field.normalize(value) {
            Err(ValueProblem::InvalidChoice(msg)) => Some(format!("Invalid choice: {}", msg)),
            _ => None,
        })
    }
}

/// Rule: numeric values must respect the field bounds
pub struct RangeRule;

impl ValidationRule for RangeRule {
    fn code(&self) -> &str {
        "E006"
    }
    fn description(&self) -> &str {
        "Numeric value is outside the allowed range"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        value_issues(ctx, self.code(), |field, value| {
            let normalized = field.normalize(value).ok()?;
            field
                .check_range(&normalized)
                .map(|problem| format!("Out of range: {}", problem))
        })
    }
}

/// Rule: reference fields must name an existing object
pub struct ReferenceRule;

impl ValidationRule for ReferenceRule {
    fn code(&self) -> &str {
        "E007"
    }
    fn description(&self) -> &str {
        "Reference points to an object that does not exist"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        if !ctx.check_references {
            return Vec::new();
        }
        let valid_names = ctx.doc.valid_names();
        ctx.doc
            .dangling_references(&valid_names)
            .into_iter()
            .filter(|d| ctx.in_scope(&d.obj_type))
            .map(|d| {
                ValidationIssue::error(
                    self.code(),
                    d.obj_type,
                    d.obj_name,
                    format!("Reference '{}' does not match any object", d.target),
                )
                .with_field(d.field)
            })
            .collect()
    }
}

/// Rule: unique object types may appear at most once
pub struct UniqueObjectRule;

impl ValidationRule for UniqueObjectRule {
    fn code(&self) -> &str {
        "E008"
    }
    fn description(&self) -> &str {
        "Unique object type appears more than once"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let schema = ctx.doc.schema();
        ctx.doc
            .types()
            .into_iter()
            .filter(|t| ctx.in_scope(t) && schema.is_unique(t))
            .filter_map(|t| {
                let count = ctx.doc.collection(t).map_or(0, <[IdfObject]>::len);
                (count > 1).then(|| {
                    ValidationIssue::error(
                        self.code(),
                        t,
                        "",
                        format!("'{}' is a unique object but appears {} times", t, count),
                    )
                })
            })
            .collect()
    }
}

/// Rule: object types the schema requires should be present
pub struct RequiredObjectRule;

impl ValidationRule for RequiredObjectRule {
    fn code(&self) -> &str {
        "W001"
    }
    fn description(&self) -> &str {
        "Required object type is missing from the model"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        if !ctx.is_whole_model() {
            return Vec::new();
        }
        let schema = ctx.doc.schema();
        schema
            .object_types()
            .filter(|t| schema.is_required_object(t) && !ctx.doc.contains_type(t))
            .map(|t| {
                ValidationIssue::warning(
                    self.code(),
                    t,
                    "",
                    format!("Required object type '{}' is missing", t),
                )
            })
            .collect()
    }
}

/// Rule: report empty fields that fall back to a schema default
pub struct DefaultValueRule;

impl ValidationRule for DefaultValueRule {
    fn code(&self) -> &str {
        "I001"
    }
    fn description(&self) -> &str {
        "Field is empty and will use its default"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (obj, obj_schema) in ctx.objects() {
            for field in &obj_schema.fields {
                let Some(default) = &field.default else {
                    continue;
                };
                if obj.get(&field.name).map_or(true, is_blank) {
                    issues.push(
                        ValidationIssue::info(
                            self.code(),
                            obj.obj_type.as_str(),
                            obj.name.as_str(),
                            format!("Field is empty, default {} will be used", default),
                        )
                        .with_field(field.name.as_str()),
                    );
                }
            }
        }
        issues
    }
}

/// Get all default rules
pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(UnknownTypeRule),
        Box::new(UnknownFieldRule),
        Box::new(RequiredFieldRule),
        Box::new(ValueTypeRule),
        Box::new(ChoiceRule),
        Box::new(RangeRule),
        Box::new(ReferenceRule),
        Box::new(UniqueObjectRule),
        Box::new(RequiredObjectRule),
        Box::new(DefaultValueRule),
    ]
}
