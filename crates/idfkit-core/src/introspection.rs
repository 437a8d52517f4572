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

//! Human-oriented descriptions of object types.

use crate::error::{IdfError, IdfResult};
use crate::schema::{FieldKind, FieldSchema, Schema};
use serde_json::Value;

/// Description of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescription {
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub default: Option<Value>,
    pub units: Option<String>,
    pub enum_values: Option<Vec<String>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub note: Option<String>,
    pub is_reference: bool,
    pub object_list: Vec<String>,
}

/// Description of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescription {
    pub obj_type: String,
    pub memo: Option<String>,
    pub has_name: bool,
    pub is_extensible: bool,
    pub extensible_size: usize,
    pub required_fields: Vec<String>,
    pub fields: Vec<FieldDescription>,
}

/// Describe an object type's fields and constraints.
///
/// Extensible groups are listed as a single `array` field after the fixed
/// fields; its note names the per-item fields.
pub fn describe_object_type(schema: &Schema, obj_type: &str) -> IdfResult<ObjectDescription> {
    let obj = schema
        .object(obj_type)
        .ok_or_else(|| IdfError::unknown_type(obj_type))?;

    let mut fields: Vec<FieldDescription> = obj
        .fields
        .iter()
        .map(|f| describe_field(f, obj.is_required(&f.name)))
        .collect();

    if let Some(group) = &obj.extensible {
        let items: Vec<&str> = group.fields.iter().map(|f| f.name.as_str()).collect();
        fields.push(FieldDescription {
            name: group.name.clone(),
            field_type: FieldKind::Array.as_str().to_string(),
            required: obj.is_required(&group.name),
            default: None,
            units: None,
            enum_values: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            note: Some(format!("List of objects with fields: {}", items.join(", "))),
            is_reference: false,
            object_list: Vec::new(),
        });
    }

    Ok(ObjectDescription {
        obj_type: obj.name.clone(),
        memo: obj.memo.clone(),
        has_name: obj.has_name(),
        is_extensible: obj.extensible.is_some(),
        extensible_size: obj.extensible.as_ref().map_or(0, |g| g.fields.len()),
        required_fields: obj.required_fields.clone(),
        fields,
    })
}

fn describe_field(field: &FieldSchema, required: bool) -> FieldDescription {
    // Exclusive bounds are reported in place of the inclusive ones.
    let (minimum, exclusive_minimum) = split_bound(field.minimum, field.exclusive_minimum);
    let (maximum, exclusive_maximum) = split_bound(field.maximum, field.exclusive_maximum);

    FieldDescription {
        name: field.name.clone(),
        field_type: field.kind.as_str().to_string(),
        required,
        default: field.default.clone(),
        units: field.units.clone(),
        enum_values: field.enum_values.clone(),
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        note: field.note.clone(),
        is_reference: field.is_reference(),
        object_list: field.object_list.clone(),
    }
}

fn split_bound(bound: Option<f64>, exclusive: bool) -> (Option<f64>, Option<f64>) {
    match (bound, exclusive) {
        (Some(b), true) => (None, Some(b)),
        (b, _) => (b, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;

    #[test]
    fn test_describe_zone() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let desc = describe_object_type(&schema, "zone").unwrap();
        assert_eq!(desc.obj_type, "Zone");
        assert!(desc.has_name);
        assert!(!desc.is_extensible);
        assert_eq!(desc.extensible_size, 0);

        let x = desc.fields.iter().find(|f| f.name == "x_origin").unwrap();
        assert_eq!(x.field_type, "number");
        assert_eq!(x.units.as_deref(), Some("m"));
        assert!(!x.required);
    }

    #[test]
    fn test_describe_reference_and_choice() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let desc = describe_object_type(&schema, "BuildingSurface:Detailed").unwrap();
        assert!(desc.is_extensible);
        assert_eq!(desc.extensible_size, 3);
        assert!(desc.required_fields.contains(&"zone_name".to_string()));

        let zone = desc.fields.iter().find(|f| f.name == "zone_name").unwrap();
        assert!(zone.is_reference);
        assert_eq!(zone.field_type, "reference");
        assert_eq!(zone.object_list, vec!["ZoneNames".to_string()]);
        assert!(zone.required);

        let surface_type = desc.fields.iter().find(|f| f.name == "surface_type").unwrap();
        assert_eq!(surface_type.field_type, "choice");
        assert!(surface_type
            .enum_values
            .as_ref()
            .unwrap()
            .contains(&"Wall".to_string()));

        let vertices = desc.fields.last().unwrap();
        assert_eq!(vertices.name, "vertices");
        assert_eq!(vertices.field_type, "array");
    }

    #[test]
    fn test_describe_exclusive_bounds() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let desc = describe_object_type(&schema, "Material").unwrap();
        let thickness = desc.fields.iter().find(|f| f.name == "thickness").unwrap();
        assert_eq!(thickness.exclusive_minimum, Some(0.0));
        assert_eq!(thickness.minimum, None);
        assert_eq!(thickness.maximum, Some(3.0));
    }

    #[test]
    fn test_describe_unknown_type() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let err = describe_object_type(&schema, "NotAType").unwrap_err();
        assert!(matches!(err, IdfError::UnknownObjectType(_)));
    }
}
