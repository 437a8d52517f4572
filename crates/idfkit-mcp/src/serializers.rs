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


//! Conversions from toolkit types to the JSON objects returned by tools.

use idfkit_core::{FieldDescription, IdfObject, ObjectDescription, Schema};
use idfkit_sim::{ErrorMessage, HtmlTable, OutputItem};
use idfkit_validate::{ValidationIssue, ValidationResult};
use idfkit_weather::WeatherStation;
use serde_json::{json, Map, Value};

/// Every field of an object, after its type and name.
pub fn serialize_object(obj: &IdfObject) -> Value {
    let mut out = header(obj);
    out.extend(obj.to_dict());
    Value::Object(out)
}

/// Type, name and any required fields that are set.
pub fn serialize_object_brief(obj: &IdfObject, schema: Option<&Schema>) -> Map<String, Value> {
    let mut out = header(obj);
    if let Some(schema) = schema {
        for field in schema.get_required_fields(&obj.obj_type) {
            if let Some(value) = obj.get(field) {
                out.insert(field.to_string(), value.clone());
            }
        }
    }
    out
}

/// `{object_type, name}`
pub fn object_ref(obj: &IdfObject) -> Value {
    Value::Object(header(obj))
}

fn header(obj: &IdfObject) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("object_type".into(), Value::String(obj.obj_type.clone()));
    out.insert("name".into(), Value::String(obj.name.clone()));
    out
}

pub fn serialize_object_description(desc: &ObjectDescription) -> Value {
    json!({
        "object_type": desc.obj_type,
        "memo": desc.memo,
        "has_name": desc.has_name,
        "is_extensible": desc.is_extensible,
        "extensible_size": desc.extensible_size,
        "required_fields": desc.required_fields,
        "fields": desc.fields.iter().map(serialize_field_description).collect::<Vec<_>>(),
    })
}

/// Optional attributes are only present when the schema defines them.
pub fn serialize_field_description(f: &FieldDescription) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(f.name));
    out.insert("field_type".into(), json!(f.field_type));
    out.insert("required".into(), json!(f.required));

    let optional = [
        ("default", f.default.clone()),
        ("units", f.units.as_ref().map(|u| json!(u))),
        ("enum_values", f.enum_values.as_ref().map(|v| json!(v))),
        ("minimum", f.minimum.map(|v| json!(v))),
        ("maximum", f.maximum.map(|v| json!(v))),
        ("exclusive_minimum", f.exclusive_minimum.map(|v| json!(v))),
        ("exclusive_maximum", f.exclusive_maximum.map(|v| json!(v))),
        ("note", f.note.as_ref().map(|n| json!(n))),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            out.insert(key.into(), value);
        }
    }

    if f.is_reference {
        out.insert("is_reference".into(), Value::Bool(true));
        out.insert("object_list".into(), json!(f.object_list));
    }
    Value::Object(out)
}

pub fn serialize_validation_issue(issue: &ValidationIssue) -> Value {
    json!({
        "severity": issue.severity().as_str(),
        "object_type": issue.obj_type(),
        "object_name": issue.obj_name(),
        "field": issue.field(),
        "message": issue.message(),
        "code": issue.code(),
    })
}

/// Counts for every severity; info issues are counted but not listed.
pub fn serialize_validation_result(result: &ValidationResult) -> Value {
    json!({
        "is_valid": result.is_valid(),
        "error_count": result.errors.len(),
        "warning_count": result.warnings.len(),
        "info_count": result.info.len(),
        "errors": result.errors.iter().map(serialize_validation_issue).collect::<Vec<_>>(),
        "warnings": result.warnings.iter().map(serialize_validation_issue).collect::<Vec<_>>(),
    })
}

pub fn serialize_station(station: &WeatherStation) -> Map<String, Value> {
    station.to_dict()
}

pub fn serialize_error_message(msg: &ErrorMessage) -> Value {
    json!({ "message": msg.message, "details": msg.details })
}

pub fn serialize_table(table: &HtmlTable) -> Value {
    let mut out = Map::new();
    out.insert("title".into(), json!(table.title));
    out.insert("report".into(), json!(table.report_name));
    out.insert("for".into(), json!(table.for_string));
    let data = table.to_dict();
    if !data.is_empty() {
        out.insert("data".into(), Value::Object(data));
    }
    Value::Object(out)
}

pub fn serialize_output_item(item: OutputItem<'_>) -> Value {
    match item {
        OutputItem::Variable(v) => json!({
            "name": v.name,
            "units": v.units,
            "key": v.key,
            "type": "variable",
        }),
        OutputItem::Meter(m) => json!({
            "name": m.name,
            "units": m.units,
            "type": "meter",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idfkit_core::{describe_object_type, SchemaRegistry};
    use idfkit_sim::ErrorSeverity;

    #[test]
    fn test_serialize_object() {
        let mut obj = IdfObject::new("Zone", "Office");
        obj.set("x_origin", json!(2.0));
        let value = serialize_object(&obj);
        assert_eq!(value["object_type"], "Zone");
        assert_eq!(value["name"], "Office");
        assert_eq!(value["x_origin"], 2.0);
    }

    #[test]
    fn test_serialize_object_brief() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let mut obj = IdfObject::new("Construction", "ExtWall");
        obj.set("outside_layer", json!("Brick"));
        obj.set("layer_2", json!("Insulation"));

        let brief = serialize_object_brief(&obj, Some(&*schema));
        assert_eq!(brief.get("outside_layer"), Some(&json!("Brick")));
        assert!(brief.get("layer_2").is_none());

        let bare = serialize_object_brief(&obj, None);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_field_description_omits_absent_keys() {
        let schema = SchemaRegistry::new().latest().unwrap();
        let desc = describe_object_type(&schema, "BuildingSurface:Detailed").unwrap();
        let value = serialize_object_description(&desc);
        let fields = value["fields"].as_array().unwrap();

        let zone = fields.iter().find(|f| f["name"] == "zone_name").unwrap();
        assert_eq!(zone["is_reference"], true);
        assert_eq!(zone["object_list"], json!(["ZoneNames"]));
        assert!(zone.get("units").is_none());

        let surface_type = fields.iter().find(|f| f["name"] == "surface_type").unwrap();
        assert!(surface_type.get("is_reference").is_none());
        assert!(surface_type.get("object_list").is_none());
        assert!(surface_type["enum_values"].is_array());
    }

    #[test]
    fn test_serialize_table_without_data() {
        let table = HtmlTable {
            title: "Site and Source Energy".into(),
            report_name: "Annual Building Utility Performance Summary".into(),
            for_string: "Entire Facility".into(),
            header: vec![String::new(), "Total Energy [GJ]".into()],
            rows: Vec::new(),
        };
        let value = serialize_table(&table);
        assert_eq!(value["report"], "Annual Building Utility Performance Summary");
        assert_eq!(value["for"], "Entire Facility");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_serialize_error_message() {
        let msg = ErrorMessage {
            severity: ErrorSeverity::Severe,
            message: "Zone has no surfaces".into(),
            details: vec!["Zone=OFFICE".into()],
        };
        assert_eq!(
            serialize_error_message(&msg),
            json!({"message": "Zone has no surfaces", "details": ["Zone=OFFICE"]})
        );
    }
}
