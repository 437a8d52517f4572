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

//! epJSON schema model.
//!
//! Parses the `Energy+.schema.epJSON` document shipped with EnergyPlus into
//! a lookup structure keyed by object type. Only the parts of the JSON
//! schema that drive editing and validation are retained:
//!
//! - object metadata (`group`, `memo`, `maxProperties`, `minProperties`)
//! - the `name` descriptor and the reference lists it provides
//! - field order from `legacy_idd`, including the extensible group
//! - per-field kind, enum choices, numeric bounds, units, defaults and
//!   `object_list` reference targets

use crate::error::{IdfError, IdfResult};
use crate::version::Version;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Integer,
    String,
    Choice,
    Reference,
    Array,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Choice => "choice",
            Self::Reference => "reference",
            Self::Array => "array",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field value was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueProblem {
    WrongKind(String),
    InvalidChoice(String),
    OutOfRange(String),
}

impl fmt::Display for ValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongKind(m) | Self::InvalidChoice(m) | Self::OutOfRange(m) => f.write_str(m),
        }
    }
}

/// Schema of a single field.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// epJSON key, e.g. `x_origin`.
    pub name: String,
    /// IDD display name, e.g. `X Origin`.
    pub display_name: String,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub units: Option<String>,
    /// Allowed choices, without the empty entry.
    pub enum_values: Option<Vec<String>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub note: Option<String>,
    /// Reference lists the value must name an object from.
    pub object_list: Vec<String>,
    /// `Autosize` / `Autocalculate` keyword accepted in place of a number.
    pub auto_keyword: Option<String>,
}

impl FieldSchema {
    pub fn is_reference(&self) -> bool {
        self.kind == FieldKind::Reference
    }

    /// Coerce a value into the representation this field stores.
    ///
    /// Empty strings and nulls pass through unchanged so callers can treat
    /// them as unset.
    pub fn normalize(&self, value: &Value) -> Result<Value, ValueProblem> {
        if is_blank(value) {
            return Ok(value.clone());
        }
        match self.kind {
            FieldKind::Number | FieldKind::Integer => self.normalize_numeric(value),
            FieldKind::Choice => self.normalize_choice(value),
            FieldKind::String | FieldKind::Reference => match value {
                Value::String(s) => Ok(Value::String(s.trim().to_string())),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                other => Err(ValueProblem::WrongKind(format!(
                    "expected a string, got {}",
                    json_type_name(other)
                ))),
            },
            FieldKind::Array => match value {
                Value::Array(_) => Ok(value.clone()),
                other => Err(ValueProblem::WrongKind(format!(
                    "expected a list, got {}",
                    json_type_name(other)
                ))),
            },
        }
    }

    fn normalize_numeric(&self, value: &Value) -> Result<Value, ValueProblem> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                if let Some(keyword) = &self.auto_keyword {
                    if s.trim().eq_ignore_ascii_case(keyword) {
                        return Ok(Value::String(keyword.clone()));
                    }
                }
                s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        };

        let Some(number) = number else {
            return Err(ValueProblem::WrongKind(format!(
                "expected {}, got {}",
                if self.kind == FieldKind::Integer {
                    "an integer"
                } else {
                    "a number"
                },
                describe_value(value)
            )));
        };

        if self.kind == FieldKind::Integer {
            if number.fract() != 0.0 {
                return Err(ValueProblem::WrongKind(format!(
                    "expected an integer, got {}",
                    number
                )));
            }
            return Ok(Value::from(number as i64));
        }

        match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Ok(number_value(number)),
        }
    }

    fn normalize_choice(&self, value: &Value) -> Result<Value, ValueProblem> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ValueProblem::WrongKind(format!(
                    "expected a string, got {}",
                    json_type_name(other)
                )))
            }
        };
        let choices = self.enum_values.as_deref().unwrap_or_default();
        match choices.iter().find(|c| c.eq_ignore_ascii_case(&text)) {
            Some(choice) => Ok(Value::String(choice.clone())),
            None => Err(ValueProblem::InvalidChoice(format!(
                "'{}' is not one of [{}]",
                text,
                choices.join(", ")
            ))),
        }
    }

    /// Check numeric bounds on an already normalized value.
    pub fn check_range(&self, value: &Value) -> Option<ValueProblem> {
        let n = value.as_f64()?;
        if let Some(min) = self.minimum {
            let below = if self.exclusive_minimum {
                n <= min
            } else {
                n < min
            };
            if below {
                let op = if self.exclusive_minimum { ">" } else { ">=" };
                return Some(ValueProblem::OutOfRange(format!(
                    "value {} must be {} {}",
                    n, op, min
                )));
            }
        }
        if let Some(max) = self.maximum {
            let above = if self.exclusive_maximum {
                n >= max
            } else {
                n > max
            };
            if above {
                let op = if self.exclusive_maximum { "<" } else { "<=" };
                return Some(ValueProblem::OutOfRange(format!(
                    "value {} must be {} {}",
                    n, op, max
                )));
            }
        }
        None
    }
}

/// The `name` descriptor of an object type.
#[derive(Debug, Clone, Default)]
pub struct NameField {
    pub required: bool,
    /// Reference lists this object's name is a member of.
    pub reference: Vec<String>,
}

/// Repeating group of fields at the end of an object.
#[derive(Debug, Clone)]
pub struct ExtensibleGroup {
    /// epJSON key holding the list of items, e.g. `vertices`.
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl ExtensibleGroup {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Schema of one object type.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub name: String,
    pub group: Option<String>,
    pub memo: Option<String>,
    pub name_field: Option<NameField>,
    /// At most one instance allowed (`maxProperties: 1`).
    pub unique: bool,
    /// At least one instance required (`minProperties >= 1`).
    pub required_object: bool,
    /// Non-extensible fields in IDD order, excluding the name.
    pub fields: Vec<FieldSchema>,
    pub required_fields: Vec<String>,
    pub extensible: Option<ExtensibleGroup>,
}

impl ObjectSchema {
    pub fn has_name(&self) -> bool {
        self.name_field.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.iter().any(|f| f == field)
    }

    /// Reference lists an object of this type can be named in.
    pub fn provided_references(&self) -> &[String] {
        self.name_field
            .as_ref()
            .map(|n| n.reference.as_slice())
            .unwrap_or_default()
    }

    /// Validate and normalize a set of field values for this type.
    ///
    /// Unknown field names, wrong value kinds and invalid choices are
    /// rejected. Null and empty values are dropped.
    pub fn normalize_fields(&self, fields: &Map<String, Value>) -> IdfResult<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in fields {
            let normalized = if let Some(field) = self.field(key) {
                field
                    .normalize(value)
                    .map_err(|p| self.field_error(key, &p))?
            } else if let Some(group) = self.extensible.as_ref().filter(|g| &g.name == key) {
                self.normalize_extensible(group, value)?
            } else {
                return Err(IdfError::validation(format!(
                    "Unknown field '{}' for object type '{}'",
                    key, self.name
                )));
            };
            if !is_blank(&normalized) {
                out.insert(key.clone(), normalized);
            }
        }
        Ok(out)
    }

    fn normalize_extensible(&self, group: &ExtensibleGroup, value: &Value) -> IdfResult<Value> {
        let Value::Array(items) = value else {
            return Err(IdfError::validation(format!(
                "Field '{}' on '{}' must be a list of objects",
                group.name, self.name
            )));
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(item) = item else {
                return Err(IdfError::validation(format!(
                    "Items of '{}' on '{}' must be objects",
                    group.name, self.name
                )));
            };
            let mut normalized = Map::new();
            for (key, v) in item {
                let field = group.field(key).ok_or_else(|| {
                    IdfError::validation(format!(
                        "Unknown field '{}' in '{}' of object type '{}'",
                        key, group.name, self.name
                    ))
                })?;
                let v = field.normalize(v).map_err(|p| self.field_error(key, &p))?;
                if !is_blank(&v) {
                    normalized.insert(key.clone(), v);
                }
            }
            out.push(Value::Object(normalized));
        }
        Ok(Value::Array(out))
    }

    fn field_error(&self, field: &str, problem: &ValueProblem) -> IdfError {
        IdfError::validation(format!(
            "Invalid value for field '{}' on '{}': {}",
            field, self.name, problem
        ))
    }
}

/// A parsed epJSON schema for one EnergyPlus version.
#[derive(Debug, Clone)]
pub struct Schema {
    version: Version,
    types: Vec<ObjectSchema>,
    index: HashMap<String, usize>,
    providers: HashMap<String, Vec<String>>,
}

impl Schema {
    /// Parse a schema document.
    pub fn from_json(version: Version, text: &str) -> IdfResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(version, &value)
    }

    pub fn from_value(version: Version, value: &Value) -> IdfResult<Self> {
        let properties = value
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                IdfError::SchemaNotFound(format!(
                    "schema for {} has no 'properties' table",
                    version
                ))
            })?;

        let mut types = Vec::with_capacity(properties.len());
        for (name, def) in properties {
            types.push(parse_object(name, def)?);
        }

        let mut index = HashMap::with_capacity(types.len());
        let mut providers: HashMap<String, Vec<String>> = HashMap::new();
        for (i, obj) in types.iter().enumerate() {
            index.insert(obj.name.to_uppercase(), i);
            for list in obj.provided_references() {
                providers
                    .entry(list.clone())
                    .or_default()
                    .push(obj.name.clone());
            }
        }

        Ok(Self {
            version,
            types,
            index,
            providers,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Object type names in schema order.
    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up an object type, ignoring case.
    pub fn object(&self, obj_type: &str) -> Option<&ObjectSchema> {
        if let Some(&i) = self.index.get(&obj_type.to_uppercase()) {
            return self.types.get(i);
        }
        None
    }

    /// Canonical spelling of an object type name.
    pub fn resolve_type(&self, obj_type: &str) -> Option<&str> {
        self.object(obj_type).map(|o| o.name.as_str())
    }

    pub fn contains_type(&self, obj_type: &str) -> bool {
        self.object(obj_type).is_some()
    }

    /// Position of a type in schema order, used to order output.
    pub fn type_position(&self, obj_type: &str) -> Option<usize> {
        self.index.get(&obj_type.to_uppercase()).copied()
    }

    pub fn get_group(&self, obj_type: &str) -> Option<&str> {
        self.object(obj_type)?.group.as_deref()
    }

    pub fn get_object_memo(&self, obj_type: &str) -> Option<&str> {
        self.object(obj_type)?.memo.as_deref()
    }

    pub fn has_name(&self, obj_type: &str) -> bool {
        self.object(obj_type).is_some_and(|o| o.has_name())
    }

    pub fn is_unique(&self, obj_type: &str) -> bool {
        self.object(obj_type).is_some_and(|o| o.unique)
    }

    pub fn is_required_object(&self, obj_type: &str) -> bool {
        self.object(obj_type).is_some_and(|o| o.required_object)
    }

    pub fn field_names(&self, obj_type: &str) -> Vec<&str> {
        self.object(obj_type)
            .map(|o| o.fields.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn get_required_fields(&self, obj_type: &str) -> Vec<&str> {
        self.object(obj_type)
            .map(|o| o.required_fields.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Schema of a field, looking inside the extensible group as well.
    pub fn field(&self, obj_type: &str, field: &str) -> Option<&FieldSchema> {
        let obj = self.object(obj_type)?;
        obj.field(field)
            .or_else(|| obj.extensible.as_ref().and_then(|g| g.field(field)))
    }

    /// Reference lists a field points into; empty for non-reference fields.
    pub fn get_field_object_list(&self, obj_type: &str, field: &str) -> &[String] {
        self.field(obj_type, field)
            .map(|f| f.object_list.as_slice())
            .unwrap_or_default()
    }

    /// Object types whose names are members of a reference list.
    pub fn get_types_providing_reference(&self, list: &str) -> &[String] {
        self.providers
            .get(list)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn parse_object(name: &str, def: &Value) -> IdfResult<ObjectSchema> {
    let inner = def
        .get("patternProperties")
        .and_then(Value::as_object)
        .and_then(|pp| pp.values().next())
        .ok_or_else(|| {
            IdfError::SchemaNotFound(format!("object type '{}' has no patternProperties", name))
        })?;

    let empty = Map::new();
    let props = inner
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let legacy = def.get("legacy_idd");
    let field_info = legacy
        .and_then(|l| l.get("field_info"))
        .and_then(Value::as_object);
    let info_for = |field: &str| field_info.and_then(|fi| fi.get(field));

    let extension = legacy
        .and_then(|l| l.get("extension"))
        .and_then(Value::as_str);

    // Legacy field order; fall back to property order for hand-written schemas.
    let order: Vec<String> = match legacy.and_then(|l| l.get("fields")).and_then(Value::as_array) {
        Some(fields) => fields
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => props.keys().cloned().collect(),
    };

    let fields = order
        .iter()
        .filter(|f| f.as_str() != "name" && Some(f.as_str()) != extension)
        .filter_map(|f| props.get(f).map(|p| parse_field(f, p, info_for(f))))
        .collect();

    let extensible = extension.and_then(|ext| {
        let items = props
            .get(ext)?
            .get("items")?
            .get("properties")?
            .as_object()?;
        let ext_order: Vec<String> = legacy
            .and_then(|l| l.get("extensibles"))
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_else(|| items.keys().cloned().collect());
        Some(ExtensibleGroup {
            name: ext.to_string(),
            fields: ext_order
                .iter()
                .filter_map(|f| items.get(f).map(|p| parse_field(f, p, info_for(f))))
                .collect(),
        })
    });

    let name_field = def.get("name").map(|n| NameField {
        required: n
            .get("is_required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        reference: string_list(n.get("reference")),
    });

    Ok(ObjectSchema {
        name: name.to_string(),
        group: def.get("group").and_then(Value::as_str).map(str::to_string),
        memo: def.get("memo").and_then(Value::as_str).map(str::to_string),
        name_field,
        unique: def.get("maxProperties").and_then(Value::as_u64) == Some(1),
        required_object: def
            .get("minProperties")
            .and_then(Value::as_u64)
            .is_some_and(|n| n >= 1),
        fields,
        required_fields: string_list(inner.get("required")),
        extensible,
    })
}

fn parse_field(name: &str, def: &Value, info: Option<&Value>) -> FieldSchema {
    let display_name = info
        .and_then(|i| i.get("field_name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| display_name(name));

    let mut field = FieldSchema {
        name: name.to_string(),
        display_name,
        kind: FieldKind::String,
        default: def.get("default").cloned(),
        units: def.get("units").and_then(Value::as_str).map(str::to_string),
        enum_values: None,
        minimum: None,
        maximum: None,
        exclusive_minimum: false,
        exclusive_maximum: false,
        note: def.get("note").and_then(Value::as_str).map(str::to_string),
        object_list: Vec::new(),
        auto_keyword: None,
    };

    // Autosizable numerics are `anyOf: [number, {enum: ["", "Autosize"]}]`.
    let numeric_def = if let Some(any_of) = def.get("anyOf").and_then(Value::as_array) {
        field.auto_keyword = any_of
            .iter()
            .filter_map(|branch| branch.get("enum"))
            .flat_map(|e| string_list(Some(e)))
            .find(|s| !s.is_empty());
        any_of.iter().find(|branch| {
            matches!(
                branch.get("type").and_then(Value::as_str),
                Some("number" | "integer")
            )
        })
    } else {
        None
    };
    let typed = numeric_def.unwrap_or(def);

    field.kind = match typed.get("type").and_then(Value::as_str) {
        Some("number") => FieldKind::Number,
        Some("integer") => FieldKind::Integer,
        Some("array") => FieldKind::Array,
        _ if def.get("data_type").and_then(Value::as_str) == Some("object_list") => {
            FieldKind::Reference
        }
        _ if def.get("enum").is_some() => FieldKind::Choice,
        _ => FieldKind::String,
    };

    if field.units.is_none() {
        field.units = typed.get("units").and_then(Value::as_str).map(str::to_string);
    }

    match field.kind {
        FieldKind::Reference => field.object_list = string_list(def.get("object_list")),
        FieldKind::Choice => {
            field.enum_values = Some(
                string_list(def.get("enum"))
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect(),
            )
        }
        FieldKind::Number | FieldKind::Integer => {
            field.minimum = typed.get("minimum").and_then(Value::as_f64);
            field.maximum = typed.get("maximum").and_then(Value::as_f64);
            // draft-04 uses booleans, later drafts carry the bound itself
            match typed.get("exclusiveMinimum") {
                Some(Value::Bool(b)) => field.exclusive_minimum = *b,
                Some(Value::Number(n)) => {
                    field.minimum = n.as_f64();
                    field.exclusive_minimum = true;
                }
                _ => {}
            }
            match typed.get("exclusiveMaximum") {
                Some(Value::Bool(b)) => field.exclusive_maximum = *b,
                Some(Value::Number(n)) => {
                    field.maximum = n.as_f64();
                    field.exclusive_maximum = true;
                }
                _ => {}
            }
        }
        FieldKind::String | FieldKind::Array => {}
    }

    field
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// `outside_layer` -> `Outside Layer`
pub fn display_name(field: &str) -> String {
    field
        .split('_')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Null or an empty/whitespace string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// JSON number for an `f64`, kept integral when it has no fraction.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => json_type_name(other).to_string(),
    }
}
