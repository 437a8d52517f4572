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

//! A single EnergyPlus object.

use serde_json::{Map, Value};

/// An object instance. Field values are kept in their epJSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfObject {
    /// Canonical object type, e.g. `Zone`.
    pub obj_type: String,
    /// Object name; empty for unnamed types.
    pub name: String,
    /// Field values keyed by epJSON field name.
    pub data: Map<String, Value>,
}

impl IdfObject {
    pub fn new(obj_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            obj_type: obj_type.into(),
            name: name.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.data.get(field).and_then(Value::as_f64)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.data.remove(field)
    }

    /// Case-insensitive name comparison, as EnergyPlus does.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Field values as a plain mapping.
    pub fn to_dict(&self) -> Map<String, Value> {
        self.data.clone()
    }
}
