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


//! Argument types for MCP tools.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

fn default_list_limit() -> usize {
    50
}

fn default_search_limit() -> usize {
    20
}

fn default_series_limit() -> usize {
    500
}

fn default_station_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> String {
    "idf".to_string()
}

// --- Schema ---

#[derive(Debug, Deserialize)]
pub struct ListObjectTypesArgs {
    pub group: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeObjectTypeArgs {
    pub object_type: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchSchemaArgs {
    pub query: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableReferencesArgs {
    pub object_type: String,
    pub field_name: String,
}

// --- Read ---

#[derive(Debug, Deserialize)]
pub struct LoadModelArgs {
    pub file_path: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListObjectsArgs {
    pub object_type: String,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct GetObjectArgs {
    pub object_type: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchObjectsArgs {
    pub query: String,
    pub object_type: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct GetReferencesArgs {
    pub name: String,
}

// --- Write ---

#[derive(Debug, Deserialize)]
pub struct NewModelArgs {
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddObjectArgs {
    pub object_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Option<Map<String, JsonValue>>,
}

/// Entries stay raw JSON so a malformed entry only fails itself.
#[derive(Debug, Deserialize)]
pub struct BatchAddArgs {
    pub objects: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateObjectArgs {
    pub object_type: String,
    pub name: String,
    pub fields: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveObjectArgs {
    pub object_type: String,
    pub name: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenameObjectArgs {
    pub object_type: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateObjectArgs {
    pub object_type: String,
    pub name: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveModelArgs {
    pub file_path: Option<String>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

// --- Validation ---

#[derive(Debug, Deserialize)]
pub struct ValidateModelArgs {
    pub object_types: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub check_references: bool,
}

// --- Simulation ---

#[derive(Debug, Deserialize)]
pub struct RunSimulationArgs {
    pub weather_file: Option<String>,
    #[serde(default)]
    pub design_day: bool,
    #[serde(default)]
    pub annual: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListOutputVariablesArgs {
    pub search: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct QueryTimeseriesArgs {
    pub variable_name: String,
    pub key_value: Option<String>,
    pub frequency: Option<String>,
    pub environment: Option<String>,
    #[serde(default = "default_series_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportTimeseriesArgs {
    pub variable_name: String,
    pub file_path: String,
    pub key_value: Option<String>,
    pub frequency: Option<String>,
    pub environment: Option<String>,
}

// --- Weather ---

#[derive(Debug, Deserialize)]
pub struct SearchStationsArgs {
    pub query: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
    #[serde(default = "default_station_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct DownloadWeatherArgs {
    pub wmo: Option<String>,
    pub query: Option<String>,
    pub country: Option<String>,
}
