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

//! epJSON format.
//!
//! The top level maps object types to `{name: {field: value}}` maps.
//! Unnamed objects are keyed `"<Type> <n>"` on output and read back with
//! an empty name.

use crate::document::{Document, VERSION_TYPE};
use crate::error::{IdfError, IdfResult};
use crate::registry::SchemaRegistry;
use crate::version::{Version, LATEST_VERSION};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Keys EnergyPlus tooling adds that are not fields.
const METADATA_PREFIX: &str = "idf_";

/// Parse epJSON text into a document.
pub fn parse_epjson(
    text: &str,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let root: Value = serde_json::from_str(text)?;
    from_value(&root, version, registry)
}

/// Build a document from an already decoded epJSON value.
pub fn from_value(
    root: &Value,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let root = root
        .as_object()
        .ok_or_else(|| IdfError::validation("epJSON root must be an object"))?;

    let file_version = root
        .get(VERSION_TYPE)
        .and_then(Value::as_object)
        .and_then(|objs| objs.values().next())
        .and_then(|v| v.get("version_identifier"))
        .and_then(Value::as_str)
        .map(Version::parse_identifier)
        .transpose()?;
    let version = version.or(file_version).unwrap_or(LATEST_VERSION);

    let schema = registry.get(version)?;
    let mut doc = Document::new(schema.clone());

    for (type_name, objects) in root {
        if type_name == VERSION_TYPE {
            continue;
        }
        let obj_schema = schema
            .object(type_name)
            .ok_or_else(|| IdfError::unknown_type(type_name))?;
        let objects = objects.as_object().ok_or_else(|| {
            IdfError::validation(format!("'{}' must map names to objects", type_name))
        })?;

        for (key, fields) in objects {
            let fields = fields.as_object().ok_or_else(|| {
                IdfError::validation(format!("{} '{}' must be an object", type_name, key))
            })?;
            let data: Map<String, Value> = fields
                .iter()
                .filter(|(k, _)| !k.starts_with(METADATA_PREFIX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let name = if obj_schema.has_name() { key.as_str() } else { "" };
            doc.add_unchecked(&obj_schema.name, name, data)?;
        }
    }

    debug!("Parsed epJSON with {} objects", doc.len());
    Ok(doc)
}

/// Render a document as an epJSON value.
pub fn write_epjson(doc: &Document) -> Value {
    let mut root = Map::new();

    let mut version = Map::new();
    version.insert(
        "version_identifier".to_string(),
        Value::String(doc.version().identifier()),
    );
    let mut version_objs = Map::new();
    version_objs.insert(format!("{} 1", VERSION_TYPE), Value::Object(version));
    root.insert(VERSION_TYPE.to_string(), Value::Object(version_objs));

    for obj_type in doc.types() {
        let Some(objects) = doc.collection(obj_type) else {
            continue;
        };
        let mut entries = Map::new();
        for (i, obj) in objects.iter().enumerate() {
            let key = if obj.name.is_empty() {
                format!("{} {}", obj_type, i + 1)
            } else {
                obj.name.clone()
            };
            entries.insert(key, Value::Object(obj.data.clone()));
        }
        root.insert(obj_type.to_string(), Value::Object(entries));
    }

    Value::Object(root)
}

/// Read and parse an epJSON file.
pub fn load_epjson(
    path: impl AsRef<Path>,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let doc = parse_epjson(&text, version, registry)?;
    info!("Loaded {} objects from {}", doc.len(), path.display());
    Ok(doc)
}

/// Write a document to an epJSON file, pretty-printed.
pub fn save_epjson(doc: &Document, path: impl AsRef<Path>) -> IdfResult<()> {
    let text = serde_json::to_string_pretty(&write_epjson(doc))?;
    std::fs::write(path.as_ref(), text)?;
    Ok(())
}
