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


//! Model loading and inspection tools.

use crate::error::McpResult;
use crate::serializers::{object_ref, serialize_object, serialize_object_brief};
use crate::session::{parse_version, Session, ToolEnv};
use crate::tools::helpers::{contains_lower, parse_args};
use crate::tools::types::{
    GetObjectArgs, GetReferencesArgs, ListObjectsArgs, LoadModelArgs, SearchObjectsArgs,
};
use idfkit_core::{load_document, Document, IdfObject};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute load_model tool.
pub fn execute_load_model(
    args: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: LoadModelArgs = parse_args(args)?;
    let version = parse_version(args.version.as_deref())?;
    let path = PathBuf::from(&args.file_path);

    let doc = load_document(&path, version, env.registry())?;
    info!("Loaded model {} ({} objects)", path.display(), doc.len());
    session.set_model(doc, Some(path));

    let doc = session.require_model()?;
    Ok(build_summary(doc, session.file_path.as_deref()))
}

/// Execute get_model_summary tool.
pub fn execute_get_model_summary(session: &Session) -> McpResult<JsonValue> {
    let doc = session.require_model()?;
    Ok(build_summary(doc, session.file_path.as_deref()))
}

/// Execute list_objects tool.
pub fn execute_list_objects(args: Option<JsonValue>, session: &Session) -> McpResult<JsonValue> {
    let args: ListObjectsArgs = parse_args(args)?;
    let doc = session.require_model()?;

    let Some(collection) = doc.collection(&args.object_type) else {
        return Ok(no_objects_of_type(&args.object_type));
    };
    let objects: Vec<JsonValue> = collection
        .iter()
        .take(args.limit)
        .map(|obj| JsonValue::Object(serialize_object_brief(obj, Some(doc.schema()))))
        .collect();

    Ok(json!({
        "object_type": args.object_type,
        "total": collection.len(),
        "returned": objects.len(),
        "objects": objects,
    }))
}

/// Execute get_object tool.
pub fn execute_get_object(args: Option<JsonValue>, session: &Session) -> McpResult<JsonValue> {
    let args: GetObjectArgs = parse_args(args)?;
    let doc = session.require_model()?;
    match lookup(doc, &args.object_type, &args.name) {
        Ok(obj) => Ok(serialize_object(obj)),
        Err(error) => Ok(error),
    }
}

/// Execute search_objects tool.
pub fn execute_search_objects(args: Option<JsonValue>, session: &Session) -> McpResult<JsonValue> {
    let args: SearchObjectsArgs = parse_args(args)?;
    let doc = session.require_model()?;
    let query = args.query.to_lowercase();

    let matches: Vec<JsonValue> = doc
        .all_objects()
        .filter(|obj| {
            args.object_type
                .as_deref()
                .map_or(true, |t| obj.obj_type.eq_ignore_ascii_case(t))
        })
        .filter(|obj| matches_query(obj, &query))
        .take(args.limit)
        .map(object_ref)
        .collect();

    Ok(json!({ "query": args.query, "count": matches.len(), "matches": matches }))
}

/// Execute get_references tool.
pub fn execute_get_references(args: Option<JsonValue>, session: &Session) -> McpResult<JsonValue> {
    let args: GetReferencesArgs = parse_args(args)?;
    let doc = session.require_model()?;

    let referenced_by: Vec<JsonValue> = doc
        .get_referencing(&args.name)
        .into_iter()
        .map(object_ref)
        .collect();
    let references: Vec<String> = doc
        .find_by_name(&args.name)
        .map(|obj| doc.get_references(obj).into_iter().collect())
        .unwrap_or_default();

    Ok(json!({
        "name": args.name,
        "referenced_by_count": referenced_by.len(),
        "referenced_by": referenced_by,
        "references_count": references.len(),
        "references": references,
    }))
}

/// Version, totals and per-group type counts.
pub(crate) fn build_summary(doc: &Document, file_path: Option<&Path>) -> JsonValue {
    let schema = doc.schema();
    let mut groups: BTreeMap<&str, Map<String, JsonValue>> = BTreeMap::new();
    let mut zone_count = 0;

    for obj_type in doc.types() {
        let count = doc.collection(obj_type).map_or(0, <[IdfObject]>::len);
        if obj_type == "Zone" {
            zone_count = count;
        }
        let group = schema.get_group(obj_type).unwrap_or("Ungrouped");
        groups
            .entry(group)
            .or_default()
            .insert(obj_type.to_string(), json!(count));
    }

    let groups: Map<String, JsonValue> = groups
        .into_iter()
        .map(|(group, types)| {
            let count: u64 = types.values().filter_map(JsonValue::as_u64).sum();
            (group.to_string(), json!({ "count": count, "types": types }))
        })
        .collect();

    json!({
        "version": doc.version().to_string(),
        "file_path": file_path.map(|p| p.display().to_string()),
        "total_objects": doc.len(),
        "zone_count": zone_count,
        "groups": groups,
    })
}

/// Find an object, or the error object explaining why it is missing.
pub(crate) fn lookup<'a>(
    doc: &'a Document,
    obj_type: &str,
    name: &str,
) -> Result<&'a IdfObject, JsonValue> {
    if !doc.contains_type(obj_type) {
        return Err(no_objects_of_type(obj_type));
    }
    doc.get(obj_type, name).ok_or_else(|| {
        json!({ "error": format!("Object '{}' not found in '{}'.", name, obj_type) })
    })
}

fn no_objects_of_type(obj_type: &str) -> JsonValue {
    json!({ "error": format!("No objects of type '{}' in the model.", obj_type) })
}

fn matches_query(obj: &IdfObject, query: &str) -> bool {
    contains_lower(&obj.name, query)
        || obj
            .data
            .values()
            .filter_map(JsonValue::as_str)
            .any(|s| contains_lower(s, query))
}
