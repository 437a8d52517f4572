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


//! Model editing tools.
//!
//! Handlers that change the model take the session mutably. Lookups that
//! fail return an error object rather than an `Err`, so the client sees
//! the same message the read tools give. Rename and duplicate are the
//! exception: a missing source object is a `Not found` error.

use crate::error::McpResult;
use crate::serializers::{object_ref, serialize_object, serialize_object_brief};
use crate::session::{parse_version, Session, ToolEnv};
use crate::tools::helpers::parse_args;
use crate::tools::read::lookup;
use crate::tools::types::{
    AddObjectArgs, BatchAddArgs, DuplicateObjectArgs, NewModelArgs, RemoveObjectArgs,
    RenameObjectArgs, SaveModelArgs, UpdateObjectArgs,
};
use idfkit_core::{epjson, idf, new_document, Document, IdfError, LATEST_VERSION};
use serde_json::{json, Map, Value as JsonValue};
use std::path::PathBuf;
use tracing::{debug, info};

/// Execute new_model tool.
pub fn execute_new_model(
    args: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: NewModelArgs = parse_args(args)?;
    let version = parse_version(args.version.as_deref())?.unwrap_or(LATEST_VERSION);

    let doc = new_document(version, env.registry())?;
    session.set_model(doc, None);
    info!("Created new model for EnergyPlus {}", version);

    Ok(json!({ "status": "created", "version": version.to_string() }))
}

/// Execute add_object tool.
pub fn execute_add_object(args: Option<JsonValue>, session: &mut Session) -> McpResult<JsonValue> {
    let args: AddObjectArgs = parse_args(args)?;
    let doc = session.require_model_mut()?;
    let fields = args.fields.unwrap_or_default();
    let obj = doc.add(&args.object_type, &args.name, &fields)?;
    Ok(serialize_object(obj))
}

/// Execute batch_add_objects tool.
///
/// Entries are added in order; a failing entry is reported and the rest
/// still run.
pub fn execute_batch_add_objects(
    args: Option<JsonValue>,
    session: &mut Session,
) -> McpResult<JsonValue> {
    let args: BatchAddArgs = parse_args(args)?;
    let doc = session.require_model_mut()?;

    let mut results = Vec::with_capacity(args.objects.len());
    let mut errors = 0;
    for (index, entry) in args.objects.into_iter().enumerate() {
        let mut result = Map::new();
        result.insert("index".into(), json!(index));
        match add_entry(doc, entry) {
            Ok(brief) => result.extend(brief),
            Err(message) => {
                errors += 1;
                result.insert("error".into(), JsonValue::String(message));
            }
        }
        results.push(JsonValue::Object(result));
    }
    debug!("Batch add: {} entries, {} failed", results.len(), errors);

    Ok(json!({
        "total": results.len(),
        "success": results.len() - errors,
        "errors": errors,
        "results": results,
    }))
}

fn add_entry(doc: &mut Document, entry: JsonValue) -> Result<Map<String, JsonValue>, String> {
    if entry.get("object_type").and_then(JsonValue::as_str).is_none() {
        return Err("Missing 'object_type'".to_string());
    }
    let entry: AddObjectArgs = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    let fields = entry.fields.unwrap_or_default();
    let obj = doc
        .add(&entry.object_type, &entry.name, &fields)
        .map_err(|e| e.to_string())?;
    Ok(serialize_object_brief(obj, None))
}

/// Execute update_object tool.
pub fn execute_update_object(
    args: Option<JsonValue>,
    session: &mut Session,
) -> McpResult<JsonValue> {
    let args: UpdateObjectArgs = parse_args(args)?;
    if let Err(error) = lookup(session.require_model()?, &args.object_type, &args.name) {
        return Ok(error);
    }
    let doc = session.require_model_mut()?;
    let obj = doc.update_fields(&args.object_type, &args.name, &args.fields)?;
    Ok(serialize_object(obj))
}

/// Execute remove_object tool.
pub fn execute_remove_object(
    args: Option<JsonValue>,
    session: &mut Session,
) -> McpResult<JsonValue> {
    let args: RemoveObjectArgs = parse_args(args)?;
    let doc = session.require_model()?;
    let (obj_type, name) = match lookup(doc, &args.object_type, &args.name) {
        Ok(obj) => (obj.obj_type.clone(), obj.name.clone()),
        Err(error) => return Ok(error),
    };

    if !args.force {
        let referenced_by: Vec<JsonValue> = doc
            .get_referencing(&name)
            .into_iter()
            .filter(|o| !(o.obj_type == obj_type && o.is_named(&name)))
            .map(object_ref)
            .collect();
        if !referenced_by.is_empty() {
            return Ok(json!({
                "error": "Object is referenced by other objects. Use force=True to remove anyway.",
                "referenced_by": referenced_by,
            }));
        }
    }

    session.require_model_mut()?.remove(&obj_type, &name)?;
    info!("Removed {} '{}'", obj_type, name);
    Ok(json!({ "status": "removed", "object_type": obj_type, "name": name }))
}

/// Execute rename_object tool.
pub fn execute_rename_object(
    args: Option<JsonValue>,
    session: &mut Session,
) -> McpResult<JsonValue> {
    let args: RenameObjectArgs = parse_args(args)?;
    let obj_type = session
        .require_model()?
        .get(&args.object_type, &args.old_name)
        .map(|obj| obj.obj_type.clone())
        .ok_or_else(|| missing_object(&args.object_type, &args.old_name))?;

    let updated = session
        .require_model_mut()?
        .rename(&obj_type, &args.old_name, &args.new_name)?;

    Ok(json!({
        "status": "renamed",
        "object_type": obj_type,
        "old_name": args.old_name,
        "new_name": args.new_name.trim(),
        "references_updated": updated,
    }))
}

/// Execute duplicate_object tool.
pub fn execute_duplicate_object(
    args: Option<JsonValue>,
    session: &mut Session,
) -> McpResult<JsonValue> {
    let args: DuplicateObjectArgs = parse_args(args)?;
    if session.require_model()?.get(&args.object_type, &args.name).is_none() {
        return Err(missing_object(&args.object_type, &args.name).into());
    }
    let doc = session.require_model_mut()?;
    let copy = doc.copy_object(&args.object_type, &args.name, &args.new_name)?;
    Ok(serialize_object(copy))
}

fn missing_object(obj_type: &str, name: &str) -> IdfError {
    IdfError::not_found(format!("Object '{}' not found in '{}'", name, obj_type))
}

/// Execute save_model tool.
pub fn execute_save_model(args: Option<JsonValue>, session: &mut Session) -> McpResult<JsonValue> {
    let args: SaveModelArgs = parse_args(args)?;
    let path = match args.file_path.map(PathBuf::from).or_else(|| session.file_path.clone()) {
        Some(path) => path,
        None => {
            return Ok(json!({
                "error": "No file path specified and no original path available."
            }))
        }
    };

    let doc = session.require_model()?;
    let format = if args.output_format.eq_ignore_ascii_case("epjson") {
        epjson::save_epjson(doc, &path)?;
        "epjson"
    } else {
        idf::save_idf(doc, &path)?;
        "idf"
    };
    info!("Saved model to {} as {}", path.display(), format);

    let file_path = path.display().to_string();
    session.file_path = Some(path);
    Ok(json!({ "status": "saved", "file_path": file_path, "format": format }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{env, loaded_session};

    fn empty_session(env: &ToolEnv) -> Session {
        let mut session = Session::new();
        execute_new_model(None, &mut session, env).unwrap();
        session
    }

    #[test]
    fn test_new_model() {
        let env = env();
        let mut session = Session::new();
        let result = execute_new_model(Some(json!({"version": "24.1.0"})), &mut session, &env)
            .unwrap();
        assert_eq!(result, json!({"status": "created", "version": "24.1.0"}));
        assert_eq!(session.require_model().unwrap().len(), 0);
    }

    #[test]
    fn test_new_model_unknown_version() {
        let env = env();
        let mut session = Session::new();
        let result = execute_new_model(Some(json!({"version": "8.9.0"})), &mut session, &env);
        assert!(result.is_err());
        assert!(session.document.is_none());
    }

    #[test]
    fn test_add_object() {
        let env = env();
        let mut session = empty_session(&env);
        let args = json!({
            "object_type": "zone",
            "name": "Office",
            "fields": {"x_origin": 1.5, "multiplier": 2}
        });
        let result = execute_add_object(Some(args), &mut session).unwrap();
        assert_eq!(result["object_type"], "Zone");
        assert_eq!(result["name"], "Office");
        assert_eq!(result["x_origin"], 1.5);
    }

    #[test]
    fn test_add_object_invalid_field() {
        let env = env();
        let mut session = empty_session(&env);
        let args = json!({"object_type": "Zone", "name": "A", "fields": {"bogus_field": 1}});
        let err = execute_add_object(Some(args), &mut session).unwrap_err();
        assert_eq!(err.to_error_object()["error"], "Validation failed");
    }

    #[test]
    fn test_add_object_requires_model() {
        let mut session = Session::new();
        let args = json!({"object_type": "Zone", "name": "A"});
        assert!(execute_add_object(Some(args), &mut session).is_err());
    }

    #[test]
    fn test_batch_add_partial_failure() {
        let env = env();
        let mut session = empty_session(&env);
        let args = json!({"objects": [
            {"object_type": "Zone", "name": "A"},
            {"name": "NoType"},
            {"object_type": "Zone", "name": "a"},
            {"object_type": "Construction", "name": "Wall", "fields": {"outside_layer": "Brick"}},
        ]});
        let result = execute_batch_add_objects(Some(args), &mut session).unwrap();

        assert_eq!(result["total"], 4);
        assert_eq!(result["success"], 2);
        assert_eq!(result["errors"], 2);
        assert_eq!(result["results"][0], json!({"index": 0, "object_type": "Zone", "name": "A"}));
        assert_eq!(result["results"][1]["error"], "Missing 'object_type'");
        assert!(result["results"][2]["error"]
            .as_str()
            .unwrap()
            .contains("already exists"));
        assert_eq!(result["results"][3]["index"], 3);
        assert_eq!(session.require_model().unwrap().len(), 2);
    }

    #[test]
    fn test_update_object() {
        let env = env();
        let mut session = loaded_session(&env);
        let args = json!({"object_type": "Zone", "name": "Office", "fields": {"multiplier": 3}});
        let result = execute_update_object(Some(args), &mut session).unwrap();
        assert_eq!(result["multiplier"], 3);

        let args = json!({"object_type": "Zone", "name": "Attic", "fields": {}});
        let result = execute_update_object(Some(args), &mut session).unwrap();
        assert_eq!(result["error"], "Object 'Attic' not found in 'Zone'.");
    }

    #[test]
    fn test_remove_referenced_object() {
        let env = env();
        let mut session = loaded_session(&env);

        let args = json!({"object_type": "Zone", "name": "Office"});
        let result = execute_remove_object(Some(args), &mut session).unwrap();
        assert_eq!(
            result["error"],
            "Object is referenced by other objects. Use force=True to remove anyway."
        );
        assert_eq!(result["referenced_by"][0]["name"], "W1");
        assert!(session.require_model().unwrap().get("Zone", "Office").is_some());

        let args = json!({"object_type": "Zone", "name": "office", "force": true});
        let result = execute_remove_object(Some(args), &mut session).unwrap();
        assert_eq!(
            result,
            json!({"status": "removed", "object_type": "Zone", "name": "Office"})
        );
        assert!(session.require_model().unwrap().get("Zone", "Office").is_none());
    }

    #[test]
    fn test_remove_unreferenced_object() {
        let env = env();
        let mut session = loaded_session(&env);
        let args = json!({"object_type": "Zone", "name": "Lab"});
        let result = execute_remove_object(Some(args), &mut session).unwrap();
        assert_eq!(result["status"], "removed");
    }

    #[test]
    fn test_rename_updates_references() {
        let env = env();
        let mut session = loaded_session(&env);
        let args = json!({"object_type": "Zone", "old_name": "Office", "new_name": "Studio"});
        let result = execute_rename_object(Some(args), &mut session).unwrap();
        assert_eq!(result["status"], "renamed");
        assert_eq!(result["references_updated"], 1);

        let doc = session.require_model().unwrap();
        let surface = doc.get("BuildingSurface:Detailed", "W1").unwrap();
        assert_eq!(surface.get_str("zone_name"), Some("Studio"));
    }

    #[test]
    fn test_rename_and_duplicate_missing_object() {
        let env = env();
        let mut session = loaded_session(&env);

        let args = json!({"object_type": "Zone", "old_name": "Attic", "new_name": "Loft"});
        let err = execute_rename_object(Some(args), &mut session).unwrap_err();
        assert_eq!(
            err.to_error_object()["error"],
            "Not found: Object 'Attic' not found in 'Zone'"
        );

        // Also when the model has no objects of the type at all
        let args = json!({"object_type": "Schedule:Compact", "name": "Always", "new_name": "On"});
        let err = execute_duplicate_object(Some(args), &mut session).unwrap_err();
        assert_eq!(
            err.to_error_object()["error"],
            "Not found: Object 'Always' not found in 'Schedule:Compact'"
        );
        assert!(session.require_model().unwrap().get("Zone", "Loft").is_none());
    }

    #[test]
    fn test_duplicate_object() {
        let env = env();
        let mut session = loaded_session(&env);
        let args = json!({"object_type": "Material", "name": "Brick", "new_name": "Brick2"});
        let result = execute_duplicate_object(Some(args), &mut session).unwrap();
        assert_eq!(result["name"], "Brick2");
        assert_eq!(result["roughness"], "Rough");

        let args = json!({"object_type": "Material", "name": "Brick", "new_name": "brick2"});
        let err = execute_duplicate_object(Some(args), &mut session).unwrap_err();
        assert!(err.to_error_object()["error"]
            .as_str()
            .unwrap()
            .starts_with("Duplicate object"));
    }

    #[test]
    fn test_save_model_formats() {
        let env = env();
        let mut session = loaded_session(&env);
        let dir = tempfile::tempdir().unwrap();

        let result = execute_save_model(None, &mut session).unwrap();
        assert_eq!(
            result["error"],
            "No file path specified and no original path available."
        );

        let path = dir.path().join("out.epJSON");
        let args = json!({"file_path": path.to_str().unwrap(), "output_format": "epJSON"});
        let result = execute_save_model(Some(args), &mut session).unwrap();
        assert_eq!(result["format"], "epjson");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Office\""));

        // Falls back to the last saved path
        let result = execute_save_model(None, &mut session).unwrap();
        assert_eq!(result["status"], "saved");
        assert_eq!(result["file_path"], path.display().to_string());
        assert_eq!(result["format"], "idf");
    }
}
