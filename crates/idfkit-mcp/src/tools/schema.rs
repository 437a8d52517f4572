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


//! Schema exploration tools. These work without a loaded model.

use crate::error::McpResult;
use crate::serializers::serialize_object_description;
use crate::session::{Session, ToolEnv};
use crate::tools::helpers::{contains_lower, parse_args};
use crate::tools::types::{
    AvailableReferencesArgs, DescribeObjectTypeArgs, ListObjectTypesArgs, SearchSchemaArgs,
};
use idfkit_core::describe_object_type;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};

const UNGROUPED: &str = "Ungrouped";
const MEMO_PREVIEW_CHARS: usize = 200;

/// Execute list_object_types tool.
pub fn execute_list_object_types(
    args: Option<JsonValue>,
    session: &Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: ListObjectTypesArgs = parse_args(args)?;
    let schema = env.schema_for(session, args.version.as_deref())?;

    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for obj_type in schema.object_types() {
        let group = schema.get_group(obj_type).unwrap_or(UNGROUPED);
        if let Some(wanted) = &args.group {
            if !group.eq_ignore_ascii_case(wanted) {
                continue;
            }
        }
        groups.entry(group).or_default().push(obj_type);
    }

    let total: usize = groups.values().map(Vec::len).sum();
    let groups: Map<String, JsonValue> = groups
        .into_iter()
        .map(|(g, types)| (g.to_string(), json!({ "count": types.len(), "types": types })))
        .collect();

    Ok(json!({ "total_types": total, "groups": groups }))
}

/// Execute describe_object_type tool.
pub fn execute_describe_object_type(
    args: Option<JsonValue>,
    session: &Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: DescribeObjectTypeArgs = parse_args(args)?;
    let schema = env.schema_for(session, args.version.as_deref())?;
    let desc = describe_object_type(&schema, &args.object_type)?;
    Ok(serialize_object_description(&desc))
}

/// Execute search_schema tool.
pub fn execute_search_schema(
    args: Option<JsonValue>,
    session: &Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: SearchSchemaArgs = parse_args(args)?;
    let schema = env.schema_for(session, args.version.as_deref())?;
    let query = args.query.to_lowercase();

    let matches: Vec<JsonValue> = schema
        .object_types()
        .filter_map(|obj_type| {
            let memo = schema.get_object_memo(obj_type).unwrap_or("");
            if !contains_lower(obj_type, &query) && !contains_lower(memo, &query) {
                return None;
            }
            let preview = (!memo.is_empty())
                .then(|| memo.chars().take(MEMO_PREVIEW_CHARS).collect::<String>());
            Some(json!({
                "object_type": obj_type,
                "group": schema.get_group(obj_type).unwrap_or(UNGROUPED),
                "memo": preview,
            }))
        })
        .collect();

    Ok(json!({ "query": args.query, "count": matches.len(), "matches": matches }))
}

/// Execute get_available_references tool.
pub fn execute_get_available_references(
    args: Option<JsonValue>,
    session: &Session,
) -> McpResult<JsonValue> {
    let args: AvailableReferencesArgs = parse_args(args)?;
    let doc = session.require_model()?;
    let schema = session.require_schema()?;

    let object_lists = schema.get_field_object_list(&args.object_type, &args.field_name);
    if object_lists.is_empty() {
        return Ok(json!({
            "error": format!(
                "Field '{}' on '{}' is not a reference field.",
                args.field_name, args.object_type
            )
        }));
    }

    let mut by_list = Map::new();
    let mut all_names = BTreeSet::new();
    for list in object_lists {
        let mut names: Vec<&str> = schema
            .get_types_providing_reference(list)
            .iter()
            .filter_map(|provider| doc.collection(provider))
            .flatten()
            .filter(|obj| !obj.name.is_empty())
            .map(|obj| obj.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        names.sort_unstable();
        all_names.extend(names.iter().copied());
        by_list.insert(list.clone(), json!(names));
    }

    Ok(json!({
        "object_type": args.object_type,
        "field_name": args.field_name,
        "available_names": all_names.into_iter().collect::<Vec<_>>(),
        "by_reference_list": by_list,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{env, loaded_session};

    #[test]
    fn test_list_object_types() {
        let env = env();
        let session = Session::new();
        let result = execute_list_object_types(None, &session, &env).unwrap();
        let groups = result["groups"].as_object().unwrap();

        let keys: Vec<&String> = groups.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let zones = &groups["Thermal Zones and Surfaces"];
        assert!(zones["types"].as_array().unwrap().contains(&json!("Zone")));
        let total: u64 = groups.values().map(|g| g["count"].as_u64().unwrap()).sum();
        assert_eq!(result["total_types"].as_u64().unwrap(), total);
    }

    #[test]
    fn test_list_object_types_group_filter() {
        let env = env();
        let session = Session::new();
        let args = json!({ "group": "schedules" });
        let result = execute_list_object_types(Some(args), &session, &env).unwrap();
        let groups = result["groups"].as_object().unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("Schedules"));
    }

    #[test]
    fn test_list_object_types_bad_version() {
        let env = env();
        let session = Session::new();
        let err = execute_list_object_types(Some(json!({"version": "24"})), &session, &env)
            .unwrap_err();
        assert!(err.to_error_object()["error"]
            .as_str()
            .unwrap()
            .starts_with("ValueError"));
    }

    #[test]
    fn test_describe_object_type() {
        let env = env();
        let session = Session::new();
        let result =
            execute_describe_object_type(Some(json!({"object_type": "Zone"})), &session, &env)
                .unwrap();
        assert_eq!(result["object_type"], "Zone");
        assert_eq!(result["has_name"], true);

        let err = execute_describe_object_type(
            Some(json!({"object_type": "NotAType"})),
            &session,
            &env,
        )
        .unwrap_err();
        assert!(err.to_error_object()["error"]
            .as_str()
            .unwrap()
            .starts_with("Unknown object type"));
    }

    #[test]
    fn test_search_schema() {
        let env = env();
        let session = Session::new();
        let result =
            execute_search_schema(Some(json!({"query": "SURFACE"})), &session, &env).unwrap();
        let types: Vec<&str> = result["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["object_type"].as_str().unwrap())
            .collect();
        assert!(types.contains(&"BuildingSurface:Detailed"));
        assert!(types.contains(&"FenestrationSurface:Detailed"));
        assert_eq!(result["count"].as_u64().unwrap() as usize, types.len());
    }

    #[test]
    fn test_available_references() {
        let env = env();
        let session = loaded_session(&env);
        let args = json!({"object_type": "BuildingSurface:Detailed", "field_name": "zone_name"});
        let result = execute_get_available_references(Some(args), &session).unwrap();
        assert_eq!(result["available_names"], json!(["Lab", "Office"]));
        assert_eq!(result["by_reference_list"]["ZoneNames"], json!(["Lab", "Office"]));

        let args = json!({"object_type": "Zone", "field_name": "x_origin"});
        let result = execute_get_available_references(Some(args), &session).unwrap();
        assert_eq!(
            result["error"],
            "Field 'x_origin' on 'Zone' is not a reference field."
        );
    }

    #[test]
    fn test_available_references_requires_model() {
        let session = Session::new();
        let args = json!({"object_type": "Zone", "field_name": "x_origin"});
        let err = execute_get_available_references(Some(args), &session).unwrap_err();
        assert_eq!(
            err.to_error_object()["error"],
            "No model loaded. Use load_model or new_model first."
        );
    }
}
