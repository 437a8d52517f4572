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


//! idfkit tools for the MCP server.
//!
//! Available tools:
//! - Schema: `list_object_types`, `describe_object_type`, `search_schema`,
//!   `get_available_references`
//! - Read: `load_model`, `get_model_summary`, `list_objects`, `get_object`,
//!   `search_objects`, `get_references`
//! - Write: `new_model`, `add_object`, `batch_add_objects`, `update_object`,
//!   `remove_object`, `rename_object`, `duplicate_object`, `save_model`
//! - Validation: `validate_model`, `check_references`
//! - Simulation: `run_simulation`, `get_results_summary`,
//!   `list_output_variables`, `query_timeseries`, `export_timeseries`
//! - Weather: `search_weather_stations`, `download_weather_file`

mod helpers;
#[macro_use]
mod schema_macros;
mod read;
mod schema;
mod simulation;
mod types;
mod validation;
mod weather;
mod write;

pub use read::{
    execute_get_model_summary, execute_get_object, execute_get_references, execute_list_objects,
    execute_load_model, execute_search_objects,
};
pub use schema::{
    execute_describe_object_type, execute_get_available_references, execute_list_object_types,
    execute_search_schema,
};
pub use simulation::{
    execute_export_timeseries, execute_get_results_summary, execute_list_output_variables,
    execute_query_timeseries, execute_run_simulation,
};
pub use validation::{execute_check_references, execute_validate_model};
pub use weather::{execute_download_weather_file, execute_search_weather_stations};
pub use write::{
    execute_add_object, execute_batch_add_objects, execute_duplicate_object, execute_new_model,
    execute_remove_object, execute_rename_object, execute_save_model, execute_update_object,
};

use crate::error::{McpError, McpResult};
use crate::protocol::{CallToolResult, Tool};
use crate::session::{Session, ToolEnv};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

fn tool(name: &str, description: &str, input_schema: JsonValue) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Get all available idfkit tools.
pub fn get_tools() -> Vec<Tool> {
    let object_type = || schema_string!("EnergyPlus object type, e.g. 'Zone' or 'BuildingSurface:Detailed'");
    let object_name = || schema_string!("Name of the object");
    let environment = || {
        schema_enum!(
            ["sizing", "annual"],
            "Only read data from design-day ('sizing') or weather-file ('annual') periods"
        )
    };

    vec![
        // Schema
        tool(
            "list_object_types",
            "List available EnergyPlus object types grouped by category.",
            tool_schema! {
                required: [],
                properties: {
                    group: schema_string!("Only list types in this group, e.g. 'Thermal Zones and Surfaces'"),
                    version: version_arg!()
                }
            },
        ),
        tool(
            "describe_object_type",
            "Get the field schema for an object type: field names, types, defaults, units, constraints and references. Call this before creating or editing objects.",
            tool_schema! {
                required: ["object_type"],
                properties: {
                    object_type: object_type(),
                    version: version_arg!()
                }
            },
        ),
        tool(
            "search_schema",
            "Search object types by name or description.",
            tool_schema! {
                required: ["query"],
                properties: {
                    query: schema_string!("Case-insensitive text to look for"),
                    version: version_arg!()
                }
            },
        ),
        tool(
            "get_available_references",
            "List the object names in the loaded model that a reference field may point to.",
            tool_schema! {
                required: ["object_type", "field_name"],
                properties: {
                    object_type: object_type(),
                    field_name: schema_string!("Reference field, e.g. 'zone_name'")
                }
            },
        ),
        // Read
        tool(
            "load_model",
            "Load an IDF or epJSON model from disk. Replaces the current model and returns its summary.",
            tool_schema! {
                required: ["file_path"],
                properties: {
                    file_path: schema_string!("Path to a .idf, .epJSON or .json file"),
                    version: schema_string!("Override the EnergyPlus version as 'X.Y.Z' (default: read from the file)")
                }
            },
        ),
        tool(
            "get_model_summary",
            "Summarise the loaded model: version, object counts by group and zone count.",
            tool_schema!(),
        ),
        tool(
            "list_objects",
            "List objects of one type with their required fields.",
            tool_schema! {
                required: ["object_type"],
                properties: {
                    object_type: object_type(),
                    limit: limit_arg!(50)
                }
            },
        ),
        tool(
            "get_object",
            "Get every field of one object.",
            tool_schema! {
                required: ["object_type", "name"],
                properties: {
                    object_type: object_type(),
                    name: object_name()
                }
            },
        ),
        tool(
            "search_objects",
            "Find objects whose name or any text field contains the query (case-insensitive).",
            tool_schema! {
                required: ["query"],
                properties: {
                    query: schema_string!("Text to look for"),
                    object_type: schema_string!("Only search objects of this type"),
                    limit: limit_arg!(20)
                }
            },
        ),
        tool(
            "get_references",
            "Show which objects refer to a name and which names the matching object refers to.",
            tool_schema! {
                required: ["name"],
                properties: {
                    name: object_name()
                }
            },
        ),
        // Write
        tool(
            "new_model",
            "Create an empty model. Replaces the current model.",
            tool_schema! {
                required: [],
                properties: {
                    version: schema_string!("EnergyPlus version as 'X.Y.Z' (default: latest)")
                }
            },
        ),
        tool(
            "add_object",
            "Add one object to the model. Field values are checked against the schema.",
            tool_schema! {
                required: ["object_type"],
                properties: {
                    object_type: object_type(),
                    name: schema_string!("Object name (omit for unnamed types)", default: ""),
                    fields: schema_object!("Field values keyed by field name, e.g. {\"x_origin\": 0}")
                }
            },
        ),
        tool(
            "batch_add_objects",
            "Add several objects in one call. Each entry is added independently; failures are reported per entry.",
            tool_schema! {
                required: ["objects"],
                properties: {
                    objects: schema_object_array!(
                        "Objects to add, in order",
                        required: ["object_type"],
                        properties: {
                            object_type: object_type(),
                            name: schema_string!("Object name"),
                            fields: schema_object!("Field values keyed by field name")
                        }
                    )
                }
            },
        ),
        tool(
            "update_object",
            "Set fields on an existing object. Null or empty values clear a field.",
            tool_schema! {
                required: ["object_type", "name", "fields"],
                properties: {
                    object_type: object_type(),
                    name: object_name(),
                    fields: schema_object!("Field values to set, keyed by field name")
                }
            },
        ),
        tool(
            "remove_object",
            "Remove an object. Refuses when other objects refer to it unless force is set.",
            tool_schema! {
                required: ["object_type", "name"],
                properties: {
                    object_type: object_type(),
                    name: object_name(),
                    force: schema_bool!("Remove even if the object is referenced", default: false)
                }
            },
        ),
        tool(
            "rename_object",
            "Rename an object and update every reference to it.",
            tool_schema! {
                required: ["object_type", "old_name", "new_name"],
                properties: {
                    object_type: object_type(),
                    old_name: schema_string!("Current name"),
                    new_name: schema_string!("New name")
                }
            },
        ),
        tool(
            "duplicate_object",
            "Copy an object under a new name.",
            tool_schema! {
                required: ["object_type", "name", "new_name"],
                properties: {
                    object_type: object_type(),
                    name: object_name(),
                    new_name: schema_string!("Name of the copy")
                }
            },
        ),
        tool(
            "save_model",
            "Write the model to disk as IDF or epJSON.",
            tool_schema! {
                required: [],
                properties: {
                    file_path: schema_string!("Destination path (default: the path the model was loaded from or last saved to)"),
                    output_format: schema_enum!(["idf", "epjson"], "File format", default: "idf")
                }
            },
        ),
        // Validation
        tool(
            "validate_model",
            "Validate the loaded model against the EnergyPlus schema.",
            tool_schema! {
                required: [],
                properties: {
                    object_types: schema_string_array!("Only validate these types (default: all)"),
                    check_references: schema_bool!("Check that reference fields name existing objects", default: true)
                }
            },
        ),
        tool(
            "check_references",
            "List reference fields that name objects missing from the model.",
            tool_schema!(),
        ),
        // Simulation
        tool(
            "run_simulation",
            "Run EnergyPlus on the loaded model. Uses the downloaded weather file when none is given.",
            tool_schema! {
                required: [],
                properties: {
                    weather_file: schema_string!("Path to an EPW weather file"),
                    design_day: schema_bool!("Only simulate design days", default: false),
                    annual: schema_bool!("Run a full annual weather-file simulation", default: false)
                }
            },
        ),
        tool(
            "get_results_summary",
            "Summarise the last simulation: diagnostics, error messages and report tables.",
            tool_schema!(),
        ),
        tool(
            "list_output_variables",
            "List output variables and meters reported by the last simulation.",
            tool_schema! {
                required: [],
                properties: {
                    search: schema_string!("Regular expression matched against names (case-insensitive)"),
                    limit: limit_arg!(50)
                }
            },
        ),
        tool(
            "query_timeseries",
            "Read one output variable's time series from the last simulation's SQLite output.",
            tool_schema! {
                required: ["variable_name"],
                properties: {
                    variable_name: schema_string!("Variable or meter name, e.g. 'Zone Mean Air Temperature'"),
                    key_value: schema_string!("Key such as a zone name (default: first available)"),
                    frequency: schema_string!("Reporting frequency, e.g. 'Hourly'"),
                    environment: environment(),
                    limit: limit_arg!(500)
                }
            },
        ),
        tool(
            "export_timeseries",
            "Write one output variable's time series to a CSV file.",
            tool_schema! {
                required: ["variable_name", "file_path"],
                properties: {
                    variable_name: schema_string!("Variable or meter name"),
                    file_path: schema_string!("Destination CSV path"),
                    key_value: schema_string!("Key such as a zone name (default: first available)"),
                    frequency: schema_string!("Reporting frequency, e.g. 'Hourly'"),
                    environment: environment()
                }
            },
        ),
        // Weather
        tool(
            "search_weather_stations",
            "Search weather stations by text or find the nearest ones to a coordinate.",
            tool_schema! {
                required: [],
                properties: {
                    query: schema_string!("City, airport or WMO number"),
                    latitude: schema_number!("Latitude for nearest-station search", minimum: -90.0, maximum: 90.0),
                    longitude: schema_number!("Longitude for nearest-station search", minimum: -180.0, maximum: 180.0),
                    country: schema_string!("Country code filter, e.g. 'USA'"),
                    limit: limit_arg!(10)
                }
            },
        ),
        tool(
            "download_weather_file",
            "Download the EPW and DDY files for a station and remember the EPW for run_simulation.",
            tool_schema! {
                required: [],
                properties: {
                    wmo: schema_string!("WMO station number"),
                    query: schema_string!("Search text; the best match is downloaded"),
                    country: schema_string!("Country code filter, e.g. 'USA'")
                }
            },
        ),
    ]
}

/// Run a tool by name and return its JSON result.
///
/// Unknown names fail with [`McpError::ToolNotFound`]; every other failure
/// is returned as an `Err` for the caller to report.
pub async fn call_tool(
    name: &str,
    arguments: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    match name {
        "list_object_types" => execute_list_object_types(arguments, session, env),
        "describe_object_type" => execute_describe_object_type(arguments, session, env),
        "search_schema" => execute_search_schema(arguments, session, env),
        "get_available_references" => execute_get_available_references(arguments, session),
        "load_model" => execute_load_model(arguments, session, env),
        "get_model_summary" => execute_get_model_summary(session),
        "list_objects" => execute_list_objects(arguments, session),
        "get_object" => execute_get_object(arguments, session),
        "search_objects" => execute_search_objects(arguments, session),
        "get_references" => execute_get_references(arguments, session),
        "new_model" => execute_new_model(arguments, session, env),
        "add_object" => execute_add_object(arguments, session),
        "batch_add_objects" => execute_batch_add_objects(arguments, session),
        "update_object" => execute_update_object(arguments, session),
        "remove_object" => execute_remove_object(arguments, session),
        "rename_object" => execute_rename_object(arguments, session),
        "duplicate_object" => execute_duplicate_object(arguments, session),
        "save_model" => execute_save_model(arguments, session),
        "validate_model" => execute_validate_model(arguments, session),
        "check_references" => execute_check_references(session),
        "run_simulation" => execute_run_simulation(arguments, session, env).await,
        "get_results_summary" => execute_get_results_summary(session),
        "list_output_variables" => execute_list_output_variables(arguments, session),
        "query_timeseries" => execute_query_timeseries(arguments, session),
        "export_timeseries" => execute_export_timeseries(arguments, session),
        "search_weather_stations" => execute_search_weather_stations(arguments, env).await,
        "download_weather_file" => execute_download_weather_file(arguments, session, env).await,
        _ => Err(McpError::ToolNotFound(name.to_string())),
    }
}

/// Execute a tool by name.
///
/// Tool failures become `{"error": ...}` results flagged with `isError`.
pub async fn execute_tool(
    name: &str,
    arguments: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<CallToolResult> {
    debug!("Calling tool {}", name);
    let value = match call_tool(name, arguments, session, env).await {
        Ok(value) => value,
        Err(e @ McpError::ToolNotFound(_)) => return Err(e),
        Err(e) => {
            warn!("Tool {} failed: {}", name, e);
            e.to_error_object()
        }
    };
    Ok(CallToolResult::from_value(&value))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::server::McpServerConfig;
    use crate::session::{Session, ToolEnv};
    use idfkit_core::idf::parse_idf;
    use std::path::PathBuf;

    pub const MODEL: &str = r#"
Version,24.1;
Building,HQ,0,City;
GlobalGeometryRules,UpperLeftCorner,Counterclockwise,Relative;
Material,Brick,Rough,0.1,0.9,1900,800;
Construction,Wall,Brick;
Zone,Office;
Zone,Lab;
BuildingSurface:Detailed,W1,Wall,Wall,Office,Outdoors,,SunExposed,WindExposed,,4,
  0,0,3, 0,0,0, 5,0,0, 5,0,3;
"#;

    /// The five-station CSV the weather tests are written against.
    pub fn fixture_stations() -> PathBuf {
        PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../idfkit-weather/tests/fixtures/stations.csv"
        ))
    }

    pub fn env() -> ToolEnv {
        ToolEnv::new(&McpServerConfig {
            station_index: Some(fixture_stations()),
            ..McpServerConfig::default()
        })
    }

    /// A session holding [`MODEL`].
    pub fn loaded_session(env: &ToolEnv) -> Session {
        let doc = parse_idf(MODEL, None, env.registry()).unwrap();
        let mut session = Session::new();
        session.set_model(doc, None);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{env, loaded_session};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_tools_returns_all_tools() {
        let tools = get_tools();
        assert_eq!(tools.len(), 27);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        for expected in [
            "list_object_types",
            "describe_object_type",
            "get_available_references",
            "load_model",
            "batch_add_objects",
            "save_model",
            "validate_model",
            "check_references",
            "run_simulation",
            "query_timeseries",
            "export_timeseries",
            "download_weather_file",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_tool_schemas_valid() {
        for tool in get_tools() {
            assert!(!tool.description.is_empty(), "Tool {} has empty description", tool.name);
            assert_eq!(
                tool.input_schema["type"], "object",
                "Tool {} missing object type",
                tool.name
            );
            assert!(
                tool.input_schema.get("properties").is_some(),
                "Tool {} missing properties",
                tool.name
            );
        }
    }

    #[test]
    fn test_required_arguments_are_declared() {
        let tools = get_tools();
        let get_object = tools.iter().find(|t| t.name == "get_object").unwrap();
        assert_eq!(get_object.input_schema["required"], json!(["object_type", "name"]));
        let batch = tools.iter().find(|t| t.name == "batch_add_objects").unwrap();
        assert_eq!(
            batch.input_schema["properties"]["objects"]["items"]["required"],
            json!(["object_type"])
        );
    }

    #[tokio::test]
    async fn test_execute_tool_unknown() {
        let env = env();
        let mut session = Session::new();
        let result = execute_tool("unknown_tool", None, &mut session, &env).await;

        if let Err(McpError::ToolNotFound(name)) = result {
            assert_eq!(name, "unknown_tool");
        } else {
            panic!("Expected ToolNotFound error");
        }
    }

    #[tokio::test]
    async fn test_execute_tool_wraps_errors() {
        let env = env();
        let mut session = Session::new();
        let result = execute_tool("get_model_summary", None, &mut session, &env)
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.json().unwrap(),
            json!({"error": "No model loaded. Use load_model or new_model first."})
        );
    }

    #[tokio::test]
    async fn test_execute_tool_success() {
        let env = env();
        let mut session = loaded_session(&env);
        let args = json!({"object_type": "Zone"});
        let result = execute_tool("list_objects", Some(args), &mut session, &env)
            .await
            .unwrap();
        assert_eq!(result.is_error, None);
        assert_eq!(result.json().unwrap()["total"], 2);
    }
}
