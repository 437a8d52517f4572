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


//! End-to-end tests driving the server through JSON-RPC requests.

use idfkit_mcp::{JsonRpcRequest, JsonRpcResponse, McpServer, McpServerConfig, PROTOCOL_VERSION};
use serde_json::{json, Value};
use tempfile::TempDir;

fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest::new(Some(json!(id)), method, Some(params))
}

async fn call(server: &mut McpServer, name: &str, arguments: Value) -> (Value, bool) {
    let response = server
        .handle_request(request(1, "tools/call", json!({"name": name, "arguments": arguments})))
        .await
        .expect("tools/call must respond");
    tool_payload(response)
}

fn tool_payload(response: JsonRpcResponse) -> (Value, bool) {
    assert!(response.error.is_none(), "unexpected error: {:?}", response.error);
    let result = response.result.expect("result");
    let is_error = result["isError"].as_bool().unwrap_or(false);
    let text = result["content"][0]["text"].as_str().expect("text content");
    (serde_json::from_str(text).expect("tool output is JSON"), is_error)
}

fn material() -> Value {
    json!({
        "object_type": "Material",
        "name": "Brick",
        "fields": {
            "roughness": "Rough",
            "thickness": 0.1,
            "conductivity": 0.9,
            "density": 1900,
            "specific_heat": 800
        }
    })
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let mut server = McpServer::new(McpServerConfig::default());

    let response = server
        .handle_request(request(
            1,
            "initialize",
            json!({"protocolVersion": PROTOCOL_VERSION, "capabilities": {}}),
        ))
        .await
        .unwrap();
    let result = response.result.unwrap();
    assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(result["serverInfo"]["name"], "idfkit");
    assert!(server.is_initialized());

    let notification = JsonRpcRequest::new(None, "notifications/initialized", None);
    assert!(server.handle_request(notification).await.is_none());

    let response = server.handle_request(request(2, "tools/list", json!({}))).await.unwrap();
    let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
    assert_eq!(tools, 27);
}

#[tokio::test]
async fn test_build_validate_save_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("office.idf");
    let mut server = McpServer::new(McpServerConfig::default());

    let (created, is_error) = call(&mut server, "new_model", json!({})).await;
    assert!(!is_error);
    assert_eq!(created["status"], "created");

    let (batch, _) = call(
        &mut server,
        "batch_add_objects",
        json!({"objects": [
            {"object_type": "Zone", "name": "Office"},
            material(),
            {"object_type": "Construction", "name": "Wall", "fields": {"outside_layer": "Brick"}},
        ]}),
    )
    .await;
    assert_eq!(batch["success"], 3);
    assert_eq!(batch["errors"], 0);

    let (validation, _) = call(&mut server, "validate_model", json!({})).await;
    assert_eq!(validation["is_valid"], true);
    assert_eq!(validation["error_count"], 0);

    let (refs, _) = call(&mut server, "get_references", json!({"name": "Brick"})).await;
    assert_eq!(refs["referenced_by_count"], 1);
    assert_eq!(refs["referenced_by"][0]["object_type"], "Construction");

    let (saved, _) = call(
        &mut server,
        "save_model",
        json!({"file_path": path.to_str().unwrap()}),
    )
    .await;
    assert_eq!(saved["status"], "saved");
    assert_eq!(saved["format"], "idf");
    assert!(path.exists());

    // A fresh server sees the saved file
    let mut reader = McpServer::new(McpServerConfig::default());
    let (summary, is_error) = call(
        &mut reader,
        "load_model",
        json!({"file_path": path.to_str().unwrap()}),
    )
    .await;
    assert!(!is_error, "{}", summary);
    assert_eq!(summary["zone_count"], 1);

    let (obj, _) = call(
        &mut reader,
        "get_object",
        json!({"object_type": "Construction", "name": "Wall"}),
    )
    .await;
    assert_eq!(obj["outside_layer"], "Brick");
}

#[tokio::test]
async fn test_rename_propagates_and_remove_guard() {
    let mut server = McpServer::new(McpServerConfig::default());
    call(&mut server, "new_model", json!({})).await;
    call(&mut server, "add_object", material()).await;
    call(
        &mut server,
        "add_object",
        json!({"object_type": "Construction", "name": "Wall", "fields": {"outside_layer": "Brick"}}),
    )
    .await;

    let (renamed, _) = call(
        &mut server,
        "rename_object",
        json!({"object_type": "Material", "old_name": "Brick", "new_name": "Clay Brick"}),
    )
    .await;
    assert_eq!(renamed["status"], "renamed");
    assert_eq!(renamed["references_updated"], 1);

    let (wall, _) = call(
        &mut server,
        "get_object",
        json!({"object_type": "Construction", "name": "Wall"}),
    )
    .await;
    assert_eq!(wall["outside_layer"], "Clay Brick");

    let (blocked, is_error) = call(
        &mut server,
        "remove_object",
        json!({"object_type": "Material", "name": "Clay Brick"}),
    )
    .await;
    assert!(is_error);
    assert_eq!(blocked["referenced_by"][0]["name"], "Wall");

    let (removed, _) = call(
        &mut server,
        "remove_object",
        json!({"object_type": "Material", "name": "Clay Brick", "force": true}),
    )
    .await;
    assert_eq!(removed["status"], "removed");

    let (dangling, _) = call(&mut server, "check_references", json!({})).await;
    assert_eq!(dangling["dangling_count"], 1);
    assert_eq!(dangling["dangling_references"][0]["missing_target"], "Clay Brick");
}

#[tokio::test]
async fn test_tools_report_missing_model() {
    let mut server = McpServer::new(McpServerConfig::default());

    let (result, is_error) = call(&mut server, "list_objects", json!({"object_type": "Zone"})).await;
    assert!(is_error);
    assert_eq!(
        result["error"],
        "No model loaded. Use load_model or new_model first."
    );

    let (result, is_error) = call(&mut server, "get_results_summary", json!({})).await;
    assert!(is_error);
    assert!(result["error"].as_str().unwrap().contains("run_simulation"));
}

#[tokio::test]
async fn test_shutdown_clears_session() {
    let mut server = McpServer::new(McpServerConfig::default());
    call(&mut server, "new_model", json!({})).await;
    assert!(server.session().document.is_some());

    let response = server.handle_request(request(9, "shutdown", json!({}))).await.unwrap();
    assert!(response.error.is_none());
    assert!(server.session().document.is_none());
    assert!(!server.is_initialized());
}

#[tokio::test]
async fn test_protocol_errors() {
    let mut server = McpServer::new(McpServerConfig::default());

    let response = server
        .handle_request(request(3, "tools/call", json!({"name": "no_such_tool"})))
        .await
        .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "Tool not found: no_such_tool");

    let response = server.handle_request(request(4, "resources/list", json!({}))).await.unwrap();
    assert_eq!(response.error.unwrap().message, "Method not found: resources/list");

    let response = server
        .handle_request(JsonRpcRequest::new(Some(json!(5)), "tools/call", None))
        .await
        .unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}
