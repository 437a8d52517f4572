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


//! MCP Server implementation.

use crate::error::McpResult;
use crate::protocol::*;
use crate::session::{Session, ToolEnv};
use crate::tools::{execute_tool, get_tools};
use crate::{SERVER_NAME, VERSION};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// MCP protocol revision spoken by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Guidance sent to clients in the `initialize` response.
pub const INSTRUCTIONS: &str = "EnergyPlus model editor powered by idfkit. Create, edit, validate, and simulate building energy models.

Guidelines:
- Use get_model_summary first to understand any loaded model
- Call describe_object_type before creating/editing objects to know valid fields
- Use batch_add_objects when creating multiple objects (minimizes round-trips)
- Validate after modifications with validate_model
- For reference fields, use get_available_references to see valid values
- Check references before removing objects (remove_object warns by default)";

/// MCP Server configuration.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name reported in protocol handshake.
    pub name: String,

    /// Server version reported in protocol handshake.
    pub version: String,

    /// Extra directory searched for `V<X-Y-Z>.schema.epJSON` files.
    pub schema_dir: Option<PathBuf>,

    /// EnergyPlus install directory. When unset, the standard locations and
    /// `ENERGYPLUS_DIR` are searched at simulation time.
    pub energyplus_dir: Option<PathBuf>,

    /// Station index CSV replacing the bundled one.
    pub station_index: Option<PathBuf>,

    /// URL of a station index CSV, downloaded once into the weather cache.
    /// Ignored when `station_index` is set.
    pub station_index_url: Option<String>,

    /// Where downloaded weather files are kept.
    pub weather_cache: Option<PathBuf>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: VERSION.to_string(),
            schema_dir: None,
            energyplus_dir: None,
            station_index: None,
            station_index_url: None,
            weather_cache: None,
        }
    }
}

/// MCP Server.
///
/// Owns the session, so requests are handled one at a time.
pub struct McpServer {
    config: McpServerConfig,
    initialized: bool,
    session: Session,
    env: ToolEnv,
}

impl McpServer {
    pub fn new(config: McpServerConfig) -> Self {
        let env = ToolEnv::new(&config);
        Self {
            config,
            initialized: false,
            session: Session::new(),
            env,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Serve line-delimited JSON-RPC on stdin/stdout until EOF.
    pub async fn run_stdio(&mut self) -> McpResult<()> {
        info!("idfkit MCP Server starting on stdio");
        let reader = BufReader::new(tokio::io::stdin());
        self.run(reader, tokio::io::stdout()).await
    }

    /// Serve one JSON-RPC message per line from `reader`, answering on
    /// `writer`.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }
                    debug!("Received: {}", message);

                    let response = match serde_json::from_str::<JsonRpcRequest>(message) {
                        Ok(request) => self.handle_request(request).await,
                        Err(e) => Some(JsonRpcResponse::error(
                            None,
                            -32700,
                            format!("Parse error: {}", e),
                            None,
                        )),
                    };

                    if let Some(response) = response {
                        let response_str = serde_json::to_string(&response)?;
                        debug!("Sending: {}", response_str);
                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;
                    }
                }
                Err(e) => {
                    error!("Read error: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one request. Notifications are processed but get no response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" | "notifications/initialized" => self.handle_initialized(id),
            "shutdown" => self.handle_shutdown(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::error(id, -32601, format!("Method not found: {}", method), None)
            }
        };

        (!notification).then_some(response)
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        -32602,
                        format!("Invalid params: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, -32602, "Missing params".to_string(), None);
            }
        };

        self.initialized = true;
        match &params.client_info {
            Some(client) => info!(
                "Server initialized for {} {} (protocol {})",
                client.name, client.version, params.protocol_version
            ),
            None => info!("Server initialized (protocol {})", params.protocol_version),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    fn handle_initialized(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("Client sent initialized notification");
        JsonRpcResponse::success(id, json!({}))
    }

    fn handle_shutdown(&mut self, id: Option<Value>) -> JsonRpcResponse {
        info!("Server shutting down");
        self.initialized = false;
        self.session.reset();
        JsonRpcResponse::success(id, json!({}))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ListToolsResult { tools: get_tools() };
        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_tools_call(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        -32602,
                        format!("Invalid params: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, -32602, "Missing params".to_string(), None);
            }
        };

        match execute_tool(&params.name, params.arguments, &mut self.session, &self.env).await {
            Ok(result) => JsonRpcResponse::from_serializable(id, &result),
            // Only an unknown tool reaches here; tool failures are results
            Err(e) => {
                warn!("Tool call rejected: {}", e);
                JsonRpcResponse::error(id, e.code(), e.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::new(McpServerConfig::default())
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(Some(json!(id)), method, params)
    }

    fn initialize_params() -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        })
    }

    #[tokio::test]
    async fn test_initialize() {
        let mut server = server();
        let response = server
            .handle_request(request(1, "initialize", Some(initialize_params())))
            .await
            .unwrap();

        assert!(server.is_initialized());
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "idfkit");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(result["instructions"]
            .as_str()
            .unwrap()
            .starts_with("EnergyPlus model editor powered by idfkit."));
    }

    #[tokio::test]
    async fn test_initialize_missing_params() {
        let mut server = server();
        let response = server
            .handle_request(request(1, "initialize", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
        assert!(!server.is_initialized());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let mut server = server();
        let notification = JsonRpcRequest::new(None, "notifications/initialized", None);
        assert!(server.handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let response = server
            .handle_request(request(3, "resources/list", None))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let mut server = server();
        let response = server
            .handle_request(request(2, "tools/list", None))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 27);
    }

    #[tokio::test]
    async fn test_tools_call_keeps_session() {
        let mut server = server();
        let call = |id: i64, name: &str, args: Value| {
            request(id, "tools/call", Some(json!({"name": name, "arguments": args})))
        };

        let response = server
            .handle_request(call(1, "new_model", json!({})))
            .await
            .unwrap();
        assert!(response.error.is_none());

        server
            .handle_request(call(2, "add_object", json!({"object_type": "Zone", "name": "Office"})))
            .await
            .unwrap();
        assert_eq!(server.session().require_model().unwrap().len(), 1);

        let response = server
            .handle_request(call(3, "get_object", json!({"object_type": "Zone", "name": "Nope"})))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Object 'Nope' not found in 'Zone'."));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let mut server = server();
        let params = json!({"name": "read_idd", "arguments": {}});
        let response = server
            .handle_request(request(4, "tools/call", Some(params)))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Tool not found: read_idd");
    }

    #[tokio::test]
    async fn test_shutdown_resets_session() {
        let mut server = server();
        let params = json!({"name": "new_model", "arguments": {}});
        server
            .handle_request(request(1, "tools/call", Some(params)))
            .await
            .unwrap();
        assert!(server.session().document.is_some());

        server.handle_request(request(2, "shutdown", None)).await.unwrap();
        assert!(server.session().document.is_none());
    }

    #[tokio::test]
    async fn test_run_line_protocol() {
        let mut server = server();
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
            "\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "not json\n",
        );
        let mut output = Vec::new();
        server.run(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
        assert_eq!(lines[1]["error"]["code"], -32700);
    }
}
