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


//! Streamable HTTP transport.
//!
//! Each `POST` carries one JSON-RPC message and is answered with one JSON
//! response. Notifications are answered with `202 Accepted` and no body.
//! Requests share one server, so they are handled one at a time.

use crate::error::McpResult;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default endpoint when no mount path is configured.
pub const DEFAULT_MOUNT_PATH: &str = "/mcp";

type SharedServer = Arc<Mutex<McpServer>>;

/// Router exposing the server at `mount_path` (default `/mcp`).
pub fn router(server: McpServer, mount_path: Option<&str>) -> Router {
    let path = normalize_mount_path(mount_path);
    Router::new()
        .route(&path, post(handle_rpc))
        .with_state(Arc::new(Mutex::new(server)))
}

/// Listen on `host:port` until the process is stopped.
pub async fn serve(
    server: McpServer,
    host: &str,
    port: u16,
    mount_path: Option<&str>,
) -> McpResult<()> {
    let app = router(server, mount_path);
    let listener = TcpListener::bind((host, port)).await?;
    info!(
        "idfkit MCP Server listening on http://{}:{}{}",
        host,
        port,
        normalize_mount_path(mount_path)
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn normalize_mount_path(mount_path: Option<&str>) -> String {
    match mount_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{}", p),
        None => DEFAULT_MOUNT_PATH.to_string(),
    }
}

async fn handle_rpc(State(server): State<SharedServer>, body: String) -> Response {
    debug!("Received: {}", body);
    let request = match serde_json::from_str::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            let response =
                JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e), None);
            return Json(response).into_response();
        }
    };

    let response = server.lock().await.handle_request(request).await;
    match response {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
