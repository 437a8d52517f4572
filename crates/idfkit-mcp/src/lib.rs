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


//! idfkit Model Context Protocol (MCP) Server
//!
//! Exposes EnergyPlus model authoring to AI/LLM clients over JSON-RPC 2.0.
//! Tools are grouped as:
//!
//! - **Schema**: browse object types and their fields without a model
//! - **Read**: load a model, summarise it, list, get and search objects
//! - **Write**: create models, add, update, remove, rename and save objects
//! - **Validation**: schema validation and dangling reference checks
//! - **Simulation**: run EnergyPlus and inspect diagnostics, tables and
//!   time series
//! - **Weather**: find stations and download EPW/DDY files
//!
//! A [`McpServer`] owns one [`Session`] holding the active model. Requests
//! arrive over stdio (one JSON message per line) or HTTP (see [`http`]).

mod error;
pub mod http;
mod protocol;
pub mod serializers;
mod server;
mod session;
pub mod tools;

pub use error::{McpError, McpResult};
pub use protocol::*;
pub use server::{McpServer, McpServerConfig, INSTRUCTIONS, PROTOCOL_VERSION};
pub use session::{Session, ToolEnv};
pub use tools::{call_tool, execute_tool, get_tools};

/// MCP Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "idfkit";
