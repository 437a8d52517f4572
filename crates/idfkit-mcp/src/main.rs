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


//! idfkit MCP Server binary.
//!
//! # Usage
//!
//! ```bash
//! # stdio transport, for clients that spawn the server
//! idfkit-mcp
//!
//! # HTTP transport on 127.0.0.1:8000/mcp
//! idfkit-mcp --transport streamable-http --port 8000
//!
//! # Point at an EnergyPlus install and log debug output
//! RUST_LOG=debug idfkit-mcp --energyplus-dir /usr/local/EnergyPlus-24-1-0
//! ```

use clap::{Parser, ValueEnum};
use idfkit_mcp::{http, McpServer, McpServerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    StreamableHttp,
}

#[derive(Parser)]
#[command(name = "idfkit-mcp")]
#[command(author = "Dweve B.V.")]
#[command(version)]
#[command(about = "idfkit Model Context Protocol (MCP) Server for EnergyPlus modelling")]
struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum, env = "IDFKIT_MCP_TRANSPORT", default_value = "stdio")]
    transport: Transport,

    /// Host to bind for the HTTP transport
    #[arg(long, env = "IDFKIT_MCP_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind for the HTTP transport
    #[arg(long, env = "IDFKIT_MCP_PORT", default_value_t = 8000)]
    port: u16,

    /// Endpoint path for the HTTP transport (default: /mcp)
    #[arg(long, env = "IDFKIT_MCP_MOUNT_PATH")]
    mount_path: Option<String>,

    /// Extra directory holding EnergyPlus schema files
    #[arg(long, env = "IDFKIT_SCHEMA_DIR")]
    schema_dir: Option<PathBuf>,

    /// EnergyPlus installation directory
    #[arg(long, env = "ENERGYPLUS_DIR")]
    energyplus_dir: Option<PathBuf>,

    /// Weather station index CSV (default: bundled index)
    #[arg(long, env = "IDFKIT_STATION_INDEX")]
    station_index: Option<PathBuf>,

    /// URL of a weather station index CSV, cached on first use
    #[arg(long, env = "IDFKIT_STATION_INDEX_URL")]
    station_index_url: Option<String>,

    /// Directory for downloaded weather files
    #[arg(long, env = "IDFKIT_WEATHER_CACHE")]
    weather_cache: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("idfkit_mcp=info".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = McpServerConfig {
        schema_dir: cli.schema_dir,
        energyplus_dir: cli.energyplus_dir,
        station_index: cli.station_index,
        station_index_url: cli.station_index_url,
        weather_cache: cli.weather_cache,
        ..Default::default()
    };
    let mut server = McpServer::new(config);

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.transport {
        Transport::Stdio => runtime.block_on(server.run_stdio())?,
        Transport::StreamableHttp => runtime.block_on(http::serve(
            server,
            &cli.host,
            cli.port,
            cli.mount_path.as_deref(),
        ))?,
    }

    Ok(())
}
