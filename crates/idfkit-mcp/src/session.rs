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


//! Session state and the toolkit handles shared by every tool.

use crate::error::{McpError, McpResult};
use crate::server::McpServerConfig;
use idfkit_core::{Document, Schema, SchemaRegistry, Version, LATEST_VERSION};
use idfkit_sim::SimulationResult;
use idfkit_weather::{default_cache_dir, StationIndex, WeatherDownloader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::info;

/// The model a client is working on and what was derived from it.
///
/// Loading or creating a model replaces the whole session except the
/// weather file, which outlives models.
#[derive(Debug, Default)]
pub struct Session {
    pub document: Option<Document>,
    pub schema: Option<Arc<Schema>>,
    pub file_path: Option<PathBuf>,
    pub simulation_result: Option<SimulationResult>,
    pub weather_file: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_model(&self) -> McpResult<&Document> {
        self.document.as_ref().ok_or_else(no_model)
    }

    pub fn require_model_mut(&mut self) -> McpResult<&mut Document> {
        self.document.as_mut().ok_or_else(no_model)
    }

    pub fn require_schema(&self) -> McpResult<&Arc<Schema>> {
        self.schema.as_ref().ok_or_else(|| {
            McpError::Session("No schema loaded. Use load_model or new_model first.".to_string())
        })
    }

    pub fn require_simulation_result(&self) -> McpResult<&SimulationResult> {
        self.simulation_result.as_ref().ok_or_else(|| {
            McpError::Session(
                "No simulation results available. Use run_simulation first.".to_string(),
            )
        })
    }

    /// Make `doc` the active model.
    pub fn set_model(&mut self, doc: Document, file_path: Option<PathBuf>) {
        self.schema = Some(Arc::clone(doc.schema()));
        self.document = Some(doc);
        self.file_path = file_path;
        self.simulation_result = None;
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn no_model() -> McpError {
    McpError::Session("No model loaded. Use load_model or new_model first.".to_string())
}

/// Long-lived toolkit handles: schema registry, EnergyPlus location and
/// the weather station index.
pub struct ToolEnv {
    registry: SchemaRegistry,
    energyplus_dir: Option<PathBuf>,
    station_index: Option<PathBuf>,
    station_index_url: Option<String>,
    stations: OnceLock<StationIndex>,
    downloader: WeatherDownloader,
}

impl ToolEnv {
    pub fn new(config: &McpServerConfig) -> Self {
        let mut registry = SchemaRegistry::new();
        if let Some(dir) = &config.schema_dir {
            registry.add_search_dir(dir);
        }
        // An install directory ships Energy+.schema.epJSON at its root
        if let Some(dir) = &config.energyplus_dir {
            registry.add_search_dir(dir);
        }
        let cache = config.weather_cache.clone().unwrap_or_else(default_cache_dir);

        Self {
            registry,
            energyplus_dir: config.energyplus_dir.clone(),
            station_index: config.station_index.clone(),
            station_index_url: config.station_index_url.clone(),
            stations: OnceLock::new(),
            downloader: WeatherDownloader::new(cache),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn energyplus_dir(&self) -> Option<&Path> {
        self.energyplus_dir.as_deref()
    }

    pub fn downloader(&self) -> &WeatherDownloader {
        &self.downloader
    }

    /// Schema for an explicit version, else the session's, else the latest.
    pub fn schema_for(&self, session: &Session, version: Option<&str>) -> McpResult<Arc<Schema>> {
        if let Some(version) = parse_version(version)? {
            return Ok(self.registry.get(version)?);
        }
        if let Some(schema) = &session.schema {
            return Ok(Arc::clone(schema));
        }
        Ok(self.registry.get(LATEST_VERSION)?)
    }

    /// The station index, loaded on first use.
    ///
    /// A local file wins over a URL; a URL is downloaded once into the
    /// weather cache. Without either the bundled index is used.
    pub async fn stations(&self) -> McpResult<&StationIndex> {
        if let Some(index) = self.stations.get() {
            return Ok(index);
        }
        let index = match (&self.station_index, &self.station_index_url) {
            (Some(path), _) => StationIndex::load_from_path(path)?,
            (None, Some(url)) => {
                let path = self.downloader.download_index(url).await?;
                StationIndex::load_from_path(&path)?
            }
            (None, None) => StationIndex::load()?,
        };
        info!("Loaded {} weather stations", index.len());
        Ok(self.stations.get_or_init(|| index))
    }
}

/// Parse an optional `X.Y.Z` version argument.
pub(crate) fn parse_version(version: Option<&str>) -> McpResult<Option<Version>> {
    Ok(version.map(Version::parse).transpose()?)
}
