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


//! EPW/DDY downloader with an on-disk cache.

use crate::error::{WeatherError, WeatherResult};
use crate::station::WeatherStation;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_FILE_NAME: &str = "stations.csv";

/// Paths of a station's downloaded files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherFiles {
    pub epw: PathBuf,
    pub ddy: PathBuf,
}

/// Downloads weather files into `<cache>/<wmo>/`.
#[derive(Debug, Clone)]
pub struct WeatherDownloader {
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl Default for WeatherDownloader {
    fn default() -> Self {
        Self::new(default_cache_dir())
    }
}

impl WeatherDownloader {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where a station's files are stored.
    pub fn station_files(&self, station: &WeatherStation) -> WeatherFiles {
        let dir = self.cache_dir.join(&station.wmo);
        WeatherFiles {
            epw: dir.join(file_name(&station.url, &station.wmo, "epw")),
            ddy: dir.join(file_name(&station.ddy_url(), &station.wmo, "ddy")),
        }
    }

    /// Fetch the EPW and DDY files, reusing cached copies.
    pub async fn download(&self, station: &WeatherStation) -> WeatherResult<WeatherFiles> {
        let files = self.station_files(station);
        self.fetch(&station.url, &files.epw).await?;
        self.fetch(&station.ddy_url(), &files.ddy).await?;
        Ok(files)
    }

    /// Where a downloaded station index is cached.
    pub fn index_path(&self) -> PathBuf {
        self.cache_dir.join(INDEX_FILE_NAME)
    }

    /// Fetch a station index CSV once and reuse the cached copy afterwards.
    pub async fn download_index(&self, url: &str) -> WeatherResult<PathBuf> {
        let dest = self.index_path();
        self.fetch(url, &dest).await?;
        Ok(dest)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> WeatherResult<()> {
        if dest.is_file() {
            debug!("Using cached {}", dest.display());
            return Ok(());
        }
        info!("Downloading {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write then rename so an interrupted download is never cached
        let partial = dest.with_extension("part");
        tokio::fs::write(&partial, &body).await?;
        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}

/// `<user cache dir>/idfkit/weather`, or a temp directory without one.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("idfkit")
        .join("weather")
}

fn file_name(url: &str, wmo: &str, ext: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|n| !n.is_empty() && n.ends_with(&format!(".{}", ext)))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.{}", wmo, ext))
}
