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


//! Station index with text and nearest-neighbour search.

use crate::error::WeatherResult;
use crate::station::WeatherStation;
use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const BUNDLED_STATIONS: &str = include_str!("../data/stations.csv");

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A text search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub station: WeatherStation,
    /// 0..=1, higher is better.
    pub score: f64,
    /// Which station attribute matched: `wmo`, `name`, `state` or `country`.
    pub match_field: String,
}

/// A nearest-station hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialResult {
    pub station: WeatherStation,
    pub distance_km: f64,
}

/// In-memory list of stations.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: Vec<WeatherStation>,
}

impl StationIndex {
    /// The index bundled with the crate.
    pub fn load() -> WeatherResult<Self> {
        Self::from_reader(BUNDLED_STATIONS.as_bytes())
    }

    /// Load a CSV file with the bundled column layout.
    pub fn load_from_path(path: &Path) -> WeatherResult<Self> {
        let index = Self::from_reader(std::fs::File::open(path)?)?;
        debug!("Loaded {} stations from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn from_reader(reader: impl Read) -> WeatherResult<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let stations = csv
            .deserialize()
            .collect::<Result<Vec<WeatherStation>, csv::Error>>()?;
        Ok(Self { stations })
    }

    pub fn from_stations(stations: Vec<WeatherStation>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[WeatherStation] {
        &self.stations
    }

    /// Station by exact WMO number.
    pub fn get(&self, wmo: &str) -> Option<&WeatherStation> {
        self.stations.iter().find(|s| s.wmo == wmo.trim())
    }

    /// Rank stations against free text, best first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let tokens: Vec<&str> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut results: Vec<SearchResult> = self
            .stations
            .iter()
            .filter_map(|station| {
                score_station(station, &query, &tokens).map(|(score, field)| SearchResult {
                    station: station.clone(),
                    score,
                    match_field: field.to_string(),
                })
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.station.name.cmp(&b.station.name))
        });
        results.truncate(limit);
        results
    }

    /// Stations closest to a point, nearest first.
    pub fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<SpatialResult> {
        let mut results: Vec<SpatialResult> = self
            .stations
            .iter()
            .map(|s| SpatialResult {
                station: s.clone(),
                distance_km: haversine_km(latitude, longitude, s.latitude, s.longitude),
            })
            .collect();
        results.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(limit);
        results
    }
}

fn score_station(station: &WeatherStation, query: &str, tokens: &[&str]) -> Option<(f64, &'static str)> {
    if station.wmo == query {
        return Some((1.0, "wmo"));
    }
    let name = station.name.to_lowercase();
    if name == query {
        return Some((0.95, "name"));
    }

    let mut best: Option<(f64, &'static str)> = None;
    let mut offer = |score: f64, field: &'static str| {
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, field));
        }
    };

    if name.contains(query) {
        offer(0.8, "name");
    }
    if !tokens.is_empty() {
        let hits = tokens.iter().filter(|t| name.contains(*t)).count();
        if hits > 0 {
            offer(0.6 * hits as f64 / tokens.len() as f64, "name");
        }
    }
    if station.state.eq_ignore_ascii_case(query) {
        offer(0.5, "state");
    }
    if station.country.eq_ignore_ascii_case(query) {
        offer(0.3, "country");
    }
    best
}

/// Great-circle distance between two points in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
