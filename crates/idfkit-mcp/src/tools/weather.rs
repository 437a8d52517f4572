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


//! Weather station search and download tools.

use crate::error::McpResult;
use crate::serializers::serialize_station;
use crate::session::{Session, ToolEnv};
use crate::tools::helpers::{parse_args, round_to};
use crate::tools::types::{DownloadWeatherArgs, SearchStationsArgs};
use idfkit_weather::WeatherStation;
use serde_json::{json, Value as JsonValue};
use tracing::info;

/// Candidates considered when picking a station for download.
const DOWNLOAD_CANDIDATES: usize = 10;

fn country_matches(station: &WeatherStation, country: Option<&str>) -> bool {
    country.map_or(true, |c| station.country.eq_ignore_ascii_case(c))
}

/// Execute search_weather_stations tool.
///
/// Coordinates take precedence over a text query.
pub async fn execute_search_weather_stations(
    args: Option<JsonValue>,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: SearchStationsArgs = parse_args(args)?;
    let country = args.country.as_deref().filter(|c| !c.is_empty());

    if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
        let stations: Vec<JsonValue> = env
            .stations()
            .await?
            .nearest(latitude, longitude, args.limit)
            .into_iter()
            .filter(|r| country_matches(&r.station, country))
            .map(|r| {
                let mut entry = serialize_station(&r.station);
                entry.insert("distance_km".into(), json!(round_to(r.distance_km, 1)));
                JsonValue::Object(entry)
            })
            .collect();
        return Ok(json!({
            "search_type": "spatial",
            "count": stations.len(),
            "stations": stations,
        }));
    }

    let Some(query) = args.query else {
        return Ok(json!({
            "error": "Provide either 'query' for text search or 'latitude'/'longitude' for spatial search."
        }));
    };

    // Over-fetch so the country filter still leaves enough results
    let stations: Vec<JsonValue> = env
        .stations()
        .await?
        .search(&query, args.limit.saturating_mul(3))
        .into_iter()
        .filter(|r| country_matches(&r.station, country))
        .take(args.limit)
        .map(|r| {
            let mut entry = serialize_station(&r.station);
            entry.insert("score".into(), json!(round_to(r.score, 3)));
            entry.insert("match_field".into(), json!(r.match_field));
            JsonValue::Object(entry)
        })
        .collect();

    Ok(json!({
        "search_type": "text",
        "query": query,
        "count": stations.len(),
        "stations": stations,
    }))
}

/// Execute download_weather_file tool.
///
/// A query wins over a WMO number. The EPW path is kept in the session
/// for later simulation runs.
pub async fn execute_download_weather_file(
    args: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: DownloadWeatherArgs = parse_args(args)?;
    let country = args.country.as_deref().filter(|c| !c.is_empty());
    let index = env.stations().await?;

    let station = if let Some(query) = &args.query {
        let found = index
            .search(query, DOWNLOAD_CANDIDATES)
            .into_iter()
            .map(|r| r.station)
            .find(|s| country_matches(s, country));
        match found {
            Some(station) => station,
            None => {
                return Ok(json!({
                    "error": format!("No weather stations found for query '{}'.", query)
                }))
            }
        }
    } else if let Some(wmo) = &args.wmo {
        match index.get(wmo) {
            Some(station) => station.clone(),
            None => {
                return Ok(json!({
                    "error": format!("No weather station found with WMO '{}'.", wmo)
                }))
            }
        }
    } else {
        return Ok(json!({
            "error": "Provide either 'wmo' or 'query' to identify the weather station."
        }));
    };

    let files = env.downloader().download(&station).await?;
    info!(
        "Weather file for {} at {}",
        station.display_name(),
        files.epw.display()
    );
    session.weather_file = Some(files.epw.clone());

    Ok(json!({
        "status": "downloaded",
        "station": serialize_station(&station),
        "epw_path": files.epw.display().to_string(),
        "ddy_path": files.ddy.display().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::McpServerConfig;
    use std::path::Path;

    fn env_with_cache(cache: &Path) -> ToolEnv {
        ToolEnv::new(&McpServerConfig {
            station_index: Some(crate::tools::test_support::fixture_stations()),
            weather_cache: Some(cache.to_path_buf()),
            ..McpServerConfig::default()
        })
    }

    #[tokio::test]
    async fn test_spatial_search() {
        let env = crate::tools::test_support::env();
        // Downtown Chicago
        let args = json!({"latitude": 41.88, "longitude": -87.63, "limit": 2});
        let result = execute_search_weather_stations(Some(args), &env)
            .await
            .unwrap();

        assert_eq!(result["search_type"], "spatial");
        assert_eq!(result["count"], 2);
        assert_eq!(result["stations"][0]["wmo"], "725300");
        let distance = result["stations"][0]["distance_km"].as_f64().unwrap();
        assert!(distance > 20.0 && distance < 30.0);
    }

    #[tokio::test]
    async fn test_spatial_search_country_filter() {
        let env = crate::tools::test_support::env();
        let args = json!({"latitude": 41.88, "longitude": -87.63, "country": "CAN"});
        let result = execute_search_weather_stations(Some(args), &env)
            .await
            .unwrap();
        assert_eq!(result["count"], 0);
    }

    #[tokio::test]
    async fn test_text_search() {
        let env = crate::tools::test_support::env();
        let args = json!({"query": "chicago", "country": "usa"});
        let result = execute_search_weather_stations(Some(args), &env)
            .await
            .unwrap();

        assert_eq!(result["search_type"], "text");
        assert_eq!(result["query"], "chicago");
        assert_eq!(result["count"], 1);
        assert_eq!(result["stations"][0]["score"], 0.8);
        assert_eq!(result["stations"][0]["match_field"], "name");
    }

    #[tokio::test]
    async fn test_text_search_huge_limit() {
        let env = crate::tools::test_support::env();
        let args = json!({"query": "chicago", "limit": u64::MAX});
        let result = execute_search_weather_stations(Some(args), &env)
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["stations"][0]["wmo"], "725300");
    }

    #[tokio::test]
    async fn test_bundled_index_reaches_other_countries() {
        let env = ToolEnv::new(&McpServerConfig::default());
        let args = json!({"latitude": 41.88, "longitude": -87.63, "country": "CAN"});
        let result = execute_search_weather_stations(Some(args), &env)
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["stations"][0]["wmo"], "716240");
    }

    #[tokio::test]
    async fn test_search_needs_query_or_coordinates() {
        let env = crate::tools::test_support::env();
        let result = execute_search_weather_stations(Some(json!({"latitude": 40.0})), &env)
            .await
            .unwrap();
        assert_eq!(
            result["error"],
            "Provide either 'query' for text search or 'latitude'/'longitude' for spatial search."
        );
    }

    #[tokio::test]
    async fn test_download_uses_cache_and_sets_session() {
        let cache = tempfile::tempdir().unwrap();
        let env = env_with_cache(cache.path());
        let station = env.stations().await.unwrap().get("725300").unwrap().clone();
        let files = env.downloader().station_files(&station);
        std::fs::create_dir_all(files.epw.parent().unwrap()).unwrap();
        std::fs::write(&files.epw, "LOCATION,Chicago").unwrap();
        std::fs::write(&files.ddy, "! design days").unwrap();

        let mut session = Session::new();
        let args = json!({"wmo": "725300"});
        let result = execute_download_weather_file(Some(args), &mut session, &env)
            .await
            .unwrap();

        assert_eq!(result["status"], "downloaded");
        assert_eq!(result["station"]["wmo"], "725300");
        assert_eq!(result["epw_path"], files.epw.display().to_string());
        assert_eq!(session.weather_file, Some(files.epw));
    }

    #[tokio::test]
    async fn test_download_lookup_failures() {
        let cache = tempfile::tempdir().unwrap();
        let env = env_with_cache(cache.path());
        let mut session = Session::new();

        let result = execute_download_weather_file(Some(json!({"wmo": "000000"})), &mut session, &env)
            .await
            .unwrap();
        assert_eq!(result["error"], "No weather station found with WMO '000000'.");

        let args = json!({"query": "chicago", "country": "DEU"});
        let result = execute_download_weather_file(Some(args), &mut session, &env)
            .await
            .unwrap();
        assert_eq!(result["error"], "No weather stations found for query 'chicago'.");

        let result = execute_download_weather_file(None, &mut session, &env)
            .await
            .unwrap();
        assert_eq!(
            result["error"],
            "Provide either 'wmo' or 'query' to identify the weather station."
        );
        assert!(session.weather_file.is_none());
    }
}
