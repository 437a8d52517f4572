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


//! Simulation tools: run EnergyPlus and read back its outputs.

use crate::error::McpResult;
use crate::serializers::{serialize_error_message, serialize_output_item, serialize_table};
use crate::session::{Session, ToolEnv};
use crate::tools::helpers::{parse_args, round_to};
use crate::tools::types::{
    ExportTimeseriesArgs, ListOutputVariablesArgs, QueryTimeseriesArgs, RunSimulationArgs,
};
use idfkit_sim::{simulate, Environment, SimulationOptions, TimeseriesQuery};
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;
use tracing::info;

const MAX_SEVERE_MESSAGES: usize = 10;
const MAX_SUMMARY_TABLES: usize = 20;

/// Execute run_simulation tool.
///
/// The weather file comes from the arguments or the session; design-day
/// runs may go without one.
pub async fn execute_run_simulation(
    args: Option<JsonValue>,
    session: &mut Session,
    env: &ToolEnv,
) -> McpResult<JsonValue> {
    let args: RunSimulationArgs = parse_args(args)?;
    let doc = session.require_model()?;

    let weather = args
        .weather_file
        .map(PathBuf::from)
        .or_else(|| session.weather_file.clone());
    if weather.is_none() && !args.design_day {
        return Ok(json!({
            "error": "No weather file specified. Provide weather_file or use download_weather_file first, or set design_day=True."
        }));
    }

    let options = SimulationOptions {
        weather,
        design_day: args.design_day,
        annual: args.annual,
        output_dir: None,
        energyplus_dir: env.energyplus_dir().map(PathBuf::from),
    };
    let result = simulate(doc, &options).await?;

    let response = json!({
        "success": result.success,
        "runtime_seconds": round_to(result.runtime_seconds, 2),
        "output_directory": result.run_dir.display().to_string(),
        "errors": {
            "fatal": result.errors.fatal_count(),
            "severe": result.errors.severe_count(),
            "warnings": result.errors.warning_count(),
        },
        "simulation_complete": result.errors.simulation_complete,
    });
    session.simulation_result = Some(result);
    Ok(response)
}

/// Execute get_results_summary tool.
pub fn execute_get_results_summary(session: &Session) -> McpResult<JsonValue> {
    let result = session.require_simulation_result()?;
    let errors = &result.errors;

    let mut summary = json!({
        "success": result.success,
        "runtime_seconds": round_to(result.runtime_seconds, 2),
        "output_directory": result.run_dir.display().to_string(),
        "errors": {
            "fatal": errors.fatal_count(),
            "severe": errors.severe_count(),
            "warnings": errors.warning_count(),
            "summary": errors.summary(),
        },
    });

    if errors.has_fatal() || errors.has_severe() {
        summary["fatal_messages"] = errors.fatal.iter().map(serialize_error_message).collect();
        summary["severe_messages"] = errors
            .severe
            .iter()
            .take(MAX_SEVERE_MESSAGES)
            .map(serialize_error_message)
            .collect();
    }

    if let Some(html) = &result.html {
        summary["tables"] = html
            .tables
            .iter()
            .take(MAX_SUMMARY_TABLES)
            .map(serialize_table)
            .collect();
    }

    Ok(summary)
}

/// Execute list_output_variables tool.
pub fn execute_list_output_variables(
    args: Option<JsonValue>,
    session: &Session,
) -> McpResult<JsonValue> {
    let args: ListOutputVariablesArgs = parse_args(args)?;
    let result = session.require_simulation_result()?;

    let Some(index) = &result.variables else {
        return Ok(json!({
            "error": "No output variable index available. The simulation may not have produced .rdd/.mdd files."
        }));
    };

    let candidates = match args.search.as_deref().filter(|s| !s.is_empty()) {
        Some(pattern) => index.search(pattern),
        None => index.iter().collect(),
    };
    let variables: Vec<JsonValue> = candidates
        .into_iter()
        .take(args.limit)
        .map(serialize_output_item)
        .collect();

    Ok(json!({
        "total_available": index.len(),
        "returned": variables.len(),
        "variables": variables,
    }))
}

/// Execute query_timeseries tool.
pub fn execute_query_timeseries(
    args: Option<JsonValue>,
    session: &Session,
) -> McpResult<JsonValue> {
    let args: QueryTimeseriesArgs = parse_args(args)?;
    let result = session.require_simulation_result()?;

    let query = build_query(
        args.variable_name,
        args.key_value,
        args.frequency,
        args.environment.as_deref(),
    )?;
    let series = result.query_timeseries(&query)?;
    let statistics = series
        .statistics()
        .map(|s| json!({ "min": s.min, "max": s.max, "mean": s.mean }));

    let returned = series.len().min(args.limit);
    Ok(json!({
        "variable_name": series.variable_name,
        "key_value": series.key_value,
        "units": series.units,
        "frequency": series.frequency,
        "total_points": series.len(),
        "returned": returned,
        "timestamps": &series.timestamps[..returned],
        "values": &series.values[..returned],
        "statistics": statistics,
    }))
}

/// Execute export_timeseries tool.
pub fn execute_export_timeseries(
    args: Option<JsonValue>,
    session: &Session,
) -> McpResult<JsonValue> {
    let args: ExportTimeseriesArgs = parse_args(args)?;
    let result = session.require_simulation_result()?;

    let query = build_query(
        args.variable_name,
        args.key_value,
        args.frequency,
        args.environment.as_deref(),
    )?;
    let series = result.query_timeseries(&query)?;
    let path = PathBuf::from(&args.file_path);
    let rows = series.to_csv(&path)?;
    info!("Exported {} rows of {} to {}", rows, series.variable_name, path.display());

    Ok(json!({ "status": "exported", "file_path": args.file_path, "rows": rows }))
}

fn build_query(
    variable_name: String,
    key_value: Option<String>,
    frequency: Option<String>,
    environment: Option<&str>,
) -> McpResult<TimeseriesQuery> {
    let environment = environment.map(str::parse::<Environment>).transpose()?;
    Ok(TimeseriesQuery {
        variable_name,
        key_value,
        frequency,
        environment,
    })
}
