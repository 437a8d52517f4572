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


//! Running EnergyPlus on a model.

use crate::error::{SimError, SimResult};
use crate::locate::find_energyplus;
use crate::result::SimulationResult;
use idfkit_core::{idf, Document};
use serde_json::{json, Map, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Input file name written into the run directory.
pub const INPUT_FILE: &str = "in.idf";

/// How to run a simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// EPW weather file; design-day runs may omit it.
    pub weather: Option<PathBuf>,
    /// Only simulate design days (`-D`).
    pub design_day: bool,
    /// Force an annual weather-file run (`-a`).
    pub annual: bool,
    /// Run directory; a fresh temporary directory when absent.
    pub output_dir: Option<PathBuf>,
    /// EnergyPlus install directory; searched for when absent.
    pub energyplus_dir: Option<PathBuf>,
}

/// Write the model to a run directory and run EnergyPlus on it.
///
/// Output objects are added to a copy; `doc` itself is left untouched.
pub async fn simulate(doc: &Document, options: &SimulationOptions) -> SimResult<SimulationResult> {
    let install = find_energyplus(options.energyplus_dir.as_deref())?;
    if let Some(weather) = &options.weather {
        if !weather.is_file() {
            return Err(SimError::NotFound(format!(
                "Weather file not found: {}",
                weather.display()
            )));
        }
    }

    let run_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => fresh_run_dir()?,
    };
    tokio::fs::create_dir_all(&run_dir).await?;

    let mut model = doc.clone();
    ensure_output_objects(&mut model)?;
    let input = run_dir.join(INPUT_FILE);
    idf::save_idf(&model, &input)?;

    let args = build_args(options, &run_dir, &input, needs_expand_objects(&model));
    info!(
        "Running {} in {}",
        install.executable.display(),
        run_dir.display()
    );
    debug!("EnergyPlus arguments: {:?}", args);

    let start = Instant::now();
    let output = Command::new(&install.executable)
        .args(&args)
        .current_dir(&run_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| SimError::Simulation(format!("failed to start EnergyPlus: {e}")))?;
    let runtime = start.elapsed().as_secs_f64();

    let err_file = run_dir.join("eplusout.err");
    if !output.status.success() && !err_file.is_file() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SimError::Simulation(format!(
            "EnergyPlus exited with {} and produced no error file: {}",
            output.status,
            stderr.trim()
        )));
    }

    let result = SimulationResult::from_run_dir(&run_dir, output.status.success(), runtime)?;
    if result.success {
        info!("Simulation finished in {:.2}s", runtime);
    } else {
        warn!("Simulation failed: {}", result.errors.summary());
    }
    Ok(result)
}

/// Command line for a run, input file last.
pub fn build_args(
    options: &SimulationOptions,
    run_dir: &Path,
    input: &Path,
    expand_objects: bool,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if let Some(weather) = &options.weather {
        args.push("-w".into());
        args.push(weather.as_os_str().to_owned());
    }
    args.push("-d".into());
    args.push(run_dir.as_os_str().to_owned());
    if options.design_day {
        args.push("-D".into());
    }
    if options.annual {
        args.push("-a".into());
    }
    if expand_objects {
        args.push("-x".into());
    }
    args.push(input.as_os_str().to_owned());
    args
}

/// HVAC templates must be expanded by ExpandObjects before the run.
pub fn needs_expand_objects(doc: &Document) -> bool {
    doc.types().iter().any(|t| t.starts_with("HVACTemplate:"))
}

/// Add the output objects result parsing relies on, when the schema
/// knows them and the model lacks them.
pub fn ensure_output_objects(doc: &mut Document) -> SimResult<()> {
    let wanted: [(&str, Value); 3] = [
        ("Output:SQLite", json!({"option_type": "SimpleAndTabular"})),
        ("OutputControl:Table:Style", json!({"column_separator": "HTML"})),
        (
            "Output:Table:SummaryReports",
            json!({"reports": [{"report_name": "AllSummary"}]}),
        ),
    ];
    for (obj_type, fields) in wanted {
        if !doc.schema().contains_type(obj_type) || doc.contains_type(obj_type) {
            continue;
        }
        let fields: Map<String, Value> = fields.as_object().cloned().unwrap_or_default();
        doc.add(obj_type, "", &fields)?;
        debug!("Added {} for result parsing", obj_type);
    }
    Ok(())
}

/// A new directory under the system temp dir. It outlives the run so
/// results can be read back.
fn fresh_run_dir() -> SimResult<PathBuf> {
    let dir = tempfile::Builder::new().prefix("idfkit-run-").tempdir()?;
    Ok(dir.keep())
}
