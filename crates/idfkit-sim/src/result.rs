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


//! Outputs of a finished run.

use crate::errfile::ErrorReport;
use crate::error::{SimError, SimResult};
use crate::html::HtmlReport;
use crate::rdd::OutputVariableIndex;
use crate::sql::{SqlOutput, TimeseriesQuery, TimeseriesResult};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Output file stem EnergyPlus uses when run with `-d`.
pub const OUTPUT_PREFIX: &str = "eplusout";

/// Everything read back from a run directory.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub success: bool,
    pub runtime_seconds: f64,
    pub run_dir: PathBuf,
    pub errors: ErrorReport,
    pub html: Option<HtmlReport>,
    pub variables: Option<OutputVariableIndex>,
    pub sql_path: Option<PathBuf>,
}

impl SimulationResult {
    /// Collect the outputs found in `run_dir`.
    ///
    /// A run that exited cleanly still counts as failed when the
    /// diagnostics report a fatal error.
    pub fn from_run_dir(run_dir: &Path, exited_ok: bool, runtime_seconds: f64) -> SimResult<Self> {
        let output = |ext: &str| run_dir.join(format!("{}.{}", OUTPUT_PREFIX, ext));

        let errors = ErrorReport::from_file(&output("err"))?;

        let html_path = run_dir.join(format!("{}tbl.htm", OUTPUT_PREFIX));
        let html = if html_path.is_file() {
            match HtmlReport::from_file(&html_path) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Could not read {}: {}", html_path.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let variables = OutputVariableIndex::from_files(&output("rdd"), &output("mdd"));
        let sql_path = Some(output("sql")).filter(|p| p.is_file());

        Ok(Self {
            success: exited_ok && !errors.has_fatal(),
            runtime_seconds,
            run_dir: run_dir.to_path_buf(),
            errors,
            html,
            variables,
            sql_path,
        })
    }

    /// Open the SQLite output.
    pub fn sql(&self) -> SimResult<SqlOutput> {
        let path = self.sql_path.as_deref().ok_or(SimError::NoSqlOutput)?;
        SqlOutput::open(path)
    }

    pub fn query_timeseries(&self, query: &TimeseriesQuery) -> SimResult<TimeseriesResult> {
        self.sql()?.query_timeseries(query)
    }
}
