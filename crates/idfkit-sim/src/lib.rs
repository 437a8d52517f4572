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


//! Running EnergyPlus and reading its output.
//!
//! - [`find_energyplus`] locates an installation.
//! - [`simulate`] writes a model to a run directory and runs it.
//! - [`SimulationResult`] gathers the outputs: diagnostics
//!   ([`ErrorReport`]), tabular reports ([`HtmlReport`]), the variable
//!   dictionary ([`OutputVariableIndex`]) and time series from the SQLite
//!   database ([`SqlOutput`]).

mod errfile;
mod error;
mod html;
mod locate;
mod rdd;
mod result;
mod runner;
mod sql;

pub use errfile::{ErrorMessage, ErrorReport, ErrorSeverity};
pub use error::{SimError, SimResult};
pub use html::{HtmlReport, HtmlTable};
pub use locate::{find_energyplus, EnergyPlusInstall, ENERGYPLUS_DIR_ENV};
pub use rdd::{OutputItem, OutputMeter, OutputVariable, OutputVariableIndex};
pub use result::{SimulationResult, OUTPUT_PREFIX};
pub use runner::{
    build_args, ensure_output_objects, needs_expand_objects, simulate, SimulationOptions,
    INPUT_FILE,
};
pub use sql::{Environment, SqlOutput, Statistics, TimeseriesQuery, TimeseriesResult};

/// Read an EnergyPlus output file as text.
///
/// EnergyPlus echoes object names in whatever encoding the input used, so
/// invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_output_text(path: &std::path::Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
