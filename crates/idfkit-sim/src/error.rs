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


//! Error types for simulation runs and output parsing.

use idfkit_core::IdfError;
use thiserror::Error;

/// Errors from running EnergyPlus or reading its output.
#[derive(Debug, Error)]
pub enum SimError {
    /// No usable EnergyPlus installation.
    #[error("{0}")]
    EnergyPlusNotFound(String),

    /// EnergyPlus could not be run or failed without a diagnostics file.
    #[error("{0}")]
    Simulation(String),

    /// A requested variable, table or file is not in the output.
    #[error("{0}")]
    NotFound(String),

    /// The run produced no SQLite output.
    #[error("No SQL output available. Ensure the model has an Output:SQLite object and rerun the simulation.")]
    NoSqlOutput,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sql(#[from] rusqlite::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Idf(#[from] IdfError),
}

impl SimError {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::EnergyPlusNotFound(_) => "EnergyPlusNotFoundError",
            Self::Simulation(_) => "SimulationError",
            Self::NotFound(_) => "NotFoundError",
            Self::NoSqlOutput => "NoSqlOutputError",
            Self::InvalidArgument(_) => "ValueError",
            Self::Io(_) => "IOError",
            Self::Sql(_) => "SQLError",
            Self::Csv(_) => "CSVError",
            Self::Idf(e) => e.kind_name(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
