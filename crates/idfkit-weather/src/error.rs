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


//! Error types for station lookup and downloads.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    NotFound(String),

    #[error("download of {url} failed with HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

impl WeatherError {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFoundError",
            Self::Download { .. } | Self::Http(_) => "DownloadError",
            Self::Io(_) => "IOError",
            Self::Csv(_) => "CSVError",
        }
    }
}

pub type WeatherResult<T> = Result<T, WeatherError>;
