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


//! Weather stations for EnergyPlus simulations.
//!
//! A [`StationIndex`] lists stations with downloadable EPW files and can
//! search them by text or by distance. A [`WeatherDownloader`] fetches a
//! station's EPW and DDY files into a local cache.

mod download;
mod error;
mod index;
mod station;

pub use download::{default_cache_dir, WeatherDownloader, WeatherFiles};
pub use error::{WeatherError, WeatherResult};
pub use index::{haversine_km, SearchResult, SpatialResult, StationIndex};
pub use station::WeatherStation;
