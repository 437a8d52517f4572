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


//! Weather station records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A station with a downloadable EPW file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    /// WMO station number, kept as text to preserve leading zeros.
    pub wmo: String,
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub elevation: f64,
    /// Hours from UTC.
    pub timezone: f64,
    /// EPW download URL.
    pub url: String,
}

impl WeatherStation {
    /// URL of the matching design-day file.
    pub fn ddy_url(&self) -> String {
        match self.url.strip_suffix(".epw") {
            Some(stem) => format!("{}.ddy", stem),
            None => format!("{}.ddy", self.url),
        }
    }

    /// `Name, ST, COUNTRY` for display.
    pub fn display_name(&self) -> String {
        if self.state.is_empty() {
            format!("{}, {}", self.name, self.country)
        } else {
            format!("{}, {}, {}", self.name, self.state, self.country)
        }
    }

    pub fn to_dict(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> WeatherStation {
        WeatherStation {
            wmo: "724666".into(),
            name: "Golden NREL".into(),
            state: "CO".into(),
            country: "USA".into(),
            latitude: 39.74,
            longitude: -105.18,
            elevation: 1829.0,
            timezone: -7.0,
            url: "https://example.org/USA_CO_Golden-NREL.724666_TMY3.epw".into(),
        }
    }

    #[test]
    fn test_ddy_url() {
        assert_eq!(
            station().ddy_url(),
            "https://example.org/USA_CO_Golden-NREL.724666_TMY3.ddy"
        );
    }

    #[test]
    fn test_to_dict() {
        let dict = station().to_dict();
        assert_eq!(dict["wmo"], Value::String("724666".into()));
        assert_eq!(dict["latitude"].as_f64(), Some(39.74));
        assert_eq!(dict.len(), 9);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(station().display_name(), "Golden NREL, CO, USA");
    }
}
