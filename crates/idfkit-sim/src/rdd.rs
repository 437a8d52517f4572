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


//! Output variable and meter dictionaries (`.rdd` / `.mdd`).
//!
//! Both files come in two layouts. The regular one:
//!
//! ```text
//! Program Version,EnergyPlus, Version 24.1.0-9d7789a3ac, YMD=2024.05.01 10:00
//! Var Type (reported time step),Var Report Type,Variable Name [Units]
//! Zone,Average,Zone Mean Air Temperature [C]
//! Zone,Meter,Electricity:Facility [J]
//! ```
//!
//! and the IDF one produced by `Output:VariableDictionary,IDF`:
//!
//! ```text
//! Output:Variable,*,Zone Mean Air Temperature,hourly; !- Zone Average [C]
//! Output:Meter,Electricity:Facility,hourly; !- [J]
//! ```

use regex::RegexBuilder;
use std::path::Path;

/// A reportable output variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVariable {
    pub name: String,
    pub units: String,
    /// Key the variable applies to; `*` for all keys.
    pub key: String,
    /// `Zone` or `HVAC` time step.
    pub var_type: String,
    /// `Average` or `Sum`.
    pub report_type: String,
}

/// A reportable meter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMeter {
    pub name: String,
    pub units: String,
}

/// Borrowed view over either kind of entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputItem<'a> {
    Variable(&'a OutputVariable),
    Meter(&'a OutputMeter),
}

impl<'a> OutputItem<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Variable(v) => &v.name,
            Self::Meter(m) => &m.name,
        }
    }

    pub fn units(&self) -> &'a str {
        match self {
            Self::Variable(v) => &v.units,
            Self::Meter(m) => &m.units,
        }
    }
}

/// Every variable and meter a run can report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputVariableIndex {
    pub variables: Vec<OutputVariable>,
    pub meters: Vec<OutputMeter>,
}

impl OutputVariableIndex {
    /// Build from the text of the `.rdd` and `.mdd` files.
    pub fn parse(rdd: &str, mdd: &str) -> Self {
        let mut index = Self::default();
        for line in rdd.lines().chain(mdd.lines()) {
            index.parse_line(line);
        }
        index
    }

    /// Read `<stem>.rdd` and `<stem>.mdd`; `None` when neither exists.
    pub fn from_files(rdd: &Path, mdd: &Path) -> Option<Self> {
        let rdd = crate::read_output_text(rdd).ok();
        let mdd = crate::read_output_text(mdd).ok();
        if rdd.is_none() && mdd.is_none() {
            return None;
        }
        Some(Self::parse(
            rdd.as_deref().unwrap_or_default(),
            mdd.as_deref().unwrap_or_default(),
        ))
    }

    pub fn len(&self) -> usize {
        self.variables.len() + self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Variables followed by meters.
    pub fn iter(&self) -> impl Iterator<Item = OutputItem<'_>> {
        self.variables
            .iter()
            .map(OutputItem::Variable)
            .chain(self.meters.iter().map(OutputItem::Meter))
    }

    /// Entries whose name matches `pattern`, case-insensitive.
    ///
    /// An invalid regular expression is matched as a literal substring.
    pub fn search(&self, pattern: &str) -> Vec<OutputItem<'_>> {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => self.iter().filter(|i| re.is_match(i.name())).collect(),
            Err(_) => {
                let needle = pattern.to_lowercase();
                self.iter()
                    .filter(|i| i.name().to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') || line.starts_with("Program Version") {
            return;
        }
        if let Some(rest) = line.strip_prefix("Output:Variable,") {
            self.parse_idf_variable(rest);
        } else if let Some(rest) = strip_meter_prefix(line) {
            self.parse_idf_meter(rest);
        } else {
            self.parse_regular(line);
        }
    }

    fn parse_regular(&mut self, line: &str) {
        let parts: Vec<&str> = line.splitn(3, ',').map(str::trim).collect();
        let [var_type, report_type, rest] = parts.as_slice() else {
            return;
        };
        if var_type.starts_with("Var Type") {
            return;
        }
        let (name, units) = split_units(rest);
        if report_type.eq_ignore_ascii_case("Meter") {
            self.meters.push(OutputMeter { name, units });
        } else {
            self.variables.push(OutputVariable {
                name,
                units,
                key: "*".to_string(),
                var_type: var_type.to_string(),
                report_type: report_type.to_string(),
            });
        }
    }

    fn parse_idf_variable(&mut self, rest: &str) {
        let (fields, comment) = split_comment(rest);
        let parts: Vec<&str> = fields.split(',').map(str::trim).collect();
        let [key, name, ..] = parts.as_slice() else {
            return;
        };
        // Comment is `Zone Average [C]`
        let (kind, units) = split_units(comment);
        let mut kind = kind.split_whitespace();
        self.variables.push(OutputVariable {
            name: name.to_string(),
            units,
            key: key.to_string(),
            var_type: kind.next().unwrap_or_default().to_string(),
            report_type: kind.next().unwrap_or_default().to_string(),
        });
    }

    fn parse_idf_meter(&mut self, rest: &str) {
        let (fields, comment) = split_comment(rest);
        let Some(name) = fields.split(',').map(str::trim).next().filter(|n| !n.is_empty()) else {
            return;
        };
        let (_, units) = split_units(comment);
        self.meters.push(OutputMeter {
            name: name.to_string(),
            units,
        });
    }
}

fn strip_meter_prefix(line: &str) -> Option<&str> {
    ["Output:Meter,", "Output:Meter:MeterFileOnly,", "Output:Meter:Cumulative,"]
        .iter()
        .find_map(|p| line.strip_prefix(p))
}

/// Split `fields; !- comment` at the terminator.
fn split_comment(text: &str) -> (&str, &str) {
    let (fields, comment) = text.split_once(';').unwrap_or((text, ""));
    (fields, comment.trim().trim_start_matches("!-").trim())
}

/// Split `Name [Units]` into its parts.
fn split_units(text: &str) -> (String, String) {
    let text = text.trim();
    match (text.rfind('['), text.ends_with(']')) {
        (Some(open), true) => (
            text[..open].trim().to_string(),
            text[open + 1..text.len() - 1].trim().to_string(),
        ),
        _ => (text.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RDD: &str = "Program Version,EnergyPlus, Version 24.1.0-9d7789a3ac, YMD=2024.05.01 10:00
Var Type (reported time step),Var Report Type,Variable Name [Units]
Zone,Average,Site Outdoor Air Drybulb Temperature [C]
Zone,Average,Zone Mean Air Temperature [C]
HVAC,Sum,Zone Ideal Loads Zone Sensible Heating Energy [J]
";

    const MDD: &str = "Program Version,EnergyPlus, Version 24.1.0-9d7789a3ac, YMD=2024.05.01 10:00
Var Type (reported time step),Var Report Type,Variable Name [Units]
Zone,Meter,Electricity:Facility [J]
Zone,Meter,InteriorLights:Electricity [J]
";

    const RDD_IDF: &str = "! Program Version,EnergyPlus, Version 24.1.0
! Output:Variable Objects (applicable to this run)
Output:Variable,*,Site Outdoor Air Drybulb Temperature,hourly; !- Zone Average [C]
Output:Variable,*,Zone Air System Sensible Heating Energy,hourly; !- HVAC Sum [J]
";

    const MDD_IDF: &str = "! Output:Meter Objects (applicable to this run)
Output:Meter,Electricity:Facility,hourly; !- [J]
Output:Meter:Cumulative,Electricity:Facility,hourly; !- [J]
";

    #[test]
    fn test_parse_regular() {
        let index = OutputVariableIndex::parse(RDD, MDD);
        assert_eq!(index.variables.len(), 3);
        assert_eq!(index.meters.len(), 2);
        assert_eq!(index.len(), 5);

        let temp = &index.variables[1];
        assert_eq!(temp.name, "Zone Mean Air Temperature");
        assert_eq!(temp.units, "C");
        assert_eq!(temp.key, "*");
        assert_eq!(temp.var_type, "Zone");
        assert_eq!(temp.report_type, "Average");

        assert_eq!(index.meters[0].name, "Electricity:Facility");
        assert_eq!(index.meters[0].units, "J");
    }

    #[test]
    fn test_parse_idf_format() {
        let index = OutputVariableIndex::parse(RDD_IDF, MDD_IDF);
        assert_eq!(index.variables.len(), 2);
        assert_eq!(index.variables[1].var_type, "HVAC");
        assert_eq!(index.variables[1].report_type, "Sum");
        assert_eq!(index.variables[1].units, "J");
        assert_eq!(index.meters.len(), 2);
        assert_eq!(index.meters[0].units, "J");
    }

    #[test]
    fn test_search() {
        let index = OutputVariableIndex::parse(RDD, MDD);
        let hits = index.search("zone.*temperature");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Zone Mean Air Temperature");

        let electric = index.search("electricity");
        assert_eq!(electric.len(), 2);
        assert!(electric.iter().all(|i| matches!(i, OutputItem::Meter(_))));

        // Unbalanced bracket falls back to a literal match
        assert!(index.search("[C").is_empty());
    }

    #[test]
    fn test_from_files() {
        let tmp = tempfile::tempdir().unwrap();
        let rdd = tmp.path().join("eplusout.rdd");
        let mdd = tmp.path().join("eplusout.mdd");
        assert!(OutputVariableIndex::from_files(&rdd, &mdd).is_none());

        std::fs::write(&rdd, RDD).unwrap();
        let index = OutputVariableIndex::from_files(&rdd, &mdd).unwrap();
        assert_eq!(index.variables.len(), 3);
        assert!(index.meters.is_empty());
    }
}
