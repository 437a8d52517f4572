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


//! Parser for the EnergyPlus diagnostics file (`eplusout.err`).
//!
//! ```text
//!    ** Warning ** Zone "OFFICE" has no heating setpoint
//!    **   ~~~   ** ...continuation detail
//!    ** Severe  ** Surface "WALL1" references unknown construction
//!    **  Fatal  ** Errors occurred on processing input file.
//!    ************* EnergyPlus Completed Successfully-- 3 Warning; 0 Severe Errors; ...
//! ```

use std::fmt;
use std::path::Path;

const COMPLETED: &str = "EnergyPlus Completed Successfully";
const TERMINATED: &str = "EnergyPlus Terminated";

/// Severity of a message in the diagnostics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Severe,
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Severe => "severe",
            Self::Fatal => "fatal",
        })
    }
}

/// One message with its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub severity: ErrorSeverity,
    pub message: String,
    pub details: Vec<String>,
}

/// Parsed diagnostics of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    pub fatal: Vec<ErrorMessage>,
    pub severe: Vec<ErrorMessage>,
    pub warnings: Vec<ErrorMessage>,
    pub info: Vec<ErrorMessage>,
    /// The run reached the successful completion marker.
    pub simulation_complete: bool,
    /// First line of the file, e.g. `Program Version,EnergyPlus, Version 24.1.0`.
    pub program_version: Option<String>,
}

impl ErrorReport {
    pub fn parse(text: &str) -> Self {
        let mut report = Self::default();
        // Which list the last message went to, for continuation lines
        let mut last: Option<ErrorSeverity> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("Program Version") && report.program_version.is_none() {
                report.program_version = Some(trimmed.trim_end_matches(',').to_string());
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("*************") {
                let rest = rest.trim();
                if rest.contains(COMPLETED) {
                    report.simulation_complete = true;
                } else if rest.contains(TERMINATED) {
                    report.simulation_complete = false;
                }
                if !rest.is_empty() {
                    report.push(ErrorSeverity::Info, rest);
                    last = Some(ErrorSeverity::Info);
                }
                continue;
            }

            let Some((tag, body)) = split_tag(trimmed) else {
                continue;
            };
            match tag {
                "~~~" => {
                    if let Some(severity) = last {
                        if let Some(msg) = report.list_mut(severity).last_mut() {
                            msg.details.push(body.to_string());
                        }
                    }
                }
                _ => {
                    let severity = match tag {
                        "Fatal" => ErrorSeverity::Fatal,
                        "Severe" => ErrorSeverity::Severe,
                        "Warning" => ErrorSeverity::Warning,
                        _ => ErrorSeverity::Info,
                    };
                    report.push(severity, body);
                    last = Some(severity);
                }
            }
        }
        report
    }

    /// Parse a diagnostics file; a missing file yields an empty report.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        match crate::read_output_text(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    fn push(&mut self, severity: ErrorSeverity, message: &str) {
        self.list_mut(severity).push(ErrorMessage {
            severity,
            message: message.to_string(),
            details: Vec::new(),
        });
    }

    fn list_mut(&mut self, severity: ErrorSeverity) -> &mut Vec<ErrorMessage> {
        match severity {
            ErrorSeverity::Fatal => &mut self.fatal,
            ErrorSeverity::Severe => &mut self.severe,
            ErrorSeverity::Warning => &mut self.warnings,
            ErrorSeverity::Info => &mut self.info,
        }
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal.len()
    }

    pub fn severe_count(&self) -> usize {
        self.severe.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_fatal(&self) -> bool {
        !self.fatal.is_empty()
    }

    pub fn has_severe(&self) -> bool {
        !self.severe.is_empty()
    }

    /// One-line summary of the counts and completion state.
    pub fn summary(&self) -> String {
        format!(
            "{} fatal, {} severe, {} warnings; simulation {}",
            self.fatal_count(),
            self.severe_count(),
            self.warning_count(),
            if self.simulation_complete {
                "completed successfully"
            } else {
                "did not complete"
            }
        )
    }
}

/// Split `** Tag ** body` into its tag and body.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("**")?;
    let end = rest.find("**")?;
    Some((rest[..end].trim(), rest[end + 2..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERR: &str = "Program Version,EnergyPlus, Version 24.1.0-9d7789a3ac, YMD=2024.05.01 10:00,
   ** Warning ** GetSurfaceData: Entered Zone Floor Areas differ from calculated Zone Floor Area(s).
   **   ~~~   ** ...use Output:Diagnostics,DisplayExtraWarnings; to show more information on individual zones.
   ** Warning ** Zone=OFFICE has no thermostat.
   ** Severe  ** Construction=EXTWALL references undefined material BRICK.
   **   ~~~   ** ...in Construction outside layer.
   **  Fatal  ** GetInput: Errors found in input.
   ...Summary of Errors that led to program termination:
   ..... Reference severe error count=1
   ************* Warning:  Node connection errors not checked - most system input has not been read (see previous warning).
   ************* EnergyPlus Terminated--Fatal Error Detected. 2 Warning; 1 Severe Errors; Elapsed Time=00hr 00min  0.21sec
";

    #[test]
    fn test_parse_messages() {
        let report = ErrorReport::parse(ERR);
        assert_eq!(report.warning_count(), 2);
        assert_eq!(report.severe_count(), 1);
        assert_eq!(report.fatal_count(), 1);
        assert!(!report.simulation_complete);
        assert!(report.has_fatal() && report.has_severe());

        assert_eq!(report.warnings[0].details.len(), 1);
        assert!(report.warnings[0].details[0].starts_with("...use Output:Diagnostics"));
        assert_eq!(report.severe[0].details, vec!["...in Construction outside layer."]);
        assert_eq!(report.fatal[0].message, "GetInput: Errors found in input.");
        assert_eq!(report.info.len(), 2);
        assert!(report
            .program_version
            .as_deref()
            .is_some_and(|v| v.contains("24.1.0")));
    }

    #[test]
    fn test_completed_run() {
        let text = "Program Version,EnergyPlus, Version 24.1.0,\n   ************* EnergyPlus Completed Successfully-- 0 Warning; 0 Severe Errors; Elapsed Time=00hr 00min  2.11sec\n";
        let report = ErrorReport::parse(text);
        assert!(report.simulation_complete);
        assert_eq!(
            report.summary(),
            "0 fatal, 0 severe, 0 warnings; simulation completed successfully"
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let report = ErrorReport::from_file(Path::new("/no/such/eplusout.err")).unwrap();
        assert_eq!(report, ErrorReport::default());
    }
}
