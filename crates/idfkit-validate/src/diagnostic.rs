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


//! Validation issue types

use std::fmt;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, nothing to fix
    Info,
    /// Might be an issue
    Warning,
    /// Prevents a valid model
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding on a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    severity: Severity,
    obj_type: String,
    obj_name: String,
    field: Option<String>,
    message: String,
    code: String,
}

impl ValidationIssue {
    fn new(
        severity: Severity,
        code: impl Into<String>,
        obj_type: impl Into<String>,
        obj_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            obj_type: obj_type.into(),
            obj_name: obj_name.into(),
            field: None,
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn error(
        code: impl Into<String>,
        obj_type: impl Into<String>,
        obj_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Error, code, obj_type, obj_name, message)
    }

    pub fn warning(
        code: impl Into<String>,
        obj_type: impl Into<String>,
        obj_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, code, obj_type, obj_name, message)
    }

    pub fn info(
        code: impl Into<String>,
        obj_type: impl Into<String>,
        obj_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Info, code, obj_type, obj_name, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Public getters
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn obj_type(&self) -> &str {
        &self.obj_type
    }

    pub fn obj_name(&self) -> &str {
        &self.obj_name
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.obj_type)?;
        if !self.obj_name.is_empty() {
            write!(f, " '{}'", self.obj_name)?;
        }
        if let Some(ref field) = self.field {
            write!(f, ", field '{}'", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Issues found by a validation run, split by severity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// A model is valid when no errors were found; warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    /// Every issue, errors first.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::error("E003", "Zone", "Office", "Required field is missing")
            .with_field("x_origin");
        assert_eq!(
            issue.to_string(),
            "[E003] error: Zone 'Office', field 'x_origin': Required field is missing"
        );
        let unnamed = ValidationIssue::warning("W001", "Building", "", "missing");
        assert_eq!(unnamed.to_string(), "[W001] warning: Building: missing");
    }

    #[test]
    fn test_result_routing() {
        let mut result = ValidationResult::default();
        assert!(result.is_valid());

        result.push(ValidationIssue::info("I001", "Zone", "A", "default"));
        result.push(ValidationIssue::warning("W001", "Building", "", "missing"));
        assert!(result.is_valid());

        result.push(ValidationIssue::error("E002", "Zone", "A", "unknown"));
        assert!(!result.is_valid());
        assert_eq!(result.total(), 3);
        assert_eq!(result.iter().next().map(|i| i.code()), Some("E002"));
    }
}
