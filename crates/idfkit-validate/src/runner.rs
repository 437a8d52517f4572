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


//! Validation runner

use crate::diagnostic::{Severity, ValidationIssue, ValidationResult};
use crate::rules::{default_rules, ValidationContext, ValidationRule};
use idfkit_core::Document;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Maximum number of issues to collect before stopping.
const MAX_ISSUES: usize = 10_000;

/// Configuration for a validation run
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Report references to objects that do not exist (default: true)
    pub check_references: bool,
    /// Only validate these object types (default: all)
    pub object_types: Option<Vec<String>>,
    /// Minimum severity to report
    pub min_severity: Severity,
    /// Maximum number of issues to collect (default: 10,000)
    pub max_issues: usize,
    /// Codes of rules that are switched off
    pub disabled_rules: HashSet<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_references: true,
            object_types: None,
            min_severity: Severity::Info,
            max_issues: MAX_ISSUES,
            disabled_rules: HashSet::new(),
        }
    }
}

impl ValidationConfig {
    pub fn with_object_types(mut self, object_types: Vec<String>) -> Self {
        self.object_types = Some(object_types);
        self
    }

    pub fn with_check_references(mut self, check_references: bool) -> Self {
        self.check_references = check_references;
        self
    }

    /// Disable a specific rule
    pub fn disable_rule(&mut self, code: &str) {
        self.disabled_rules.insert(code.to_string());
    }
}

/// Validation runner
pub struct ValidationRunner {
    config: ValidationConfig,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationRunner {
    /// Create a new runner with the default rules
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            rules: default_rules(),
        }
    }

    /// Create a runner with custom rules
    pub fn with_rules(config: ValidationConfig, rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { config, rules }
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all enabled rules on a document.
    ///
    /// Collection stops once `max_issues` issues have been gathered.
    pub fn run(&self, doc: &Document) -> ValidationResult {
        let ctx = ValidationContext::new(
            doc,
            self.config.object_types.as_deref(),
            self.config.check_references,
        );
        let mut result = ValidationResult::default();

        'rules: for rule in &self.rules {
            if self.config.disabled_rules.contains(rule.code()) {
                continue;
            }
            for issue in rule
                .check(&ctx)
                .into_iter()
                .filter(|i| i.severity() >= self.config.min_severity)
            {
                if result.total() >= self.config.max_issues {
                    warn!(
                        "Validation stopped after {} issues",
                        self.config.max_issues
                    );
                    break 'rules;
                }
                result.push(issue);
            }
        }

        debug!(
            "Validation finished: {} errors, {} warnings, {} info",
            result.errors.len(),
            result.warnings.len(),
            result.info.len()
        );
        result
    }

    /// Run and return the issues as a flat list, errors first
    pub fn run_flat(&self, doc: &Document) -> Vec<ValidationIssue> {
        self.run(doc).iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idfkit_core::SchemaRegistry;
    use serde_json::{json, Map, Value};

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn sample() -> Document {
        let mut doc = Document::new(SchemaRegistry::new().latest().unwrap());
        doc.add_unchecked("Zone", "A", fields(json!({"multiplier": "many"})))
            .unwrap();
        doc.add("Lights", "L1", &fields(json!({"schedule_name": "Missing"})))
            .unwrap();
        doc
    }

    #[test]
    fn test_min_severity_filter() {
        let config = ValidationConfig {
            min_severity: Severity::Warning,
            ..Default::default()
        };
        let result = ValidationRunner::new(config).run(&sample());
        assert!(result.info.is_empty());
        assert!(!result.warnings.is_empty());
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn test_disable_rule() {
        let mut config = ValidationConfig::default();
        config.disable_rule("E004");
        let result = ValidationRunner::new(config).run(&sample());
        assert!(result.errors.iter().all(|i| i.code() != "E004"));
        assert!(result.errors.iter().any(|i| i.code() == "E007"));
    }

    #[test]
    fn test_max_issues() {
        let config = ValidationConfig {
            max_issues: 2,
            ..Default::default()
        };
        let result = ValidationRunner::new(config).run(&sample());
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn test_custom_rule() {
        struct NoLights;
        impl ValidationRule for NoLights {
            fn code(&self) -> &str {
                "X001"
            }
            fn description(&self) -> &str {
                "Lights are not allowed"
            }
            fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationIssue> {
                ctx.objects()
                    .filter(|(o, _)| o.obj_type == "Lights")
                    .map(|(o, _)| ValidationIssue::warning(self.code(), "Lights", o.name.as_str(), "no"))
                    .collect()
            }
        }

        let runner = ValidationRunner::with_rules(ValidationConfig::default(), vec![Box::new(NoLights)]);
        let issues = runner.run_flat(&sample());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].obj_name(), "L1");
    }
}
