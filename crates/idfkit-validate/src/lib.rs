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


//! Schema validation for EnergyPlus models.
//!
//! Rules check a [`Document`] against its schema and report issues tagged
//! with a severity and a stable code:
//!
//! | Code | Severity | Check |
//! |------|----------|-------|
//! | E001 | error | unknown object type |
//! | E002 | error | unknown field |
//! | E003 | error | required field missing |
//! | E004 | error | wrong value type |
//! | E005 | error | invalid choice |
//! | E006 | error | numeric bound violated |
//! | E007 | error | dangling reference |
//! | E008 | error | duplicate unique object |
//! | W001 | warning | required object type missing |
//! | I001 | info | empty field falls back to its default |
//!
//! ```rust
//! use idfkit_core::{new_document, SchemaRegistry, LATEST_VERSION};
//! use idfkit_validate::{validate_document, ValidationConfig};
//!
//! let registry = SchemaRegistry::new();
//! let doc = new_document(LATEST_VERSION, &registry).unwrap();
//! let result = validate_document(&doc, &ValidationConfig::default());
//! assert!(result.is_valid());
//! ```

mod diagnostic;
mod rules;
mod runner;

pub use diagnostic::{Severity, ValidationIssue, ValidationResult};
pub use rules::{default_rules, ValidationContext, ValidationRule};
pub use runner::{ValidationConfig, ValidationRunner};

use idfkit_core::Document;

/// Run the default rules on a document
pub fn validate_document(doc: &Document, config: &ValidationConfig) -> ValidationResult {
    ValidationRunner::new(config.clone()).run(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idfkit_core::{idf, SchemaRegistry};

    const MODEL: &str = r#"
Version,24.1;
Building,HQ,0,City;
GlobalGeometryRules,UpperLeftCorner,Counterclockwise,Relative;
Material,Brick,Rough,0.1,0.9,1900,800;
Construction,Wall,Brick;
Zone,Office;
BuildingSurface:Detailed,W1,Wall,Wall,Office,Outdoors,,SunExposed,WindExposed,,4,
  0,0,3, 0,0,0, 5,0,0, 5,0,3;
"#;

    #[test]
    fn test_valid_model() {
        let registry = SchemaRegistry::new();
        let doc = idf::parse_idf(MODEL, None, &registry).unwrap();
        let result = validate_document(&doc, &ValidationConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_broken_reference() {
        let registry = SchemaRegistry::new();
        let text = MODEL.replace("Construction,Wall,Brick;", "Construction,Wall,Stone;");
        let doc = idf::parse_idf(&text, None, &registry).unwrap();

        let result = validate_document(&doc, &ValidationConfig::default());
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "E007");
        assert_eq!(result.errors[0].field(), Some("outside_layer"));

        let relaxed = ValidationConfig::default().with_check_references(false);
        assert!(validate_document(&doc, &relaxed).is_valid());
    }

    #[test]
    fn test_zones_only_model_is_valid() {
        let registry = SchemaRegistry::new();
        let doc = idf::parse_idf("Zone,A;\nZone,B;", None, &registry).unwrap();
        let result = validate_document(&doc, &ValidationConfig::default());
        assert!(result.is_valid());
        assert!(result.warnings.iter().all(|w| w.code() == "W001"));
    }

    #[test]
    fn test_filtered_types() {
        let registry = SchemaRegistry::new();
        let text = MODEL.replace("Material,Brick,Rough,", "Material,Brick,Bumpy,");
        let doc = idf::parse_idf(&text, None, &registry).unwrap();

        let zones_only = ValidationConfig::default().with_object_types(vec!["zone".into()]);
        assert!(validate_document(&doc, &zones_only).is_valid());

        let materials = ValidationConfig::default().with_object_types(vec!["Material".into()]);
        let result = validate_document(&doc, &materials);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "E005");
    }
}
