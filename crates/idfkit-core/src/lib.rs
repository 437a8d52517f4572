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


//! Schema-driven object model for EnergyPlus building models.
//!
//! Models are held in a [`Document`]: objects grouped by type, each with
//! epJSON-style field values checked against a [`Schema`]. Schemas are
//! resolved by version through a [`SchemaRegistry`], which ships a compact
//! bundled schema and can load full schemas from EnergyPlus installs.
//!
//! # Formats
//!
//! - [`idf`]: the classic comma/semicolon text format.
//! - [`epjson`]: the JSON format EnergyPlus reads natively.
//!
//! ```
//! use idfkit_core::{idf, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new();
//! let doc = idf::parse_idf("Version,24.1;\nZone,Office;", None, &registry).unwrap();
//! assert!(doc.get("Zone", "office").is_some());
//! ```

mod document;
pub mod epjson;
mod error;
pub mod idf;
mod introspection;
mod object;
pub mod reference;
mod registry;
pub mod schema;
mod version;

pub use document::{Document, VERSION_TYPE};
pub use error::{IdfError, IdfResult};
pub use introspection::{describe_object_type, FieldDescription, ObjectDescription};
pub use object::IdfObject;
pub use reference::DanglingReference;
pub use registry::{bundled_schema_text, RegistryStats, SchemaRegistry, SCHEMA_FILE_NAME};
pub use schema::{FieldKind, FieldSchema, ObjectSchema, Schema};
pub use version::{version_string, Version, LATEST_VERSION};

/// Create an empty model for `version`.
pub fn new_document(version: Version, registry: &SchemaRegistry) -> IdfResult<Document> {
    Ok(Document::new(registry.get(version)?))
}

/// Load a model, choosing the format from the file extension.
///
/// `.epjson` and `.json` are read as epJSON, anything else as IDF.
pub fn load_document(
    path: impl AsRef<std::path::Path>,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let path = path.as_ref();
    if is_epjson_path(path) {
        epjson::load_epjson(path, version, registry)
    } else {
        idf::load_idf(path, version, registry)
    }
}

/// Whether a path names an epJSON file.
pub fn is_epjson_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("epjson") || e.eq_ignore_ascii_case("json"))
}
