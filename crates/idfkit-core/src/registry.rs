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

//! Schema lookup and caching.
//!
//! Schemas are resolved per version from, in order:
//!
//! 1. each search directory as `<dir>/V<X>-<Y>-<Z>/Energy+.schema.epJSON`
//! 2. each search directory as `<dir>/Energy+.schema.epJSON` (an EnergyPlus
//!    install), accepted when its `epJSON_schema_version` matches
//! 3. the compact schema bundled with this crate
//!
//! Parsed schemas are shared through a concurrent cache.

use crate::error::{IdfError, IdfResult};
use crate::schema::Schema;
use crate::version::{Version, LATEST_VERSION};
use dashmap::DashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// File name EnergyPlus uses for its schema.
pub const SCHEMA_FILE_NAME: &str = "Energy+.schema.epJSON";

const BUNDLED_SCHEMAS: &[(Version, &str)] = &[(
    LATEST_VERSION,
    include_str!("../schemas/V24-1-0.schema.epJSON"),
)];

/// Raw text of a bundled schema, if one ships for this version.
pub fn bundled_schema_text(version: Version) -> Option<&'static str> {
    BUNDLED_SCHEMAS
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, text)| *text)
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub hits: u64,
    pub misses: u64,
    pub cached: usize,
}

impl RegistryStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Resolves and caches schemas by version.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    search_dirs: Vec<PathBuf>,
    cache: DashMap<Version, Arc<Schema>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SchemaRegistry {
    /// Registry backed by the bundled schemas only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_dirs: dirs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Get the schema for a version, loading it on first use.
    pub fn get(&self, version: Version) -> IdfResult<Arc<Schema>> {
        if let Some(schema) = self.cache.get(&version) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(schema.value()));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let schema = Arc::new(self.load(version)?);
        self.cache.insert(version, Arc::clone(&schema));
        Ok(schema)
    }

    /// Schema for the newest bundled version.
    pub fn latest(&self) -> IdfResult<Arc<Schema>> {
        self.get(LATEST_VERSION)
    }

    /// Versions that can be resolved, newest first.
    pub fn available_versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = BUNDLED_SCHEMAS.iter().map(|(v, _)| *v).collect();
        for dir in &self.search_dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name();
                if let Some(v) = name.to_str().and_then(parse_dir_name) {
                    if entry.path().join(SCHEMA_FILE_NAME).is_file() {
                        versions.push(v);
                    }
                }
            }
        }
        versions.sort_unstable_by(|a, b| b.cmp(a));
        versions.dedup();
        versions
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            cached: self.cache.len(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn load(&self, version: Version) -> IdfResult<Schema> {
        for dir in &self.search_dirs {
            let versioned = dir.join(version.dir_name()).join(SCHEMA_FILE_NAME);
            if versioned.is_file() {
                return load_schema_file(version, &versioned);
            }

            let install = dir.join(SCHEMA_FILE_NAME);
            if install.is_file() && install_matches(&install, version) {
                return load_schema_file(version, &install);
            }
        }

        if let Some(text) = bundled_schema_text(version) {
            debug!("Using bundled schema for {}", version);
            return Schema::from_json(version, text).map_err(|e| {
                IdfError::SchemaNotFound(format!("bundled schema for {} is invalid: {}", version, e))
            });
        }

        Err(IdfError::VersionNotFound(format!(
            "no schema available for EnergyPlus {}",
            version
        )))
    }
}

fn load_schema_file(version: Version, path: &Path) -> IdfResult<Schema> {
    info!("Loading schema {} from {}", version, path.display());
    let text = std::fs::read_to_string(path).map_err(|e| {
        IdfError::SchemaNotFound(format!("cannot read {}: {}", path.display(), e))
    })?;
    Schema::from_json(version, &text).map_err(|e| {
        IdfError::SchemaNotFound(format!("cannot parse {}: {}", path.display(), e))
    })
}

fn install_matches(path: &Path, version: Version) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(&text) else {
        return false;
    };
    value
        .get("epJSON_schema_version")
        .and_then(Value::as_str)
        .and_then(|s| Version::parse_identifier(s).ok())
        .is_some_and(|v| v.same_release(&version))
}

/// `V24-1-0` -> 24.1.0
fn parse_dir_name(name: &str) -> Option<Version> {
    let rest = name.strip_prefix('V')?;
    let parts: Vec<u32> = rest
        .split('-')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TINY_SCHEMA: &str = r#"{
        "properties": {
            "Zone": {
                "patternProperties": {".*": {"type": "object", "properties": {}}},
                "group": "Thermal Zones and Surfaces",
                "name": {"type": "string", "is_required": true}
            }
        },
        "epJSON_schema_version": "9.6.0"
    }"#;

    #[test]
    fn test_bundled_latest() {
        let registry = SchemaRegistry::new();
        let schema = registry.latest().unwrap();
        assert_eq!(schema.version(), LATEST_VERSION);
        assert!(schema.contains_type("Zone"));
    }

    #[test]
    fn test_cache_hits_and_misses() {
        let registry = SchemaRegistry::new();
        let a = registry.get(LATEST_VERSION).unwrap();
        let b = registry.get(LATEST_VERSION).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let stats = registry.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.cached, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_version() {
        let registry = SchemaRegistry::new();
        let err = registry.get(Version::new(1, 0, 0)).unwrap_err();
        assert!(matches!(err, IdfError::VersionNotFound(_)));
    }

    #[test]
    fn test_versioned_search_dir() {
        let dir = TempDir::new().unwrap();
        let vdir = dir.path().join("V9-6-0");
        std::fs::create_dir_all(&vdir).unwrap();
        std::fs::write(vdir.join(SCHEMA_FILE_NAME), TINY_SCHEMA).unwrap();

        let registry = SchemaRegistry::with_search_dirs([dir.path().to_path_buf()]);
        let schema = registry.get(Version::new(9, 6, 0)).unwrap();
        assert_eq!(schema.len(), 1);
        assert!(registry
            .available_versions()
            .contains(&Version::new(9, 6, 0)));
    }

    #[test]
    fn test_install_dir_schema() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SCHEMA_FILE_NAME), TINY_SCHEMA).unwrap();

        let registry = SchemaRegistry::with_search_dirs([dir.path().to_path_buf()]);
        assert!(registry.get(Version::new(9, 6, 0)).is_ok());
        // Version tag mismatch falls through to bundled schemas
        assert!(registry.get(LATEST_VERSION).unwrap().len() > 1);
    }

    #[test]
    fn test_corrupt_schema_is_schema_not_found() {
        let dir = TempDir::new().unwrap();
        let vdir = dir.path().join("V9-5-0");
        std::fs::create_dir_all(&vdir).unwrap();
        std::fs::write(vdir.join(SCHEMA_FILE_NAME), "{ not json").unwrap();

        let registry = SchemaRegistry::with_search_dirs([dir.path().to_path_buf()]);
        let err = registry.get(Version::new(9, 5, 0)).unwrap_err();
        assert!(matches!(err, IdfError::SchemaNotFound(_)));
    }

    #[test]
    fn test_parse_dir_name() {
        assert_eq!(parse_dir_name("V24-1-0"), Some(Version::new(24, 1, 0)));
        assert_eq!(parse_dir_name("V24-1"), None);
        assert_eq!(parse_dir_name("EnergyPlus"), None);
    }
}
