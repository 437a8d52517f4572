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


//! Locating an EnergyPlus installation.

use crate::error::{SimError, SimResult};
use idfkit_core::Version;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an EnergyPlus install directory.
pub const ENERGYPLUS_DIR_ENV: &str = "ENERGYPLUS_DIR";

#[cfg(windows)]
const EXECUTABLE: &str = "energyplus.exe";
#[cfg(not(windows))]
const EXECUTABLE: &str = "energyplus";

#[cfg(windows)]
const INSTALL_ROOTS: &[&str] = &["C:\\"];
#[cfg(target_os = "macos")]
const INSTALL_ROOTS: &[&str] = &["/Applications"];
#[cfg(all(not(windows), not(target_os = "macos")))]
const INSTALL_ROOTS: &[&str] = &["/usr/local", "/opt"];

/// A usable EnergyPlus installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyPlusInstall {
    pub dir: PathBuf,
    pub executable: PathBuf,
    /// Parsed from the directory name when it follows the installer layout.
    pub version: Option<Version>,
}

impl EnergyPlusInstall {
    fn from_dir(dir: &Path) -> Option<Self> {
        let executable = dir.join(EXECUTABLE);
        if !executable.is_file() {
            return None;
        }
        Some(Self {
            dir: dir.to_path_buf(),
            executable,
            version: dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(version_from_dir_name),
        })
    }

    /// Schema shipped with the install, if present.
    pub fn schema_path(&self) -> Option<PathBuf> {
        let path = self.dir.join(idfkit_core::SCHEMA_FILE_NAME);
        path.is_file().then_some(path)
    }
}

/// Find EnergyPlus.
///
/// An explicit directory is authoritative. Otherwise `ENERGYPLUS_DIR`,
/// then `PATH`, then the standard install locations are searched, newest
/// version first.
pub fn find_energyplus(explicit: Option<&Path>) -> SimResult<EnergyPlusInstall> {
    if let Some(dir) = explicit {
        return EnergyPlusInstall::from_dir(dir).ok_or_else(|| {
            SimError::EnergyPlusNotFound(format!(
                "No {} executable in {}",
                EXECUTABLE,
                dir.display()
            ))
        });
    }

    if let Some(dir) = std::env::var_os(ENERGYPLUS_DIR_ENV) {
        if let Some(install) = EnergyPlusInstall::from_dir(Path::new(&dir)) {
            debug!("Using EnergyPlus from {}", ENERGYPLUS_DIR_ENV);
            return Ok(install);
        }
    }

    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            if let Some(install) = EnergyPlusInstall::from_dir(&dir) {
                debug!("Using EnergyPlus from PATH: {}", dir.display());
                return Ok(install);
            }
        }
    }

    for root in INSTALL_ROOTS {
        if let Some(install) = newest_install_in(Path::new(root)) {
            debug!("Using EnergyPlus from {}", install.dir.display());
            return Ok(install);
        }
    }

    Err(SimError::EnergyPlusNotFound(format!(
        "Could not find EnergyPlus. Set {} or install it under one of: {}",
        ENERGYPLUS_DIR_ENV,
        INSTALL_ROOTS.join(", ")
    )))
}

/// The highest-versioned `EnergyPlus*` install directly under `root`.
fn newest_install_in(root: &Path) -> Option<EnergyPlusInstall> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut installs: Vec<EnergyPlusInstall> = entries
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with("EnergyPlus"))
        })
        .filter_map(|e| EnergyPlusInstall::from_dir(&e.path()))
        .collect();
    installs.sort_by(|a, b| b.version.cmp(&a.version));
    installs.into_iter().next()
}

/// `EnergyPlus-24-1-0` and `EnergyPlusV24-1-0` style names.
fn version_from_dir_name(name: &str) -> Option<Version> {
    let rest = name.strip_prefix("EnergyPlus")?;
    let rest = rest.trim_start_matches(['-', 'V', 'v']);
    let parts: Vec<u32> = rest
        .split(['-', '.'])
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_install(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(EXECUTABLE), b"").unwrap();
        dir
    }

    #[test]
    fn test_version_from_dir_name() {
        assert_eq!(
            version_from_dir_name("EnergyPlus-24-1-0"),
            Some(Version::new(24, 1, 0))
        );
        assert_eq!(
            version_from_dir_name("EnergyPlusV23-2-0"),
            Some(Version::new(23, 2, 0))
        );
        assert_eq!(version_from_dir_name("EnergyPlus"), None);
        assert_eq!(version_from_dir_name("Other-1-2-3"), None);
    }

    #[test]
    fn test_explicit_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = fake_install(tmp.path(), "EnergyPlus-24-1-0");
        let install = find_energyplus(Some(&dir)).unwrap();
        assert_eq!(install.executable, dir.join(EXECUTABLE));
        assert_eq!(install.version, Some(Version::new(24, 1, 0)));
        assert!(install.schema_path().is_none());
    }

    #[test]
    fn test_explicit_dir_missing_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let err = find_energyplus(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, SimError::EnergyPlusNotFound(_)));
    }

    #[test]
    fn test_newest_install_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fake_install(tmp.path(), "EnergyPlus-23-2-0");
        let newest = fake_install(tmp.path(), "EnergyPlus-24-1-0");
        std::fs::create_dir_all(tmp.path().join("EnergyPlus-25-1-0")).unwrap();

        let install = newest_install_in(tmp.path()).unwrap();
        assert_eq!(install.dir, newest);
    }
}
