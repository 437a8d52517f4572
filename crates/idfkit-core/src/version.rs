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

//! EnergyPlus version numbers.

use crate::error::{IdfError, IdfResult};
use std::fmt;
use std::str::FromStr;

/// An EnergyPlus release, `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Newest version with a bundled schema.
pub const LATEST_VERSION: Version = Version::new(24, 1, 0);

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `X.Y.Z` version string.
    pub fn parse(s: &str) -> IdfResult<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(IdfError::InvalidVersion(format!(
                "Version must be in 'X.Y.Z' format, got '{}'",
                s
            )));
        }
        Self::from_parts(&parts, s)
    }

    /// Parse the identifier stored in a `Version` object, which is usually
    /// `X.Y` but may carry a patch component.
    pub fn parse_identifier(s: &str) -> IdfResult<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.len() {
            2 => Self::from_parts(&[parts[0], parts[1], "0"], s),
            3 => Self::from_parts(&parts, s),
            _ => Err(IdfError::InvalidVersion(format!(
                "Version identifier must be 'X.Y' or 'X.Y.Z', got '{}'",
                s
            ))),
        }
    }

    fn from_parts(parts: &[&str], original: &str) -> IdfResult<Self> {
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(parts) {
            *slot = part.trim().parse().map_err(|_| {
                IdfError::InvalidVersion(format!(
                    "Version must be in 'X.Y.Z' format, got '{}'",
                    original
                ))
            })?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }

    /// The `X.Y` form written into `Version` objects.
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Directory name used for schema folders, e.g. `V24-1-0`.
    pub fn dir_name(&self) -> String {
        format!("V{}-{}-{}", self.major, self.minor, self.patch)
    }

    /// Whether two versions describe the same release series.
    pub fn same_release(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = IdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Render a version as `X.Y.Z`.
pub fn version_string(version: Version) -> String {
    version.to_string()
}
