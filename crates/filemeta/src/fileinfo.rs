// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One version of an object as reported by a single disk.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct FileInfo {
    pub volume: String,
    pub name: String,
    pub version_id: Option<Uuid>,
    pub is_latest: bool,
    pub deleted: bool,
    pub data_dir: Option<Uuid>,
    pub mod_time: Option<OffsetDateTime>,
    pub size: i64,
    // Index of the disk that produced this version, not part of the version identity.
    pub idx: usize,
}

impl FileInfo {
    pub fn new(volume: &str, name: &str, version_id: Option<Uuid>) -> Self {
        Self {
            volume: volume.to_string(),
            name: name.to_string(),
            version_id,
            ..Default::default()
        }
    }

    /// Version id rendered the way heal sources and admin responses carry it,
    /// an empty string for the null version.
    pub fn version_id_string(&self) -> String {
        self.version_id.map(|v| v.to_string()).unwrap_or_default()
    }

    /// Check whether two disks describe the same version of the object.
    ///
    /// Fields that legitimately differ between disks (`idx`) are ignored.
    pub fn same_version(&self, other: &FileInfo) -> bool {
        self.name == other.name
            && self.version_id == other.version_id
            && self.deleted == other.deleted
            && self.data_dir == other.data_dir
            && self.mod_time == other.mod_time
            && self.size == other.size
    }
}

/// All versions of one object key as listed by one disk.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FileInfoVersions {
    // Name of the volume.
    pub volume: String,

    // Name of the file.
    pub name: String,

    // Represents the latest mod time of the
    // latest version.
    pub latest_mod_time: Option<OffsetDateTime>,

    pub versions: Vec<FileInfo>,
}

impl FileInfoVersions {
    pub fn new(volume: &str, name: &str, versions: Vec<FileInfo>) -> Self {
        let latest_mod_time = versions.iter().find(|v| v.is_latest).or(versions.first()).and_then(|v| v.mod_time);
        Self {
            volume: volume.to_string(),
            name: name.to_string(),
            latest_mod_time,
            versions,
        }
    }

    /// Two listings agree when they carry the same versions in the same order.
    pub fn same_versions(&self, other: &FileInfoVersions) -> bool {
        self.name == other.name
            && self.versions.len() == other.versions.len()
            && self.versions.iter().zip(other.versions.iter()).all(|(a, b)| a.same_version(b))
    }
}
