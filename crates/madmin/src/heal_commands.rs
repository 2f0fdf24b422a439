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
use std::fmt::{self, Display};
use time::OffsetDateTime;

/// Remove objects that do not have read quorum while healing.
pub const HEAL_DELETE_DANGLING: bool = true;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealItemType {
    #[serde(rename = "metadata")]
    Metadata,
    #[serde(rename = "bucket")]
    Bucket,
    #[serde(rename = "bucket-metadata")]
    BucketMetadata,
    #[serde(rename = "object")]
    Object,
}

impl HealItemType {
    pub fn to_str(&self) -> &str {
        match self {
            HealItemType::Metadata => "metadata",
            HealItemType::Bucket => "bucket",
            HealItemType::BucketMetadata => "bucket-metadata",
            HealItemType::Object => "object",
        }
    }
}

impl Display for HealItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum HealScanMode {
    Unknown = 0,
    #[default]
    Normal = 1,
    Deep = 2,
}

impl TryFrom<u8> for HealScanMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HealScanMode::Unknown),
            1 => Ok(HealScanMode::Normal),
            2 => Ok(HealScanMode::Deep),
            _ => Err(format!("invalid HealScanMode value: {value}")),
        }
    }
}

impl Serialize for HealScanMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for HealScanMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u8),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => HealScanMode::try_from(n).map_err(serde::de::Error::custom),
            Raw::Str(s) => match s.as_str() {
                "Unknown" | "unknown" => Ok(HealScanMode::Unknown),
                "Normal" | "normal" => Ok(HealScanMode::Normal),
                "Deep" | "deep" => Ok(HealScanMode::Deep),
                other => other
                    .parse::<u8>()
                    .map_err(|_| serde::de::Error::custom(format!("invalid HealScanMode string: {other}")))
                    .and_then(|n| HealScanMode::try_from(n).map_err(serde::de::Error::custom)),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealOpts {
    pub recursive: bool,
    #[serde(rename = "dryRun")]
    pub dry_run: bool,
    pub remove: bool,
    pub recreate: bool,
    #[serde(rename = "scanMode")]
    pub scan_mode: HealScanMode,
    #[serde(rename = "updateParity")]
    pub update_parity: bool,
    #[serde(rename = "nolock")]
    pub no_lock: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealResultItem {
    #[serde(rename = "resultId")]
    pub result_index: usize,
    #[serde(rename = "type")]
    pub heal_item_type: Option<HealItemType>,
    #[serde(rename = "bucket")]
    pub bucket: String,
    #[serde(rename = "object")]
    pub object: String,
    #[serde(rename = "versionId")]
    pub version_id: String,
    #[serde(rename = "detail")]
    pub detail: String,
    #[serde(rename = "parityBlocks")]
    pub parity_blocks: usize,
    #[serde(rename = "dataBlocks")]
    pub data_blocks: usize,
    #[serde(rename = "diskCount")]
    pub disk_count: usize,
    #[serde(rename = "setCount")]
    pub set_count: usize,
    #[serde(rename = "objectSize")]
    pub object_size: usize,
}

/// Background heal status of one node, as served to the admin API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgHealState {
    #[serde(rename = "offline_endpoints", default)]
    pub offline_endpoints: Vec<String>,
    #[serde(rename = "scanned_items_count")]
    pub scanned_items_count: u64,
    #[serde(rename = "last_heal_activity", with = "time::serde::rfc3339::option")]
    pub last_heal_activity: Option<OffsetDateTime>,
    #[serde(rename = "next_heal_round", with = "time::serde::rfc3339::option")]
    pub next_heal_round: Option<OffsetDateTime>,
    #[serde(rename = "heal_disks", default)]
    pub heal_disks: Vec<String>,
}
