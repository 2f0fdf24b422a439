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

#![allow(dead_code)]

//! In-memory disks, healers and scanners shared by the heal integration tests.

use async_trait::async_trait;
use rustfs_filemeta::{FileInfo, FileInfoVersions};
use rustfs_heal::storage::{DiskAPI, DiskStore, IoLoadMonitor, LocalDiskScanner, ObjectHealer, SetTopology, VersionStream};
use rustfs_heal::{BackgroundHealState, Error, HealConfig, Result};
use rustfs_madmin::{HealOpts, HealResultItem, HealScanMode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const META_BUCKET: &str = ".rustfs.sys";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn test_config() -> HealConfig {
    HealConfig {
        workers: 2,
        queue_multiplier: 1,
        bucket_concurrency: 2,
        poll_interval: Duration::from_millis(10),
        auto_drive_healing: true,
    }
}

/// Single-version listing entry with a stable mod time.
pub fn object(bucket: &str, name: &str, version_id: Option<Uuid>) -> FileInfoVersions {
    let fi = FileInfo {
        mod_time: Some(OffsetDateTime::UNIX_EPOCH),
        size: 1024,
        is_latest: true,
        ..FileInfo::new(bucket, name, version_id)
    };
    FileInfoVersions::new(bucket, name, vec![fi])
}

#[derive(Debug, Default)]
pub struct MockDisk {
    endpoint: String,
    buckets: HashMap<String, Vec<FileInfoVersions>>,
    offline: bool,
}

impl MockDisk {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn offline(endpoint: &str) -> Self {
        Self {
            offline: true,
            ..Self::new(endpoint)
        }
    }

    pub fn with_entries(mut self, bucket: &str, mut entries: Vec<FileInfoVersions>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        self.buckets.insert(bucket.to_string(), entries);
        self
    }

    pub fn store(self) -> Option<DiskStore> {
        Some(Arc::new(self))
    }
}

#[async_trait]
impl DiskAPI for MockDisk {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn walk_versions(
        &self,
        bucket: &str,
        prefix: &str,
        _marker: &str,
        _recursive: bool,
        cancel: CancellationToken,
    ) -> Result<VersionStream> {
        if self.offline {
            return Err(Error::other("drive is offline"));
        }
        let entries: Vec<_> = self
            .buckets
            .get(bucket)
            .map(|entries| entries.iter().filter(|e| e.name.starts_with(prefix)).cloned().collect())
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            for entry in entries {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    sent = tx.send(entry) => if sent.is_err() { return },
                }
            }
        });
        Ok(rx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealCall {
    Format,
    Bucket(String),
    Object {
        bucket: String,
        object: String,
        version_id: String,
        scan_mode: HealScanMode,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Broken,
}

/// Healer that records every call and fails the objects it is told to.
#[derive(Debug, Default)]
pub struct RecordingHealer {
    calls: Mutex<Vec<HealCall>>,
    failures: Mutex<HashMap<String, Failure>>,
    delay: Option<Duration>,
}

impl RecordingHealer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Each heal_object call sleeps for `delay` before returning.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn fail_object(&self, object: &str, failure: Failure) {
        self.failures.lock().unwrap().insert(object.to_string(), failure);
    }

    pub fn calls(&self) -> Vec<HealCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Object heals outside the system bucket, as (object, version id).
    pub fn user_object_heals(&self) -> Vec<(String, String)> {
        let mut heals: Vec<_> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                HealCall::Object {
                    bucket,
                    object,
                    version_id,
                    ..
                } if bucket != META_BUCKET => Some((object, version_id)),
                _ => None,
            })
            .collect();
        heals.sort();
        heals
    }

    pub fn meta_object_heals(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HealCall::Object { bucket, object, .. } if bucket == META_BUCKET => Some(object),
                _ => None,
            })
            .collect()
    }

    /// User bucket heals, sorted.
    pub fn bucket_heals(&self) -> Vec<String> {
        let mut buckets: Vec<_> = self
            .bucket_calls()
            .into_iter()
            .filter(|bucket| !bucket.starts_with(META_BUCKET))
            .collect();
        buckets.sort();
        buckets
    }

    /// Bucket heals of system bucket prefixes, in call order.
    pub fn meta_bucket_heals(&self) -> Vec<String> {
        self.bucket_calls()
            .into_iter()
            .filter(|bucket| bucket.starts_with(META_BUCKET))
            .collect()
    }

    fn bucket_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HealCall::Bucket(bucket) => Some(bucket),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ObjectHealer for RecordingHealer {
    async fn heal_format(&self, _dry_run: bool) -> Result<HealResultItem> {
        self.calls.lock().unwrap().push(HealCall::Format);
        Ok(HealResultItem::default())
    }

    async fn heal_bucket(&self, bucket: &str, _opts: &HealOpts) -> Result<HealResultItem> {
        self.calls.lock().unwrap().push(HealCall::Bucket(bucket.to_string()));
        Ok(HealResultItem {
            bucket: bucket.to_string(),
            ..Default::default()
        })
    }

    async fn heal_object(&self, bucket: &str, object: &str, version_id: &str, opts: &HealOpts) -> Result<HealResultItem> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(HealCall::Object {
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: version_id.to_string(),
            scan_mode: opts.scan_mode,
        });

        let failure = self.failures.lock().unwrap().get(object).copied();
        match failure {
            Some(Failure::NotFound) => Err(Error::ObjectNotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            }),
            Some(Failure::Broken) => Err(Error::HealTaskFailed {
                message: "not enough good parts".to_string(),
            }),
            None => Ok(HealResultItem {
                bucket: bucket.to_string(),
                object: object.to_string(),
                version_id: version_id.to_string(),
                ..Default::default()
            }),
        }
    }
}

pub struct FixedTopology(pub usize);

impl SetTopology for FixedTopology {
    fn set_drive_count(&self) -> usize {
        self.0
    }
}

pub struct StaticScanner(pub Vec<String>);

#[async_trait]
impl LocalDiskScanner for StaticScanner {
    async fn local_disks_to_heal(&self) -> Vec<String> {
        self.0.clone()
    }
}

pub struct IdleMonitor;

impl IoLoadMonitor for IdleMonitor {
    fn active_requests(&self) -> usize {
        0
    }
}

/// Registry with background healing already running on `healer`.
pub async fn start_engine(healer: Arc<RecordingHealer>) -> Arc<BackgroundHealState> {
    let state = BackgroundHealState::new(test_config());
    state
        .init_background_healing(healer, Arc::new(IdleMonitor))
        .await
        .expect("background healing should start");
    state
}
