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

//! Storage collaborators the heal engine drives but does not implement.

use crate::Result;
use async_trait::async_trait;
use rustfs_filemeta::FileInfoVersions;
use rustfs_madmin::{HealOpts, HealResultItem};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Ordered stream of per-object version listings produced by one disk.
pub type VersionStream = mpsc::Receiver<FileInfoVersions>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
}

impl BucketInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One drive of an erasure set.
#[async_trait]
pub trait DiskAPI: Debug + Send + Sync + 'static {
    fn endpoint(&self) -> String;

    /// Walk every object under `bucket/prefix`, yielding entries in strictly
    /// increasing object name order. The stream ends when the walk completes
    /// or `cancel` fires.
    async fn walk_versions(
        &self,
        bucket: &str,
        prefix: &str,
        marker: &str,
        recursive: bool,
        cancel: CancellationToken,
    ) -> Result<VersionStream>;
}

pub type DiskStore = Arc<dyn DiskAPI>;

/// Object layer repair entry points used by the heal workers.
#[async_trait]
pub trait ObjectHealer: Send + Sync + 'static {
    /// Heal the on-disk format metadata of the cluster
    async fn heal_format(&self, dry_run: bool) -> Result<HealResultItem>;

    async fn heal_bucket(&self, bucket: &str, opts: &HealOpts) -> Result<HealResultItem>;

    /// Heal a single object version. An empty `version_id` means the null version.
    async fn heal_object(&self, bucket: &str, object: &str, version_id: &str, opts: &HealOpts) -> Result<HealResultItem>;
}

pub trait SetTopology: Send + Sync {
    /// Number of drives in each erasure set.
    fn set_drive_count(&self) -> usize;
}

/// Reports local disks that need healing (fresh or replaced drives).
#[async_trait]
pub trait LocalDiskScanner: Send + Sync {
    async fn local_disks_to_heal(&self) -> Vec<String>;
}

/// Current foreground request load, consulted by the heal throttle.
pub trait IoLoadMonitor: Send + Sync {
    fn active_requests(&self) -> usize;
}

/// Monitor that always reports an idle node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIoMonitor;

impl IoLoadMonitor for NoopIoMonitor {
    fn active_requests(&self) -> usize {
        0
    }
}
