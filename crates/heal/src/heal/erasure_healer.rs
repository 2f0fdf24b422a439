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

use super::background::BackgroundHealState;
use super::reconcile::{EntryReconciler, FileInfoVersionsStream};
use super::sequence::{BG_HEALING_UUID, HealSequence, HealSource};
use super::throttle::HealThrottle;
use crate::storage::{BucketInfo, DiskStore, SetTopology};
use crate::{Error, Result};
use futures::future::join_all;
use rustfs_madmin::HealItemType;
use rustfs_utils::path::path_join_buf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// System bucket holding cluster wide metadata.
pub const RUSTFS_META_BUCKET: &str = ".rustfs.sys";
pub const BACKEND_ENCRYPTED_FILE: &str = "backend-encrypted";
pub const CONFIG_PREFIX: &str = "config";
pub const BUCKET_META_PREFIX: &str = "buckets";

/// Walks one erasure set and feeds every object that is not fully healthy to
/// the background heal sequence.
pub struct ErasureSetHealer {
    state: Arc<BackgroundHealState>,
    topology: Arc<dyn SetTopology>,
    poll_interval: Duration,
    bucket_concurrency: usize,
}

impl ErasureSetHealer {
    pub fn new(state: Arc<BackgroundHealState>, topology: Arc<dyn SetTopology>) -> Self {
        let poll_interval = state.config().poll_interval;
        let bucket_concurrency = state.config().bucket_concurrency.max(1);
        Self {
            state,
            topology,
            poll_interval,
            bucket_concurrency,
        }
    }

    /// Heal every bucket of one erasure set.
    ///
    /// Waits for the background sequence to appear first. Returns `Ok(())`
    /// when `ctx` is cancelled, whether before the sequence shows up or in
    /// the middle of a bucket. Per-object failures are logged and skipped.
    #[tracing::instrument(skip(self, ctx, buckets, disks), fields(set = set_index + 1, bucket_count = buckets.len(), disk_count = disks.len()))]
    #[allow(clippy::too_many_arguments)]
    pub async fn heal_erasure_set(
        &self,
        ctx: &CancellationToken,
        prefix: &str,
        set_index: usize,
        max_io: usize,
        max_sleep: Duration,
        buckets: &[BucketInfo],
        disks: &[Option<DiskStore>],
    ) -> Result<()> {
        let Some(bg_seq) = self.wait_for_background_sequence(ctx).await else {
            info!("erasure set heal cancelled before background healing started");
            return Ok(());
        };

        let set_drive_count = self.topology.set_drive_count();
        let throttle = HealThrottle::new(max_io, max_sleep);

        self.heal_system_meta(ctx, &bg_seq).await;

        let semaphore = Semaphore::new(self.bucket_concurrency);
        let semaphore = &semaphore;
        let bg_seq = &bg_seq;
        let tasks = buckets.iter().map(|bucket| async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            if ctx.is_cancelled() {
                return;
            }
            self.heal_bucket(ctx, bg_seq, &bucket.name, prefix, set_index, set_drive_count, throttle, disks)
                .await;
        });
        join_all(tasks).await;

        Ok(())
    }

    async fn wait_for_background_sequence(&self, ctx: &CancellationToken) -> Option<Arc<HealSequence>> {
        loop {
            if let Some(seq) = self.state.get_heal_sequence_by_token(BG_HEALING_UUID).await {
                return Some(seq);
            }
            tokio::select! {
                _ = ctx.cancelled() => return None,
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    /// Heal the cluster wide metadata that lives outside user buckets. The
    /// config and bucket metadata prefixes are healed as buckets.
    async fn heal_system_meta(&self, ctx: &CancellationToken, bg_seq: &HealSequence) {
        let sources = [
            (
                HealSource::object(RUSTFS_META_BUCKET, BACKEND_ENCRYPTED_FILE, ""),
                HealItemType::Metadata,
            ),
            (
                HealSource::bucket(&path_join_buf(&[RUSTFS_META_BUCKET, CONFIG_PREFIX])),
                HealItemType::BucketMetadata,
            ),
            (
                HealSource::bucket(&path_join_buf(&[RUSTFS_META_BUCKET, BUCKET_META_PREFIX])),
                HealItemType::BucketMetadata,
            ),
        ];
        for (source, item_type) in sources {
            let path = path_join_buf(&[&source.bucket, &source.object]);
            match bg_seq.queue_heal_task(ctx, source, item_type).await {
                Ok(()) => {}
                Err(Error::Cancelled) => return,
                Err(err) if err.is_not_found() => {}
                Err(err) => warn!("heal of {} failed: {}", path, err),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn heal_bucket(
        &self,
        ctx: &CancellationToken,
        bg_seq: &HealSequence,
        bucket: &str,
        prefix: &str,
        set_index: usize,
        set_drive_count: usize,
        throttle: HealThrottle,
        disks: &[Option<DiskStore>],
    ) {
        match bg_seq.queue_heal_task(ctx, HealSource::bucket(bucket), HealItemType::Bucket).await {
            Ok(()) => {}
            Err(Error::Cancelled) => return,
            Err(err) if err.is_not_found() => {}
            Err(err) => warn!("heal of bucket {} failed: {}", bucket, err),
        }

        let streams = open_version_streams(ctx, bucket, prefix, set_index, disks).await;
        if streams.is_empty() {
            info!("no disk of erasure set {} could list bucket {}", set_index + 1, bucket);
            return;
        }
        let mut reconciler = EntryReconciler::new(streams);

        loop {
            let next = tokio::select! {
                _ = ctx.cancelled() => None,
                next = reconciler.next_entry() => next,
            };
            let Some(reconciled) = next else {
                break;
            };

            if reconciled.quorum_count >= set_drive_count {
                continue;
            }

            for version in reconciled.entry.versions.iter() {
                let source = HealSource::object(bucket, &version.name, &version.version_id_string()).with_throttle(throttle);
                match bg_seq.queue_heal_task(ctx, source, HealItemType::Object).await {
                    Ok(()) => {}
                    Err(Error::Cancelled) => {
                        info!("healing of bucket {} on erasure set {} cancelled", bucket, set_index + 1);
                        return;
                    }
                    Err(err) if err.is_not_found() => {
                        debug!("{}/{} vanished before it could be healed", bucket, version.name);
                    }
                    Err(err) => {
                        error!(
                            "unable to heal object {}/{} ({}): {}",
                            bucket,
                            version.name,
                            version.version_id_string(),
                            err
                        );
                    }
                }
            }
        }

        if ctx.is_cancelled() {
            info!("healing of bucket {} on erasure set {} cancelled", bucket, set_index + 1);
        } else {
            info!("healing finished for bucket {} on erasure set {}", bucket, set_index + 1);
        }
    }
}

/// Open one listing per present disk. Absent disks and disks that fail to
/// start listing are left out.
async fn open_version_streams(
    ctx: &CancellationToken,
    bucket: &str,
    prefix: &str,
    set_index: usize,
    disks: &[Option<DiskStore>],
) -> Vec<FileInfoVersionsStream> {
    let walks = disks.iter().flatten().map(|disk| async move {
        match disk.walk_versions(bucket, prefix, "", true, ctx.clone()).await {
            Ok(rx) => Some(FileInfoVersionsStream::new(rx, set_index, disk.endpoint())),
            Err(err) => {
                let err = Error::DiskUnavailable {
                    endpoint: disk.endpoint(),
                    message: err.to_string(),
                };
                warn!("skipping disk while listing {}: {}", bucket, err);
                None
            }
        }
    });
    join_all(walks).await.into_iter().flatten().collect()
}
