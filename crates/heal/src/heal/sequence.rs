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

use super::throttle::HealThrottle;
use crate::{Error, Result};
use rustfs_madmin::{HEAL_DELETE_DANGLING, HealItemType, HealOpts, HealResultItem, HealScanMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use time::OffsetDateTime;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Client token of the node-wide background heal sequence.
pub const BG_HEALING_UUID: &str = "0000-0000-0000-0000";

/// Bucket name the background sequence is registered under.
pub const RUSTFS_RESERVED_BUCKET: &str = "rustfs";

/// Bucket of a task that must be skipped without touching storage.
pub const NOP_HEAL: &str = "";

type ItemsMap = HashMap<HealItemType, u64>;

/// What to heal and how, as handed to [`HealSequence::queue_heal_task`].
#[derive(Debug, Default, Clone)]
pub struct HealSource {
    pub bucket: String,
    pub object: String,
    pub version_id: String,
    pub throttle: HealThrottle,
    /// Hand the task off without waiting for its result
    pub no_wait: bool,
    /// Overrides the sequence heal setting
    pub opts: Option<HealOpts>,
}

impl HealSource {
    pub fn bucket(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..Default::default()
        }
    }

    pub fn object(bucket: &str, object: &str, version_id: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
            version_id: version_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_throttle(mut self, throttle: HealThrottle) -> Self {
        self.throttle = throttle;
        self
    }
}

#[derive(Debug)]
pub struct HealTask {
    pub bucket: String,
    pub object: String,
    pub version_id: String,
    pub opts: HealOpts,
    pub throttle: HealThrottle,
    pub item_type: HealItemType,
    pub(crate) resp_tx: Option<mpsc::Sender<HealResult>>,
}

impl HealTask {
    fn new(source: HealSource, item_type: HealItemType, setting: HealOpts) -> Self {
        Self {
            opts: source.opts.unwrap_or(setting),
            bucket: source.bucket,
            object: source.object,
            version_id: source.version_id,
            throttle: source.throttle,
            item_type,
            resp_tx: None,
        }
    }
}

#[derive(Debug)]
pub struct HealResult {
    pub result: HealResultItem,
    pub err: Option<Error>,
}

impl HealResult {
    pub fn ok(result: HealResultItem) -> Self {
        Self { result, err: None }
    }

    pub fn err(result: HealResultItem, err: Error) -> Self {
        Self { result, err: Some(err) }
    }

    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealStatusSummary {
    #[default]
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "stopped")]
    Stopped,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealSequenceStatus {
    #[serde(rename = "Summary")]
    pub summary: HealStatusSummary,
    #[serde(rename = "StartTime", with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(rename = "Settings")]
    pub heal_setting: HealOpts,
}

/// A named stream of heal tasks with its own queue and counters.
pub struct HealSequence {
    pub bucket: String,
    pub object: String,
    pub client_token: String,
    pub start_time: SystemTime,
    pub setting: HealOpts,
    current_status: RwLock<HealSequenceStatus>,
    scanned_items_map: RwLock<ItemsMap>,
    healed_items_map: RwLock<ItemsMap>,
    heal_failed_items_map: RwLock<ItemsMap>,
    last_heal_activity: RwLock<Option<SystemTime>>,
    tasks_tx: mpsc::Sender<HealTask>,
    tasks_rx: Arc<Mutex<mpsc::Receiver<HealTask>>>,
    cancel_token: CancellationToken,
}

impl fmt::Debug for HealSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealSequence")
            .field("bucket", &self.bucket)
            .field("object", &self.object)
            .field("client_token", &self.client_token)
            .field("setting", &self.setting)
            .field("cancelled", &self.cancel_token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Build the node-wide background sequence. Its lifetime is bound to `parent`.
pub fn new_bg_heal_sequence(parent: &CancellationToken, queue_capacity: usize) -> HealSequence {
    let setting = HealOpts {
        remove: HEAL_DELETE_DANGLING,
        scan_mode: HealScanMode::Normal,
        ..Default::default()
    };
    HealSequence::build(BG_HEALING_UUID, RUSTFS_RESERVED_BUCKET, "", setting, parent, queue_capacity)
}

impl HealSequence {
    /// Operator triggered sequence with a fresh client token.
    pub fn new(bucket: &str, object: &str, setting: HealOpts, parent: &CancellationToken, queue_capacity: usize) -> Self {
        let token = Uuid::new_v4().to_string();
        Self::build(&token, bucket, object, setting, parent, queue_capacity)
    }

    fn build(
        client_token: &str,
        bucket: &str,
        object: &str,
        setting: HealOpts,
        parent: &CancellationToken,
        queue_capacity: usize,
    ) -> Self {
        let (tasks_tx, tasks_rx) = mpsc::channel(queue_capacity.max(1));
        let start_time = SystemTime::now();
        Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
            client_token: client_token.to_string(),
            start_time,
            setting,
            current_status: RwLock::new(HealSequenceStatus {
                start_time: Some(OffsetDateTime::from(start_time)),
                heal_setting: setting,
                ..Default::default()
            }),
            scanned_items_map: RwLock::new(HashMap::new()),
            healed_items_map: RwLock::new(HashMap::new()),
            heal_failed_items_map: RwLock::new(HashMap::new()),
            last_heal_activity: RwLock::new(None),
            tasks_tx,
            tasks_rx: Arc::new(Mutex::new(tasks_rx)),
            cancel_token: parent.child_token(),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn is_quitting(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub(crate) fn task_receiver(&self) -> Arc<Mutex<mpsc::Receiver<HealTask>>> {
        self.tasks_rx.clone()
    }

    /// Cancel the sequence. Tasks already being healed run to completion.
    pub async fn stop(&self) {
        self.cancel_token.cancel();
        self.current_status.write().await.summary = HealStatusSummary::Stopped;
    }

    pub async fn status(&self) -> HealSequenceStatus {
        let mut status = self.current_status.read().await.clone();
        if self.is_quitting() && matches!(status.summary, HealStatusSummary::NotStarted | HealStatusSummary::Running) {
            status.summary = HealStatusSummary::Stopped;
        }
        status
    }

    async fn mark_running(&self) {
        let mut status = self.current_status.write().await;
        if status.summary == HealStatusSummary::NotStarted {
            status.summary = HealStatusSummary::Running;
        }
    }

    /// Submit one heal task and, unless `source.no_wait` is set, wait for its result.
    ///
    /// Blocks while the queue is full. Returns [`Error::Cancelled`] as soon as
    /// either `cancel` or the sequence itself is cancelled. A skipped task is
    /// reported as success; any other failure is handed back to the caller
    /// after the counters are updated.
    pub async fn queue_heal_task(&self, cancel: &CancellationToken, source: HealSource, heal_type: HealItemType) -> Result<()> {
        if self.is_quitting() || cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.mark_running().await;

        let no_wait = source.no_wait;
        let mut task = HealTask::new(source, heal_type, self.setting);

        if no_wait {
            return match self.tasks_tx.try_send(task) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(task)) => {
                    warn!("heal queue is full, dropping {} task {}/{}", heal_type, task.bucket, task.object);
                    Ok(())
                }
                Err(TrySendError::Closed(_)) => Err(Error::Cancelled),
            };
        }

        let (resp_tx, mut resp_rx) = mpsc::channel(1);
        task.resp_tx = Some(resp_tx);
        debug!("queue_heal_task: {}/{} ({})", task.bucket, task.object, heal_type);

        tokio::select! {
            _ = self.cancel_token.cancelled() => return Err(Error::Cancelled),
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            sent = self.tasks_tx.send(task) => sent.map_err(|_| Error::Cancelled)?,
        }

        let res = tokio::select! {
            _ = self.cancel_token.cancelled() => return Err(Error::Cancelled),
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            res = resp_rx.recv() => res,
        };

        let Some(res) = res else {
            return Err(Error::HealTaskFailed {
                message: "heal worker exited before reporting a result".to_string(),
            });
        };

        self.record_result(heal_type, &res).await;
        match res.err {
            None | Some(Error::SkipFile) => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Account for one finished task. Vanished objects and skipped tasks are
    /// scanned but neither healed nor failed.
    pub async fn record_result(&self, heal_type: HealItemType, result: &HealResult) {
        self.count_scanned(heal_type).await;
        match &result.err {
            None => self.count_healed(heal_type).await,
            Some(err) if err.is_not_found() || matches!(err, Error::SkipFile) => {}
            Some(_) => self.count_failed(heal_type).await,
        }
    }

    async fn count_scanned(&self, heal_type: HealItemType) {
        *self.scanned_items_map.write().await.entry(heal_type).or_insert(0) += 1;
        *self.last_heal_activity.write().await = Some(SystemTime::now());
    }

    async fn count_healed(&self, heal_type: HealItemType) {
        *self.healed_items_map.write().await.entry(heal_type).or_insert(0) += 1;
        *self.last_heal_activity.write().await = Some(SystemTime::now());
    }

    async fn count_failed(&self, heal_type: HealItemType) {
        *self.heal_failed_items_map.write().await.entry(heal_type).or_insert(0) += 1;
        *self.last_heal_activity.write().await = Some(SystemTime::now());
    }

    pub async fn get_scanned_items_count(&self) -> u64 {
        self.scanned_items_map.read().await.values().sum()
    }

    pub async fn get_healed_items_count(&self) -> u64 {
        self.healed_items_map.read().await.values().sum()
    }

    pub async fn get_failed_items_count(&self) -> u64 {
        self.heal_failed_items_map.read().await.values().sum()
    }

    pub async fn get_scanned_items_map(&self) -> ItemsMap {
        self.scanned_items_map.read().await.clone()
    }

    pub async fn get_healed_items_map(&self) -> ItemsMap {
        self.healed_items_map.read().await.clone()
    }

    pub async fn get_heal_failed_items_map(&self) -> ItemsMap {
        self.heal_failed_items_map.read().await.clone()
    }

    pub async fn last_heal_activity(&self) -> Option<SystemTime> {
        *self.last_heal_activity.read().await
    }
}
