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

use super::sequence::{HealResult, HealSequence, HealTask, NOP_HEAL};
use crate::Error;
use crate::storage::{IoLoadMonitor, ObjectHealer};
use rustfs_madmin::HealResultItem;
use rustfs_utils::path::SLASH_SEPARATOR;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Pool of workers draining the task queue of one heal sequence.
pub struct HealRoutine {
    workers: usize,
    healer: Arc<dyn ObjectHealer>,
    io_monitor: Arc<dyn IoLoadMonitor>,
}

impl HealRoutine {
    pub fn new(workers: usize, healer: Arc<dyn ObjectHealer>, io_monitor: Arc<dyn IoLoadMonitor>) -> Self {
        Self {
            workers: workers.max(1),
            healer,
            io_monitor,
        }
    }

    /// Spawn the workers. They exit once the sequence is cancelled.
    pub fn spawn(&self, seq: Arc<HealSequence>) -> Vec<JoinHandle<()>> {
        info!("starting {} heal workers for sequence {}", self.workers, seq.client_token);
        (0..self.workers)
            .map(|id| {
                let seq = seq.clone();
                let healer = self.healer.clone();
                let io_monitor = self.io_monitor.clone();
                tokio::spawn(async move { add_worker(id, seq, healer, io_monitor).await })
            })
            .collect()
    }
}

async fn add_worker(id: usize, seq: Arc<HealSequence>, healer: Arc<dyn ObjectHealer>, io_monitor: Arc<dyn IoLoadMonitor>) {
    let tasks = seq.task_receiver();
    let cancel = seq.cancel_token().clone();
    loop {
        let task = {
            let mut rx = tokio::select! {
                _ = cancel.cancelled() => break,
                rx = tasks.lock() => rx,
            };
            tokio::select! {
                _ = cancel.cancelled() => None,
                task = rx.recv() => task,
            }
        };
        let Some(mut task) = task else {
            break;
        };

        task.throttle.wait_for_low_io(io_monitor.as_ref(), &cancel).await;
        let result = heal_task(healer.as_ref(), &task).await;

        match task.resp_tx.take() {
            Some(resp_tx) => {
                if resp_tx.send(result).await.is_err() {
                    debug!("heal worker {}: caller stopped waiting for {}/{}", id, task.bucket, task.object);
                }
            }
            None => seq.record_result(task.item_type, &result).await,
        }
    }
    debug!("heal worker {} exiting", id);
}

async fn heal_task(healer: &dyn ObjectHealer, task: &HealTask) -> HealResult {
    let res = if task.bucket == NOP_HEAL {
        Err(Error::SkipFile)
    } else if task.bucket == SLASH_SEPARATOR {
        healer.heal_format(task.opts.dry_run).await
    } else if task.object.is_empty() {
        healer.heal_bucket(&task.bucket, &task.opts).await
    } else {
        healer
            .heal_object(&task.bucket, &task.object, &task.version_id, &task.opts)
            .await
    };

    match res {
        Ok(mut item) => {
            item.heal_item_type = Some(task.item_type);
            HealResult::ok(item)
        }
        Err(err) => {
            let item = HealResultItem {
                heal_item_type: Some(task.item_type),
                bucket: task.bucket.clone(),
                object: task.object.clone(),
                version_id: task.version_id.clone(),
                detail: err.to_string(),
                ..Default::default()
            };
            HealResult::err(item, err)
        }
    }
}
