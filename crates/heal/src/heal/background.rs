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

use super::routine::HealRoutine;
use super::sequence::{BG_HEALING_UUID, HealSequence, HealSource, new_bg_heal_sequence};
use crate::config::HealConfig;
use crate::storage::{IoLoadMonitor, LocalDiskScanner, ObjectHealer};
use crate::{Error, Result};
use rustfs_madmin::{HealItemType, HealOpts, HealScanMode};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Node-wide heal state: the live heal sequences and the disks waiting for a heal.
///
/// Shared by reference between the erasure set healers, the admin status
/// handler and the bootstrap code. Cancelling the root token tears down every
/// sequence and worker.
#[derive(Debug)]
pub struct BackgroundHealState {
    config: HealConfig,
    root_token: CancellationToken,
    heal_seq_map: RwLock<HashMap<String, Arc<HealSequence>>>,
    heal_local_disks: RwLock<BTreeSet<String>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl BackgroundHealState {
    pub fn new(config: HealConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            root_token: CancellationToken::new(),
            heal_seq_map: RwLock::new(HashMap::new()),
            heal_local_disks: RwLock::new(BTreeSet::new()),
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.root_token
    }

    /// Create and register the background sequence and start its workers.
    /// Calling it again returns the already running sequence.
    pub async fn init_background_healing(
        &self,
        healer: Arc<dyn ObjectHealer>,
        io_monitor: Arc<dyn IoLoadMonitor>,
    ) -> Result<Arc<HealSequence>> {
        if self.root_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut seq_map = self.heal_seq_map.write().await;
        if let Some(seq) = seq_map.get(BG_HEALING_UUID).filter(|seq| !seq.is_quitting()) {
            return Ok(seq.clone());
        }

        let seq = Arc::new(new_bg_heal_sequence(&self.root_token, self.config.queue_capacity()));
        seq_map.insert(seq.client_token.clone(), seq.clone());
        drop(seq_map);

        let handles = HealRoutine::new(self.config.workers, healer, io_monitor).spawn(seq.clone());
        self.workers.lock().await.extend(handles);

        info!("background heal sequence started with {} workers", self.config.workers);
        Ok(seq)
    }

    /// Start background healing and, when enabled, remember the disks the
    /// local scanner reports as needing a heal.
    pub async fn init_auto_heal(
        &self,
        healer: Arc<dyn ObjectHealer>,
        io_monitor: Arc<dyn IoLoadMonitor>,
        scanner: &dyn LocalDiskScanner,
    ) -> Result<Arc<HealSequence>> {
        let seq = self.init_background_healing(healer, io_monitor).await?;
        if self.config.auto_drive_healing {
            let disks = scanner.local_disks_to_heal().await;
            if !disks.is_empty() {
                info!("found drives to heal {}, proceeding to heal them", disks.len());
                self.push_heal_local_disks(&disks).await;
            }
        }
        Ok(seq)
    }

    pub async fn get_heal_sequence_by_token(&self, token: &str) -> Option<Arc<HealSequence>> {
        self.heal_seq_map.read().await.get(token).cloned()
    }

    /// Stop and unregister a sequence.
    pub async fn stop_heal_sequence(&self, token: &str) -> Result<()> {
        let Some(seq) = self.heal_seq_map.write().await.remove(token) else {
            return Err(Error::SequenceNotFound {
                client_token: token.to_string(),
            });
        };
        seq.stop().await;
        info!("heal sequence {} stopped", token);
        Ok(())
    }

    pub async fn push_heal_local_disks(&self, endpoints: &[String]) {
        self.heal_local_disks.write().await.extend(endpoints.iter().cloned());
    }

    pub async fn pop_heal_local_disks(&self, endpoints: &[String]) {
        let mut disks = self.heal_local_disks.write().await;
        for ep in endpoints {
            disks.remove(ep);
        }
    }

    /// Remembered disks awaiting a heal, sorted.
    pub async fn get_heal_local_disk_endpoints(&self) -> Vec<String> {
        self.heal_local_disks.read().await.iter().cloned().collect()
    }

    /// Heal one object version in deep scan mode through the background
    /// sequence. Does nothing when background healing is not running.
    pub async fn deep_heal_object(&self, bucket: &str, object: &str, version_id: &str) {
        let Some(seq) = self.get_heal_sequence_by_token(BG_HEALING_UUID).await else {
            debug!("background heal sequence not running, skipping deep heal of {}/{}", bucket, object);
            return;
        };

        let source = HealSource {
            opts: Some(HealOpts {
                scan_mode: HealScanMode::Deep,
                ..seq.setting
            }),
            ..HealSource::object(bucket, object, version_id)
        };
        let cancel = seq.cancel_token().clone();
        if let Err(err) = seq.queue_heal_task(&cancel, source, HealItemType::Object).await {
            if !err.is_cancelled() && !err.is_not_found() {
                debug!("deep heal of {}/{} ({}) failed: {}", bucket, object, version_id, err);
            }
        }
    }

    /// Cancel every sequence and wait for the workers to exit.
    pub async fn shutdown(&self) {
        self.root_token.cancel();
        let sequences: Vec<_> = self.heal_seq_map.write().await.drain().map(|(_, seq)| seq).collect();
        for seq in sequences {
            seq.stop().await;
        }

        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                warn!("heal worker terminated abnormally: {}", err);
            }
        }
        info!("background healing shut down");
    }
}
