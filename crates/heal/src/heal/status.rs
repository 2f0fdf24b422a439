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
use super::sequence::BG_HEALING_UUID;
use crate::storage::LocalDiskScanner;
use rustfs_madmin::BgHealState;
use std::collections::BTreeSet;
use time::OffsetDateTime;

/// Background heal status of this node, `None` when background healing has
/// not been started.
///
/// `heal_disks` is the union of what the scanner reports now and the disks
/// remembered in `state`.
pub async fn get_local_background_heal_status(
    state: &BackgroundHealState,
    scanner: &dyn LocalDiskScanner,
) -> Option<BgHealState> {
    let bg_seq = state.get_heal_sequence_by_token(BG_HEALING_UUID).await?;

    let mut heal_disks: BTreeSet<String> = scanner.local_disks_to_heal().await.into_iter().collect();
    heal_disks.extend(state.get_heal_local_disk_endpoints().await);

    Some(BgHealState {
        scanned_items_count: bg_seq.get_scanned_items_count().await,
        last_heal_activity: bg_seq.last_heal_activity().await.map(OffsetDateTime::from),
        next_heal_round: Some(OffsetDateTime::now_utc()),
        heal_disks: heal_disks.into_iter().collect(),
        ..Default::default()
    })
}
