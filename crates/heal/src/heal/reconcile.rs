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

use crate::storage::VersionStream;
use rustfs_filemeta::FileInfoVersions;

/// Listing of one disk of an erasure set.
#[derive(Debug)]
pub struct FileInfoVersionsStream {
    rx: VersionStream,
    pub set_index: usize,
    pub endpoint: String,
}

impl FileInfoVersionsStream {
    pub fn new(rx: VersionStream, set_index: usize, endpoint: impl Into<String>) -> Self {
        Self {
            rx,
            set_index,
            endpoint: endpoint.into(),
        }
    }
}

/// One object as agreed on by the disks of a set.
#[derive(Debug, Clone)]
pub struct ReconciledEntry {
    pub entry: FileInfoVersions,
    /// Number of disks whose listing matched `entry` exactly
    pub quorum_count: usize,
    pub set_index: usize,
}

/// K-way merge of per-disk listings sorted by object name.
///
/// Every distinct name present on any disk is produced exactly once, in
/// ascending order. Only the disks that contributed the current name are
/// advanced, so a name missing from some disks does not desynchronize them.
#[derive(Debug)]
pub struct EntryReconciler {
    streams: Vec<FileInfoVersionsStream>,
    entries: Vec<Option<FileInfoVersions>>,
    needs_advance: Vec<bool>,
}

impl EntryReconciler {
    pub fn new(streams: Vec<FileInfoVersionsStream>) -> Self {
        let n = streams.len();
        Self {
            streams,
            entries: vec![None; n],
            needs_advance: vec![true; n],
        }
    }

    /// Next object in name order with its quorum, or `None` once every
    /// stream is exhausted.
    ///
    /// Listings for the same name are grouped by exact version equality and
    /// the largest group wins; a tie goes to the group seen first in stream
    /// order.
    pub async fn next_entry(&mut self) -> Option<ReconciledEntry> {
        for (i, stream) in self.streams.iter_mut().enumerate() {
            if self.needs_advance[i] {
                self.entries[i] = stream.rx.recv().await;
                self.needs_advance[i] = false;
            }
        }

        let min_name = self.entries.iter().flatten().map(|e| e.name.as_str()).min()?.to_string();

        let mut set_index = None;
        let mut candidates = Vec::new();
        for (i, slot) in self.entries.iter_mut().enumerate() {
            if let Some(entry) = slot.take_if(|e| e.name == min_name) {
                set_index.get_or_insert(self.streams[i].set_index);
                candidates.push(entry);
                self.needs_advance[i] = true;
            }
        }

        let (mut best, mut quorum_count) = (0, 0);
        for (i, candidate) in candidates.iter().enumerate() {
            let count = candidates.iter().filter(|other| other.same_versions(candidate)).count();
            if count > quorum_count {
                best = i;
                quorum_count = count;
            }
        }

        Some(ReconciledEntry {
            entry: candidates.swap_remove(best),
            quorum_count,
            set_index: set_index.unwrap_or_default(),
        })
    }
}
