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

use crate::storage::IoLoadMonitor;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const WAIT_TICK: Duration = Duration::from_millis(100);

/// Pacing hint attached to a heal task.
///
/// Workers wait while the node serves at least `max_io` foreground requests,
/// for at most `max_sleep` per task. A `max_io` of zero disables pacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealThrottle {
    pub max_io: usize,
    pub max_sleep: Duration,
}

impl HealThrottle {
    pub fn new(max_io: usize, max_sleep: Duration) -> Self {
        Self { max_io, max_sleep }
    }

    fn is_unlimited(&self) -> bool {
        self.max_io == 0
    }

    /// Wait until the foreground load drops below `max_io`, `max_sleep` is
    /// used up or `cancel` fires. Returns the time spent waiting.
    pub async fn wait_for_low_io(&self, monitor: &dyn IoLoadMonitor, cancel: &CancellationToken) -> Duration {
        let mut waited = Duration::ZERO;
        if self.is_unlimited() {
            return waited;
        }

        while monitor.active_requests() >= self.max_io && waited < self.max_sleep {
            let tick = WAIT_TICK.min(self.max_sleep - waited);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(tick) => waited += tick,
            }
        }
        waited
    }
}
