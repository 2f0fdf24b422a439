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

/// Environment variable name that specifies the number of background heal workers.
/// - Purpose: Set how many workers drain the background heal sequence queue.
/// - Unit: number of workers (usize).
/// - Valid values: any positive integer; `0` falls back to [`DEFAULT_HEAL_WORKERS_FALLBACK`].
/// - Semantics: Each worker processes one heal task at a time, so this bounds the number of concurrent repairs.
/// - Example: `export RUSTFS_HEAL_WORKERS=8`
/// - Note: When unset, half of the available CPUs are used.
pub const ENV_HEAL_WORKERS: &str = "RUSTFS_HEAL_WORKERS";

/// Worker count used when neither the environment nor the CPU count yields a usable value.
pub const DEFAULT_HEAL_WORKERS_FALLBACK: usize = 4;

/// Environment variable name that specifies the heal queue capacity multiplier.
///
/// - Purpose: Size the bounded task queue of a heal sequence.
/// - Unit: multiplier applied to the available parallelism (usize).
/// - Valid values: any positive integer.
/// - Semantics: Queue capacity is `multiplier * available CPUs`. Producers block once the queue is full,
///   which is the only backpressure between the scanner and the heal workers.
/// - Example: `export RUSTFS_HEAL_QUEUE_MULTIPLIER=2`
/// - Note: Large values let scanning run far ahead of repair and weaken the throttle.
pub const ENV_HEAL_QUEUE_MULTIPLIER: &str = "RUSTFS_HEAL_QUEUE_MULTIPLIER";

/// Default heal queue capacity multiplier.
/// - Value: 1 (one queue slot per available CPU).
pub const DEFAULT_HEAL_QUEUE_MULTIPLIER: usize = 1;

/// Environment variable name that specifies how many buckets of one erasure set are healed concurrently.
/// - Purpose: Cap the fan-out of a single erasure set heal pass.
/// - Unit: number of buckets (usize).
/// - Valid values: any positive integer.
/// - Semantics: Each bucket opens one listing per disk; this value bounds the number of concurrent listings to
///   `bucket concurrency * disks per set`.
/// - Example: `export RUSTFS_HEAL_BUCKET_CONCURRENCY=4`
pub const ENV_HEAL_BUCKET_CONCURRENCY: &str = "RUSTFS_HEAL_BUCKET_CONCURRENCY";

/// Default number of buckets healed at once per erasure set pass.
pub const DEFAULT_HEAL_BUCKET_CONCURRENCY: usize = 4;

/// Environment variable name that specifies the background sequence availability poll interval.
/// - Purpose: Define how often an erasure set heal pass checks whether the background heal sequence exists.
/// - Unit: milliseconds (u64).
/// - Valid values: any positive integer.
/// - Example: `export RUSTFS_HEAL_POLL_INTERVAL_MS=1000`
pub const ENV_HEAL_POLL_INTERVAL_MS: &str = "RUSTFS_HEAL_POLL_INTERVAL_MS";

/// Default background sequence availability poll interval in milliseconds.
/// - Value: 1000 milliseconds.
pub const DEFAULT_HEAL_POLL_INTERVAL_MS: u64 = 1000;

/// Environment variable name that enables or disables automatic drive healing.
/// - Purpose: Control whether disks reported unhealthy by the local scanner are remembered at bootstrap.
/// - Valid values: "true" or "false" (case insensitive), also "1"/"0" and "yes"/"no".
/// - Example: `export RUSTFS_HEAL_AUTO_DRIVE_HEALING=true`
pub const ENV_HEAL_AUTO_DRIVE_HEALING: &str = "RUSTFS_HEAL_AUTO_DRIVE_HEALING";

/// Default value for automatic drive healing.
/// - Value: true.
pub const DEFAULT_HEAL_AUTO_DRIVE_HEALING: bool = true;
