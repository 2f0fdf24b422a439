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

use rustfs_config::{
    DEFAULT_HEAL_AUTO_DRIVE_HEALING, DEFAULT_HEAL_BUCKET_CONCURRENCY, DEFAULT_HEAL_POLL_INTERVAL_MS,
    DEFAULT_HEAL_QUEUE_MULTIPLIER, DEFAULT_HEAL_WORKERS_FALLBACK, ENV_HEAL_AUTO_DRIVE_HEALING, ENV_HEAL_BUCKET_CONCURRENCY,
    ENV_HEAL_POLL_INTERVAL_MS, ENV_HEAL_QUEUE_MULTIPLIER, ENV_HEAL_WORKERS,
};
use rustfs_utils::{get_env_bool, get_env_opt_usize, get_env_u64, get_env_usize};
use std::time::Duration;

/// Heal engine configuration
#[derive(Debug, Clone)]
pub struct HealConfig {
    /// Number of workers draining the background sequence queue
    pub workers: usize,
    /// Queue capacity is `queue_multiplier * available CPUs`
    pub queue_multiplier: usize,
    /// Buckets healed concurrently within one erasure set pass
    pub bucket_concurrency: usize,
    /// How often a pass checks for the background sequence before starting
    pub poll_interval: Duration,
    /// Remember disks reported unhealthy by the local scanner at bootstrap
    pub auto_drive_healing: bool,
}

impl Default for HealConfig {
    fn default() -> Self {
        let workers = match get_env_opt_usize(ENV_HEAL_WORKERS).unwrap_or(num_cpus::get() / 2) {
            0 => DEFAULT_HEAL_WORKERS_FALLBACK,
            n => n,
        };
        let queue_multiplier = get_env_usize(ENV_HEAL_QUEUE_MULTIPLIER, DEFAULT_HEAL_QUEUE_MULTIPLIER).max(1);
        let bucket_concurrency = get_env_usize(ENV_HEAL_BUCKET_CONCURRENCY, DEFAULT_HEAL_BUCKET_CONCURRENCY).max(1);
        let poll_interval_ms = match get_env_u64(ENV_HEAL_POLL_INTERVAL_MS, DEFAULT_HEAL_POLL_INTERVAL_MS) {
            0 => DEFAULT_HEAL_POLL_INTERVAL_MS,
            n => n,
        };

        Self {
            workers,
            queue_multiplier,
            bucket_concurrency,
            poll_interval: Duration::from_millis(poll_interval_ms),
            auto_drive_healing: get_env_bool(ENV_HEAL_AUTO_DRIVE_HEALING, DEFAULT_HEAL_AUTO_DRIVE_HEALING),
        }
    }
}

impl HealConfig {
    /// Capacity of a heal sequence task queue, never zero.
    pub fn queue_capacity(&self) -> usize {
        self.queue_multiplier.max(1).saturating_mul(num_cpus::get()).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_heal_config_defaults() {
        temp_env::with_vars_unset(
            [
                ENV_HEAL_WORKERS,
                ENV_HEAL_QUEUE_MULTIPLIER,
                ENV_HEAL_BUCKET_CONCURRENCY,
                ENV_HEAL_POLL_INTERVAL_MS,
                ENV_HEAL_AUTO_DRIVE_HEALING,
            ],
            || {
                let config = HealConfig::default();
                assert!(config.workers >= 1);
                assert_eq!(config.queue_multiplier, DEFAULT_HEAL_QUEUE_MULTIPLIER);
                assert_eq!(config.bucket_concurrency, DEFAULT_HEAL_BUCKET_CONCURRENCY);
                assert_eq!(config.poll_interval, Duration::from_secs(1));
                assert!(config.auto_drive_healing);
                assert_eq!(config.queue_capacity(), num_cpus::get());
            },
        );
    }

    #[test]
    #[serial]
    fn test_heal_config_from_env() {
        temp_env::with_vars(
            [
                (ENV_HEAL_WORKERS, Some("3")),
                (ENV_HEAL_QUEUE_MULTIPLIER, Some("2")),
                (ENV_HEAL_BUCKET_CONCURRENCY, Some("8")),
                (ENV_HEAL_POLL_INTERVAL_MS, Some("250")),
                (ENV_HEAL_AUTO_DRIVE_HEALING, Some("off")),
            ],
            || {
                let config = HealConfig::default();
                assert_eq!(config.workers, 3);
                assert_eq!(config.bucket_concurrency, 8);
                assert_eq!(config.poll_interval, Duration::from_millis(250));
                assert!(!config.auto_drive_healing);
                assert_eq!(config.queue_capacity(), 2 * num_cpus::get());
            },
        );
    }

    #[test]
    #[serial]
    fn test_heal_config_zero_values_fall_back() {
        temp_env::with_vars(
            [
                (ENV_HEAL_WORKERS, Some("0")),
                (ENV_HEAL_QUEUE_MULTIPLIER, Some("0")),
                (ENV_HEAL_POLL_INTERVAL_MS, Some("0")),
            ],
            || {
                let config = HealConfig::default();
                assert_eq!(config.workers, DEFAULT_HEAL_WORKERS_FALLBACK);
                assert_eq!(config.queue_multiplier, 1);
                assert_eq!(config.poll_interval, Duration::from_millis(DEFAULT_HEAL_POLL_INTERVAL_MS));
            },
        );
    }
}
