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

use std::{env, str::FromStr};

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

pub fn get_env_usize(key: &str, default: usize) -> usize {
    parse_env(key).unwrap_or(default)
}

pub fn get_env_opt_usize(key: &str) -> Option<usize> {
    parse_env(key)
}

pub fn get_env_u64(key: &str, default: u64) -> u64 {
    parse_env(key).unwrap_or(default)
}

pub fn get_env_opt_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

pub fn get_env_bool(key: &str, default: bool) -> bool {
    get_env_opt_bool(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "RUSTFS_UTILS_ENVS_TEST_KEY";

    #[test]
    fn usize_falls_back_on_garbage() {
        temp_env::with_var(KEY, Some("not-a-number"), || {
            assert_eq!(get_env_usize(KEY, 7), 7);
            assert_eq!(get_env_opt_usize(KEY), None);
        });
        temp_env::with_var(KEY, Some(" 12 "), || {
            assert_eq!(get_env_usize(KEY, 7), 12);
        });
    }

    #[test]
    fn bool_accepts_common_spellings() {
        for (raw, want) in [("on", true), ("YES", true), ("1", true), ("off", false), ("False", false)] {
            temp_env::with_var(KEY, Some(raw), || {
                assert_eq!(get_env_bool(KEY, !want), want, "value {raw}");
            });
        }
        temp_env::with_var_unset(KEY, || {
            assert!(get_env_bool(KEY, true));
            assert_eq!(get_env_opt_bool(KEY), None);
        });
    }
}
