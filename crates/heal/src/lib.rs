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

//! Background healing for RustFS erasure sets.
//!
//! An [`ErasureSetHealer`] walks the disks of one erasure set, reconciles
//! their listings and queues every object lacking full quorum on the
//! background [`HealSequence`], whose workers repair it through an
//! [`storage::ObjectHealer`].

pub mod config;
mod error;
pub mod heal;
pub mod storage;

pub use config::HealConfig;
pub use error::{Error, Result, is_err_object_not_found, is_err_version_not_found};
pub use heal::{
    BackgroundHealState, ErasureSetHealer, HealSequence, HealSource, HealThrottle, get_local_background_heal_status,
};
