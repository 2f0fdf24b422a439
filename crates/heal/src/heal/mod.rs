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

pub mod background;
pub mod erasure_healer;
pub mod reconcile;
pub mod routine;
pub mod sequence;
pub mod status;
pub mod throttle;

pub use background::BackgroundHealState;
pub use erasure_healer::ErasureSetHealer;
pub use reconcile::{EntryReconciler, FileInfoVersionsStream, ReconciledEntry};
pub use routine::HealRoutine;
pub use sequence::{
    BG_HEALING_UUID, HealResult, HealSequence, HealSequenceStatus, HealSource, HealStatusSummary, HealTask, NOP_HEAL,
    new_bg_heal_sequence,
};
pub use status::get_local_background_heal_status;
pub use throttle::HealThrottle;
