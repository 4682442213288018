// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity state management types.
//!
//! [`EntityState`] caches the last resolved value of every inbound slot.
//! [`StateChange`] describes a single change and is what callbacks receive.
//!
//! # Examples
//!
//! ```
//! use mqtt_media_player::state::{EntityState, StateChange};
//! use mqtt_media_player::types::PlayerState;
//!
//! let mut state = EntityState::new();
//!
//! let changed = state.apply(&StateChange::state(PlayerState::Playing));
//! assert!(changed);
//!
//! // Applying the same change again reports no change
//! assert!(!state.apply(&StateChange::state(PlayerState::Playing)));
//! ```

mod entity_state;
mod state_change;

pub use entity_state::{AttributeValue, EntityState};
pub use state_change::StateChange;
