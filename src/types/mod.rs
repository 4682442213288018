// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the binding.
//!
//! # Types
//!
//! - [`PlayerState`] - Logical power/playback state of the player
//! - [`QosLevel`] - MQTT quality of service (0-2)
//! - [`VolumeRange`] - Device volume bounds and linear scaling
//! - [`EntityId`] - Runtime identifier of an entity

mod entity_id;
mod player_state;
mod qos;
mod volume;

pub use entity_id::EntityId;
pub use player_state::PlayerState;
pub use qos::QosLevel;
pub use volume::VolumeRange;
