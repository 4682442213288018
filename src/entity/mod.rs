// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The media player entity and its components.
//!
//! [`MediaPlayer`] is composed from independent components, each owning one
//! concern:
//!
//! - [`Availability`] - online/offline tracking from an availability topic
//! - [`JsonAttributes`] - extra attributes from a JSON object topic
//! - [`DeviceInfo`] - the device registry block
//! - [`DiscoveryMessage`] - discovery topic and payload parsing
//!
//! The entity forwards its lifecycle (attach, reconfigure, detach) to each
//! of them.

mod availability;
mod device_info;
mod discovery;
mod json_attributes;
mod media_player;

pub use availability::{Availability, AvailabilityBinding};
pub use device_info::DeviceInfo;
pub use discovery::{
    COMPONENT, DEFAULT_PREFIX, DiscoveryHash, DiscoveryMessage, DiscoveryPayload,
};
pub use json_attributes::{JsonAttributes, JsonAttributesBinding};
pub use media_player::MediaPlayer;
