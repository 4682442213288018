// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriptions, in both directions.
//!
//! # Overview
//!
//! - [`SubscriptionSet`] - the transport subscriptions an entity owns, with
//!   bind, rebind and unbind
//! - [`CallbackRegistry`] - host callbacks notified of state changes
//! - [`Subscribable`] - Trait for types that accept host callbacks
//! - [`SubscriptionId`] - identifier used to remove either kind
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use mqtt_media_player::MediaPlayer;
//! use mqtt_media_player::config::MediaPlayerConfig;
//! use mqtt_media_player::protocol::LoopbackTransport;
//! use mqtt_media_player::subscription::Subscribable;
//!
//! let transport = Arc::new(LoopbackTransport::new());
//! let player = MediaPlayer::new(MediaPlayerConfig::new("Den"), transport).unwrap();
//!
//! let sub_id = player.on_state_changed(|change| {
//!     println!("Changed: {change:?}");
//! });
//!
//! // Later, unsubscribe
//! assert!(player.unsubscribe(sub_id));
//! ```

mod callback;
mod manager;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use manager::{InboundRoute, RouteTarget, SubscriptionSet};
pub use subscribable::Subscribable;
