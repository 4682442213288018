// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extra state attributes received as a JSON object.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::state::StateChange;
use crate::template::Render;

/// Topic and optional template of the JSON attributes.
#[derive(Debug, Clone)]
pub struct JsonAttributesBinding {
    topic: String,
    template: Option<Arc<dyn Render>>,
}

impl JsonAttributesBinding {
    /// Creates a binding.
    #[must_use]
    pub fn new(topic: impl Into<String>, template: Option<Arc<dyn Render>>) -> Self {
        Self {
            topic: topic.into(),
            template,
        }
    }

    /// Returns the attributes topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Renders and decodes a payload.
    ///
    /// Returns `None`, after logging a warning, unless the result is a JSON
    /// object.
    #[must_use]
    pub fn decode(&self, payload: &str) -> Option<Map<String, Value>> {
        let rendered = match &self.template {
            Some(template) => template.render(payload),
            None => payload.to_string(),
        };

        match serde_json::from_str::<Value>(&rendered) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                tracing::warn!(topic = %self.topic, payload = %rendered, "JSON result was not an object");
                None
            }
            Err(e) => {
                tracing::warn!(topic = %self.topic, payload = %rendered, error = %e, "Erroneous JSON");
                None
            }
        }
    }
}

/// The extra attributes of one entity.
#[derive(Debug, Default)]
pub struct JsonAttributes {
    attributes: RwLock<Map<String, Value>>,
}

impl JsonAttributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a payload and replaces the attributes with it.
    ///
    /// Returns the change to notify if the payload was accepted.
    pub fn handle(&self, binding: &JsonAttributesBinding, payload: &str) -> Option<StateChange> {
        let map = binding.decode(payload)?;
        *self.attributes.write() = map.clone();
        Some(StateChange::Attributes(map))
    }

    /// Returns a snapshot of the attributes.
    #[must_use]
    pub fn get(&self) -> Map<String, Value> {
        self.attributes.read().clone()
    }

    /// Forgets every attribute.
    pub fn clear(&self) {
        self.attributes.write().clear();
    }
}
