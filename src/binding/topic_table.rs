// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slot to topic lookup.

use std::collections::BTreeMap;

use crate::SupportedFeatures;
use crate::slot::{CommandSlot, InboundSlot};

/// Topics bound to the inbound and command slots of one entity.
///
/// Every slot either has exactly one topic or is absent. The table is
/// immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicTable {
    inbound: BTreeMap<InboundSlot, String>,
    commands: BTreeMap<CommandSlot, String>,
}

impl TopicTable {
    pub(crate) fn new(
        inbound: BTreeMap<InboundSlot, String>,
        commands: BTreeMap<CommandSlot, String>,
    ) -> Self {
        Self { inbound, commands }
    }

    /// Returns the subscribe topic of an inbound slot.
    #[must_use]
    pub fn inbound(&self, slot: InboundSlot) -> Option<&str> {
        self.inbound.get(&slot).map(String::as_str)
    }

    /// Returns the publish topic of a command slot.
    #[must_use]
    pub fn command(&self, slot: CommandSlot) -> Option<&str> {
        self.commands.get(&slot).map(String::as_str)
    }

    /// Iterates over every bound inbound slot.
    pub fn inbound_topics(&self) -> impl Iterator<Item = (InboundSlot, &str)> {
        self.inbound.iter().map(|(slot, topic)| (*slot, topic.as_str()))
    }

    /// Iterates over every bound command slot.
    pub fn command_topics(&self) -> impl Iterator<Item = (CommandSlot, &str)> {
        self.commands.iter().map(|(slot, topic)| (*slot, topic.as_str()))
    }

    /// Derives the capability mask: one flag per bound command slot.
    #[must_use]
    pub fn supported_features(&self) -> SupportedFeatures {
        self.commands.keys().map(CommandSlot::feature).collect()
    }
}
