/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Per-event-kind lists of weakly-held subscription records.

use crate::event::{EventKind, SwitchEvent};
use crate::observability::events;
use crate::subscription::{SubscriptionHandle, SubscriptionRecord};
use gnmi_wire::Code;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, warn};

const COMPONENT: &str = "event_bus";

/// One event list: the records to notify for a single event kind.
///
/// Records are held by weak reference; entries whose owner is gone are
/// skipped on delivery and pruned in the same pass. No explicit
/// deregistration walk is needed for correctness, only for memory hygiene.
#[derive(Default)]
pub(crate) struct HandlerList {
    records: Mutex<Vec<Weak<SubscriptionRecord>>>,
}

impl HandlerList {
    fn register(&self, record: &SubscriptionHandle) {
        let mut records = self.records.lock().expect("event list lock poisoned");
        records.push(Arc::downgrade(record));
    }

    /// Number of live registrations; dead entries are pruned as a side effect.
    fn live_len(&self) -> usize {
        let mut records = self.records.lock().expect("event list lock poisoned");
        records.retain(|weak| weak.strong_count() > 0);
        records.len()
    }

    /// Snapshots live records and prunes dead ones under the lock; the
    /// handlers run outside the lock so delivery cannot block registration.
    fn snapshot(&self) -> Vec<SubscriptionHandle> {
        let mut records = self.records.lock().expect("event list lock poisoned");
        records.retain(|weak| weak.strong_count() > 0);
        records.iter().filter_map(Weak::upgrade).collect()
    }
}

/// Registry of one [`HandlerList`] per [`EventKind`].
///
/// Injected into the publisher rather than kept as process-global state so
/// multi-tenant tests stay isolated.
pub struct EventBus {
    lists: HashMap<EventKind, HandlerList>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let lists = EventKind::ALL
            .iter()
            .map(|kind| (*kind, HandlerList::default()))
            .collect();
        Self { lists }
    }

    /// Appends a weak reference to `record` on the list for `kind`.
    pub fn register(&self, kind: EventKind, record: &SubscriptionHandle) {
        self.list(kind).register(record);
    }

    /// Number of live registrations for `kind`.
    pub fn registered_handler_count(&self, kind: EventKind) -> usize {
        self.list(kind).live_len()
    }

    /// Delivers `event` to every live record registered for its kind.
    ///
    /// Handler errors are logged and do not stop delivery to the remaining
    /// subscribers; all handlers of one event run before the caller hands the
    /// next event of the same kind in.
    pub async fn deliver(&self, event: &SwitchEvent) {
        let kind = event.kind();
        for record in self.list(kind).snapshot() {
            if let Err(error) = record.handle(event).await {
                if error.code() == Code::Cancelled {
                    debug!(
                        event = events::DELIVER_SKIPPED_DEAD_STREAM,
                        component = COMPONENT,
                        kind = ?kind,
                        "skipping record whose stream is gone"
                    );
                } else {
                    warn!(
                        event = events::DELIVER_HANDLER_FAILED,
                        component = COMPONENT,
                        kind = ?kind,
                        err = %error,
                        "handler returned non-OK status"
                    );
                }
            }
        }
    }

    fn list(&self, kind: EventKind) -> &HandlerList {
        self.lists
            .get(&kind)
            .expect("event bus holds a list for every kind")
    }
}
