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

//! Worker loop draining the bounded switch-event queue into the event bus.

use crate::bus::EventBus;
use crate::event::SwitchEvent;
use crate::observability::events;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{info, warn};

const COMPONENT: &str = "switch_event_reader";

/// Drains `receiver` until the queue closes, dispatching each event to the
/// bus. Every event is fully delivered before the next is read, so delivery
/// order equals enqueue order per event kind.
///
/// A lagged read means the bounded queue overflowed while this worker was
/// busy; it is logged and the loop continues with the next available event.
pub(crate) async fn read_switch_events(bus: Arc<EventBus>, mut receiver: Receiver<SwitchEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => bus.deliver(&event).await,
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    event = events::SWITCH_EVENT_RECV_LAGGED,
                    component = COMPONENT,
                    skipped,
                    "switch event queue overflowed; continuing"
                );
            }
            Err(RecvError::Closed) => {
                info!(
                    event = events::SWITCH_EVENT_RECV_CLOSED,
                    component = COMPONENT,
                    reason = "queue_closed",
                    "switch event queue closed; stopping reader"
                );
                break;
            }
        }
    }
}
