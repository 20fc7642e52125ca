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

//! Subscription records: the unit event lists hold weak references to.

use crate::event::SwitchEvent;
use crate::timer::TimerHandle;
use futures::future::BoxFuture;
use gnmi_wire::{Code, Status, SubscribeResponse};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

/// Outbound half of a client stream.
///
/// Writes must not block: implementations are expected to enqueue into a
/// bounded transport queue and fail fast when it is full or closed, so a slow
/// client can never stall event delivery to other subscribers.
pub trait SubscribeSink: Send + Sync {
    fn write(&self, response: SubscribeResponse) -> Result<(), Status>;
}

/// A leaf handler: reacts to one event by writing updates on the sink.
///
/// Handlers silently ignore events that are not relevant to their leaf, so a
/// record registered on several event lists only emits for matching events.
/// Everything event-dependent is extracted before the returned future is
/// built, so the future owns what it needs.
pub type EventHandler = Arc<
    dyn Fn(&SwitchEvent, Arc<dyn SubscribeSink>) -> BoxFuture<'static, Result<(), Status>>
        + Send
        + Sync,
>;

/// Sampling parameters of a periodic subscription.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frequency {
    pub delay_ms: u64,
    pub period_ms: u64,
}

/// One active subscription.
///
/// The record owns its handler strongly and refers to the client stream
/// weakly; its own lifetime is bounded by the Subscribe scope that holds the
/// [`SubscriptionHandle`]. Event lists only ever hold `Weak` references to
/// records, so dropping the handle is all the cleanup registration needs.
pub struct SubscriptionRecord {
    handler: EventHandler,
    sink: Weak<dyn SubscribeSink>,
    timer: Mutex<Option<TimerHandle>>,
}

impl std::fmt::Debug for SubscriptionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRecord").finish_non_exhaustive()
    }
}

/// Owning reference to a subscription record.
pub type SubscriptionHandle = Arc<SubscriptionRecord>;

impl SubscriptionRecord {
    pub(crate) fn new(handler: EventHandler, sink: Weak<dyn SubscribeSink>) -> Self {
        Self {
            handler,
            sink,
            timer: Mutex::new(None),
        }
    }

    /// Runs the handler against `event`, upgrading the stream reference first.
    ///
    /// A record whose stream is gone reports `CANCELLED`; the caller treats
    /// that as a pruning signal, not a delivery failure.
    pub async fn handle(&self, event: &SwitchEvent) -> Result<(), Status> {
        let Some(sink) = self.sink.upgrade() else {
            return Err(Status::fail_with_code(
                Code::Cancelled,
                "subscriber stream is gone",
            ));
        };
        (self.handler)(event, sink).await
    }

    pub(crate) fn attach_timer(&self, handle: TimerHandle) {
        let mut timer = self.timer.lock().expect("timer slot lock poisoned");
        *timer = Some(handle);
    }

    /// Cancels the record's periodic timer, if one is attached.
    pub fn cancel_timer(&self) {
        let timer = self.timer.lock().expect("timer slot lock poisoned");
        if let Some(handle) = timer.as_ref() {
            handle.cancel();
        }
    }

    pub(crate) fn has_timer(&self) -> bool {
        self.timer.lock().expect("timer slot lock poisoned").is_some()
    }
}

impl Drop for SubscriptionRecord {
    // A record abandoned without an explicit unsubscribe must not leave a
    // live timer entry behind.
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Sink backed by a bounded outbound queue; the transport side drains it.
pub struct ChannelSink {
    sender: mpsc::Sender<SubscribeResponse>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<SubscribeResponse>) -> Self {
        Self { sender }
    }
}

impl SubscribeSink for ChannelSink {
    fn write(&self, response: SubscribeResponse) -> Result<(), Status> {
        self.sender.try_send(response).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => Status::fail_with_code(
                Code::Unavailable,
                "subscriber outbound queue is full",
            ),
            mpsc::error::TrySendError::Closed(_) => {
                Status::fail_with_code(Code::Cancelled, "subscriber outbound queue is closed")
            }
        })
    }
}

/// Sink that records every response; used by Get snapshots and tests.
#[derive(Default)]
pub struct CollectorSink {
    responses: Mutex<Vec<SubscribeResponse>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<SubscribeResponse> {
        std::mem::take(&mut self.responses.lock().expect("collector lock poisoned"))
    }

    pub fn written(&self) -> Vec<SubscribeResponse> {
        self.responses.lock().expect("collector lock poisoned").clone()
    }
}

impl SubscribeSink for CollectorSink {
    fn write(&self, response: SubscribeResponse) -> Result<(), Status> {
        self.responses
            .lock()
            .expect("collector lock poisoned")
            .push(response);
        Ok(())
    }
}
