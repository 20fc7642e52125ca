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

//! The subscription manager: validates paths, installs the right delivery
//! machinery per mode, and routes cancellation.

use crate::bus::EventBus;
use crate::config::ChassisConfig;
use crate::event::{EventKind, SwitchEvent};
use crate::event_reader;
use crate::observability::events;
use crate::runtime::spawn_dispatch_loop;
use crate::subscription::{
    EventHandler, Frequency, SubscribeSink, SubscriptionHandle, SubscriptionRecord,
};
use crate::switch::SwitchInterface;
use crate::timer::TimerDaemon;
use crate::tree::{HandlerMode, ParseTree};
use futures::FutureExt;
use gnmi_wire::{Code, Path, Status, SubscribeResponse, Subscription};
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::thread;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "publisher";

/// Depth of the bounded queue carrying change events from the switch driver.
const SWITCH_EVENT_QUEUE_DEPTH: usize = 128;

const SWITCH_EVENT_READER_THREAD_NAME: &str = "gnmi-event-read";
const TICK_DISPATCH_THREAD_NAME: &str = "gnmi-tick-fire";

struct EventReaderState {
    sender: broadcast::Sender<SwitchEvent>,
    worker: thread::JoinHandle<()>,
}

/// The public subscription API over the parse tree, event bus, and timer
/// daemon.
pub struct Publisher {
    switch: Arc<dyn SwitchInterface>,
    tree: ParseTree,
    bus: Arc<EventBus>,
    timers: TimerDaemon,
    tick_sender: mpsc::UnboundedSender<Weak<SubscriptionRecord>>,
    event_reader: tokio::sync::Mutex<Option<EventReaderState>>,
}

impl Publisher {
    /// Builds a publisher over `switch` with an interface-less initial tree.
    ///
    /// Spawns the timer-tick dispatch worker; the switch-event reader is
    /// wired separately through [`Publisher::register_event_reader`].
    pub fn new(switch: Arc<dyn SwitchInterface>) -> Self {
        let (tick_sender, tick_receiver) = mpsc::unbounded_channel();
        spawn_dispatch_loop(TICK_DISPATCH_THREAD_NAME, move || {
            tick_dispatch_loop(tick_receiver)
        });

        Self {
            switch: switch.clone(),
            tree: ParseTree::new(switch),
            bus: Arc::new(EventBus::new()),
            timers: TimerDaemon::new(),
            tick_sender,
            event_reader: tokio::sync::Mutex::new(None),
        }
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    /// Live registration count for one event kind.
    pub fn registered_handler_count(&self, kind: EventKind) -> usize {
        self.bus.registered_handler_count(kind)
    }

    /// Subscribes `path` in ON_CHANGE mode: the record is registered with
    /// every event list the subtree emits events on.
    pub fn subscribe_on_change(
        &self,
        path: &Path,
        sink: &Arc<dyn SubscribeSink>,
    ) -> Result<SubscriptionHandle, Status> {
        let (handler, kinds) = self.resolve(path, HandlerMode::OnChange)?;
        let record = Arc::new(SubscriptionRecord::new(handler, Arc::downgrade(sink)));
        for kind in &kinds {
            self.bus.register(*kind, &record);
        }
        debug!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            mode = "on_change",
            path = %path,
            kinds = kinds.len(),
            "subscription registered"
        );
        Ok(record)
    }

    /// Subscribes `path` in SAMPLE mode: a periodic timer posts a tick to the
    /// record, whose on-timer handler reads the value and writes the update.
    pub fn subscribe_periodic(
        &self,
        freq: Frequency,
        path: &Path,
        sink: &Arc<dyn SubscribeSink>,
    ) -> Result<SubscriptionHandle, Status> {
        let (handler, _kinds) = self.resolve(path, HandlerMode::OnTimer)?;
        let record = Arc::new(SubscriptionRecord::new(handler, Arc::downgrade(sink)));

        let weak = Arc::downgrade(&record);
        let tick_sender = self.tick_sender.clone();
        let timer = self
            .timers
            .request_periodic_timer(freq.delay_ms, freq.period_ms, move || {
                // Runs on the daemon thread: only posts the tick.
                let _ = tick_sender.send(weak.clone());
            })
            .map_err(|status| {
                error!(
                    event = events::TIMER_START_FAILED,
                    component = COMPONENT,
                    path = %path,
                    err = %status,
                    "unable to start sample timer"
                );
                Status::fail_with_code(Code::Internal, "Cannot start timer.")
            })?;
        record.attach_timer(timer);
        self.bus.register(EventKind::TimerTick, &record);

        debug!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            mode = "sample",
            path = %path,
            period_ms = freq.period_ms,
            "subscription registered"
        );
        Ok(record)
    }

    /// Subscribes `path` in POLL mode: the record is only retained; it fires
    /// when the client sends a poll.
    pub fn subscribe_poll(
        &self,
        path: &Path,
        sink: &Arc<dyn SubscribeSink>,
    ) -> Result<SubscriptionHandle, Status> {
        let (handler, _kinds) = self.resolve(path, HandlerMode::OnPoll)?;
        let record = Arc::new(SubscriptionRecord::new(handler, Arc::downgrade(sink)));
        debug!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            mode = "poll",
            path = %path,
            "subscription registered"
        );
        Ok(record)
    }

    /// Synchronously invokes the on-poll handler once.
    pub async fn handle_poll(&self, record: &SubscriptionHandle) -> Result<(), Status> {
        record.handle(&SwitchEvent::PollTick).await
    }

    /// Cancels the record's timer, if any; event-list weak references decay
    /// once the caller drops its owning handle and are pruned lazily.
    pub fn unsubscribe(&self, record: &SubscriptionHandle) {
        record.cancel_timer();
        debug!(
            event = events::UNSUBSCRIBE_OK,
            component = COMPONENT,
            had_timer = record.has_timer(),
            "subscription released"
        );
    }

    /// Applies the node's target-defined policy to `subscription`.
    pub fn update_subscription_with_target_defined_mode(
        &self,
        path: &Path,
        subscription: &mut Subscription,
    ) -> Result<(), Status> {
        if path.is_empty() {
            return Err(Status::fail_with_code(Code::InvalidArgument, "path is empty"));
        }
        self.tree
            .with_node(path, |node| node.apply_target_defined_mode(subscription))
            .ok_or_else(|| unsupported_path(path))?
    }

    /// Writes the end-of-initial-snapshot control message.
    pub fn send_sync_response(&self, sink: &dyn SubscribeSink) -> Result<(), Status> {
        sink.write(SubscribeResponse::SyncResponse).map_err(|error| {
            warn!(
                event = events::SUBSCRIBE_STREAM_WRITE_FAILED,
                component = COMPONENT,
                err = %error,
                "writing sync-response message to stream failed"
            );
            Status::fail_with_code(
                Code::Internal,
                "Writing sync-response message to stream failed",
            )
        })?;
        debug!(
            event = events::SYNC_RESPONSE_SENT,
            component = COMPONENT,
            "sync-response message sent"
        );
        Ok(())
    }

    /// Routes one switch event to every interested subscription.
    pub async fn handle_change(&self, event: &SwitchEvent) {
        self.bus.deliver(event).await;
    }

    /// Grows the tree from a pushed chassis config, then fans the
    /// config-pushed event out to subscribers.
    pub async fn on_config_pushed(&self, config: &ChassisConfig) -> Result<(), Status> {
        for port in &config.singleton_ports {
            self.tree
                .add_subtree_interface(port, config.queues_for_node(port.node));
        }
        self.tree.add_subtree_chassis(&config.chassis.name);
        info!(
            event = events::CONFIG_PUSH_APPLIED,
            component = COMPONENT,
            chassis = %config.chassis.name,
            ports = config.singleton_ports.len(),
            "chassis config applied"
        );
        self.handle_change(&SwitchEvent::ConfigPushed).await;
        Ok(())
    }

    /// Creates the bounded switch-event queue, registers its sender with the
    /// driver, and spawns the dedicated reader worker. Idempotent.
    pub async fn register_event_reader(&self) -> Result<(), Status> {
        let mut state = self.event_reader.lock().await;
        if state.is_some() {
            return Ok(());
        }
        let (sender, receiver) = broadcast::channel(SWITCH_EVENT_QUEUE_DEPTH);
        self.switch.register_event_writer(sender.clone()).await?;
        let bus = self.bus.clone();
        let worker = spawn_dispatch_loop(SWITCH_EVENT_READER_THREAD_NAME, move || {
            event_reader::read_switch_events(bus, receiver)
        });
        debug!(
            event = events::SWITCH_EVENT_READER_SPAWNED,
            component = COMPONENT,
            depth = SWITCH_EVENT_QUEUE_DEPTH,
            "switch event reader running"
        );
        *state = Some(EventReaderState { sender, worker });
        Ok(())
    }

    /// Detaches the driver's event sender and closes the queue; the reader
    /// worker exits on queue closure and is joined.
    pub async fn unregister_event_reader(&self) -> Result<(), Status> {
        let Some(state) = self.event_reader.lock().await.take() else {
            return Ok(());
        };
        self.switch.unregister_event_writer().await?;
        drop(state.sender);
        let _ = state.worker.join();
        Ok(())
    }

    fn resolve(
        &self,
        path: &Path,
        mode: HandlerMode,
    ) -> Result<(EventHandler, BTreeSet<EventKind>), Status> {
        if path.is_empty() {
            return Err(self.reject(path, "path is empty"));
        }
        let resolved = self.tree.with_node(path, |node| {
            if !node.all_subtree_leaves_support(mode) {
                return Err(self.reject(
                    path,
                    format!("Not all leaves on the path ({path}) support this mode"),
                ));
            }
            let handler = match node.handler(mode) {
                Some(handler) => handler,
                None => {
                    let mut handlers = Vec::new();
                    node.collect_leaf_handlers(mode, &mut handlers);
                    if handlers.is_empty() {
                        return Err(self.reject(
                            path,
                            format!("No handler serves the path ({path}) in this mode"),
                        ));
                    }
                    composite_handler(handlers)
                }
            };
            Ok((handler, node.subtree_event_kinds()))
        });
        resolved.unwrap_or_else(|| Err(self.reject(path, format!("The path ({path}) is unsupported"))))
    }

    fn reject(&self, path: &Path, message: impl Into<String>) -> Status {
        let status = Status::fail_with_code(Code::InvalidArgument, message);
        warn!(
            event = events::SUBSCRIBE_REJECTED,
            component = COMPONENT,
            path = %path,
            err = %status,
            "subscription rejected"
        );
        status
    }
}

fn unsupported_path(path: &Path) -> Status {
    Status::fail_with_code(
        Code::InvalidArgument,
        format!("The path ({path}) is unsupported"),
    )
}

/// Interior-node handler assembled at subscribe time: runs every subtree
/// leaf handler in tree order; each leaf only emits for events it matches.
fn composite_handler(handlers: Vec<EventHandler>) -> EventHandler {
    let handlers = Arc::new(handlers);
    Arc::new(move |event, sink| {
        let handlers = handlers.clone();
        let event = event.clone();
        async move {
            for handler in handlers.iter() {
                handler(&event, sink.clone()).await?;
            }
            Ok(())
        }
        .boxed()
    })
}

/// Drains timer ticks and delivers each to its owning record; records whose
/// owner or stream is gone are skipped.
async fn tick_dispatch_loop(mut receiver: mpsc::UnboundedReceiver<Weak<SubscriptionRecord>>) {
    while let Some(weak) = receiver.recv().await {
        let Some(record) = weak.upgrade() else {
            continue;
        };
        if let Err(error) = record.handle(&SwitchEvent::TimerTick).await {
            if error.code() == Code::Cancelled {
                debug!(
                    event = events::TICK_DISPATCH_SKIPPED,
                    component = COMPONENT,
                    "tick for a subscription whose stream is gone"
                );
            } else {
                warn!(
                    event = events::DELIVER_HANDLER_FAILED,
                    component = COMPONENT,
                    err = %error,
                    "sample handler returned non-OK status"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Publisher;
    use crate::config::{Chassis, ChassisConfig, SingletonPort};
    use crate::event::{EventKind, SwitchEvent};
    use crate::subscription::{CollectorSink, SubscribeSink};
    use crate::switch::{
        DataRequest, DataResponse, EventSender, PortState, SetValueRequest, SwitchInterface,
    };
    use async_trait::async_trait;
    use gnmi_wire::{Code, Path, Status, SubscribeResponse, TypedValue};
    use std::str::FromStr;
    use std::sync::Arc;

    struct UpSwitch;

    #[async_trait]
    impl SwitchInterface for UpSwitch {
        async fn retrieve_value(
            &self,
            _node_id: u64,
            request: DataRequest,
        ) -> Result<DataResponse, Status> {
            match request {
                DataRequest::OperStatus { .. } => Ok(DataResponse::OperStatus(PortState::Up)),
                other => Err(Status::fail_with_code(
                    Code::Unimplemented,
                    format!("request not faked: {other:?}"),
                )),
            }
        }

        async fn set_value(&self, _node_id: u64, _request: SetValueRequest) -> Result<(), Status> {
            Ok(())
        }

        async fn register_event_writer(&self, _sender: EventSender) -> Result<(), Status> {
            Ok(())
        }

        async fn unregister_event_writer(&self) -> Result<(), Status> {
            Ok(())
        }
    }

    fn publisher_with_interface() -> Publisher {
        let publisher = Publisher::new(Arc::new(UpSwitch));
        publisher.tree().add_subtree_interface(
            &SingletonPort {
                name: "iface-1".to_string(),
                node: 3,
                id: 3,
                speed_bps: 25_000_000_000,
            },
            &[],
        );
        publisher
    }

    fn path(text: &str) -> Path {
        Path::from_str(text).expect("test path should parse")
    }

    fn string_updates(responses: &[SubscribeResponse]) -> Vec<TypedValue> {
        responses
            .iter()
            .filter_map(|response| match response {
                SubscribeResponse::Update(notification) => {
                    notification.update.first().map(|update| update.value.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_path_is_rejected() {
        let publisher = publisher_with_interface();
        let sink: Arc<dyn SubscribeSink> = Arc::new(CollectorSink::new());

        let result = publisher.subscribe_on_change(&Path::root(), &sink);

        assert_eq!(result.unwrap_err().code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn unsupported_path_is_rejected() {
        let publisher = publisher_with_interface();
        let sink: Arc<dyn SubscribeSink> = Arc::new(CollectorSink::new());

        let result = publisher.subscribe_on_change(&path("/interfaces/nope"), &sink);

        assert_eq!(result.unwrap_err().code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn mixed_mode_subtree_is_rejected_for_timer() {
        let publisher = publisher_with_interface();
        let sink: Arc<dyn SubscribeSink> = Arc::new(CollectorSink::new());

        // The wildcard skeleton leaves have no on-timer handler, so the root
        // subtree mixes timer support.
        let result = publisher.subscribe_periodic(
            crate::subscription::Frequency {
                delay_ms: 0,
                period_ms: 100,
            },
            &path("/interfaces"),
            &sink,
        );

        assert_eq!(result.unwrap_err().code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn on_change_delivery_projects_the_event() {
        let publisher = publisher_with_interface();
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();
        let _handle = publisher
            .subscribe_on_change(
                &path("/interfaces/interface[name=iface-1]/state/oper-status"),
                &sink,
            )
            .expect("subscribe should succeed");

        publisher
            .handle_change(&SwitchEvent::PortOperStateChanged {
                node_id: 3,
                port_id: 3,
                state: PortState::Up,
            })
            .await;

        assert_eq!(string_updates(&collector.written()), vec![TypedValue::string("UP")]);
    }

    #[tokio::test]
    async fn on_change_ignores_events_for_other_ports() {
        let publisher = publisher_with_interface();
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();
        let _handle = publisher
            .subscribe_on_change(
                &path("/interfaces/interface[name=iface-1]/state/oper-status"),
                &sink,
            )
            .expect("subscribe should succeed");

        publisher
            .handle_change(&SwitchEvent::PortOperStateChanged {
                node_id: 9,
                port_id: 9,
                state: PortState::Down,
            })
            .await;

        assert!(collector.written().is_empty());
    }

    #[tokio::test]
    async fn poll_runs_the_on_poll_handler_once() {
        let publisher = publisher_with_interface();
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();
        let handle = publisher
            .subscribe_poll(
                &path("/interfaces/interface[name=iface-1]/state/oper-status"),
                &sink,
            )
            .expect("subscribe should succeed");

        publisher
            .handle_poll(&handle)
            .await
            .expect("poll should succeed");

        assert_eq!(string_updates(&collector.written()), vec![TypedValue::string("UP")]);
    }

    #[tokio::test]
    async fn subtree_subscription_registers_once_per_kind_and_decays() {
        let publisher = publisher_with_interface();
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();
        let subtree = path("/interfaces/interface[name=iface-1]");

        let interface_kinds = [
            EventKind::PortOperState,
            EventKind::PortAdminState,
            EventKind::PortSpeed,
            EventKind::PortNegotiatedSpeed,
            EventKind::PortMacAddress,
            EventKind::PortCounters,
        ];
        let before: Vec<_> = interface_kinds
            .iter()
            .map(|kind| publisher.registered_handler_count(*kind))
            .collect();

        let handle = publisher
            .subscribe_on_change(&subtree, &sink)
            .expect("subscribe should succeed");

        for (kind, prior) in interface_kinds.iter().zip(&before) {
            assert_eq!(
                publisher.registered_handler_count(*kind),
                prior + 1,
                "kind {kind:?} should gain exactly one registration"
            );
        }
        assert_eq!(
            publisher.registered_handler_count(EventKind::MemoryErrorAlarm),
            0
        );

        publisher.unsubscribe(&handle);
        drop(handle);
        for (kind, prior) in interface_kinds.iter().zip(&before) {
            assert_eq!(publisher.registered_handler_count(*kind), *prior);
        }
    }

    #[tokio::test]
    async fn config_push_emits_the_config_pushed_event() {
        let publisher = Publisher::new(Arc::new(UpSwitch));
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();

        let config = ChassisConfig {
            chassis: Chassis {
                name: "chassis-1".to_string(),
            },
            singleton_ports: vec![SingletonPort {
                name: "iface-1".to_string(),
                node: 3,
                id: 3,
                speed_bps: 25_000_000_000,
            }],
            node_configs: Vec::new(),
        };
        publisher
            .on_config_pushed(&config)
            .await
            .expect("config push should succeed");

        // The new subtrees resolve after the push.
        let handle = publisher
            .subscribe_poll(&path("/interfaces/interface[name=iface-1]/state/name"), &sink)
            .expect("subscribe should succeed");
        publisher
            .handle_poll(&handle)
            .await
            .expect("poll should succeed");

        assert_eq!(
            string_updates(&collector.written()),
            vec![TypedValue::string("iface-1")]
        );
    }

    #[tokio::test]
    async fn counters_target_defined_mode_becomes_sample_at_ten_seconds() {
        let publisher = publisher_with_interface();
        let mut subscription = gnmi_wire::Subscription::default();

        publisher
            .update_subscription_with_target_defined_mode(
                &path("/interfaces/interface[name=iface-1]/state/counters"),
                &mut subscription,
            )
            .expect("policy should apply");

        assert_eq!(subscription.mode, gnmi_wire::SubscriptionMode::Sample);
        assert_eq!(subscription.sample_interval_ms, 10_000);
    }

    #[tokio::test]
    async fn non_specialized_target_defined_mode_is_untouched() {
        let publisher = publisher_with_interface();
        let mut subscription = gnmi_wire::Subscription::default();

        publisher
            .update_subscription_with_target_defined_mode(
                &path("/interfaces/interface[name=iface-1]/state/oper-status"),
                &mut subscription,
            )
            .expect("policy should apply");

        assert_eq!(
            subscription.mode,
            gnmi_wire::SubscriptionMode::TargetDefined
        );
    }

    #[tokio::test]
    async fn sync_response_is_a_control_message() {
        let publisher = publisher_with_interface();
        let collector = Arc::new(CollectorSink::new());

        publisher
            .send_sync_response(collector.as_ref())
            .expect("sync response should write");

        assert_eq!(collector.written(), vec![SubscribeResponse::SyncResponse]);
    }
}
