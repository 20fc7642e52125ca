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

//! Schema-specific leaf handlers.
//!
//! Every handler closes over the leaf's identifying tuple and the switch
//! interface handle; three patterns occur: direct read (poll/timer), event
//! projection (on-change), and group poll (alarm nodes).

pub(crate) mod chassis;
pub(crate) mod convert;
pub(crate) mod interface;
pub(crate) mod lacp;
pub(crate) mod qos;

use crate::event::SwitchEvent;
use crate::subscription::{EventHandler, SubscribeSink};
use crate::switch::{DataRequest, DataResponse, SwitchInterface};
use futures::FutureExt;
use gnmi_wire::{Code, Notification, Path, Status, TypedValue, Update};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Writes one notification carrying a single `path -> value` update.
pub(crate) fn write_update(
    sink: &dyn SubscribeSink,
    path: &Path,
    value: TypedValue,
) -> Result<(), Status> {
    write_updates(
        sink,
        vec![Update {
            path: path.clone(),
            value,
        }],
    )
}

/// Writes one notification carrying a batch of updates.
pub(crate) fn write_updates(sink: &dyn SubscribeSink, updates: Vec<Update>) -> Result<(), Status> {
    sink.write(gnmi_wire::SubscribeResponse::Update(Notification::new(
        timestamp_ns(),
        updates,
    )))
}

pub(crate) fn unexpected_response(response: &DataResponse) -> Status {
    Status::fail_with_code(
        Code::Internal,
        format!("switch returned an unexpected data response: {response:?}"),
    )
}

/// Direct-read handler: issues one typed retrieve, projects the answer, and
/// writes one update. Serves both on-poll and on-timer.
pub(crate) fn poll_handler(
    switch: Arc<dyn SwitchInterface>,
    node_id: u64,
    request: DataRequest,
    path: Path,
    project: impl Fn(&DataResponse) -> Result<TypedValue, Status> + Send + Sync + 'static,
) -> EventHandler {
    let project = Arc::new(project);
    Arc::new(move |_event, sink| {
        let switch = switch.clone();
        let request = request.clone();
        let path = path.clone();
        let project = project.clone();
        async move {
            let response = switch.retrieve_value(node_id, request).await?;
            write_update(sink.as_ref(), &path, project(&response)?)
        }
        .boxed()
    })
}

/// Handler answering with a value fixed at tree-build time (name, ifindex,
/// config leaves).
pub(crate) fn const_handler(path: Path, value: TypedValue) -> EventHandler {
    Arc::new(move |_event, sink| {
        let path = path.clone();
        let value = value.clone();
        async move { write_update(sink.as_ref(), &path, value) }.boxed()
    })
}

/// Event-projection handler: writes one update when `project` recognizes the
/// event, silently ignores everything else.
pub(crate) fn change_handler(
    path: Path,
    project: impl Fn(&SwitchEvent) -> Option<TypedValue> + Send + Sync + 'static,
) -> EventHandler {
    Arc::new(move |event, sink| {
        let path = path.clone();
        let value = project(event);
        async move {
            match value {
                Some(value) => write_update(sink.as_ref(), &path, value),
                None => Ok(()),
            }
        }
        .boxed()
    })
}

/// On-change handler for leaves whose value never changes at runtime.
pub(crate) fn ignore_change_handler() -> EventHandler {
    Arc::new(|_event, _sink| async move { Ok(()) }.boxed())
}

#[cfg(test)]
mod tests {
    use super::{change_handler, const_handler, ignore_change_handler, write_updates};
    use crate::event::SwitchEvent;
    use crate::subscription::{CollectorSink, SubscribeSink};
    use crate::switch::PortState;
    use gnmi_wire::{Path, PathElem, SubscribeResponse, TypedValue, Update};
    use std::sync::Arc;

    fn leaf_path() -> Path {
        Path::root()
            .push(PathElem::new("state"))
            .push(PathElem::new("oper-status"))
    }

    fn collector() -> (Arc<CollectorSink>, Arc<dyn SubscribeSink>) {
        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn SubscribeSink> = collector.clone();
        (collector, sink)
    }

    #[tokio::test]
    async fn const_handler_writes_the_fixed_value() {
        let (collector, sink) = collector();
        let handler = const_handler(leaf_path(), TypedValue::UintVal(3));

        handler(&SwitchEvent::PollTick, sink)
            .await
            .expect("const handler never fails");

        let written = collector.written();
        assert_eq!(written.len(), 1);
        let SubscribeResponse::Update(notification) = &written[0] else {
            panic!("expected an update response");
        };
        assert_eq!(notification.update[0].value, TypedValue::UintVal(3));
    }

    #[tokio::test]
    async fn change_handler_ignores_unrelated_events() {
        let (collector, sink) = collector();
        let handler = change_handler(leaf_path(), |event| match event {
            SwitchEvent::PortOperStateChanged { .. } => Some(TypedValue::string("UP")),
            _ => None,
        });

        handler(&SwitchEvent::ConfigPushed, sink.clone())
            .await
            .expect("unrelated events are ignored");
        assert!(collector.written().is_empty());

        handler(
            &SwitchEvent::PortOperStateChanged {
                node_id: 3,
                port_id: 3,
                state: PortState::Up,
            },
            sink,
        )
        .await
        .expect("matching events write");
        assert_eq!(collector.written().len(), 1);
    }

    #[tokio::test]
    async fn ignore_change_handler_writes_nothing() {
        let (collector, sink) = collector();
        let handler = ignore_change_handler();

        handler(&SwitchEvent::ConfigPushed, sink)
            .await
            .expect("ignore handler never fails");

        assert!(collector.written().is_empty());
    }

    #[test]
    fn write_updates_batches_into_one_notification() {
        let sink = CollectorSink::new();

        write_updates(
            &sink,
            vec![
                Update {
                    path: leaf_path(),
                    value: TypedValue::UintVal(1),
                },
                Update {
                    path: leaf_path(),
                    value: TypedValue::UintVal(2),
                },
            ],
        )
        .expect("collector write never fails");

        let written = sink.written();
        assert_eq!(written.len(), 1);
        let SubscribeResponse::Update(notification) = &written[0] else {
            panic!("expected an update response");
        };
        assert_eq!(notification.update.len(), 2);
    }
}
