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

//! Handlers for the `/components/component[name=…]/chassis/alarms` subtree.

use crate::event::{EventKind, SwitchEvent};
use crate::leaves::convert::severity_to_string;
use crate::leaves::{change_handler, poll_handler, unexpected_response, write_update};
use crate::subscription::EventHandler;
use crate::switch::{Alarm, DataRequest, DataResponse, SwitchInterface};
use crate::tree::node::TreeNode;
use futures::FutureExt;
use gnmi_wire::{Path, PathElem, TypedValue};
use std::sync::Arc;

/// The alarm fields in group-poll order.
const ALARM_FIELDS: [AlarmField; 4] = [
    AlarmField::Description,
    AlarmField::Severity,
    AlarmField::Status,
    AlarmField::TimeCreated,
];

#[derive(Clone, Copy)]
enum AlarmField {
    Description,
    Severity,
    Status,
    TimeCreated,
}

impl AlarmField {
    fn leaf_name(&self) -> &'static str {
        match self {
            AlarmField::Description => "info",
            AlarmField::Severity => "severity",
            AlarmField::Status => "status",
            AlarmField::TimeCreated => "time-created",
        }
    }

    fn project(&self, alarm: &Alarm) -> TypedValue {
        match self {
            AlarmField::Description => TypedValue::string(&alarm.description),
            AlarmField::Severity => TypedValue::string(severity_to_string(alarm.severity)),
            AlarmField::Status => TypedValue::BoolVal(alarm.status),
            AlarmField::TimeCreated => TypedValue::UintVal(alarm.time_created_ns),
        }
    }
}

fn project_alarm_event(event: &SwitchEvent, kind: EventKind) -> Option<&Alarm> {
    match (event, kind) {
        (SwitchEvent::MemoryErrorAlarm { alarm }, EventKind::MemoryErrorAlarm) => Some(alarm),
        (
            SwitchEvent::FlowProgrammingExceptionAlarm { alarm },
            EventKind::FlowProgrammingExceptionAlarm,
        ) => Some(alarm),
        _ => None,
    }
}

/// Populates one component entry node with the chassis alarm subtrees.
pub(crate) fn build(entry: &mut TreeNode, switch: &Arc<dyn SwitchInterface>) {
    let alarms = entry.get_or_add_child("chassis").get_or_add_child("alarms");
    build_alarm(
        alarms.get_or_add_child("memory-error"),
        switch,
        DataRequest::MemoryErrorAlarm,
        EventKind::MemoryErrorAlarm,
    );
    build_alarm(
        alarms.get_or_add_child("flow-programming-exception"),
        switch,
        DataRequest::FlowProgrammingExceptionAlarm,
        EventKind::FlowProgrammingExceptionAlarm,
    );
}

fn build_alarm(
    group: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    request: DataRequest,
    kind: EventKind,
) {
    let group_path = group.get_path();

    let group_read = group_poll_handler(switch, request.clone(), group_path.clone());
    group
        .set_on_poll(group_read.clone())
        .set_on_timer(group_read)
        .set_on_change(group_change_handler(kind, group_path), [kind]);

    for field in ALARM_FIELDS {
        let leaf = group.get_or_add_child(field.leaf_name());
        let path = leaf.get_path();
        let read = poll_handler(
            switch.clone(),
            0,
            request.clone(),
            path.clone(),
            move |response| match response {
                DataResponse::Alarm(alarm) => Ok(field.project(alarm)),
                other => Err(unexpected_response(other)),
            },
        );
        leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
            change_handler(path, move |event| {
                project_alarm_event(event, kind).map(|alarm| field.project(alarm))
            }),
            [kind],
        );
    }
}

fn alarm_leaf_path(group_path: &Path, field: AlarmField) -> Path {
    group_path.clone().push(PathElem::new(field.leaf_name()))
}

/// Group poll: one retrieve per field, written as four successive updates in
/// description, severity, status, time-created order.
fn group_poll_handler(
    switch: &Arc<dyn SwitchInterface>,
    request: DataRequest,
    group_path: Path,
) -> EventHandler {
    let switch = switch.clone();
    Arc::new(move |_event, sink| {
        let switch = switch.clone();
        let request = request.clone();
        let group_path = group_path.clone();
        async move {
            for field in ALARM_FIELDS {
                let response = switch.retrieve_value(0, request.clone()).await?;
                let DataResponse::Alarm(alarm) = response else {
                    return Err(unexpected_response(&response));
                };
                write_update(
                    sink.as_ref(),
                    &alarm_leaf_path(&group_path, field),
                    field.project(&alarm),
                )?;
            }
            Ok(())
        }
        .boxed()
    })
}

fn group_change_handler(kind: EventKind, group_path: Path) -> EventHandler {
    Arc::new(move |event, sink| {
        let updates = project_alarm_event(event, kind).map(|alarm| {
            ALARM_FIELDS
                .iter()
                .map(|field| (alarm_leaf_path(&group_path, *field), field.project(alarm)))
                .collect::<Vec<_>>()
        });
        async move {
            if let Some(updates) = updates {
                for (path, value) in updates {
                    write_update(sink.as_ref(), &path, value)?;
                }
            }
            Ok(())
        }
        .boxed()
    })
}
