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

//! Switch-originated change events and their registry keys.

use crate::switch::{AdminState, Alarm, PortCounters, PortState, QueueCounters};

/// A change event as emitted by the switch driver or the control plane.
///
/// Port events carry the `(node_id, port_id)` pair the subscriptions filter
/// on; queue events additionally carry the queue id.
#[derive(Clone, Debug, PartialEq)]
pub enum SwitchEvent {
    PortOperStateChanged {
        node_id: u64,
        port_id: u64,
        state: PortState,
    },
    PortAdminStateChanged {
        node_id: u64,
        port_id: u64,
        state: AdminState,
    },
    PortSpeedChanged {
        node_id: u64,
        port_id: u64,
        speed_bps: u64,
    },
    PortNegotiatedSpeedChanged {
        node_id: u64,
        port_id: u64,
        speed_bps: u64,
    },
    PortMacAddressChanged {
        node_id: u64,
        port_id: u64,
        mac_address: u64,
    },
    PortLacpSystemPriorityChanged {
        node_id: u64,
        port_id: u64,
        priority: u64,
    },
    PortLacpSystemIdChanged {
        node_id: u64,
        port_id: u64,
        mac_address: u64,
    },
    PortCountersChanged {
        node_id: u64,
        port_id: u64,
        counters: PortCounters,
    },
    PortQosCountersChanged {
        node_id: u64,
        port_id: u64,
        queue_id: u32,
        counters: QueueCounters,
    },
    MemoryErrorAlarm {
        alarm: Alarm,
    },
    FlowProgrammingExceptionAlarm {
        alarm: Alarm,
    },
    ConfigPushed,
    /// Tick delivered to one SAMPLE subscription by the timer daemon.
    TimerTick,
    /// Synthetic event a client-driven poll is executed with.
    PollTick,
}

/// Registry key: one event list exists per kind.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EventKind {
    PortOperState,
    PortAdminState,
    PortSpeed,
    PortNegotiatedSpeed,
    PortMacAddress,
    PortLacpSystemPriority,
    PortLacpSystemId,
    PortCounters,
    PortQosCounters,
    MemoryErrorAlarm,
    FlowProgrammingExceptionAlarm,
    ConfigPushed,
    TimerTick,
    PollTick,
}

impl EventKind {
    /// Every kind, in registry order.
    pub const ALL: [EventKind; 14] = [
        EventKind::PortOperState,
        EventKind::PortAdminState,
        EventKind::PortSpeed,
        EventKind::PortNegotiatedSpeed,
        EventKind::PortMacAddress,
        EventKind::PortLacpSystemPriority,
        EventKind::PortLacpSystemId,
        EventKind::PortCounters,
        EventKind::PortQosCounters,
        EventKind::MemoryErrorAlarm,
        EventKind::FlowProgrammingExceptionAlarm,
        EventKind::ConfigPushed,
        EventKind::TimerTick,
        EventKind::PollTick,
    ];
}

impl SwitchEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SwitchEvent::PortOperStateChanged { .. } => EventKind::PortOperState,
            SwitchEvent::PortAdminStateChanged { .. } => EventKind::PortAdminState,
            SwitchEvent::PortSpeedChanged { .. } => EventKind::PortSpeed,
            SwitchEvent::PortNegotiatedSpeedChanged { .. } => EventKind::PortNegotiatedSpeed,
            SwitchEvent::PortMacAddressChanged { .. } => EventKind::PortMacAddress,
            SwitchEvent::PortLacpSystemPriorityChanged { .. } => EventKind::PortLacpSystemPriority,
            SwitchEvent::PortLacpSystemIdChanged { .. } => EventKind::PortLacpSystemId,
            SwitchEvent::PortCountersChanged { .. } => EventKind::PortCounters,
            SwitchEvent::PortQosCountersChanged { .. } => EventKind::PortQosCounters,
            SwitchEvent::MemoryErrorAlarm { .. } => EventKind::MemoryErrorAlarm,
            SwitchEvent::FlowProgrammingExceptionAlarm { .. } => {
                EventKind::FlowProgrammingExceptionAlarm
            }
            SwitchEvent::ConfigPushed => EventKind::ConfigPushed,
            SwitchEvent::TimerTick => EventKind::TimerTick,
            SwitchEvent::PollTick => EventKind::PollTick,
        }
    }
}
