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

//! The switch-driver seam: typed data requests/responses and the
//! [`SwitchInterface`] trait the publisher talks to.
//!
//! The driver behind this trait is an external collaborator; the publisher
//! only issues typed reads/writes and receives change events through the
//! sender registered with [`SwitchInterface::register_event_writer`].

use crate::event::SwitchEvent;
use async_trait::async_trait;
use gnmi_wire::Status;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::Sender;

/// Operational state of a port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PortState {
    Unknown,
    Up,
    Down,
    Failed,
}

/// Administrative state of a port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdminState {
    Unknown,
    Disabled,
    Enabled,
    Diag,
}

/// Severity of a chassis alarm.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AlarmSeverity {
    #[default]
    Unknown,
    Minor,
    Warning,
    Major,
    Critical,
}

/// Traffic class a QoS queue is provisioned for.
///
/// The wire renders the symbolic name; the queue id stays numeric.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TrafficClass {
    #[serde(rename = "BE1")]
    Be1,
    #[serde(rename = "AF1")]
    Af1,
    #[serde(rename = "AF2")]
    Af2,
    #[serde(rename = "AF3")]
    Af3,
    #[serde(rename = "AF4")]
    Af4,
    #[serde(rename = "NC1")]
    Nc1,
    #[serde(rename = "NC2")]
    Nc2,
}

impl TrafficClass {
    /// Symbolic queue name as rendered on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficClass::Be1 => "BE1",
            TrafficClass::Af1 => "AF1",
            TrafficClass::Af2 => "AF2",
            TrafficClass::Af3 => "AF3",
            TrafficClass::Af4 => "AF4",
            TrafficClass::Nc1 => "NC1",
            TrafficClass::Nc2 => "NC2",
        }
    }
}

/// The full per-port counter block.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PortCounters {
    pub in_octets: u64,
    pub out_octets: u64,
    pub in_unicast_pkts: u64,
    pub out_unicast_pkts: u64,
    pub in_broadcast_pkts: u64,
    pub out_broadcast_pkts: u64,
    pub in_multicast_pkts: u64,
    pub out_multicast_pkts: u64,
    pub in_discards: u64,
    pub out_discards: u64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub in_fcs_errors: u64,
    pub in_unknown_protos: u64,
}

/// Per-queue egress counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QueueCounters {
    pub transmit_octets: u64,
    pub transmit_pkts: u64,
    pub dropped_pkts: u64,
}

/// A chassis alarm snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Alarm {
    pub description: String,
    pub severity: AlarmSeverity,
    pub status: bool,
    pub time_created_ns: u64,
}

/// One typed read issued against the switch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataRequest {
    OperStatus { node_id: u64, port_id: u64 },
    AdminStatus { node_id: u64, port_id: u64 },
    MacAddress { node_id: u64, port_id: u64 },
    PortSpeed { node_id: u64, port_id: u64 },
    NegotiatedPortSpeed { node_id: u64, port_id: u64 },
    LacpSystemPriority { node_id: u64, port_id: u64 },
    LacpSystemId { node_id: u64, port_id: u64 },
    PortCounters { node_id: u64, port_id: u64 },
    QosQueueCounters { node_id: u64, port_id: u64, queue_id: u32 },
    MemoryErrorAlarm,
    FlowProgrammingExceptionAlarm,
}

/// The typed answer to one [`DataRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum DataResponse {
    OperStatus(PortState),
    AdminStatus(AdminState),
    MacAddress(u64),
    PortSpeed(u64),
    NegotiatedPortSpeed(u64),
    LacpSystemPriority(u64),
    LacpSystemId(u64),
    PortCounters(PortCounters),
    QosQueueCounters(QueueCounters),
    Alarm(Alarm),
}

/// One typed write issued against the switch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SetValueRequest {
    MacAddress { node_id: u64, port_id: u64, mac_address: u64 },
    PortSpeed { node_id: u64, port_id: u64, speed_bps: u64 },
}

/// Sender half of the switch change-event queue.
pub type EventSender = Sender<SwitchEvent>;

/// Typed read/write access to the underlying switch plus change-event wiring.
#[async_trait]
pub trait SwitchInterface: Send + Sync {
    /// Answers one typed data request.
    async fn retrieve_value(&self, node_id: u64, request: DataRequest)
        -> Result<DataResponse, Status>;

    /// Applies one typed configuration write.
    async fn set_value(&self, node_id: u64, request: SetValueRequest) -> Result<(), Status>;

    /// Hands the driver the sender it must emit change events on.
    async fn register_event_writer(&self, sender: EventSender) -> Result<(), Status>;

    /// Detaches the previously registered event sender.
    async fn unregister_event_writer(&self) -> Result<(), Status>;
}
