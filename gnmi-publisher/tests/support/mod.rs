//! Shared fakes and helpers for the integration suites.

// Each integration binary uses its own subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use gnmi_publisher::{
    AdminState, Alarm, AlarmSeverity, DataRequest, DataResponse, EventSender, PortCounters,
    PortState, Publisher, QueueConfig, QueueCounters, SetValueRequest, SingletonPort, SubscribeSink,
    SwitchEvent, SwitchInterface, TrafficClass,
};
use gnmi_wire::{Path, Status, SubscribeResponse, TypedValue};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NODE_ID: u64 = 3;
pub const PORT_ID: u64 = 3;
pub const MAC_ADDRESS: u64 = 0x112233445566;
pub const SPEED_BPS: u64 = 25_000_000_000;
pub const LACP_PRIORITY: u64 = 5;
pub const ALARM_TIME_CREATED: u64 = 12345;

/// Switch fake answering typed reads from canned values and exposing the
/// event sender it was handed.
pub struct FakeSwitch {
    sender: Mutex<Option<EventSender>>,
    retrieve_calls: AtomicUsize,
}

impl Default for FakeSwitch {
    fn default() -> Self {
        Self {
            sender: Mutex::new(None),
            retrieve_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeSwitch {
    pub fn alarm() -> Alarm {
        Alarm {
            description: "alarm".to_string(),
            severity: AlarmSeverity::Critical,
            status: true,
            time_created_ns: ALARM_TIME_CREATED,
        }
    }

    pub fn counters() -> PortCounters {
        PortCounters {
            in_octets: 5,
            out_octets: 44,
            in_unicast_pkts: 6,
            out_unicast_pkts: 7,
            in_broadcast_pkts: 8,
            out_broadcast_pkts: 9,
            in_multicast_pkts: 10,
            out_multicast_pkts: 11,
            in_discards: 12,
            out_discards: 13,
            in_errors: 14,
            out_errors: 15,
            in_fcs_errors: 16,
            in_unknown_protos: 17,
        }
    }

    pub fn retrieve_call_count(&self) -> usize {
        self.retrieve_calls.load(Ordering::Relaxed)
    }

    /// Emits one event on the registered queue; false when no reader is
    /// wired.
    pub fn emit(&self, event: SwitchEvent) -> bool {
        let sender = self.sender.lock().expect("sender lock poisoned");
        match sender.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn has_event_writer(&self) -> bool {
        self.sender.lock().expect("sender lock poisoned").is_some()
    }
}

#[async_trait]
impl SwitchInterface for FakeSwitch {
    async fn retrieve_value(
        &self,
        _node_id: u64,
        request: DataRequest,
    ) -> Result<DataResponse, Status> {
        self.retrieve_calls.fetch_add(1, Ordering::Relaxed);
        Ok(match request {
            DataRequest::OperStatus { .. } => DataResponse::OperStatus(PortState::Up),
            DataRequest::AdminStatus { .. } => DataResponse::AdminStatus(AdminState::Enabled),
            DataRequest::MacAddress { .. } => DataResponse::MacAddress(MAC_ADDRESS),
            DataRequest::PortSpeed { .. } => DataResponse::PortSpeed(SPEED_BPS),
            DataRequest::NegotiatedPortSpeed { .. } => {
                DataResponse::NegotiatedPortSpeed(SPEED_BPS)
            }
            DataRequest::LacpSystemPriority { .. } => {
                DataResponse::LacpSystemPriority(LACP_PRIORITY)
            }
            DataRequest::LacpSystemId { .. } => DataResponse::LacpSystemId(MAC_ADDRESS),
            DataRequest::PortCounters { .. } => DataResponse::PortCounters(Self::counters()),
            DataRequest::QosQueueCounters { .. } => DataResponse::QosQueueCounters(QueueCounters {
                transmit_octets: 20,
                transmit_pkts: 21,
                dropped_pkts: 22,
            }),
            DataRequest::MemoryErrorAlarm | DataRequest::FlowProgrammingExceptionAlarm => {
                DataResponse::Alarm(Self::alarm())
            }
        })
    }

    async fn set_value(&self, _node_id: u64, _request: SetValueRequest) -> Result<(), Status> {
        Ok(())
    }

    async fn register_event_writer(&self, sender: EventSender) -> Result<(), Status> {
        let mut slot = self.sender.lock().expect("sender lock poisoned");
        *slot = Some(sender);
        Ok(())
    }

    async fn unregister_event_writer(&self) -> Result<(), Status> {
        let mut slot = self.sender.lock().expect("sender lock poisoned");
        *slot = None;
        Ok(())
    }
}

pub fn singleton_port(name: &str) -> SingletonPort {
    SingletonPort {
        name: name.to_string(),
        node: NODE_ID,
        id: PORT_ID,
        speed_bps: SPEED_BPS,
    }
}

pub fn be1_queue() -> QueueConfig {
    QueueConfig {
        queue_id: 0,
        purpose: TrafficClass::Be1,
    }
}

/// A publisher over a [`FakeSwitch`] with `iface-1` and `chassis-1` grown.
pub fn publisher_with_fixture() -> (Arc<FakeSwitch>, Publisher) {
    let switch = Arc::new(FakeSwitch::default());
    let publisher = Publisher::new(switch.clone());
    publisher
        .tree()
        .add_subtree_interface(&singleton_port("iface-1"), &[be1_queue()]);
    publisher.tree().add_subtree_chassis("chassis-1");
    (switch, publisher)
}

pub fn path(text: &str) -> Path {
    Path::from_str(text).expect("test path should parse")
}

pub fn collector_sink() -> (Arc<gnmi_publisher::CollectorSink>, Arc<dyn SubscribeSink>) {
    let collector = Arc::new(gnmi_publisher::CollectorSink::new());
    let sink: Arc<dyn SubscribeSink> = collector.clone();
    (collector, sink)
}

/// First value of every update notification, in write order.
pub fn update_values(responses: &[SubscribeResponse]) -> Vec<TypedValue> {
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
