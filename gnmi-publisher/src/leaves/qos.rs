//! Handlers for the per-queue
//! `/qos/interfaces/interface[name=…]/output/queues/queue[name=…]/state`
//! subtree.

use crate::config::QueueConfig;
use crate::event::{EventKind, SwitchEvent};
use crate::leaves::{change_handler, const_handler, ignore_change_handler, poll_handler, unexpected_response};
use crate::switch::{DataRequest, DataResponse, QueueCounters, SwitchInterface};
use crate::tree::node::TreeNode;
use gnmi_wire::TypedValue;
use std::sync::Arc;

type QueueProjection = fn(&QueueCounters) -> u64;

fn queue_counter_leaves() -> [(&'static str, QueueProjection); 3] {
    [
        ("transmit-octets", |c: &QueueCounters| c.transmit_octets),
        ("transmit-pkts", |c: &QueueCounters| c.transmit_pkts),
        ("dropped-pkts", |c: &QueueCounters| c.dropped_pkts),
    ]
}

/// Populates one queue entry node (the `queue[name=…]` level).
pub(crate) fn build(
    entry: &mut TreeNode,
    queue: &QueueConfig,
    node_id: u64,
    port_id: u64,
    switch: &Arc<dyn SwitchInterface>,
) {
    let queue_id = queue.queue_id;
    let state = entry.get_or_add_child("state");

    let name = state.get_or_add_child("name");
    let name_path = name.get_path();
    let name_value = TypedValue::string(queue.purpose.as_str());
    name.set_on_poll(const_handler(name_path.clone(), name_value.clone()))
        .set_on_timer(const_handler(name_path, name_value))
        .set_on_change(ignore_change_handler(), []);

    let id = state.get_or_add_child("id");
    let id_path = id.get_path();
    let id_value = TypedValue::UintVal(queue_id as u64);
    id.set_on_poll(const_handler(id_path.clone(), id_value.clone()))
        .set_on_timer(const_handler(id_path, id_value))
        .set_on_change(ignore_change_handler(), []);

    for (leaf_name, project) in queue_counter_leaves() {
        let leaf = state.get_or_add_child(leaf_name);
        let path = leaf.get_path();
        let read = poll_handler(
            switch.clone(),
            node_id,
            DataRequest::QosQueueCounters {
                node_id,
                port_id,
                queue_id,
            },
            path.clone(),
            move |response| match response {
                DataResponse::QosQueueCounters(counters) => {
                    Ok(TypedValue::UintVal(project(counters)))
                }
                other => Err(unexpected_response(other)),
            },
        );
        leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
            change_handler(path, move |event| match event {
                SwitchEvent::PortQosCountersChanged {
                    node_id: event_node,
                    port_id: event_port,
                    queue_id: event_queue,
                    counters,
                } if *event_node == node_id
                    && *event_port == port_id
                    && *event_queue == queue_id =>
                {
                    Some(TypedValue::UintVal(project(counters)))
                }
                _ => None,
            }),
            [EventKind::PortQosCounters],
        );
    }
}
