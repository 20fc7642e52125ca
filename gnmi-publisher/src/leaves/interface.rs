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

//! Handlers for the `/interfaces/interface[name=…]` subtree.

use crate::config::SingletonPort;
use crate::event::{EventKind, SwitchEvent};
use crate::leaves::convert::{
    admin_state_to_string, mac_to_string, port_state_to_string, speed_bps_to_string,
};
use crate::leaves::{
    change_handler, const_handler, ignore_change_handler, poll_handler, unexpected_response,
    write_updates,
};
use crate::subscription::EventHandler;
use crate::switch::{DataRequest, DataResponse, PortCounters, SwitchInterface};
use crate::tree::node::TreeNode;
use futures::FutureExt;
use gnmi_wire::{
    Code, Path, PathElem, Status, Subscription, SubscriptionMode, TypedValue, Update,
};
use std::sync::Arc;

/// Sampling default applied to counters subscriptions left in
/// TARGET_DEFINED mode.
pub(crate) const COUNTERS_SAMPLE_INTERVAL_MS: u64 = 10_000;

// The mac-address config leaf is seeded with a fixed address.
// TODO: read the configured MAC from ChassisConfig once SingletonPort
// carries one.
const CONFIG_MAC_ADDRESS: u64 = 0x112233445566;

type CounterProjection = fn(&PortCounters) -> u64;

fn counter_leaves() -> [(&'static str, CounterProjection); 14] {
    [
        ("in-octets", |c: &PortCounters| c.in_octets),
        ("out-octets", |c: &PortCounters| c.out_octets),
        ("in-unicast-pkts", |c: &PortCounters| c.in_unicast_pkts),
        ("out-unicast-pkts", |c: &PortCounters| c.out_unicast_pkts),
        ("in-broadcast-pkts", |c: &PortCounters| c.in_broadcast_pkts),
        ("out-broadcast-pkts", |c: &PortCounters| c.out_broadcast_pkts),
        ("in-multicast-pkts", |c: &PortCounters| c.in_multicast_pkts),
        ("out-multicast-pkts", |c: &PortCounters| c.out_multicast_pkts),
        ("in-discards", |c: &PortCounters| c.in_discards),
        ("out-discards", |c: &PortCounters| c.out_discards),
        ("in-errors", |c: &PortCounters| c.in_errors),
        ("out-errors", |c: &PortCounters| c.out_errors),
        ("in-fcs-errors", |c: &PortCounters| c.in_fcs_errors),
        ("in-unknown-protos", |c: &PortCounters| c.in_unknown_protos),
    ]
}

/// Populates one interface entry node (the `[name=…]` level) with its state,
/// counters, and ethernet subtrees.
pub(crate) fn build(entry: &mut TreeNode, port: &SingletonPort, switch: &Arc<dyn SwitchInterface>) {
    let node_id = port.node;
    let port_id = port.id;

    let state = entry.get_or_add_child("state");
    add_const_leaf(
        state.get_or_add_child("ifindex"),
        TypedValue::UintVal(port_id),
    );
    add_const_leaf(
        state.get_or_add_child("name"),
        TypedValue::string(&port.name),
    );
    add_oper_status_leaf(state.get_or_add_child("oper-status"), switch, node_id, port_id);
    add_admin_status_leaf(state.get_or_add_child("admin-status"), switch, node_id, port_id);
    build_counters(state.get_or_add_child("counters"), switch, node_id, port_id);

    let ethernet = entry.get_or_add_child("ethernet");
    let ethernet_state = ethernet.get_or_add_child("state");
    add_mac_address_leaf(
        ethernet_state.get_or_add_child("mac-address"),
        switch,
        node_id,
        port_id,
    );
    add_speed_leaf(
        ethernet_state.get_or_add_child("port-speed"),
        switch,
        node_id,
        port_id,
        SpeedLeaf::Configured,
    );
    add_speed_leaf(
        ethernet_state.get_or_add_child("negotiated-port-speed"),
        switch,
        node_id,
        port_id,
        SpeedLeaf::Negotiated,
    );

    let ethernet_config = ethernet.get_or_add_child("config");
    add_const_leaf(
        ethernet_config.get_or_add_child("mac-address"),
        TypedValue::string(mac_to_string(CONFIG_MAC_ADDRESS)),
    );
    add_const_leaf(
        ethernet_config.get_or_add_child("port-speed"),
        TypedValue::string(speed_bps_to_string(port.speed_bps)),
    );
}

fn add_const_leaf(leaf: &mut TreeNode, value: TypedValue) {
    let path = leaf.get_path();
    leaf.set_on_poll(const_handler(path.clone(), value.clone()))
        .set_on_timer(const_handler(path, value))
        .set_on_change(ignore_change_handler(), []);
}

fn add_oper_status_leaf(
    leaf: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
) {
    let path = leaf.get_path();
    let read = poll_handler(
        switch.clone(),
        node_id,
        DataRequest::OperStatus { node_id, port_id },
        path.clone(),
        |response| match response {
            DataResponse::OperStatus(state) => {
                Ok(TypedValue::string(port_state_to_string(*state)))
            }
            other => Err(unexpected_response(other)),
        },
    );
    leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
        change_handler(path, move |event| match event {
            SwitchEvent::PortOperStateChanged {
                node_id: event_node,
                port_id: event_port,
                state,
            } if *event_node == node_id && *event_port == port_id => {
                Some(TypedValue::string(port_state_to_string(*state)))
            }
            _ => None,
        }),
        [EventKind::PortOperState],
    );
}

fn add_admin_status_leaf(
    leaf: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
) {
    let path = leaf.get_path();
    let read = poll_handler(
        switch.clone(),
        node_id,
        DataRequest::AdminStatus { node_id, port_id },
        path.clone(),
        |response| match response {
            DataResponse::AdminStatus(state) => {
                Ok(TypedValue::string(admin_state_to_string(*state)))
            }
            other => Err(unexpected_response(other)),
        },
    );
    leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
        change_handler(path, move |event| match event {
            SwitchEvent::PortAdminStateChanged {
                node_id: event_node,
                port_id: event_port,
                state,
            } if *event_node == node_id && *event_port == port_id => {
                Some(TypedValue::string(admin_state_to_string(*state)))
            }
            _ => None,
        }),
        [EventKind::PortAdminState],
    );
}

fn add_mac_address_leaf(
    leaf: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
) {
    let path = leaf.get_path();
    let read = poll_handler(
        switch.clone(),
        node_id,
        DataRequest::MacAddress { node_id, port_id },
        path.clone(),
        |response| match response {
            DataResponse::MacAddress(mac) => Ok(TypedValue::string(mac_to_string(*mac))),
            other => Err(unexpected_response(other)),
        },
    );
    leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
        change_handler(path, move |event| match event {
            SwitchEvent::PortMacAddressChanged {
                node_id: event_node,
                port_id: event_port,
                mac_address,
            } if *event_node == node_id && *event_port == port_id => {
                Some(TypedValue::string(mac_to_string(*mac_address)))
            }
            _ => None,
        }),
        [EventKind::PortMacAddress],
    );
}

enum SpeedLeaf {
    Configured,
    Negotiated,
}

fn add_speed_leaf(
    leaf: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
    which: SpeedLeaf,
) {
    let path = leaf.get_path();
    let (request, kind) = match which {
        SpeedLeaf::Configured => (
            DataRequest::PortSpeed { node_id, port_id },
            EventKind::PortSpeed,
        ),
        SpeedLeaf::Negotiated => (
            DataRequest::NegotiatedPortSpeed { node_id, port_id },
            EventKind::PortNegotiatedSpeed,
        ),
    };
    let read = poll_handler(
        switch.clone(),
        node_id,
        request,
        path.clone(),
        |response| match response {
            DataResponse::PortSpeed(speed_bps) | DataResponse::NegotiatedPortSpeed(speed_bps) => {
                Ok(TypedValue::string(speed_bps_to_string(*speed_bps)))
            }
            other => Err(unexpected_response(other)),
        },
    );
    let change = match kind {
        EventKind::PortSpeed => change_handler(path, move |event| match event {
            SwitchEvent::PortSpeedChanged {
                node_id: event_node,
                port_id: event_port,
                speed_bps,
            } if *event_node == node_id && *event_port == port_id => {
                Some(TypedValue::string(speed_bps_to_string(*speed_bps)))
            }
            _ => None,
        }),
        _ => change_handler(path, move |event| match event {
            SwitchEvent::PortNegotiatedSpeedChanged {
                node_id: event_node,
                port_id: event_port,
                speed_bps,
            } if *event_node == node_id && *event_port == port_id => {
                Some(TypedValue::string(speed_bps_to_string(*speed_bps)))
            }
            _ => None,
        }),
    };
    leaf.set_on_poll(read.clone())
        .set_on_timer(read)
        .set_on_change(change, [kind]);
}

fn build_counters(
    counters: &mut TreeNode,
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
) {
    let counters_path = counters.get_path();

    // The block node answers with the whole counter set in one notification.
    let block_read = counters_block_handler(switch, node_id, port_id, counters_path.clone());
    counters
        .set_on_poll(block_read.clone())
        .set_on_timer(block_read)
        .set_on_change(
            counters_block_change_handler(node_id, port_id, counters_path),
            [EventKind::PortCounters],
        )
        .set_target_defined_mode(Arc::new(|subscription: &mut Subscription| {
            subscription.mode = SubscriptionMode::Sample;
            subscription.sample_interval_ms = COUNTERS_SAMPLE_INTERVAL_MS;
            Ok(())
        }));

    for (leaf_name, project) in counter_leaves() {
        let leaf = counters.get_or_add_child(leaf_name);
        let path = leaf.get_path();
        let read = poll_handler(
            switch.clone(),
            node_id,
            DataRequest::PortCounters { node_id, port_id },
            path.clone(),
            move |response| match response {
                DataResponse::PortCounters(counters) => Ok(TypedValue::UintVal(project(counters))),
                other => Err(unexpected_response(other)),
            },
        );
        leaf.set_on_poll(read.clone()).set_on_timer(read).set_on_change(
            change_handler(path, move |event| match event {
                SwitchEvent::PortCountersChanged {
                    node_id: event_node,
                    port_id: event_port,
                    counters,
                } if *event_node == node_id && *event_port == port_id => {
                    Some(TypedValue::UintVal(project(counters)))
                }
                _ => None,
            }),
            [EventKind::PortCounters],
        );
    }
}

fn counters_to_updates(block_path: &Path, counters: &PortCounters) -> Vec<Update> {
    counter_leaves()
        .iter()
        .map(|(leaf_name, project)| Update {
            path: block_path.clone().push(PathElem::new(leaf_name)),
            value: TypedValue::UintVal(project(counters)),
        })
        .collect()
}

fn counters_block_handler(
    switch: &Arc<dyn SwitchInterface>,
    node_id: u64,
    port_id: u64,
    block_path: Path,
) -> EventHandler {
    let switch = switch.clone();
    Arc::new(move |_event, sink| {
        let switch = switch.clone();
        let block_path = block_path.clone();
        async move {
            let response = switch
                .retrieve_value(node_id, DataRequest::PortCounters { node_id, port_id })
                .await?;
            let DataResponse::PortCounters(counters) = response else {
                return Err(Status::fail_with_code(
                    Code::Internal,
                    "switch returned an unexpected data response for the counters block",
                ));
            };
            write_updates(sink.as_ref(), counters_to_updates(&block_path, &counters))
        }
        .boxed()
    })
}

fn counters_block_change_handler(node_id: u64, port_id: u64, block_path: Path) -> EventHandler {
    Arc::new(move |event, sink| {
        let updates = match event {
            SwitchEvent::PortCountersChanged {
                node_id: event_node,
                port_id: event_port,
                counters,
            } if *event_node == node_id && *event_port == port_id => {
                Some(counters_to_updates(&block_path, counters))
            }
            _ => None,
        };
        async move {
            match updates {
                Some(updates) => write_updates(sink.as_ref(), updates),
                None => Ok(()),
            }
        }
        .boxed()
    })
}
