//! Handlers for the `/lacp/interfaces/interface[name=…]/state` subtree.

use crate::event::{EventKind, SwitchEvent};
use crate::leaves::convert::mac_to_string;
use crate::leaves::{change_handler, poll_handler, unexpected_response};
use crate::switch::{DataRequest, DataResponse, SwitchInterface};
use crate::tree::node::TreeNode;
use gnmi_wire::TypedValue;
use std::sync::Arc;

/// Populates one LACP interface entry node with its state leaves.
pub(crate) fn build(
    entry: &mut TreeNode,
    node_id: u64,
    port_id: u64,
    switch: &Arc<dyn SwitchInterface>,
) {
    let state = entry.get_or_add_child("state");

    let priority = state.get_or_add_child("system-priority");
    let priority_path = priority.get_path();
    let priority_read = poll_handler(
        switch.clone(),
        node_id,
        DataRequest::LacpSystemPriority { node_id, port_id },
        priority_path.clone(),
        |response| match response {
            DataResponse::LacpSystemPriority(value) => Ok(TypedValue::UintVal(*value)),
            other => Err(unexpected_response(other)),
        },
    );
    priority
        .set_on_poll(priority_read.clone())
        .set_on_timer(priority_read)
        .set_on_change(
            change_handler(priority_path, move |event| match event {
                SwitchEvent::PortLacpSystemPriorityChanged {
                    node_id: event_node,
                    port_id: event_port,
                    priority,
                } if *event_node == node_id && *event_port == port_id => {
                    Some(TypedValue::UintVal(*priority))
                }
                _ => None,
            }),
            [EventKind::PortLacpSystemPriority],
        );

    let system_id = state.get_or_add_child("system-id-mac");
    let system_id_path = system_id.get_path();
    let system_id_read = poll_handler(
        switch.clone(),
        node_id,
        DataRequest::LacpSystemId { node_id, port_id },
        system_id_path.clone(),
        |response| match response {
            DataResponse::LacpSystemId(mac) => Ok(TypedValue::string(mac_to_string(*mac))),
            other => Err(unexpected_response(other)),
        },
    );
    system_id
        .set_on_poll(system_id_read.clone())
        .set_on_timer(system_id_read)
        .set_on_change(
            change_handler(system_id_path, move |event| match event {
                SwitchEvent::PortLacpSystemIdChanged {
                    node_id: event_node,
                    port_id: event_port,
                    mac_address,
                } if *event_node == node_id && *event_port == port_id => {
                    Some(TypedValue::string(mac_to_string(*mac_address)))
                }
                _ => None,
            }),
            [EventKind::PortLacpSystemId],
        );
}
