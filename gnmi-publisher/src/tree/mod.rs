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

//! The schema-shaped parse tree and its growth operations.
//!
//! The tree starts from an interface-less skeleton and grows on config push;
//! structural growth takes the writer lock, lookups take readers, and nodes
//! are never removed during a session.

pub(crate) mod node;

pub use node::{HandlerMode, TreeNode};

use crate::config::{QueueConfig, SingletonPort};
use crate::leaves;
use crate::leaves::ignore_change_handler;
use crate::observability::events;
use crate::subscription::EventHandler;
use crate::switch::SwitchInterface;
use futures::FutureExt;
use gnmi_wire::{Path, PathElem};
use std::sync::{Arc, RwLock, Weak};
use tracing::info;

const COMPONENT: &str = "parse_tree";

pub(crate) struct TreeShared {
    root: RwLock<TreeNode>,
    switch: Arc<dyn SwitchInterface>,
}

/// The publisher's path-indexed tree of leaves.
pub struct ParseTree {
    shared: Arc<TreeShared>,
}

impl ParseTree {
    /// Creates the initial interface-less tree: only the wildcard
    /// `/interfaces/interface[name=*]/state/{ifindex,name}` leaves exist.
    pub fn new(switch: Arc<dyn SwitchInterface>) -> Self {
        let shared = Arc::new(TreeShared {
            root: RwLock::new(TreeNode::root()),
            switch,
        });
        let tree = Self { shared };
        tree.install_skeleton();
        tree
    }

    fn install_skeleton(&self) {
        let interface_prefix = Path::root()
            .push(PathElem::new("interfaces"))
            .push(PathElem::new("interface"));

        let mut root = self.write_root();
        let state = root
            .get_or_add_child("interfaces")
            .get_or_add_child("interface")
            .get_or_add_key_child("name", "*")
            .get_or_add_child("state");

        for leaf_name in ["ifindex", "name"] {
            let subpath = Path::root()
                .push(PathElem::new("state"))
                .push(PathElem::new(leaf_name));
            let fanout = fanout_handler(
                &self.shared,
                interface_prefix.clone(),
                subpath,
                HandlerMode::OnPoll,
            );
            state
                .get_or_add_child(leaf_name)
                .set_on_poll(fanout)
                .set_on_change(ignore_change_handler(), []);
        }
    }

    /// Grows `/interfaces`, `/lacp`, and `/qos` subtrees for one singleton
    /// port. Atomic under the writer lock and idempotent by port name.
    pub fn add_subtree_interface(&self, port: &SingletonPort, queues: &[QueueConfig]) {
        let switch = self.shared.switch.clone();
        let mut root = self.write_root();

        let interface_entry = root
            .get_or_add_child("interfaces")
            .get_or_add_child("interface")
            .get_or_add_key_child("name", &port.name);
        leaves::interface::build(interface_entry, port, &switch);

        let lacp_entry = root
            .get_or_add_child("lacp")
            .get_or_add_child("interfaces")
            .get_or_add_child("interface")
            .get_or_add_key_child("name", &port.name);
        leaves::lacp::build(lacp_entry, port.node, port.id, &switch);

        for queue in queues {
            let queue_entry = root
                .get_or_add_child("qos")
                .get_or_add_child("interfaces")
                .get_or_add_child("interface")
                .get_or_add_key_child("name", &port.name)
                .get_or_add_child("output")
                .get_or_add_child("queues")
                .get_or_add_child("queue")
                .get_or_add_key_child("name", queue.purpose.as_str());
            leaves::qos::build(queue_entry, queue, port.node, port.id, &switch);
        }

        info!(
            event = events::TREE_ADD_INTERFACE,
            component = COMPONENT,
            name = %port.name,
            node_id = port.node,
            port_id = port.id,
            queues = queues.len(),
            "added interface subtree"
        );
    }

    /// Grows the `/components` chassis alarm subtree. Idempotent by name.
    pub fn add_subtree_chassis(&self, name: &str) {
        let switch = self.shared.switch.clone();
        let mut root = self.write_root();

        let component_entry = root
            .get_or_add_child("components")
            .get_or_add_child("component")
            .get_or_add_key_child("name", name);
        leaves::chassis::build(component_entry, &switch);

        info!(
            event = events::TREE_ADD_CHASSIS,
            component = COMPONENT,
            name = %name,
            "added chassis subtree"
        );
    }

    /// Runs `f` against the node at `path` under the reader lock.
    pub fn with_node<R>(&self, path: &Path, f: impl FnOnce(&TreeNode) -> R) -> Option<R> {
        let root = self.read_root();
        root.find_node(path).map(f)
    }

    /// Runs `f` against the root under the reader lock.
    pub fn with_root<R>(&self, f: impl FnOnce(&TreeNode) -> R) -> R {
        f(&self.read_root())
    }

    fn read_root(&self) -> std::sync::RwLockReadGuard<'_, TreeNode> {
        self.shared.root.read().expect("tree lock poisoned")
    }

    fn write_root(&self) -> std::sync::RwLockWriteGuard<'_, TreeNode> {
        self.shared.root.write().expect("tree lock poisoned")
    }
}

/// Handler of a wildcard skeleton leaf: collects the corresponding handler
/// of every concrete entry under the reader lock, then runs them in tree
/// order. Interfaces added later are picked up automatically.
fn fanout_handler(
    shared: &Arc<TreeShared>,
    prefix: Path,
    subpath: Path,
    mode: HandlerMode,
) -> EventHandler {
    let weak: Weak<TreeShared> = Arc::downgrade(shared);
    Arc::new(move |event, sink| {
        let handlers: Vec<EventHandler> = match weak.upgrade() {
            Some(shared) => {
                let root = shared.root.read().expect("tree lock poisoned");
                let mut collected = Vec::new();
                let _ = root.perform_action_for_all_non_wildcard_nodes(
                    &prefix,
                    &subpath,
                    &mut |node| {
                        if let Some(handler) = node.handler(mode) {
                            collected.push(handler);
                        }
                        Ok(())
                    },
                );
                collected
            }
            None => Vec::new(),
        };
        let event = event.clone();
        async move {
            for handler in handlers {
                handler(&event, sink.clone()).await?;
            }
            Ok(())
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::{HandlerMode, ParseTree};
    use crate::config::{QueueConfig, SingletonPort};
    use crate::event::EventKind;
    use crate::subscription::CollectorSink;
    use crate::switch::{
        AdminState, Alarm, DataRequest, DataResponse, EventSender, PortState, SetValueRequest,
        SwitchInterface, TrafficClass,
    };
    use crate::tree::node::TreeNode;
    use async_trait::async_trait;
    use gnmi_wire::{Code, Path, Status, SubscribeResponse, TypedValue};
    use std::str::FromStr;
    use std::sync::Arc;

    pub(crate) struct StaticSwitch;

    #[async_trait]
    impl SwitchInterface for StaticSwitch {
        async fn retrieve_value(
            &self,
            _node_id: u64,
            request: DataRequest,
        ) -> Result<DataResponse, Status> {
            Ok(match request {
                DataRequest::OperStatus { .. } => DataResponse::OperStatus(PortState::Up),
                DataRequest::AdminStatus { .. } => DataResponse::AdminStatus(AdminState::Enabled),
                DataRequest::MacAddress { .. } => DataResponse::MacAddress(0x112233445566),
                DataRequest::PortSpeed { .. } => DataResponse::PortSpeed(25_000_000_000),
                DataRequest::NegotiatedPortSpeed { .. } => {
                    DataResponse::NegotiatedPortSpeed(25_000_000_000)
                }
                DataRequest::LacpSystemPriority { .. } => DataResponse::LacpSystemPriority(5),
                DataRequest::LacpSystemId { .. } => DataResponse::LacpSystemId(0x112233445566),
                DataRequest::PortCounters { .. } => DataResponse::PortCounters(Default::default()),
                DataRequest::QosQueueCounters { .. } => {
                    DataResponse::QosQueueCounters(Default::default())
                }
                DataRequest::MemoryErrorAlarm | DataRequest::FlowProgrammingExceptionAlarm => {
                    DataResponse::Alarm(Alarm {
                        description: "alarm".to_string(),
                        severity: crate::switch::AlarmSeverity::Critical,
                        status: true,
                        time_created_ns: 12345,
                    })
                }
            })
        }

        async fn set_value(&self, _node_id: u64, _request: SetValueRequest) -> Result<(), Status> {
            Err(Status::fail_with_code(Code::Unimplemented, "not used"))
        }

        async fn register_event_writer(&self, _sender: EventSender) -> Result<(), Status> {
            Ok(())
        }

        async fn unregister_event_writer(&self) -> Result<(), Status> {
            Ok(())
        }
    }

    fn singleton_port(name: &str) -> SingletonPort {
        SingletonPort {
            name: name.to_string(),
            node: 3,
            id: 3,
            speed_bps: 25_000_000_000,
        }
    }

    fn be1_queue() -> QueueConfig {
        QueueConfig {
            queue_id: 0,
            purpose: TrafficClass::Be1,
        }
    }

    fn path(text: &str) -> Path {
        Path::from_str(text).expect("test path should parse")
    }

    fn collect_leaf_paths(node: &TreeNode, into: &mut Vec<String>) {
        if node.is_leaf() {
            into.push(node.get_path().to_string());
            return;
        }
        for child in node.children() {
            collect_leaf_paths(child, into);
        }
    }

    #[test]
    fn skeleton_supports_change_and_poll_but_not_timer() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));

        tree.with_root(|root| {
            assert!(root.all_subtree_leaves_support(HandlerMode::OnChange));
            assert!(root.all_subtree_leaves_support(HandlerMode::OnPoll));
            assert!(!root.all_subtree_leaves_support(HandlerMode::OnTimer));
        });
    }

    #[test]
    fn skeleton_resolves_wildcard_leaves() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));

        let found = tree.with_node(
            &path("/interfaces/interface[name=*]/state/ifindex"),
            |node| node.get_path().to_string(),
        );

        assert_eq!(
            found.as_deref(),
            Some("/interfaces/interface[name=*]/state/ifindex")
        );
    }

    #[test]
    fn add_subtree_interface_grows_all_three_subtrees() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));
        tree.add_subtree_interface(&singleton_port("iface-1"), &[be1_queue()]);

        for leaf in [
            "/interfaces/interface[name=iface-1]/state/ifindex",
            "/interfaces/interface[name=iface-1]/state/oper-status",
            "/interfaces/interface[name=iface-1]/state/counters/in-octets",
            "/interfaces/interface[name=iface-1]/ethernet/state/mac-address",
            "/lacp/interfaces/interface[name=iface-1]/state/system-priority",
            "/qos/interfaces/interface[name=iface-1]/output/queues/queue[name=BE1]/state/dropped-pkts",
        ] {
            assert!(
                tree.with_node(&path(leaf), |_| ()).is_some(),
                "missing leaf {leaf}"
            );
        }
    }

    #[test]
    fn repeated_config_pushes_produce_the_same_tree() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));
        let port = singleton_port("iface-1");

        tree.add_subtree_interface(&port, &[be1_queue()]);
        tree.add_subtree_chassis("chassis-1");
        let mut first = Vec::new();
        tree.with_root(|root| collect_leaf_paths(root, &mut first));

        tree.add_subtree_interface(&port, &[be1_queue()]);
        tree.add_subtree_chassis("chassis-1");
        let mut second = Vec::new();
        tree.with_root(|root| collect_leaf_paths(root, &mut second));

        assert_eq!(first, second);
    }

    #[test]
    fn found_node_path_is_path_equal_to_the_request() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));
        tree.add_subtree_interface(&singleton_port("iface-1"), &[]);

        let request = path("/interfaces/interface[name=iface-1]/state/oper-status");
        let node_path = tree
            .with_node(&request, |node| node.get_path())
            .expect("leaf should resolve");

        assert!(node_path.matches(&request));
    }

    #[test]
    fn interface_subtree_kinds_cover_exactly_the_port_events() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));
        tree.add_subtree_interface(&singleton_port("iface-1"), &[]);

        let kinds = tree
            .with_node(&path("/interfaces/interface[name=iface-1]"), |node| {
                node.subtree_event_kinds()
            })
            .expect("entry should resolve");

        let expected = [
            EventKind::PortOperState,
            EventKind::PortAdminState,
            EventKind::PortSpeed,
            EventKind::PortNegotiatedSpeed,
            EventKind::PortMacAddress,
            EventKind::PortCounters,
        ];
        assert_eq!(kinds.len(), expected.len());
        for kind in expected {
            assert!(kinds.contains(&kind), "missing kind {kind:?}");
        }
    }

    #[tokio::test]
    async fn wildcard_poll_fans_out_over_concrete_interfaces() {
        let tree = ParseTree::new(Arc::new(StaticSwitch));
        tree.add_subtree_interface(&singleton_port("iface-1"), &[]);
        tree.add_subtree_interface(&singleton_port("iface-2"), &[]);

        let handler = tree
            .with_node(&path("/interfaces/interface[name=*]/state/name"), |node| {
                node.handler(HandlerMode::OnPoll)
            })
            .expect("wildcard leaf should resolve")
            .expect("wildcard leaf has a poll handler");

        let collector = Arc::new(CollectorSink::new());
        let sink: Arc<dyn crate::subscription::SubscribeSink> = collector.clone();
        handler(&crate::event::SwitchEvent::PollTick, sink)
            .await
            .expect("fan-out poll should succeed");

        let names: Vec<_> = collector
            .written()
            .iter()
            .filter_map(|response| match response {
                SubscribeResponse::Update(notification) => {
                    notification.update.first().map(|update| update.value.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            vec![TypedValue::string("iface-1"), TypedValue::string("iface-2")]
        );
    }
}
