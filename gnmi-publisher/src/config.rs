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

//! The chassis configuration pushed at runtime; the tree builder grows
//! subtrees from it.

use crate::switch::TrafficClass;
use gnmi_wire::{Code, Status};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChassisConfig {
    pub chassis: Chassis,
    #[serde(default)]
    pub singleton_ports: Vec<SingletonPort>,
    #[serde(default)]
    pub node_configs: Vec<NodeConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Chassis {
    pub name: String,
}

/// One singleton port declaration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SingletonPort {
    pub name: String,
    pub node: u64,
    pub id: u64,
    pub speed_bps: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub node_id: u64,
    #[serde(default)]
    pub qos_configs: Vec<QueueConfig>,
}

/// One egress QoS queue declaration for a node.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    pub queue_id: u32,
    pub purpose: TrafficClass,
}

impl ChassisConfig {
    pub fn from_json5(contents: &str) -> Result<Self, Status> {
        json5::from_str(contents).map_err(|error| {
            Status::fail_with_code(
                Code::InvalidArgument,
                format!("Unable to parse chassis config: {error}"),
            )
        })
    }

    /// Queue configs declared for `node_id`; empty when the node has none.
    pub fn queues_for_node(&self, node_id: u64) -> &[QueueConfig] {
        self.node_configs
            .iter()
            .find(|node| node.node_id == node_id)
            .map(|node| node.qos_configs.as_slice())
            .unwrap_or(&[])
    }
}
