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

//! # gnmi-publisher
//!
//! `gnmi-publisher` is the telemetry and configuration surface of a
//! network-switch control plane: it maps OpenConfig-style paths onto live
//! reads, streamed subscriptions, and configuration writes against a switch
//! driver reached through the [`SwitchInterface`] seam.
//!
//! ## Internal architecture map
//!
//! - Wire model: paths, values, and messages come from `gnmi-wire`
//! - Parse tree: schema-shaped nodes with three handlers per leaf, grown on
//!   config push (`tree`, `leaves`)
//! - Event plumbing: per-kind event lists with weakly-held subscription
//!   records, a bounded switch-event queue, and the timer daemon (`bus`,
//!   `event_reader`, `timer`)
//! - Subscription manager: the [`Publisher`] public API
//! - Service surface: gNMI Capabilities/Get/Set/Subscribe logic over
//!   transport-agnostic stream seams (`service`)
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events/spans and does not unconditionally initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod bus;
mod config;
mod event;
mod event_reader;
mod leaves;
mod observability;
mod publisher;
mod runtime;
mod service;
mod subscription;
mod switch;
mod timer;
mod tree;

pub use bus::EventBus;
pub use config::{Chassis, ChassisConfig, NodeConfig, QueueConfig, SingletonPort};
pub use event::{EventKind, SwitchEvent};
pub use publisher::Publisher;
pub use service::{GnmiService, SubscribeStream};
pub use subscription::{
    ChannelSink, CollectorSink, EventHandler, Frequency, SubscribeSink, SubscriptionHandle,
    SubscriptionRecord,
};
pub use switch::{
    AdminState, Alarm, AlarmSeverity, DataRequest, DataResponse, EventSender, PortCounters,
    PortState, QueueCounters, SetValueRequest, SwitchInterface, TrafficClass,
};
pub use timer::{TimerDaemon, TimerHandle};
pub use tree::{HandlerMode, ParseTree, TreeNode};
