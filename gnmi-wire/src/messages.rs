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

//! gNMI message surface: Get/Set/Subscribe/Capabilities.

use crate::path::Path;
use crate::status::Status;
use crate::value::TypedValue;

/// One `path -> value` pair inside a notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub path: Path,
    pub value: TypedValue,
}

/// A timestamped batch of updates sharing one prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub timestamp_ns: u64,
    pub prefix: Path,
    pub update: Vec<Update>,
}

impl Notification {
    pub fn new(timestamp_ns: u64, update: Vec<Update>) -> Self {
        Self {
            timestamp_ns,
            prefix: Path::root(),
            update,
        }
    }
}

/// Delivery mode of one subscription entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubscriptionMode {
    #[default]
    TargetDefined,
    OnChange,
    Sample,
}

/// Top-level mode of a subscription list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ListMode {
    #[default]
    Stream,
    Once,
    Poll,
}

/// One subscription entry of a subscription list.
///
/// `sample_interval_ms` is interpreted in milliseconds; a zero interval in
/// SAMPLE mode falls back to the target default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subscription {
    pub path: Path,
    pub mode: SubscriptionMode,
    pub sample_interval_ms: u64,
    pub suppress_redundant: bool,
    pub heartbeat_interval_ms: u64,
}

/// The first message of a Subscribe stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubscriptionList {
    pub prefix: Path,
    pub mode: ListMode,
    pub subscriptions: Vec<Subscription>,
    pub updates_only: bool,
}

/// Inbound messages on a Subscribe stream.
#[derive(Clone, Debug, PartialEq)]
pub enum SubscribeRequest {
    Subscribe(SubscriptionList),
    Poll,
    Aliases,
}

/// Outbound messages on a Subscribe stream.
#[derive(Clone, Debug, PartialEq)]
pub enum SubscribeResponse {
    Update(Notification),
    /// End-of-initial-snapshot marker for STREAM subscriptions.
    SyncResponse,
    Error(Status),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetRequest {
    pub prefix: Path,
    pub paths: Vec<Path>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetResponse {
    pub notifications: Vec<Notification>,
}

/// One mutation of a Set request.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOperation {
    Delete(Path),
    Replace(Update),
    Update(Update),
}

impl UpdateOperation {
    pub fn path(&self) -> &Path {
        match self {
            UpdateOperation::Delete(path) => path,
            UpdateOperation::Replace(update) | UpdateOperation::Update(update) => &update.path,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetRequest {
    pub prefix: Path,
    pub operations: Vec<UpdateOperation>,
}

/// Per-operation outcome of a Set request.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateResult {
    pub path: Path,
    pub status: Status,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetResponse {
    pub timestamp_ns: u64,
    pub results: Vec<UpdateResult>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapabilityRequest {}

#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityResponse {
    pub supported_models: Vec<ModelData>,
    pub supported_encodings: Vec<String>,
    pub gnmi_version: String,
}

/// One supported YANG model advertised by Capabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub organization: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::{Subscription, SubscriptionMode, Update, UpdateOperation};
    use crate::path::{Path, PathElem};
    use crate::value::TypedValue;

    #[test]
    fn subscription_defaults_to_target_defined() {
        let subscription = Subscription::default();

        assert_eq!(subscription.mode, SubscriptionMode::TargetDefined);
        assert_eq!(subscription.sample_interval_ms, 0);
    }

    #[test]
    fn update_operation_exposes_its_path() {
        let path = Path::root().push(PathElem::new("interfaces"));
        let delete = UpdateOperation::Delete(path.clone());
        let replace = UpdateOperation::Replace(Update {
            path: path.clone(),
            value: TypedValue::BoolVal(true),
        });

        assert_eq!(delete.path(), &path);
        assert_eq!(replace.path(), &path);
    }
}
