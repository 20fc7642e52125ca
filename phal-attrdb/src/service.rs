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

//! The PHAL attribute-database service: Get, Set, and polled Subscribe.

use crate::query::{AttrPath, PathQuery};
use async_trait::async_trait;
use gnmi_wire::{Code, Status};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

const COMPONENT: &str = "phaldb_service";

/// Depth of the per-subscriber snapshot queue.
const SUBSCRIBER_QUEUE_DEPTH: usize = 128;

/// One typed attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
}

/// One Set operation: a path plus its new value. A missing value models an
/// unset wire oneof and is rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct AttrUpdate {
    pub path: PathQuery,
    pub value: Option<AttrValue>,
}

/// A snapshot of (part of) the attribute database.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhalDb {
    pub entries: Vec<(AttrPath, AttrValue)>,
}

impl PhalDb {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sender half of a subscription's snapshot queue, handed to the database.
pub type SnapshotSender = broadcast::Sender<PhalDb>;

/// Outbound half of one Subscribe stream.
pub trait PhalSubscribeSink: Send + Sync {
    fn write(&self, snapshot: PhalDb) -> Result<(), Status>;
}

/// The attribute database seam; the store itself is an external
/// collaborator.
#[async_trait]
pub trait AttributeDatabase: Send + Sync {
    async fn get(&self, paths: Vec<AttrPath>) -> Result<PhalDb, Status>;

    async fn set(&self, updates: Vec<(AttrPath, AttrValue)>) -> Result<(), Status>;

    /// Starts a polled subscription that sends a snapshot on `sender` every
    /// `polling_interval` while values change.
    async fn subscribe(
        &self,
        paths: Vec<AttrPath>,
        polling_interval: Duration,
        sender: SnapshotSender,
    ) -> Result<(), Status>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetRequest {
    pub path: PathQuery,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetResponse {
    pub phal_db: PhalDb,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetRequest {
    pub updates: Vec<AttrUpdate>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubscribeRequest {
    pub path: PathQuery,
    pub polling_interval_seconds: u64,
}

/// Path-indexed Get/Set/Subscribe over the attribute database.
pub struct PhalDbService {
    attribute_db: Arc<dyn AttributeDatabase>,
}

impl PhalDbService {
    pub fn new(attribute_db: Arc<dyn AttributeDatabase>) -> Self {
        Self { attribute_db }
    }

    pub async fn get(&self, request: GetRequest) -> Result<GetResponse, Status> {
        let path = request.path.to_attr_path()?;
        let phal_db = self.attribute_db.get(vec![path]).await?;
        Ok(GetResponse { phal_db })
    }

    /// Converts each update to the database form and applies them in one
    /// call. Nothing to do is success.
    pub async fn set(&self, request: SetRequest) -> Result<(), Status> {
        if request.updates.is_empty() {
            return Ok(());
        }
        let mut updates = Vec::with_capacity(request.updates.len());
        for update in &request.updates {
            let path = update.path.to_attr_path()?;
            let value = update.value.clone().ok_or_else(|| {
                Status::fail_with_code(Code::InvalidArgument, "Unknown value type")
            })?;
            updates.push((path, value));
        }
        self.attribute_db.set(updates).await
    }

    /// Issues the subscription against the database, then forwards every
    /// snapshot from the bounded queue to the client sink.
    ///
    /// A closed queue or an empty snapshot ends the stream with `INTERNAL`;
    /// an overflowed queue is logged and the next snapshot is awaited.
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
        sink: &dyn PhalSubscribeSink,
    ) -> Result<(), Status> {
        let path = request.path.to_attr_path()?;
        let (sender, mut receiver) = broadcast::channel(SUBSCRIBER_QUEUE_DEPTH);
        self.attribute_db
            .subscribe(
                vec![path],
                Duration::from_secs(request.polling_interval_seconds),
                sender,
            )
            .await?;

        loop {
            match receiver.recv().await {
                Ok(snapshot) => {
                    if snapshot.is_empty() {
                        return Err(Status::fail_with_code(
                            Code::Internal,
                            "Subscribe read returned zero bytes",
                        ));
                    }
                    sink.write(snapshot).map_err(|error| {
                        warn!(
                            event = "phal_subscribe_write_failed",
                            component = COMPONENT,
                            err = %error,
                            "subscribe stream write failed"
                        );
                        Status::fail_with_code(Code::Internal, "Subscribe stream write failed")
                    })?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        event = "phal_subscribe_recv_lagged",
                        component = COMPONENT,
                        skipped,
                        "snapshot queue overflowed; continuing"
                    );
                }
                Err(RecvError::Closed) => {
                    info!(
                        event = "phal_subscribe_recv_closed",
                        component = COMPONENT,
                        "subscription closed the snapshot queue"
                    );
                    return Err(Status::fail_with_code(
                        Code::Internal,
                        "Subscribe closed the channel",
                    ));
                }
            }
        }
    }
}
