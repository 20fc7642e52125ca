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

//! # phal-attrdb
//!
//! Path-indexed Get/Set/Subscribe service logic over the platform
//! hardware-abstraction (PHAL) attribute database. The database itself sits
//! behind the [`AttributeDatabase`] seam; queries use a richer addressing
//! than gNMI paths to permit "all indices" and "terminal subtree" reads.

mod query;
mod service;

pub use query::{AttrPath, AttrPathEntry, PathQuery, QueryEntry};
pub use service::{
    AttrUpdate, AttrValue, AttributeDatabase, GetRequest, GetResponse, PhalDb, PhalDbService,
    PhalSubscribeSink, SetRequest, SnapshotSender, SubscribeRequest,
};
