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

//! # gnmi-wire
//!
//! `gnmi-wire` holds the wire-facing data model the publisher core consumes:
//! hierarchical paths with positional keys, typed values, the gNMI message
//! surface (Get/Set/Subscribe/Capabilities), and canonical status codes.
//!
//! The message schema itself is an external specification; this crate is its
//! in-process representation plus the path semantics (equality, wildcard
//! matching, prefix concatenation) every other layer relies on.

mod messages;
mod path;
mod status;
mod value;

pub use messages::{
    CapabilityRequest, CapabilityResponse, GetRequest, GetResponse, ListMode, ModelData,
    Notification, SetRequest, SetResponse, SubscribeRequest, SubscribeResponse, Subscription,
    SubscriptionList, SubscriptionMode, Update, UpdateOperation, UpdateResult,
};
pub use path::{Path, PathElem};
pub use status::{Code, ErrorDetail, Status};
pub use value::TypedValue;
