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

//! gNMI service logic: Capabilities, Get, Set, and the Subscribe stream
//! session. The gRPC transport wiring stays outside this crate; the service
//! is written against [`SubscribeStream`]/[`SubscribeSink`] seams.

use crate::config::ChassisConfig;
use crate::observability::events;
use crate::publisher::Publisher;
use crate::subscription::{CollectorSink, Frequency, SubscribeSink, SubscriptionHandle};
use async_trait::async_trait;
use gnmi_wire::{
    CapabilityRequest, CapabilityResponse, Code, ErrorDetail, GetRequest, GetResponse, ListMode,
    ModelData, Path, SetRequest, SetResponse, Status, SubscribeRequest, SubscribeResponse,
    SubscriptionList, SubscriptionMode, TypedValue, UpdateOperation, UpdateResult,
};
use std::sync::Arc;
use tracing::{info, warn};

const COMPONENT: &str = "gnmi_service";

/// Sampling interval applied when a SAMPLE subscription leaves it at zero.
const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 10_000;

const GNMI_VERSION: &str = "0.7.0";

/// Inbound half of a client Subscribe stream plus its outbound sink.
#[async_trait]
pub trait SubscribeStream: Send {
    /// Next inbound control message; `None` once the client closed the
    /// stream.
    async fn recv(&mut self) -> Option<SubscribeRequest>;

    /// The sink subscription updates for this stream are written to.
    fn sink(&self) -> Arc<dyn SubscribeSink>;
}

/// The gNMI service surface over one publisher.
pub struct GnmiService {
    publisher: Arc<Publisher>,
}

impl GnmiService {
    pub fn new(publisher: Arc<Publisher>) -> Self {
        Self { publisher }
    }

    pub fn capabilities(&self, _request: CapabilityRequest) -> CapabilityResponse {
        let model = |name: &str| ModelData {
            name: name.to_string(),
            organization: "OpenConfig working group".to_string(),
            version: "0.1.0".to_string(),
        };
        CapabilityResponse {
            supported_models: vec![
                model("openconfig-interfaces"),
                model("openconfig-if-ethernet"),
                model("openconfig-lacp"),
                model("openconfig-qos"),
                model("openconfig-platform"),
            ],
            supported_encodings: vec!["PROTO".to_string()],
            gnmi_version: GNMI_VERSION.to_string(),
        }
    }

    /// Resolves each path and runs its on-poll handler once into a
    /// collecting sink.
    pub async fn get(&self, request: GetRequest) -> Result<GetResponse, Status> {
        let mut notifications = Vec::new();
        for path in &request.paths {
            let full_path = Path::concat(&request.prefix, path);
            let collector = Arc::new(CollectorSink::new());
            let sink: Arc<dyn SubscribeSink> = collector.clone();
            let record = self.publisher.subscribe_poll(&full_path, &sink)?;
            self.publisher.handle_poll(&record).await?;
            for response in collector.take() {
                if let SubscribeResponse::Update(notification) = response {
                    notifications.push(notification);
                }
            }
        }
        Ok(GetResponse { notifications })
    }

    /// Applies the operations of one Set request.
    ///
    /// A replace/update on the root path carries a chassis config and grows
    /// the tree; everything else is rejected per-operation. Sub-errors are
    /// aggregated into the top-level status details.
    pub async fn set(&self, request: SetRequest) -> Result<SetResponse, Status> {
        let mut results = Vec::new();
        for operation in &request.operations {
            let path = Path::concat(&request.prefix, operation.path());
            let status = self.apply_set_operation(operation).await;
            if let Err(error) = &status {
                warn!(
                    event = events::SET_OPERATION_REJECTED,
                    component = COMPONENT,
                    path = %path,
                    err = %error,
                    "set operation rejected"
                );
            }
            results.push(UpdateResult {
                path,
                status: status.err().unwrap_or_else(Status::ok),
            });
        }

        let details: Vec<ErrorDetail> = results
            .iter()
            .filter(|result| !result.status.is_ok())
            .map(|result| ErrorDetail {
                canonical_code: result.status.code(),
                code: result.status.code().number(),
                message: format!("{}: {}", result.path, result.status.message()),
            })
            .collect();
        if !details.is_empty() {
            let top_code = details[0].canonical_code;
            return Err(Status::fail_with_code(
                top_code,
                format!(
                    "{} of {} operations failed",
                    details.len(),
                    results.len()
                ),
            )
            .with_details(details));
        }

        Ok(SetResponse {
            timestamp_ns: crate::leaves::timestamp_ns(),
            results,
        })
    }

    async fn apply_set_operation(&self, operation: &UpdateOperation) -> Result<(), Status> {
        match operation {
            UpdateOperation::Delete(_) => Err(Status::fail_with_code(
                Code::Unimplemented,
                "delete is not supported",
            )),
            UpdateOperation::Replace(update) | UpdateOperation::Update(update) => {
                if !update.path.is_empty() {
                    return Err(Status::fail_with_code(
                        Code::InvalidArgument,
                        "only a root chassis-config replace/update is supported",
                    ));
                }
                let contents = match &update.value {
                    TypedValue::JsonVal(text) => text.clone(),
                    TypedValue::BytesVal(bytes) => {
                        String::from_utf8(bytes.clone()).map_err(|_| {
                            Status::fail_with_code(
                                Code::InvalidArgument,
                                "chassis config bytes are not valid UTF-8",
                            )
                        })?
                    }
                    _ => {
                        return Err(Status::fail_with_code(
                            Code::InvalidArgument,
                            "unknown value type for a chassis config push",
                        ))
                    }
                };
                let config = ChassisConfig::from_json5(&contents)?;
                self.publisher.on_config_pushed(&config).await
            }
        }
    }

    /// Serves one bidirectional Subscribe stream until the client closes it.
    pub async fn serve_subscribe<S: SubscribeStream>(&self, mut stream: S) -> Result<(), Status> {
        let sink = stream.sink();
        let Some(first) = stream.recv().await else {
            return Err(Status::fail_with_code(
                Code::Internal,
                "subscribe stream closed before a subscription list arrived",
            ));
        };
        let SubscribeRequest::Subscribe(list) = first else {
            return Err(Status::fail_with_code(
                Code::InvalidArgument,
                "first message on a subscribe stream must be a subscription list",
            ));
        };

        let session = match self.start_session(&list, &sink).await {
            Ok(session) => session,
            Err(status) => return Err(status),
        };

        if list.mode == ListMode::Once {
            session.close(&self.publisher);
            return Ok(());
        }

        let outcome = self.drain_inbound(&mut stream, &sink, &session).await;
        info!(
            event = events::SUBSCRIBE_STREAM_CLOSED,
            component = COMPONENT,
            "subscribe stream finished"
        );
        session.close(&self.publisher);
        outcome
    }

    async fn drain_inbound<S: SubscribeStream>(
        &self,
        stream: &mut S,
        sink: &Arc<dyn SubscribeSink>,
        session: &SubscribeSession,
    ) -> Result<(), Status> {
        loop {
            match stream.recv().await {
                Some(SubscribeRequest::Poll) => {
                    session.poll(&self.publisher).await?;
                }
                Some(SubscribeRequest::Aliases) => {
                    let _ = sink.write(SubscribeResponse::Error(Status::fail_with_code(
                        Code::Unimplemented,
                        "aliases are not supported",
                    )));
                }
                Some(SubscribeRequest::Subscribe(_)) => {
                    return Err(Status::fail_with_code(
                        Code::InvalidArgument,
                        "only one subscription list is accepted per stream",
                    ));
                }
                None => return Ok(()),
            }
        }
    }

    async fn start_session(
        &self,
        list: &SubscriptionList,
        sink: &Arc<dyn SubscribeSink>,
    ) -> Result<SubscribeSession, Status> {
        if list.subscriptions.is_empty() {
            return Err(Status::fail_with_code(
                Code::InvalidArgument,
                "subscription list is empty",
            ));
        }

        let mut session = SubscribeSession::default();
        for entry in &list.subscriptions {
            let path = Path::concat(&list.prefix, &entry.path);
            let mut subscription = entry.clone();
            // Only an under-specified subscription is transformed; an
            // explicit ON_CHANGE or SAMPLE request is never overridden.
            if subscription.mode == SubscriptionMode::TargetDefined {
                self.publisher
                    .update_subscription_with_target_defined_mode(&path, &mut subscription)?;
            }

            if list.mode == ListMode::Poll {
                session
                    .poll_records
                    .push(self.publisher.subscribe_poll(&path, sink)?);
                continue;
            }

            match subscription.mode {
                // A target-defined subscription the node left untouched
                // defaults to on-change delivery.
                SubscriptionMode::TargetDefined | SubscriptionMode::OnChange => {
                    session
                        .records
                        .push(self.publisher.subscribe_on_change(&path, sink)?);
                }
                SubscriptionMode::Sample => {
                    let period_ms = if subscription.sample_interval_ms == 0 {
                        DEFAULT_SAMPLE_INTERVAL_MS
                    } else {
                        subscription.sample_interval_ms
                    };
                    session.records.push(self.publisher.subscribe_periodic(
                        Frequency {
                            delay_ms: period_ms,
                            period_ms,
                        },
                        &path,
                        sink,
                    )?);
                }
            }

            if !list.updates_only {
                session.snapshot_paths.push(path);
            }
        }

        if list.mode != ListMode::Poll {
            for path in &session.snapshot_paths {
                let record = self.publisher.subscribe_poll(path, sink)?;
                self.publisher.handle_poll(&record).await?;
            }
        }
        self.publisher.send_sync_response(sink.as_ref())?;

        Ok(session)
    }
}

/// Per-stream subscription state: the owning handles for every record the
/// stream created.
#[derive(Default)]
struct SubscribeSession {
    records: Vec<SubscriptionHandle>,
    poll_records: Vec<SubscriptionHandle>,
    snapshot_paths: Vec<Path>,
}

impl SubscribeSession {
    async fn poll(&self, publisher: &Publisher) -> Result<(), Status> {
        for record in &self.poll_records {
            publisher.handle_poll(record).await?;
        }
        Ok(())
    }

    /// Drops every owning handle; event-list weak references decay and are
    /// pruned lazily, timers are cancelled explicitly.
    fn close(self, publisher: &Publisher) {
        for record in self.records.iter().chain(self.poll_records.iter()) {
            publisher.unsubscribe(record);
        }
    }
}
