//! Canonical structured event names used across `gnmi-publisher`.

// Event-bus delivery events.
pub const DELIVER_HANDLER_FAILED: &str = "deliver_handler_failed";
pub const DELIVER_SKIPPED_DEAD_STREAM: &str = "deliver_skipped_dead_stream";

// Switch-event reader events.
pub const SWITCH_EVENT_RECV_LAGGED: &str = "switch_event_recv_lagged";
pub const SWITCH_EVENT_RECV_CLOSED: &str = "switch_event_recv_closed";
pub const SWITCH_EVENT_READER_SPAWNED: &str = "switch_event_reader_spawned";

// Publisher lifecycle events.
pub const SUBSCRIBE_OK: &str = "subscribe_ok";
pub const SUBSCRIBE_REJECTED: &str = "subscribe_rejected";
pub const UNSUBSCRIBE_OK: &str = "unsubscribe_ok";
pub const TIMER_START_FAILED: &str = "timer_start_failed";
pub const TICK_DISPATCH_SKIPPED: &str = "tick_dispatch_skipped";
pub const SYNC_RESPONSE_SENT: &str = "sync_response_sent";

// Parse-tree growth events.
pub const TREE_ADD_INTERFACE: &str = "tree_add_interface";
pub const TREE_ADD_CHASSIS: &str = "tree_add_chassis";
pub const CONFIG_PUSH_APPLIED: &str = "config_push_applied";

// Service-surface events.
pub const SUBSCRIBE_STREAM_CLOSED: &str = "subscribe_stream_closed";
pub const SUBSCRIBE_STREAM_WRITE_FAILED: &str = "subscribe_stream_write_failed";
pub const SET_OPERATION_REJECTED: &str = "set_operation_rejected";
