//! Structured-logging conventions: canonical event names.

pub(crate) mod events;
