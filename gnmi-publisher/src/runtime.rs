//! Runtime helper for spawning dedicated dispatch-loop threads.

use std::future::Future;
use std::thread;
use tokio::runtime::Builder;

/// Spawns a named thread hosting a single-threaded runtime that drives
/// `run_loop` to completion. Used for the switch-event reader and the
/// timer-tick dispatcher so neither depends on an ambient runtime.
pub(crate) fn spawn_dispatch_loop<F, Fut>(thread_name: &str, run_loop: F) -> thread::JoinHandle<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()>,
{
    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create dispatch-loop Tokio runtime");

            runtime.block_on(run_loop());
        })
        .expect("Failed to spawn dispatch-loop thread")
}
