use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tracing::warn;

/// Drive an async oracle call to completion from a synchronous call path.
///
/// On a multi-threaded runtime the worker is handed over with
/// `block_in_place`. Elsewhere the future runs on the process-wide bridge
/// runtime; a current-thread runtime cannot be blocked, so there it is driven
/// from a scoped helper thread.
pub(crate) fn block_on<F>(future: F) -> F::Output
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        Ok(_) => std::thread::scope(|scope| {
            match scope.spawn(move || run_standalone(future)).join() {
                Ok(output) => output,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }),
        Err(_) => run_standalone(future),
    }
}

/// Built on first use and kept for the life of the process, so tasks and
/// connection pools created by oracle clients survive between calls.
fn bridge() -> Option<&'static Runtime> {
    static BRIDGE: OnceLock<Option<Runtime>> = OnceLock::new();
    BRIDGE
        .get_or_init(|| {
            match Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("fgate-bridge")
                .enable_all()
                .build()
            {
                Ok(runtime) => Some(runtime),
                Err(e) => {
                    warn!(error = %e, "Failed to build bridge runtime, polling on the calling thread");
                    None
                }
            }
        })
        .as_ref()
}

fn run_standalone<F: Future>(future: F) -> F::Output {
    match bridge() {
        Some(runtime) => runtime.block_on(future),
        None => futures::executor::block_on(future),
    }
}
