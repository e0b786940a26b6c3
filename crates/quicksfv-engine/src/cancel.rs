use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run-scoped cooperative cancellation flag.
///
/// Workers look at it before opening each file and before each chunk; a chunk
/// already being read finishes first.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::Release) }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Acquire) }
}
