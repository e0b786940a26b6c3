use crate::report::VerificationResult;

/// Streaming state of one entry, sent after every chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress<'a> {
    pub path:            &'a str,
    /// Position of the entry in the manifest.
    pub index:           usize,
    pub bytes_processed: u64,
    /// Expected size, when the manifest or the resolver knows it.
    pub total_bytes:     Option<u64>,
}

impl Progress<'_> {
    /// Returns `None` if `total_bytes` is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_processed as f64 / total as f64) * 100.0
            }
        })
    }
}

/// Receives events from a run; owned by the caller.
///
/// `on_progress` is called from worker threads, `on_result` from the thread
/// that started the run, in completion order.
pub trait ResultSink: Sync {
    fn on_progress(&self, _progress: &Progress<'_>) {}

    fn on_result(&self, _result: &VerificationResult) {}
}

/// Sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ResultSink for NullSink {}
