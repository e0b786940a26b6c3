use std::num::NonZeroUsize;
use std::thread;

use quicksfv_manifest::ParseOptions;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Knobs for one verification run.
#[derive(Clone, Copy, Debug)]
pub struct VerifyOptions {
    /// Worker threads; `None` uses the available parallelism.
    pub workers:    Option<usize>,
    /// Read size per provider update.
    pub chunk_size: usize,
    /// Applied when the run parses its own manifest.
    pub parse:      ParseOptions,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            workers:    None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parse:      ParseOptions::default(),
        }
    }
}

impl VerifyOptions {
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn parse(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Threads to spawn for `entries` items, at least one and never more than
    /// there is work for.
    pub fn worker_count(&self, entries: usize) -> usize {
        let wanted = self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        wanted.clamp(1, entries.max(1))
    }

    pub fn effective_chunk_size(&self) -> usize { self.chunk_size.max(1) }
}

#[cfg(test)]
mod tests {
    use quicksfv_manifest::MalformedLinePolicy;

    use super::*;

    #[test]
    fn defaults() {
        let options = VerifyOptions::default();
        assert_eq!(options.workers, None);
        assert_eq!(options.chunk_size, 64 * 1024);
        assert_eq!(options.parse.malformed, MalformedLinePolicy::Reject);
    }

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(VerifyOptions::default().workers(8).worker_count(3), 3);
        assert_eq!(VerifyOptions::default().workers(0).worker_count(3), 1);
        assert_eq!(VerifyOptions::default().workers(4).worker_count(0), 1);
        assert!(VerifyOptions::default().worker_count(100) >= 1);
    }

    #[test]
    fn zero_chunk_size_reads_one_byte() {
        assert_eq!(VerifyOptions::default().chunk_size(0).effective_chunk_size(), 1);
    }
}
