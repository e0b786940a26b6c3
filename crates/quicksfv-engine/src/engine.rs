use std::io::{self, Read};
use std::path::Path;
use std::thread;

use quicksfv_digest::DigestReader;
use quicksfv_manifest::{ManifestEntry, ManifestFormat, parse_bytes, parse_file};
use quicksfv_registry::ProviderRegistry;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::options::VerifyOptions;
use crate::progress::{Progress, ResultSink};
use crate::report::{ReportBuilder, VerificationReport, VerificationResult};
use crate::resolve::FileResolver;

/// Where a run gets its entries from.
#[derive(Clone, Copy, Debug)]
pub enum ManifestSource<'a> {
    /// Manifest file; format detected from extension, then content.
    Path(&'a Path),
    Bytes {
        format: &'a ManifestFormat,
        data:   &'a [u8],
    },
    /// Entries parsed elsewhere.
    Entries(&'a [ManifestEntry]),
}

/// Verifies manifest entries on a pool of worker threads.
///
/// Each worker owns the provider and the file handle of the entry it is
/// working on; results travel back over a channel and are put back into
/// manifest order once the pool drains.
#[derive(Debug)]
pub struct Engine<'r> {
    registry: &'r ProviderRegistry,
    options:  VerifyOptions,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r ProviderRegistry, options: VerifyOptions) -> Self {
        Self { registry, options }
    }

    /// Parse `source` and verify every entry.
    ///
    /// Fails only when the manifest cannot be read or parsed; nothing is
    /// scheduled in that case.
    pub fn run(
        &self,
        source: ManifestSource<'_>,
        resolver: &dyn FileResolver,
        sink: &dyn ResultSink,
        cancel: &CancellationToken,
    ) -> Result<VerificationReport> {
        let parsed;
        let entries: &[ManifestEntry] = match source {
            ManifestSource::Path(path) => {
                parsed = parse_file(path, &self.options.parse)?;
                &parsed.entries
            }
            ManifestSource::Bytes { format, data } => {
                parsed = parse_bytes(format, data, &self.options.parse)?;
                &parsed.entries
            }
            ManifestSource::Entries(entries) => entries,
        };
        Ok(self.verify(entries, resolver, sink, cancel))
    }

    pub fn verify(
        &self,
        entries: &[ManifestEntry],
        resolver: &dyn FileResolver,
        sink: &dyn ResultSink,
        cancel: &CancellationToken,
    ) -> VerificationReport {
        let workers = self.options.worker_count(entries.len());
        let span = tracing::info_span!("verify_run", entries = entries.len(), workers);
        let _guard = span.enter();

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        for index in 0..entries.len() {
            // The receiver is alive, so this cannot fail.
            let _ = job_tx.send(index);
        }
        drop(job_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let mut builder = ReportBuilder::new(entries.len());

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let span = span.clone();
                scope.spawn(move || {
                    let _guard = span.enter();
                    for index in job_rx.iter() {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let Some(result) =
                            self.verify_entry(index, &entries[index], resolver, sink, cancel)
                        else {
                            continue;
                        };
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            for (index, result) in result_rx.iter() {
                sink.on_result(&result);
                builder.record(index, result);
            }
        });

        let report = builder.finish();
        let counters = &report.counters;
        tracing::info!(
            status = ?report.status,
            matched = counters.matched,
            mismatched = counters.mismatched,
            missing = counters.missing,
            errored = counters.errored,
            unsupported = counters.unsupported,
            "verification finished"
        );
        report
    }

    /// `None` when cancellation was observed before the entry finished.
    fn verify_entry(
        &self,
        index: usize,
        entry: &ManifestEntry,
        resolver: &dyn FileResolver,
        sink: &dyn ResultSink,
        cancel: &CancellationToken,
    ) -> Option<VerificationResult> {
        let span = tracing::debug_span!("verify_entry", path = entry.path(), algorithm = %entry.algorithm());
        let _guard = span.enter();

        let provider = match self.registry.create(entry.algorithm()) {
            Ok(provider) => provider,
            Err(err) => {
                tracing::debug!(%err, "no provider");
                return Some(VerificationResult::unsupported(entry));
            }
        };

        if cancel.is_cancelled() {
            return None;
        }
        let file = match resolver.open(entry.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("missing");
                return Some(VerificationResult::missing(entry));
            }
            Err(err) => {
                tracing::debug!(%err, "cannot open");
                return Some(VerificationResult::read_error(entry, err));
            }
        };

        let total_bytes = entry.expected_len().or(file.len);
        let mut reader = match DigestReader::new(file.reader, provider) {
            Ok(reader) => reader,
            Err(err) => return Some(VerificationResult::read_error(entry, err)),
        };
        let mut buf = vec![0u8; self.options.effective_chunk_size()];
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("cancelled mid-stream");
                return None;
            }
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => sink.on_progress(&Progress {
                    path: entry.path(),
                    index,
                    bytes_processed: reader.bytes_processed(),
                    total_bytes,
                }),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::debug!(%err, "read failed");
                    return Some(VerificationResult::read_error(entry, err));
                }
            }
        }

        if let Some(expected) = entry.expected_len() {
            let read = reader.bytes_processed();
            if read < expected {
                tracing::debug!(read, expected, "stream ended early");
                return Some(VerificationResult::read_error(
                    entry,
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("read {read} of {expected} bytes"),
                    ),
                ));
            }
        }

        let result = match reader.finish() {
            Ok(computed) => VerificationResult::compared(entry, computed),
            Err(err) => VerificationResult::read_error(entry, err),
        };
        tracing::debug!(outcome = %result.outcome, "entry done");
        Some(result)
    }
}
