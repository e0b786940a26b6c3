//! Parallel verification of checksum manifests.
//!
//! [`Engine`] takes manifest entries, resolves each entry's algorithm through a
//! [`ProviderRegistry`](quicksfv_registry::ProviderRegistry), streams the
//! referenced bytes from a [`FileResolver`] and compares digests. Every entry
//! ends up in the [`VerificationReport`] with an explicit [`Outcome`], in
//! manifest order, whatever the worker count.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use quicksfv_engine::{
//!     CancellationToken, DirectoryResolver, Engine, ManifestSource, NullSink, VerifyOptions,
//! };
//! use quicksfv_registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::with_builtins();
//! let engine = Engine::new(&registry, VerifyOptions::default());
//! let report = engine
//!     .run(
//!         ManifestSource::Path(Path::new("album.sfv")),
//!         &DirectoryResolver::new("."),
//!         &NullSink,
//!         &CancellationToken::new(),
//!     )
//!     .unwrap();
//! println!("{} of {} matched", report.counters.matched, report.results.len());
//! ```

pub use self::cancel::CancellationToken;
pub use self::engine::{Engine, ManifestSource};
pub use self::error::{Error, Result};
pub use self::options::{DEFAULT_CHUNK_SIZE, VerifyOptions};
pub use self::progress::{NullSink, Progress, ResultSink};
pub use self::report::{Counters, Outcome, RunStatus, VerificationReport, VerificationResult};
#[cfg(feature = "zip")]
pub use self::resolve::ZipPayloadResolver;
pub use self::resolve::{DirectoryResolver, FileResolver, ResolvedFile};

mod cancel;
mod engine;
mod error;
mod options;
mod progress;
mod report;
mod resolve;
