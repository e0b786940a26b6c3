//! Provider registry for checksum algorithms.
//!
//! [`ProviderRegistry`] maps an [`AlgorithmId`](quicksfv_digest::AlgorithmId)
//! to a factory producing fresh [`DigestProvider`](quicksfv_digest::DigestProvider)
//! instances. Built-ins are registered first; providers loaded through the
//! [`plugin`] C ABI may shadow them.
//!
//! # Example
//!
//! ```
//! use quicksfv_digest::AlgorithmId;
//! use quicksfv_registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::with_builtins();
//! assert!(registry.create(&AlgorithmId::CRC32).is_ok());
//! assert!(registry.create(&AlgorithmId::new("whirlpool")).is_err());
//! ```

pub use error::{PluginLoadError, Result, UnsupportedAlgorithm};
pub use plugin::{
    ENTRY_POINT, HostCallbacks, LoadProviderFn, PLUGIN_ABI_VERSION, PluginModule, PluginProvider,
    ProviderVTable, host_callbacks,
};
pub use registry::{ProviderFactory, ProviderRegistry};

mod error;
#[cfg(feature = "dylib")]
mod loader;
pub mod plugin;
mod registry;
