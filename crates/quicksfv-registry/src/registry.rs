use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use quicksfv_digest::{AlgorithmId, DigestProvider};

use crate::error::{PluginLoadError, Result, UnsupportedAlgorithm};
use crate::plugin::{PluginModule, PluginProvider, ProviderVTable};

/// Produces a fresh provider instance per call.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn DigestProvider> + Send + Sync>;

/// Maps algorithm ids to provider factories.
///
/// Construct with [`with_builtins`](Self::with_builtins) first, then load
/// plugins; a later registration for the same id replaces the earlier one,
/// so plugins can shadow built-ins. The registry is passed by reference into
/// the verification engine and shared read-only across its workers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<AlgorithmId, ProviderFactory>,
    plugins:   HashSet<AlgorithmId>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self { Self::default() }

    /// Registry holding every provider compiled into `quicksfv-digest`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(AlgorithmId::CRC32, || Box::new(quicksfv_digest::crc32()));
        registry.register(AlgorithmId::SHA1, || Box::new(quicksfv_digest::sha1()));
        registry.register(AlgorithmId::SHA256, || Box::new(quicksfv_digest::sha256()));
        registry
    }

    /// Install `factory` for `id`, returning the factory it replaced.
    pub fn register<F>(&mut self, id: AlgorithmId, factory: F) -> Option<ProviderFactory>
    where
        F: Fn() -> Box<dyn DigestProvider> + Send + Sync + 'static,
    {
        tracing::debug!(algorithm = %id, "registering provider");
        self.factories.insert(id, Arc::new(factory))
    }

    /// Fresh, un-begun provider for `id`.
    pub fn create(
        &self,
        id: &AlgorithmId,
    ) -> std::result::Result<Box<dyn DigestProvider>, UnsupportedAlgorithm> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| UnsupportedAlgorithm(id.clone()))
    }

    pub fn contains(&self, id: &AlgorithmId) -> bool { self.factories.contains_key(id) }

    /// Registered ids in sorted order.
    pub fn algorithms(&self) -> Vec<AlgorithmId> {
        let mut ids: Vec<_> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Register an already validated plugin module.
    ///
    /// A plugin may shadow a built-in, but two plugins may not claim the same id.
    pub fn register_plugin(&mut self, module: PluginModule) -> Result<AlgorithmId> {
        let id = module.algorithm().clone();
        if self.plugins.contains(&id) {
            return Err(PluginLoadError::DuplicateId(id));
        }
        if self.factories.contains_key(&id) {
            tracing::info!(algorithm = %id, "plugin shadows existing provider");
        }

        let module = Arc::new(module);
        self.register(id.clone(), move || {
            Box::new(PluginProvider::new(Arc::clone(&module)))
        });
        self.plugins.insert(id.clone());
        Ok(id)
    }

    /// Validate and register a vtable handed over directly.
    ///
    /// # Safety
    ///
    /// Same contract as [`PluginModule::from_vtable`].
    pub unsafe fn load_vtable(&mut self, vtable: *const ProviderVTable) -> Result<AlgorithmId> {
        // SAFETY: forwarded to the caller.
        let module = unsafe { PluginModule::from_vtable(vtable) }?;
        self.register_plugin(module)
    }

    /// Load a provider from a shared library exporting
    /// [`ENTRY_POINT`](crate::ENTRY_POINT).
    ///
    /// Failures are returned and leave the registry unchanged.
    #[cfg(feature = "dylib")]
    pub fn load_library(&mut self, path: impl AsRef<std::path::Path>) -> Result<AlgorithmId> {
        let path = path.as_ref();
        match crate::loader::load(path) {
            Ok(module) => {
                let id = self.register_plugin(module)?;
                tracing::info!(algorithm = %id, path = %path.display(), "loaded provider plugin");
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load provider plugin");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("algorithms", &self.algorithms())
            .field("plugins", &self.plugins)
            .finish()
    }
}
