//! C ABI contract for externally built digest providers.
//!
//! A plugin exports one entry point, [`ENTRY_POINT`], with the signature
//! [`LoadProviderFn`]. The host calls it with a pointer to its
//! [`HostCallbacks`] table and receives a [`ProviderVTable`] describing one
//! algorithm. The vtable is copied and validated at load time; nothing about
//! the plugin's language runtime is assumed beyond these `repr(C)` tables.

use std::alloc::Layout;
use std::ffi::{CStr, c_char, c_void};
use std::ptr;
use std::sync::Arc;

use quicksfv_digest::{AlgorithmId, DigestError, DigestProvider, DigestValue};

use crate::error::{PluginLoadError, Result};

/// Bumped whenever either table changes layout.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Name of the symbol a plugin library must export.
pub const ENTRY_POINT: &str = "quicksfv_load_provider";

/// Facilities the host lends to a plugin.
#[repr(C)]
pub struct HostCallbacks {
    pub abi_version: u32,
    /// `level`: 0 error, 1 warn, 2 info, 3 debug, anything else trace.
    pub log:         Option<unsafe extern "C" fn(level: u32, message: *const c_char)>,
    pub alloc:       Option<unsafe extern "C" fn(size: usize, align: usize) -> *mut u8>,
    pub dealloc:     Option<unsafe extern "C" fn(ptr: *mut u8, size: usize, align: usize)>,
}

/// Provider description returned by a plugin's entry point.
///
/// `finalize` writes at most `out_len` bytes and returns how many it wrote;
/// it must leave `state` ready for `destroy`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ProviderVTable {
    pub abi_version:  u32,
    pub algorithm_id: *const c_char,
    pub digest_len:   usize,
    pub create:       Option<unsafe extern "C" fn() -> *mut c_void>,
    pub update:       Option<unsafe extern "C" fn(state: *mut c_void, data: *const u8, len: usize)>,
    pub finalize:
        Option<unsafe extern "C" fn(state: *mut c_void, out: *mut u8, out_len: usize) -> usize>,
    pub destroy:      Option<unsafe extern "C" fn(state: *mut c_void)>,
}

pub type LoadProviderFn =
    unsafe extern "C" fn(host: *const HostCallbacks) -> *const ProviderVTable;

static HOST_CALLBACKS: HostCallbacks = HostCallbacks {
    abi_version: PLUGIN_ABI_VERSION,
    log:         Some(host_log),
    alloc:       Some(host_alloc),
    dealloc:     Some(host_dealloc),
};

pub fn host_callbacks() -> &'static HostCallbacks { &HOST_CALLBACKS }

unsafe extern "C" fn host_log(level: u32, message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: plugins pass a NUL-terminated string valid for this call.
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    match level {
        0 => tracing::error!(target: "quicksfv::plugin", "{message}"),
        1 => tracing::warn!(target: "quicksfv::plugin", "{message}"),
        2 => tracing::info!(target: "quicksfv::plugin", "{message}"),
        3 => tracing::debug!(target: "quicksfv::plugin", "{message}"),
        _ => tracing::trace!(target: "quicksfv::plugin", "{message}"),
    }
}

unsafe extern "C" fn host_alloc(size: usize, align: usize) -> *mut u8 {
    match Layout::from_size_align(size, align) {
        // SAFETY: layout has non-zero size.
        Ok(layout) if layout.size() > 0 => unsafe { std::alloc::alloc(layout) },
        _ => ptr::null_mut(),
    }
}

unsafe extern "C" fn host_dealloc(ptr: *mut u8, size: usize, align: usize) {
    if ptr.is_null() {
        return;
    }
    if let Ok(layout) = Layout::from_size_align(size, align) {
        // SAFETY: ptr came from host_alloc with the same size and align.
        unsafe { std::alloc::dealloc(ptr, layout) };
    }
}

type CreateFn = unsafe extern "C" fn() -> *mut c_void;
type UpdateFn = unsafe extern "C" fn(*mut c_void, *const u8, usize);
type FinalizeFn = unsafe extern "C" fn(*mut c_void, *mut u8, usize) -> usize;
type DestroyFn = unsafe extern "C" fn(*mut c_void);

/// A validated plugin provider, ready to mint instances.
pub struct PluginModule {
    id:         AlgorithmId,
    digest_len: usize,
    create:     CreateFn,
    update:     UpdateFn,
    finalize:   FinalizeFn,
    destroy:    DestroyFn,
    #[cfg(feature = "dylib")]
    library:    Option<Arc<libloading::Library>>,
}

impl PluginModule {
    /// Copy and validate a plugin's vtable.
    ///
    /// # Safety
    ///
    /// `vtable` must be null or point to a readable [`ProviderVTable`] whose
    /// `algorithm_id` is null or NUL-terminated, and whose functions honour
    /// the contract documented on the table for as long as the module lives.
    pub unsafe fn from_vtable(vtable: *const ProviderVTable) -> Result<Self> {
        if vtable.is_null() {
            return Err(PluginLoadError::Rejected);
        }
        // SAFETY: non-null and readable per the caller's contract.
        let table = unsafe { *vtable };

        if table.abi_version != PLUGIN_ABI_VERSION {
            return Err(PluginLoadError::IncompatibleVersion {
                expected: PLUGIN_ABI_VERSION,
                found:    table.abi_version,
            });
        }

        if table.algorithm_id.is_null() {
            return Err(PluginLoadError::InvalidId);
        }
        // SAFETY: non-null and NUL-terminated per the caller's contract.
        let id = unsafe { CStr::from_ptr(table.algorithm_id) }
            .to_str()
            .map_err(|_| PluginLoadError::InvalidId)?;
        if id.trim().is_empty() {
            return Err(PluginLoadError::InvalidId);
        }
        if table.digest_len == 0 {
            return Err(PluginLoadError::IncompleteVTable("digest_len"));
        }

        Ok(Self {
            id:         AlgorithmId::new(id),
            digest_len: table.digest_len,
            create:     table.create.ok_or(PluginLoadError::IncompleteVTable("create"))?,
            update:     table.update.ok_or(PluginLoadError::IncompleteVTable("update"))?,
            finalize:   table.finalize.ok_or(PluginLoadError::IncompleteVTable("finalize"))?,
            destroy:    table.destroy.ok_or(PluginLoadError::IncompleteVTable("destroy"))?,
            #[cfg(feature = "dylib")]
            library:    None,
        })
    }

    #[cfg(feature = "dylib")]
    pub(crate) fn with_library(mut self, library: Arc<libloading::Library>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn algorithm(&self) -> &AlgorithmId { &self.id }

    pub fn digest_len(&self) -> usize { self.digest_len }
}

impl std::fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginModule")
            .field("id", &self.id)
            .field("digest_len", &self.digest_len)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Streaming,
    Finalized,
}

/// One streaming pass through a plugin-provided algorithm.
pub struct PluginProvider {
    module: Arc<PluginModule>,
    state:  *mut c_void,
    phase:  Phase,
}

// SAFETY: `state` is created for and owned by this instance alone, and the
// plugin contract forbids thread affinity for provider state.
unsafe impl Send for PluginProvider {}

impl PluginProvider {
    pub fn new(module: Arc<PluginModule>) -> Self {
        Self {
            module,
            state: ptr::null_mut(),
            phase: Phase::Idle,
        }
    }

    fn release(&mut self) {
        if !self.state.is_null() {
            // SAFETY: state came from this module's `create` and is released once.
            unsafe { (self.module.destroy)(self.state) };
            self.state = ptr::null_mut();
        }
    }
}

impl DigestProvider for PluginProvider {
    fn algorithm(&self) -> AlgorithmId { self.module.id.clone() }

    fn digest_len(&self) -> usize { self.module.digest_len }

    fn begin(&mut self) -> quicksfv_digest::Result<()> {
        match self.phase {
            Phase::Idle => {}
            Phase::Streaming => return Err(DigestError::InvalidState("begin called twice")),
            Phase::Finalized => return Err(DigestError::InvalidState("begin after finalize")),
        }
        // SAFETY: `create` takes no arguments; validity is part of the load contract.
        let state = unsafe { (self.module.create)() };
        if state.is_null() {
            return Err(DigestError::InvalidState("plugin failed to create provider state"));
        }
        self.state = state;
        self.phase = Phase::Streaming;
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> quicksfv_digest::Result<()> {
        match self.phase {
            Phase::Streaming => {}
            Phase::Idle => return Err(DigestError::InvalidState("update before begin")),
            Phase::Finalized => return Err(DigestError::InvalidState("update after finalize")),
        }
        if !data.is_empty() {
            // SAFETY: live state from `create`; `data` is valid for `len` bytes.
            unsafe { (self.module.update)(self.state, data.as_ptr(), data.len()) };
        }
        Ok(())
    }

    fn finalize(&mut self) -> quicksfv_digest::Result<DigestValue> {
        match self.phase {
            Phase::Streaming => {}
            Phase::Idle => return Err(DigestError::InvalidState("finalize before begin")),
            Phase::Finalized => return Err(DigestError::InvalidState("finalize called twice")),
        }
        let mut out = vec![0u8; self.module.digest_len];
        // SAFETY: live state; `out` is writable for `out.len()` bytes.
        let written = unsafe { (self.module.finalize)(self.state, out.as_mut_ptr(), out.len()) };
        self.release();
        self.phase = Phase::Finalized;

        if written != out.len() {
            return Err(DigestError::InvalidLength {
                expected: out.len(),
                actual:   written,
            });
        }
        Ok(DigestValue::new(out))
    }
}

impl Drop for PluginProvider {
    fn drop(&mut self) { self.release(); }
}
