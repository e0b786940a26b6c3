use std::path::Path;
use std::sync::Arc;

use crate::error::{PluginLoadError, Result};
use crate::plugin::{ENTRY_POINT, LoadProviderFn, PluginModule, host_callbacks};

const ENTRY_POINT_SYMBOL: &[u8] = b"quicksfv_load_provider\0";

pub(crate) fn load(path: &Path) -> Result<PluginModule> {
    // SAFETY: loading runs the library's initialisers; the caller chose to trust it.
    let library = unsafe { libloading::Library::new(path) }.map_err(|e| PluginLoadError::Open {
        path:   path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // SAFETY: the exported symbol is declared to have the `LoadProviderFn` signature.
    let entry: LoadProviderFn = unsafe { library.get::<LoadProviderFn>(ENTRY_POINT_SYMBOL) }
        .map(|symbol| *symbol)
        .map_err(|_| PluginLoadError::MissingEntryPoint {
            path:   path.to_path_buf(),
            symbol: ENTRY_POINT,
        })?;

    // SAFETY: the host table is 'static; the returned vtable is validated below.
    let vtable = unsafe { entry(host_callbacks()) };
    // SAFETY: the library stays loaded for as long as the module exists.
    let module = unsafe { PluginModule::from_vtable(vtable) }?;
    Ok(module.with_library(Arc::new(library)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(&dir.path().join("no_such_plugin.so"));
        assert!(matches!(result, Err(PluginLoadError::Open { .. })));
    }

    #[test]
    fn non_library_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.so");
        std::fs::write(&path, b"not a shared object").unwrap();
        assert!(matches!(load(&path), Err(PluginLoadError::Open { .. })));
    }

    #[test]
    fn entry_symbol_matches_name() {
        assert_eq!(&ENTRY_POINT_SYMBOL[..ENTRY_POINT.len()], ENTRY_POINT.as_bytes());
    }
}
