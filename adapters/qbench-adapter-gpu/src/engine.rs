//! Load the GPU engine shared library and resolve its entry points.

use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::{Library, Symbol};
use qbench_hal::{AccelerationMode, Precision};

use crate::error::{GpuError, GpuResult};
use crate::ffi::{self, GpuOp, GpuStateHandle};

/// Environment variable naming the engine library.
pub const ENGINE_ENV: &str = "QBENCH_GPU_ENGINE";

/// Engine library path: `$QBENCH_GPU_ENGINE`, else the platform file name
/// of `qbench_gpu` resolved by the dynamic loader's search path.
pub fn default_engine_path() -> PathBuf {
    std::env::var_os(ENGINE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(libloading::library_filename("qbench_gpu")))
}

/// A loaded GPU engine with all entry points resolved.
///
/// The library handle lives as long as this struct so the function pointers
/// stay valid.
pub struct GpuEngine {
    _library: Library,
    path: String,

    fn_device_count: ffi::FnDeviceCount,
    fn_supports_mode: ffi::FnSupportsMode,
    fn_state_create: ffi::FnStateCreate,
    fn_state_apply: ffi::FnStateApply,
    fn_state_destroy: ffi::FnStateDestroy,
}

impl GpuEngine {
    /// Load an engine library.
    ///
    /// # Errors
    ///
    /// [`GpuError::LoadFailed`] if the library cannot be opened and
    /// [`GpuError::SymbolNotFound`] if an entry point is missing.
    pub fn load(path: &Path) -> GpuResult<Self> {
        let path_str = path.display().to_string();

        // SAFETY: loading an external library runs its initializers. The
        // engine path is chosen by the operator.
        let library = unsafe { Library::new(path) }.map_err(|e| GpuError::LoadFailed {
            path: path_str.clone(),
            cause: e.to_string(),
        })?;

        let fn_device_count = resolve::<ffi::FnDeviceCount>(&library, ffi::SYM_DEVICE_COUNT)?;
        let fn_supports_mode = resolve::<ffi::FnSupportsMode>(&library, ffi::SYM_SUPPORTS_MODE)?;
        let fn_state_create = resolve::<ffi::FnStateCreate>(&library, ffi::SYM_STATE_CREATE)?;
        let fn_state_apply = resolve::<ffi::FnStateApply>(&library, ffi::SYM_STATE_APPLY)?;
        let fn_state_destroy = resolve::<ffi::FnStateDestroy>(&library, ffi::SYM_STATE_DESTROY)?;

        tracing::info!("loaded GPU engine '{path_str}'");

        Ok(Self {
            _library: library,
            path: path_str,
            fn_device_count,
            fn_supports_mode,
            fn_state_create,
            fn_state_apply,
            fn_state_destroy,
        })
    }

    /// Filesystem path the engine was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of devices the engine can use. Negative counts read as zero.
    pub fn device_count(&self) -> u32 {
        // SAFETY: no arguments; signature fixed by the engine ABI.
        let count = unsafe { (self.fn_device_count)() };
        u32::try_from(count).unwrap_or(0)
    }

    /// Whether the engine implements an acceleration mode.
    pub fn supports_mode(&self, mode: AccelerationMode) -> bool {
        // SAFETY: plain integer argument.
        unsafe { (self.fn_supports_mode)(ffi::mode_code(mode)) != 0 }
    }

    /// Allocate a device state vector initialized to |0…0⟩.
    pub fn create_state(
        &self,
        num_qubits: u32,
        precision: Precision,
        mode: AccelerationMode,
    ) -> GpuResult<GpuState<'_>> {
        let mut handle: GpuStateHandle = ptr::null_mut();
        // SAFETY: `handle` is a valid out-pointer for the duration of the call.
        let status = unsafe {
            (self.fn_state_create)(
                num_qubits,
                ffi::precision_code(precision),
                ffi::mode_code(mode),
                &mut handle,
            )
        };
        let required = state_bytes(num_qubits, precision);
        check(status, num_qubits, required)?;
        if handle.is_null() {
            return Err(GpuError::Engine(status));
        }
        Ok(GpuState {
            engine: self,
            handle,
            num_qubits,
            required_bytes: required,
        })
    }
}

impl std::fmt::Debug for GpuEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuEngine")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// A device state vector, destroyed on drop.
pub struct GpuState<'a> {
    engine: &'a GpuEngine,
    handle: GpuStateHandle,
    num_qubits: u32,
    required_bytes: u128,
}

impl GpuState<'_> {
    /// Apply ops and wait for the device to finish.
    pub fn apply(&mut self, ops: &[GpuOp]) -> GpuResult<()> {
        // SAFETY: `handle` came from `state_create` and is not yet destroyed;
        // `ops` is a valid slice of `repr(C)` values.
        let status = unsafe { (self.engine.fn_state_apply)(self.handle, ops.as_ptr(), ops.len()) };
        check(status, self.num_qubits, self.required_bytes)
    }
}

impl Drop for GpuState<'_> {
    fn drop(&mut self) {
        // SAFETY: destroyed exactly once.
        unsafe { (self.engine.fn_state_destroy)(self.handle) };
    }
}

/// Bytes of a `2^n` state vector at the given precision, saturating.
pub fn state_bytes(num_qubits: u32, precision: Precision) -> u128 {
    1u128
        .checked_shl(num_qubits)
        .and_then(|amps| amps.checked_mul(u128::from(precision.bytes_per_amplitude())))
        .unwrap_or(u128::MAX)
}

fn check(status: c_int, num_qubits: u32, required_bytes: u128) -> GpuResult<()> {
    if status == ffi::STATUS_OK {
        Ok(())
    } else {
        Err(GpuError::from_status(status, num_qubits, required_bytes))
    }
}

fn resolve<T: Copy>(library: &Library, symbol: &str) -> GpuResult<T> {
    tracing::trace!("resolving symbol '{symbol}'");

    // SAFETY: `T` matches the engine ABI declared in `ffi`.
    unsafe {
        let sym: Symbol<T> = library
            .get(symbol.as_bytes())
            .map_err(|e| GpuError::SymbolNotFound {
                symbol: symbol.to_string(),
                cause: e.to_string(),
            })?;
        Ok(*sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_library_fails_to_load() {
        let err = GpuEngine::load(Path::new("/nonexistent/libqbench_gpu.so")).unwrap_err();
        assert!(matches!(err, GpuError::LoadFailed { .. }));
    }

    #[test]
    fn test_garbage_file_fails_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a shared object").unwrap();
        let err = GpuEngine::load(file.path()).unwrap_err();
        assert!(matches!(err, GpuError::LoadFailed { .. }));
    }

    #[test]
    fn test_state_bytes() {
        assert_eq!(state_bytes(10, Precision::Single), 8 * 1024);
        assert_eq!(state_bytes(10, Precision::Double), 16 * 1024);
        assert_eq!(state_bytes(200, Precision::Double), u128::MAX);
    }
}
