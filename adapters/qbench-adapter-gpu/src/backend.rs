//! GPU backend implementation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use qbench_compile::CanonicalCircuit;
use qbench_hal::{
    AccelerationMode, Backend, BackendAvailability, BackendConfig, BackendFactory, Cancellation,
    ExecutionTarget, HalError, HalResult,
};

use crate::engine::{GpuEngine, default_engine_path};
use crate::error::{GpuError, GpuResult};
use crate::ffi::GpuOp;

/// Ops handed to the engine per call; the cancel flag is polled in between.
const APPLY_CHUNK: usize = 1024;

/// GPU backend driving an external engine library.
///
/// The engine is loaded lazily on first use and the outcome is cached, so a
/// machine without the library reports `BackendUnavailable` on every run
/// instead of failing at construction.
pub struct GpuBackend {
    config: BackendConfig,
    mode: AccelerationMode,
    engine_path: PathBuf,
    engine: OnceLock<Result<Arc<GpuEngine>, String>>,
}

impl GpuBackend {
    /// Create a GPU backend for a GPU configuration.
    pub fn new(config: BackendConfig) -> HalResult<Self> {
        let ExecutionTarget::Gpu(mode) = config.target() else {
            return Err(HalError::InvalidConfiguration(format!(
                "'{}' targets {}, the GPU backend needs a gpu configuration",
                config.label(),
                config.device()
            )));
        };
        Ok(Self {
            config,
            mode,
            engine_path: default_engine_path(),
            engine: OnceLock::new(),
        })
    }

    /// Load the engine from a specific path.
    #[must_use]
    pub fn with_engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_path = path.into();
        self.engine = OnceLock::new();
        self
    }

    /// Path the engine is loaded from.
    pub fn engine_path(&self) -> &Path {
        &self.engine_path
    }

    fn engine(&self) -> GpuResult<Arc<GpuEngine>> {
        self.engine
            .get_or_init(|| match GpuEngine::load(&self.engine_path) {
                Ok(engine) => Ok(Arc::new(engine)),
                Err(e) => {
                    warn!("GPU engine unavailable: {}", e);
                    Err(e.to_string())
                }
            })
            .clone()
            .map_err(|cause| GpuError::LoadFailed {
                path: self.engine_path.display().to_string(),
                cause,
            })
    }

    /// Engine that can serve this configuration right now.
    fn ready_engine(&self) -> GpuResult<Arc<GpuEngine>> {
        let engine = self.engine()?;
        if engine.device_count() == 0 {
            return Err(GpuError::NoDevice);
        }
        if !engine.supports_mode(self.mode) {
            return Err(GpuError::Unsupported(format!("acceleration mode {}", self.mode)));
        }
        Ok(engine)
    }

    #[instrument(skip_all, fields(label = self.config.label(), qubits = circuit.num_qubits()))]
    fn run(&self, circuit: &CanonicalCircuit, cancel: &dyn Cancellation) -> GpuResult<Duration> {
        let engine = self.ready_engine()?;

        let ops = circuit
            .instructions()
            .iter()
            .map(|inst| {
                GpuOp::encode(inst).ok_or_else(|| GpuError::UnencodableGate(inst.name().into()))
            })
            .collect::<GpuResult<Vec<_>>>()?;

        let mut state =
            engine.create_state(circuit.num_qubits(), self.config.precision(), self.mode)?;

        let start = Instant::now();
        for chunk in ops.chunks(APPLY_CHUNK) {
            if cancel.is_cancelled() {
                debug!("Cancelled after {:?}", start.elapsed());
                return Err(GpuError::Cancelled);
            }
            state.apply(chunk)?;
        }
        let elapsed = start.elapsed();

        debug!("GPU simulation completed in {:?}", elapsed);
        Ok(elapsed)
    }
}

impl Backend for GpuBackend {
    fn name(&self) -> &str {
        "statevector_gpu"
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn availability(&self) -> BackendAvailability {
        let engine = match self.engine() {
            Ok(engine) => engine,
            Err(e) => return BackendAvailability::unavailable(e.to_string()),
        };
        let devices = engine.device_count();
        if devices == 0 {
            return BackendAvailability::unavailable(GpuError::NoDevice.to_string());
        }
        if !engine.supports_mode(self.mode) {
            return BackendAvailability::unavailable(format!(
                "engine '{}' does not support acceleration mode {}",
                engine.path(),
                self.mode
            ));
        }
        BackendAvailability::with_devices(devices)
    }

    fn execute(
        &self,
        circuit: &CanonicalCircuit,
        cancel: &dyn Cancellation,
    ) -> HalResult<Duration> {
        if cancel.is_cancelled() {
            return Err(HalError::Cancelled);
        }
        Ok(self.run(circuit, cancel)?)
    }
}

impl BackendFactory for GpuBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_compile::Normalizer;
    use qbench_hal::{CancelFlag, Precision};
    use qbench_ir::{Circuit, QubitId};

    fn backend() -> GpuBackend {
        GpuBackend::new(BackendConfig::gpu(
            AccelerationMode::AcceleratedStatevector,
            Precision::Single,
        ))
        .unwrap()
        .with_engine_path("/nonexistent/libqbench_gpu.so")
    }

    #[test]
    fn test_rejects_cpu_config() {
        let err = GpuBackend::new(BackendConfig::cpu(Precision::Double)).err();
        assert!(matches!(err, Some(HalError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_engine_reports_unavailable() {
        let backend = backend();
        let availability = backend.availability();
        assert!(!availability.is_available);
        assert!(
            availability
                .status_message
                .unwrap()
                .contains("/nonexistent/libqbench_gpu.so")
        );
    }

    #[test]
    fn test_missing_engine_fails_every_run() {
        let backend = backend();
        let mut circuit = Circuit::with_size("bell", 2);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let canonical = Normalizer::new().normalize(&circuit).unwrap();

        for _ in 0..2 {
            let err = backend.execute(&canonical, &CancelFlag::new()).unwrap_err();
            assert!(matches!(err, HalError::BackendUnavailable(_)));
        }
    }
}
