//! CPU statevector backend.

use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use qbench_compile::CanonicalCircuit;
use qbench_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Cancellation, Device, HalError,
    HalResult, Precision,
};

use crate::statevector::{Op, SimFloat, Statevector};

/// Reference CPU backend.
///
/// Applies the canonical circuit to a dense state vector in the configured
/// precision. Only the gate loop is timed.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Upper bound on state vector bytes; `None` trusts the allocator.
    memory_limit: Option<u64>,
}

impl SimulatorBackend {
    /// Create a CPU backend limited by the memory currently available.
    pub fn new(precision: Precision) -> Self {
        Self {
            config: BackendConfig::cpu(precision),
            memory_limit: available_memory(),
        }
    }

    /// Override the memory limit in bytes.
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// The memory limit in effect.
    pub fn memory_limit(&self) -> Option<u64> {
        self.memory_limit
    }

    fn exhausted(&self, num_qubits: u32, required_bytes: u128) -> HalError {
        HalError::ResourceExhausted {
            num_qubits,
            required_bytes,
            limit_bytes: self.memory_limit,
        }
    }

    /// Bytes needed for the state vector, or `ResourceExhausted`.
    fn check_memory(&self, num_qubits: u32) -> HalResult<u128> {
        let per_amp = u128::from(self.config.precision().bytes_per_amplitude());
        let required = 1u128
            .checked_shl(num_qubits)
            .and_then(|amps| amps.checked_mul(per_amp))
            .ok_or_else(|| self.exhausted(num_qubits, u128::MAX))?;

        if num_qubits >= usize::BITS - 1 {
            return Err(self.exhausted(num_qubits, required));
        }
        if let Some(limit) = self.memory_limit {
            if required > u128::from(limit) {
                return Err(self.exhausted(num_qubits, required));
            }
        }
        Ok(required)
    }

    #[instrument(skip_all, fields(qubits = circuit.num_qubits(), gates = circuit.len()))]
    fn run<T: SimFloat>(
        &self,
        circuit: &CanonicalCircuit,
        cancel: &dyn Cancellation,
    ) -> HalResult<Duration> {
        let num_qubits = circuit.num_qubits();
        let ops: Vec<Op<T>> = circuit.instructions().iter().map(Op::lower).collect();

        let mut sv = Statevector::<T>::try_new(num_qubits as usize).map_err(|e| {
            warn!("State vector allocation failed: {}", e);
            let per_amp = u128::from(self.config.precision().bytes_per_amplitude());
            self.exhausted(num_qubits, (1u128 << num_qubits) * per_amp)
        })?;

        if cancel.is_cancelled() {
            return Err(HalError::Cancelled);
        }

        let start = Instant::now();
        for op in &ops {
            if cancel.is_cancelled() {
                debug!("Cancelled after {:?}", start.elapsed());
                return Err(HalError::Cancelled);
            }
            sv.apply_op(op);
        }
        let elapsed = start.elapsed();

        std::hint::black_box(sv.amplitudes());
        debug!("Simulation completed in {:?}", elapsed);
        Ok(elapsed)
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        "statevector_cpu"
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn availability(&self) -> BackendAvailability {
        BackendAvailability::always_available()
    }

    fn execute(
        &self,
        circuit: &CanonicalCircuit,
        cancel: &dyn Cancellation,
    ) -> HalResult<Duration> {
        let required = self.check_memory(circuit.num_qubits())?;
        debug!(
            "Executing {} qubits in {} precision ({} bytes)",
            circuit.num_qubits(),
            self.config.precision(),
            required
        );

        match self.config.precision() {
            Precision::Single => self.run::<f32>(circuit, cancel),
            Precision::Double => self.run::<f64>(circuit, cancel),
        }
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        if config.device() != Device::Cpu {
            return Err(HalError::InvalidConfiguration(format!(
                "'{}' targets {}, the statevector backend only runs on the cpu",
                config.label(),
                config.device()
            )));
        }
        Ok(Self {
            config,
            memory_limit: available_memory(),
        })
    }
}

/// `MemAvailable` from `/proc/meminfo`, in bytes.
fn available_memory() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_mem_available(&meminfo)
}

fn parse_mem_available(meminfo: &str) -> Option<u64> {
    meminfo.lines().find_map(|line| {
        let rest = line.strip_prefix("MemAvailable:")?;
        let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
        kib.checked_mul(1024)
    })
}
