//! Backend configurations and the sweep matrix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HalError, HalResult};

/// Device class a configuration runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host CPU.
    Cpu,
    /// GPU accelerator.
    Gpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Device::Cpu => "cpu",
            Device::Gpu => "gpu",
        })
    }
}

/// GPU execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccelerationMode {
    /// The engine's default GPU path.
    Default,
    /// The optimized state-vector path (cuStateVec).
    AcceleratedStatevector,
}

impl fmt::Display for AccelerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccelerationMode::Default => "default",
            AccelerationMode::AcceleratedStatevector => "accelerated-statevector",
        })
    }
}

/// Floating-point precision of the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Complex numbers of two `f32`.
    Single,
    /// Complex numbers of two `f64`.
    #[default]
    Double,
}

impl Precision {
    /// Bytes per complex amplitude.
    pub fn bytes_per_amplitude(self) -> u64 {
        match self {
            Precision::Single => 8,
            Precision::Double => 16,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Single => "single",
            Precision::Double => "double",
        })
    }
}

impl FromStr for Precision {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "f32" => Ok(Precision::Single),
            "double" | "f64" => Ok(Precision::Double),
            other => Err(HalError::InvalidConfiguration(format!(
                "unknown precision '{other}' (expected single or double)"
            ))),
        }
    }
}

/// Where a configuration executes.
///
/// Acceleration modes only exist for GPUs, so an accelerated CPU target
/// cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionTarget {
    /// Host CPU.
    Cpu,
    /// GPU with the given execution path.
    Gpu(AccelerationMode),
}

impl ExecutionTarget {
    /// Device class of this target.
    pub fn device(self) -> Device {
        match self {
            ExecutionTarget::Cpu => Device::Cpu,
            ExecutionTarget::Gpu(_) => Device::Gpu,
        }
    }

    /// Acceleration mode, `None` for the CPU.
    pub fn acceleration_mode(self) -> Option<AccelerationMode> {
        match self {
            ExecutionTarget::Cpu => None,
            ExecutionTarget::Gpu(mode) => Some(mode),
        }
    }

    /// Label used when none is given.
    pub fn default_label(self) -> &'static str {
        match self {
            ExecutionTarget::Cpu => "cpu",
            ExecutionTarget::Gpu(AccelerationMode::Default) => "gpu_default",
            ExecutionTarget::Gpu(AccelerationMode::AcceleratedStatevector) => "gpu_custatevec",
        }
    }
}

/// One executable configuration: target, precision and a display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ConfigRecord", try_from = "ConfigRecord")]
pub struct BackendConfig {
    target: ExecutionTarget,
    precision: Precision,
    label: String,
}

impl BackendConfig {
    /// Validate a flat (device, mode, precision) triple.
    ///
    /// `mode` is ignored when `None`; for the CPU only `None` or
    /// [`AccelerationMode::Default`] are accepted.
    pub fn new(
        device: Device,
        mode: Option<AccelerationMode>,
        precision: Precision,
    ) -> HalResult<Self> {
        let target = match (device, mode) {
            (Device::Cpu, None | Some(AccelerationMode::Default)) => ExecutionTarget::Cpu,
            (Device::Cpu, Some(mode)) => {
                return Err(HalError::InvalidConfiguration(format!(
                    "acceleration mode '{mode}' is not available on the cpu"
                )));
            }
            (Device::Gpu, mode) => ExecutionTarget::Gpu(mode.unwrap_or(AccelerationMode::Default)),
        };
        Ok(Self::from_target(target, precision))
    }

    /// Build from an already valid target.
    pub fn from_target(target: ExecutionTarget, precision: Precision) -> Self {
        Self {
            target,
            precision,
            label: target.default_label().to_string(),
        }
    }

    /// CPU configuration.
    pub fn cpu(precision: Precision) -> Self {
        Self::from_target(ExecutionTarget::Cpu, precision)
    }

    /// GPU configuration with the given execution path.
    pub fn gpu(mode: AccelerationMode, precision: Precision) -> Self {
        Self::from_target(ExecutionTarget::Gpu(mode), precision)
    }

    /// Replace the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Execution target.
    pub fn target(&self) -> ExecutionTarget {
        self.target
    }

    /// Device class.
    pub fn device(&self) -> Device {
        self.target.device()
    }

    /// Acceleration mode, `None` for the CPU.
    pub fn acceleration_mode(&self) -> Option<AccelerationMode> {
        self.target.acceleration_mode()
    }

    /// Numeric precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.acceleration_mode() {
            Some(mode) => write!(f, "{} ({}, {mode}, {})", self.label, self.device(), self.precision),
            None => write!(f, "{} ({}, {})", self.label, self.device(), self.precision),
        }
    }
}

/// Flat record form of [`BackendConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigRecord {
    label: String,
    device: Device,
    acceleration_mode: Option<AccelerationMode>,
    precision: Precision,
}

impl From<BackendConfig> for ConfigRecord {
    fn from(config: BackendConfig) -> Self {
        Self {
            device: config.device(),
            acceleration_mode: config.acceleration_mode(),
            precision: config.precision,
            label: config.label,
        }
    }
}

impl TryFrom<ConfigRecord> for BackendConfig {
    type Error = HalError;

    fn try_from(record: ConfigRecord) -> Result<Self, Self::Error> {
        Ok(BackendConfig::new(record.device, record.acceleration_mode, record.precision)?
            .with_label(record.label))
    }
}

/// Ordered, validated list of configurations for a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendMatrix {
    configs: Vec<BackendConfig>,
}

impl BackendMatrix {
    /// Validate a matrix: non-empty with unique labels. Order is kept.
    pub fn new(configs: impl IntoIterator<Item = BackendConfig>) -> HalResult<Self> {
        let configs: Vec<BackendConfig> = configs.into_iter().collect();
        if configs.is_empty() {
            return Err(HalError::InvalidConfiguration(
                "backend matrix is empty".into(),
            ));
        }
        for (i, config) in configs.iter().enumerate() {
            if configs[..i].iter().any(|c| c.label == config.label) {
                return Err(HalError::InvalidConfiguration(format!(
                    "duplicate backend label '{}'",
                    config.label
                )));
            }
        }
        Ok(Self { configs })
    }

    /// The three configurations of a full CPU/GPU comparison.
    pub fn full(precision: Precision) -> Self {
        Self {
            configs: vec![
                BackendConfig::cpu(precision),
                BackendConfig::gpu(AccelerationMode::Default, precision),
                BackendConfig::gpu(AccelerationMode::AcceleratedStatevector, precision),
            ],
        }
    }

    /// Configurations in declared order.
    pub fn configs(&self) -> &[BackendConfig] {
        &self.configs
    }

    /// Iterate in declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, BackendConfig> {
        self.configs.iter()
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Always false for a validated matrix.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl<'a> IntoIterator for &'a BackendMatrix {
    type Item = &'a BackendConfig;
    type IntoIter = std::slice::Iter<'a, BackendConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}
