//! Backend registry mapping device classes to constructors.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendFactory};
use crate::config::{BackendConfig, BackendMatrix, Device};
use crate::error::{HalError, HalResult};

/// Factory function type for backends.
type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync>;

/// Creates backends for the configurations of a sweep matrix.
pub struct BackendRegistry {
    factories: FxHashMap<Device, Factory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a backend type for a device class.
    pub fn register<B>(&mut self, device: Device)
    where
        B: BackendFactory + 'static,
    {
        debug!("Registering backend for device: {}", device);
        self.factories.insert(
            device,
            Box::new(|config| {
                let backend = B::from_config(config)?;
                Ok(Arc::new(backend))
            }),
        );
    }

    /// Register a backend factory with a custom constructor.
    pub fn register_factory(
        &mut self,
        device: Device,
        factory: impl Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync + 'static,
    ) {
        debug!("Registering factory backend for device: {}", device);
        self.factories.insert(device, Box::new(factory));
    }

    /// Create the backend for one configuration.
    pub fn create(&self, config: BackendConfig) -> HalResult<Arc<dyn Backend>> {
        let factory = self.factories.get(&config.device()).ok_or_else(|| {
            HalError::InvalidConfiguration(format!(
                "no backend registered for device '{}'",
                config.device()
            ))
        })?;
        factory(config)
    }

    /// Create one backend per configuration, in matrix order.
    pub fn create_all(&self, matrix: &BackendMatrix) -> HalResult<Vec<Arc<dyn Backend>>> {
        matrix.iter().map(|c| self.create(c.clone())).collect()
    }

    /// Whether a device class has a registered backend.
    pub fn contains(&self, device: Device) -> bool {
        self.factories.contains_key(&device)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
