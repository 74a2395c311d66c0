//! Pass manager for running a normalization pipeline.

use tracing::{debug, instrument, trace};

use qbench_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::property::PropertySet;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given circuit.
    #[instrument(skip_all, fields(circuit = circuit.name(), qubits = circuit.num_qubits()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        debug!(
            "Running {} passes on circuit with {} ops",
            self.passes.len(),
            circuit.len()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                trace!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                trace!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                trace!("Skipping pass: {}", pass.name());
            }
        }

        debug!(
            "Pass manager completed, depth: {}, ops: {}",
            circuit.depth(),
            circuit.len()
        );

        Ok(())
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_ir::QubitId;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_empty_pipeline_leaves_circuit() {
        let pm = PassManager::new();
        let mut props = PropertySet::default();

        let mut circuit = Circuit::with_size("test", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let before = circuit.clone();

        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit, before);
    }
}
