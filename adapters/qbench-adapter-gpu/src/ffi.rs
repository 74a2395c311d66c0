//! C ABI of the GPU engine library.
//!
//! The engine exports five unprefixed functions:
//!
//! ```text
//! int  qbench_gpu_device_count(void);
//! int  qbench_gpu_supports_mode(int mode);
//! int  qbench_gpu_state_create(uint32_t num_qubits, int precision, int mode, void **state);
//! int  qbench_gpu_state_apply(void *state, const qbench_gpu_op *ops, size_t len);
//! void qbench_gpu_state_destroy(void *state);
//! ```
//!
//! `qbench_gpu_state_apply` returns only after the device has synchronized,
//! so wall-clock time around it covers the whole simulation.

use std::ffi::c_void;
use std::os::raw::c_int;

use qbench_hal::{AccelerationMode, Precision};
use qbench_ir::{Instruction, StandardGate};

// ===========================================================================
// Handles and symbols
// ===========================================================================

/// Opaque state vector handle owned by the engine.
pub type GpuStateHandle = *mut c_void;

pub const SYM_DEVICE_COUNT: &str = "qbench_gpu_device_count";
pub const SYM_SUPPORTS_MODE: &str = "qbench_gpu_supports_mode";
pub const SYM_STATE_CREATE: &str = "qbench_gpu_state_create";
pub const SYM_STATE_APPLY: &str = "qbench_gpu_state_apply";
pub const SYM_STATE_DESTROY: &str = "qbench_gpu_state_destroy";

/// `int qbench_gpu_device_count(void)`
pub type FnDeviceCount = unsafe extern "C" fn() -> c_int;

/// `int qbench_gpu_supports_mode(int mode)`, non-zero when supported
pub type FnSupportsMode = unsafe extern "C" fn(mode: c_int) -> c_int;

/// `int qbench_gpu_state_create(num_qubits, precision, mode, state_out)`
pub type FnStateCreate = unsafe extern "C" fn(
    num_qubits: u32,
    precision: c_int,
    mode: c_int,
    state_out: *mut GpuStateHandle,
) -> c_int;

/// `int qbench_gpu_state_apply(state, ops, len)`
pub type FnStateApply =
    unsafe extern "C" fn(state: GpuStateHandle, ops: *const GpuOp, len: usize) -> c_int;

/// `void qbench_gpu_state_destroy(state)`
pub type FnStateDestroy = unsafe extern "C" fn(state: GpuStateHandle);

// ===========================================================================
// Status codes
// ===========================================================================

pub const STATUS_OK: c_int = 0;
pub const STATUS_INVALID_ARGUMENT: c_int = 1;
pub const STATUS_OUT_OF_MEMORY: c_int = 2;
pub const STATUS_NO_DEVICE: c_int = 3;
pub const STATUS_UNSUPPORTED: c_int = 4;

// ===========================================================================
// Enumerations
// ===========================================================================

pub const PRECISION_SINGLE: c_int = 0;
pub const PRECISION_DOUBLE: c_int = 1;

pub const MODE_DEFAULT: c_int = 0;
pub const MODE_ACCELERATED_STATEVECTOR: c_int = 1;

pub fn precision_code(precision: Precision) -> c_int {
    match precision {
        Precision::Single => PRECISION_SINGLE,
        Precision::Double => PRECISION_DOUBLE,
    }
}

pub fn mode_code(mode: AccelerationMode) -> c_int {
    match mode {
        AccelerationMode::Default => MODE_DEFAULT,
        AccelerationMode::AcceleratedStatevector => MODE_ACCELERATED_STATEVECTOR,
    }
}

// ===========================================================================
// Gate encoding
// ===========================================================================

pub const OP_X: u32 = 0;
pub const OP_Y: u32 = 1;
pub const OP_Z: u32 = 2;
pub const OP_H: u32 = 3;
pub const OP_S: u32 = 4;
pub const OP_T: u32 = 5;
pub const OP_CX: u32 = 6;
pub const OP_RX: u32 = 7;
pub const OP_RY: u32 = 8;
pub const OP_RZ: u32 = 9;

/// `control` value of single-qubit ops.
pub const NO_CONTROL: u32 = u32::MAX;

/// One canonical gate as the engine consumes it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuOp {
    pub opcode: u32,
    pub target: u32,
    pub control: u32,
    pub angle: f64,
}

impl GpuOp {
    fn single(opcode: u32, target: u32, angle: f64) -> Self {
        Self {
            opcode,
            target,
            control: NO_CONTROL,
            angle,
        }
    }

    /// Encode a canonical-basis instruction. `None` for any other gate.
    pub fn encode(instruction: &Instruction) -> Option<Self> {
        let q = |i: usize| instruction.qubits.get(i).map(|q| q.0);
        let op = match instruction.gate {
            StandardGate::X => Self::single(OP_X, q(0)?, 0.0),
            StandardGate::Y => Self::single(OP_Y, q(0)?, 0.0),
            StandardGate::Z => Self::single(OP_Z, q(0)?, 0.0),
            StandardGate::H => Self::single(OP_H, q(0)?, 0.0),
            StandardGate::S => Self::single(OP_S, q(0)?, 0.0),
            StandardGate::T => Self::single(OP_T, q(0)?, 0.0),
            StandardGate::Rx(theta) => Self::single(OP_RX, q(0)?, theta),
            StandardGate::Ry(theta) => Self::single(OP_RY, q(0)?, theta),
            StandardGate::Rz(theta) => Self::single(OP_RZ, q(0)?, theta),
            StandardGate::CX => Self {
                opcode: OP_CX,
                target: q(1)?,
                control: q(0)?,
                angle: 0.0,
            },
            _ => return None,
        };
        Some(op)
    }
}
