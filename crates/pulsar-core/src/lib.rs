//! Pulsar Core - control primitives for a real-time audio effects module
//!
//! This crate provides the building blocks shared by every execution context
//! of the device: pin interrupts, the audio callback and the cooperative main
//! loop. Everything here is lock-free and allocation-free.
//!
//! # Core Abstractions
//!
//! ## Input Conditioning
//!
//! - [`Debouncer`] - Lock-free two-state debouncer with a settling timer
//! - [`EdgeLatch`] - Take-and-reset turned-on/turned-off flags
//!
//! ## Time
//!
//! - [`Clock`] - Monotonic microsecond time source
//! - [`ManualClock`] - Deterministic clock for tests and simulation
//!
//! ## Programs
//!
//! - [`Program`] - Object-safe trait for selectable audio effects
//! - [`ProcessArgs`] - Per-block buffers, CV readings and gate edges
//! - [`ParamDescriptor`] / [`ParamTable`] - Tagged-variant parameters
//! - [`Frame`] - Stereo sample
//!
//! # Execution Contexts
//!
//! Values shared across contexts are atomic at the type level: a
//! [`Debouncer`] or [`EdgeLatch`] can be read from the main loop while an
//! interrupt handler updates it, through `&self` only.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! pulsar-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod debounce;
pub mod frame;
pub mod latch;
pub mod param;
pub mod program;

// Re-export main types at crate root
#[cfg(target_has_atomic = "64")]
pub use clock::ManualClock;
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::Clock;
pub use debounce::{
    DEFAULT_SETTLING_US, DebounceConfig, DebounceState, Debounced, Debouncer, Edge,
};
pub use frame::{Frame, deinterleave, interleave};
pub use latch::{EdgeLatch, EdgeSnapshot};
pub use param::{ParamDescriptor, ParamEntry, ParamKind, ParamTable, ParamValue};
pub use program::{
    Animation, CV_INPUT_COUNT, CvInput, GATE_SOURCE_COUNT, GateSource, ProcessArgs, Program,
};
