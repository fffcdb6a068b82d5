//! Tagtune Player
//!
//! The host build of the device: card resolver, control loop, console
//! peripherals, boot helpers and configuration.
//!
//! This library exposes the pieces the binary wires together so they can be
//! driven from tests.

pub mod boot;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod peripherals;
pub mod resolver;

// Re-export commonly used types for convenience
pub use config::DeviceConfig;
pub use controller::{Controller, ControllerOptions, Devices};
pub use error::{PlayerError, Result};
pub use resolver::{CardResolver, Dispatch};
