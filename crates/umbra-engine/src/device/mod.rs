//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - negotiating optional features (line polygon mode for wireframe)
//! - blocking texture readback for the few places that need host data
//! - turning wgpu validation errors into `Result`s

mod gpu;
mod init;
pub mod readback;
mod scope;

pub use gpu::Gpu;
pub use init::GpuInit;
pub use readback::ReadbackError;
pub use scope::capture_errors;
