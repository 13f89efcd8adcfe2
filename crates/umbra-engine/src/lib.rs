//! Umbra engine crate.
//!
//! Headless GPU runtime plus the warped dual-paraboloid shadow subsystem.
//! The numerical side of the warp (fit, control grid, coverage) lives in
//! `umbra-warp`; this crate drives it through wgpu render passes.

pub mod device;
pub mod logging;
pub mod render;
pub mod scene;
pub mod shadow;
