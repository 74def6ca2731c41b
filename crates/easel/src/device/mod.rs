//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//!
//! The surface is configured once at startup; the window is created
//! non-resizable, so there is no reconfigure-on-resize path.

mod gpu;
mod surface;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
