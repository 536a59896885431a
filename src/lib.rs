//! gridchart: bar-chart rendering, bitmap caching and hit-testing for
//! spreadsheet grids.
//!
//! `core` holds the pure chart model and scales, `render` the backend-agnostic
//! draw primitives and off-screen surfaces, and `api` the layout solver,
//! painter, geometry, hit tester and the stale-while-revalidate render engine.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{ChartRenderEngine, RenderEngineConfig};
pub use error::{ChartError, ChartResult};
