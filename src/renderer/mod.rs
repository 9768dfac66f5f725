//! 2D rendering module
//!
//! Shapes are generated as plain draw commands so the scene can be built
//! and inspected without a browser. The canvas backend replays them.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod commands;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use commands::DrawCommand;
pub use shapes::scene;
