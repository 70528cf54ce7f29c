//! Natural-language drawing: an LLM agent calling geometry tools that paint
//! onto a raster canvas.

pub mod agent;
pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod planner;
pub mod server;
pub mod session;
pub mod shapes;
pub mod tools;
pub mod wrap;
