//! HTTP access to the shop backend

mod client;
mod error;

pub use client::{image_preview_path, read_image, HttpBackend, StockApi};
pub use error::ApiError;
