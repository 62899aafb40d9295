//! Staxs Web
//!
//! WebAssembly shell around the Staxs editor: exposes it to JavaScript,
//! forwards keyboard shortcuts and holds window-level listeners while a card
//! or connection gesture is in progress.

pub mod bridge;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::StaxsCanvas;
