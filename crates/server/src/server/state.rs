//! Shared application state injected into every Axum handler.

use engine::CipherEngine;

/// Application state shared across all request handlers.
///
/// The engine holds configuration only, so per-request clones are free and
/// no request can observe another's keys or IVs.
#[derive(Clone, Default)]
pub struct AppState {
    pub engine: CipherEngine,
}

impl AppState {
    pub fn new(engine: CipherEngine) -> Self {
        Self { engine }
    }
}
