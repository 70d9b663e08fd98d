//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No payloads or key material** may appear in any span attribute or log
//!   field: plaintext, ciphertext, passphrases, PEM keys and IVs stay out.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
