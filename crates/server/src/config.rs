//! Configuration loading and validation for the cipher server.
//!
//! All values are read from environment variables at startup. Every field has
//! a default, so an empty environment yields a plain-HTTP server on port 8443.
//! The process exits with a clear error message if a value is invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Smallest RSA modulus the server will generate.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Largest RSA modulus the server will generate. Bigger public keys are
/// refused when parsed, so callers could not send them back.
pub const MAX_RSA_KEY_BITS: usize = 4096;

/// Validated server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP(S) server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Filesystem path to the PEM-encoded TLS certificate chain. TLS is
    /// enabled only when this and `tls_key_path` are both set.
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    /// Filesystem path to the PEM-encoded TLS private key.
    #[serde(default)]
    pub tls_key_path: Option<String>,

    /// Directory served for any path that matches no API route.
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Modulus size for server-generated RSA key pairs.
    #[serde(default = "default_rsa_key_bits")]
    pub rsa_key_bits: usize,

    /// OTLP/gRPC collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8443
}
fn default_request_timeout() -> u64 {
    crate::server::middleware::REQUEST_TIMEOUT.as_secs()
}
fn default_rsa_key_bits() -> usize {
    MIN_RSA_KEY_BITS
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be a non-zero port number");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&self.rsa_key_bits) {
            anyhow::bail!(
                "RSA_KEY_BITS must be between {MIN_RSA_KEY_BITS} and {MAX_RSA_KEY_BITS}"
            );
        }
        match (non_empty(&self.tls_cert_path), non_empty(&self.tls_key_path)) {
            (Some(_), None) => anyhow::bail!("TLS_KEY_PATH is required when TLS_CERT_PATH is set"),
            (None, Some(_)) => anyhow::bail!("TLS_CERT_PATH is required when TLS_KEY_PATH is set"),
            _ => {}
        }
        if let Some(dir) = non_empty(&self.static_dir) {
            if !std::path::Path::new(dir).is_dir() {
                anyhow::bail!("STATIC_DIR {dir} is not a directory");
            }
        }
        Ok(())
    }

    /// Certificate and key paths, when TLS is configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.tls_cert_path)?, non_empty(&self.tls_key_path)?))
    }

    pub fn static_dir(&self) -> Option<&str> {
        non_empty(&self.static_dir)
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        non_empty(&self.otel_exporter_otlp_endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            tls_cert_path: None,
            tls_key_path: None,
            static_dir: None,
            request_timeout_secs: default_request_timeout(),
            rsa_key_bits: default_rsa_key_bits(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

/// Blank environment values count as unset.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
