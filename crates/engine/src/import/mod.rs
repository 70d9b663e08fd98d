//! Two-step interactive import of an RSA key pair from `.pem` files.
//!
//! [`flow::KeyImportFlow`] is a pure state machine driven by discrete events.
//! [`importer::KeyImporter`] performs the asynchronous file reads and relays
//! the machine's effects to an [`importer::ImportFrontend`], the external
//! collaborator that renders prompts and notifications.

pub mod flow;
pub mod importer;

pub use flow::{ImportEffect, ImportEvent, ImportState, KeyImportFlow, KeySlot, Notification};
pub use importer::{ImportFrontend, KeyImporter};
