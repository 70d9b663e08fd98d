//! Async driver that feeds file reads into a [`KeyImportFlow`].

use std::path::Path;

use tracing::{debug, warn};

use super::flow::{ImportEffect, ImportEvent, KeyImportFlow, KeySlot, Notification};

/// The UI side of the import: file choosers and user notifications.
#[cfg_attr(test, mockall::automock)]
pub trait ImportFrontend {
    /// Reset both file choosers.
    fn clear_selectors(&self);
    /// Ask the user to choose a file for `slot`.
    fn request_file(&self, slot: KeySlot);
    /// Show `notification` to the user.
    fn notify(&self, notification: &Notification);
}

/// Drives a [`KeyImportFlow`] with real file reads.
///
/// Every step takes `&mut self`, so at most one read is in flight.
pub struct KeyImporter<F> {
    flow: KeyImportFlow,
    frontend: F,
}

impl<F: ImportFrontend> KeyImporter<F> {
    pub fn new(frontend: F) -> Self {
        Self::with_flow(KeyImportFlow::new(), frontend)
    }

    /// Resume from a previously saved flow.
    pub fn with_flow(flow: KeyImportFlow, frontend: F) -> Self {
        Self { flow, frontend }
    }

    pub fn flow(&self) -> &KeyImportFlow {
        &self.flow
    }

    pub fn into_flow(self) -> KeyImportFlow {
        self.flow
    }

    /// The user pressed the import control.
    pub fn trigger(&mut self) {
        self.dispatch(ImportEvent::Trigger);
    }

    /// Read the file the user chose for the pending slot.
    ///
    /// Ignored when no file was requested.
    pub async fn load(&mut self, path: &Path) {
        let Some(slot) = self.flow.awaiting() else {
            debug!(path = %path.display(), "no key file requested; ignoring");
            return;
        };
        let event = match tokio::fs::read_to_string(path).await {
            Ok(contents) => ImportEvent::ReadSucceeded {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                contents,
            },
            Err(e) => {
                warn!(?slot, error = %e, "failed to read key file");
                ImportEvent::ReadFailed {
                    reason: e.to_string(),
                }
            }
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: ImportEvent) {
        for effect in self.flow.handle(event) {
            match effect {
                ImportEffect::ClearSelectors => self.frontend.clear_selectors(),
                ImportEffect::RequestFile(slot) => self.frontend.request_file(slot),
                ImportEffect::Notify(n) => self.frontend.notify(&n),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::import::flow::ImportState;

    fn write_pem(dir: &Path, name: &str, label: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let body = "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA";
        std::fs::write(
            &path,
            format!("-----BEGIN {label} KEY-----\n{body}\n-----END {label} KEY-----\n"),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn imports_both_keys_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let public = write_pem(dir.path(), "public.pem", "PUBLIC");
        let private = write_pem(dir.path(), "private.pem", "PRIVATE");

        let mut frontend = MockImportFrontend::new();
        frontend.expect_clear_selectors().times(1).return_const(());
        frontend
            .expect_request_file()
            .with(eq(KeySlot::Public))
            .times(1)
            .return_const(());
        frontend
            .expect_request_file()
            .with(eq(KeySlot::Private))
            .times(1)
            .return_const(());
        frontend
            .expect_notify()
            .withf(|n| {
                matches!(
                    n,
                    Notification::PublicKeyImported
                        | Notification::PrivateKeyImported
                        | Notification::BothKeysImported
                )
            })
            .times(3)
            .return_const(());

        let mut importer = KeyImporter::new(frontend);
        importer.trigger();
        importer.load(&public).await;
        importer.trigger();
        importer.load(&private).await;

        let flow = importer.into_flow();
        assert_eq!(flow.state(), ImportState::Idle);
        assert!(flow.public_key().is_some());
        assert!(flow.private_key().is_some());
    }

    #[tokio::test]
    async fn missing_private_file_preserves_public_key() {
        let dir = tempfile::tempdir().unwrap();
        let public = write_pem(dir.path(), "public.pem", "PUBLIC");

        let mut frontend = MockImportFrontend::new();
        frontend.expect_clear_selectors().return_const(());
        frontend.expect_request_file().return_const(());
        frontend
            .expect_notify()
            .withf(|n| matches!(n, Notification::PublicKeyImported))
            .times(1)
            .return_const(());
        frontend
            .expect_notify()
            .withf(|n| matches!(n, Notification::ReadError { slot: KeySlot::Private, .. }))
            .times(1)
            .return_const(());

        let mut importer = KeyImporter::new(frontend);
        importer.trigger();
        importer.load(&public).await;
        importer.trigger();
        importer.load(&dir.path().join("absent.pem")).await;

        assert_eq!(
            importer.flow().state(),
            ImportState::PublicLoadedAwaitingPrivateTrigger
        );
        assert!(importer.flow().public_key().is_some());
    }

    #[tokio::test]
    async fn load_without_trigger_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let public = write_pem(dir.path(), "public.pem", "PUBLIC");

        // No expectations: any frontend call would panic.
        let frontend = MockImportFrontend::new();
        let mut importer = KeyImporter::new(frontend);
        importer.load(&public).await;
        assert_eq!(importer.flow().state(), ImportState::Idle);
    }
}
