//! [`KeyImportFlow`]: state machine for importing a public then a private key.
//!
//! ```text
//! Idle --trigger--> AwaitingPublicFile --ok--> PublicLoadedAwaitingPrivateTrigger
//!  ^                      |fail                    |trigger
//!  |<---------------------+                        v
//!  +<--------------ok------------------------ AwaitingPrivateFile
//!                                                  |fail -> PublicLoadedAwaitingPrivateTrigger
//! ```
//!
//! A trigger while a file read is pending is ignored, as is a read completion
//! arriving when no read was requested.

use crate::key::material::{validate, KeyKind};

/// Accepted key file extension.
pub const PEM_EXTENSION: &str = ".pem";

/// Where the import currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportState {
    #[default]
    Idle,
    AwaitingPublicFile,
    PublicLoadedAwaitingPrivateTrigger,
    AwaitingPrivateFile,
}

/// Which half of the key pair a file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    Public,
    Private,
}

impl KeySlot {
    pub fn kind(self) -> KeyKind {
        match self {
            KeySlot::Public => KeyKind::PublicPem,
            KeySlot::Private => KeyKind::PrivatePem,
        }
    }
}

/// Input driving the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// The user pressed the import control.
    Trigger,
    /// The pending file read finished.
    ReadSucceeded { file_name: String, contents: String },
    /// The pending file read failed.
    ReadFailed { reason: String },
}

/// User-facing message the frontend should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Public key stored; trigger again to import the private key.
    PublicKeyImported,
    /// Private key stored.
    PrivateKeyImported,
    /// Both halves are now stored.
    BothKeysImported,
    /// The chosen file does not end in `.pem`.
    WrongFileType { slot: KeySlot },
    /// The file could not be read.
    ReadError { slot: KeySlot, reason: String },
    /// The file contents are not a valid PEM key of the expected kind.
    InvalidFormat { slot: KeySlot, message: String },
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEffect {
    /// Reset both file choosers.
    ClearSelectors,
    /// Open a file chooser for `slot`.
    RequestFile(KeySlot),
    Notify(Notification),
}

/// Caller-owned import state plus the keys accepted so far.
#[derive(Debug, Clone, Default)]
pub struct KeyImportFlow {
    state: ImportState,
    public_key: Option<String>,
    private_key: Option<String>,
}

impl KeyImportFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Normalized public key PEM, once imported.
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    /// Normalized private key PEM, once imported.
    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    /// The slot a file read is pending for, if any.
    pub fn awaiting(&self) -> Option<KeySlot> {
        match self.state {
            ImportState::AwaitingPublicFile => Some(KeySlot::Public),
            ImportState::AwaitingPrivateFile => Some(KeySlot::Private),
            _ => None,
        }
    }

    /// Apply `event` and return the effects the frontend must carry out.
    pub fn handle(&mut self, event: ImportEvent) -> Vec<ImportEffect> {
        match event {
            ImportEvent::Trigger => self.on_trigger(),
            ImportEvent::ReadSucceeded {
                file_name,
                contents,
            } => match self.awaiting() {
                Some(slot) => self.on_read(slot, &file_name, &contents),
                None => Vec::new(),
            },
            ImportEvent::ReadFailed { reason } => match self.awaiting() {
                Some(slot) => self.fail(slot, Notification::ReadError { slot, reason }),
                None => Vec::new(),
            },
        }
    }

    fn on_trigger(&mut self) -> Vec<ImportEffect> {
        match self.state {
            ImportState::Idle => {
                self.state = ImportState::AwaitingPublicFile;
                vec![
                    ImportEffect::ClearSelectors,
                    ImportEffect::RequestFile(KeySlot::Public),
                ]
            }
            ImportState::PublicLoadedAwaitingPrivateTrigger => {
                self.state = ImportState::AwaitingPrivateFile;
                vec![ImportEffect::RequestFile(KeySlot::Private)]
            }
            ImportState::AwaitingPublicFile | ImportState::AwaitingPrivateFile => Vec::new(),
        }
    }

    fn on_read(&mut self, slot: KeySlot, file_name: &str, contents: &str) -> Vec<ImportEffect> {
        if !file_name.ends_with(PEM_EXTENSION) {
            return self.fail(slot, Notification::WrongFileType { slot });
        }
        let key = match validate(contents, slot.kind()) {
            Ok(key) => key,
            Err(e) => {
                let message = e.to_string();
                return self.fail(slot, Notification::InvalidFormat { slot, message });
            }
        };
        match slot {
            KeySlot::Public => {
                self.public_key = Some(key);
                self.state = ImportState::PublicLoadedAwaitingPrivateTrigger;
                vec![ImportEffect::Notify(Notification::PublicKeyImported)]
            }
            KeySlot::Private => {
                self.private_key = Some(key);
                self.state = ImportState::Idle;
                vec![
                    ImportEffect::Notify(Notification::PrivateKeyImported),
                    ImportEffect::Notify(Notification::BothKeysImported),
                ]
            }
        }
    }

    /// Failed public import restarts from Idle; failed private import keeps
    /// the accepted public key and waits for another trigger.
    fn fail(&mut self, slot: KeySlot, notification: Notification) -> Vec<ImportEffect> {
        self.state = match slot {
            KeySlot::Public => ImportState::Idle,
            KeySlot::Private => ImportState::PublicLoadedAwaitingPrivateTrigger,
        };
        vec![ImportEffect::Notify(notification)]
    }
}
