//! # Action Payload
//!
//! The self-describing record inside every transaction. Encoding uses
//! the same canonical codec as persisted state: fixed-width big-endian
//! integers, length-prefixed strings and lists, and full-consumption
//! decoding, so a payload either decodes completely or the transaction
//! is invalid.
//!
//! The action table is sparse on purpose: 1-3 are entity creation,
//! 10-19 user tree actions, 20-27 reserved for group tree actions, and
//! 30-31 sea actions.

use serde::{Deserialize, Serialize};

use crate::errors::ApplyError;
use sea_state::root::FileInfo;
use sea_state::{codec, Key, Operation, SeaOperation};

/// Action selector, carried on the wire as its `u8` code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Action {
    /// No action; always rejected.
    #[default]
    Unset,
    /// Create a user record for the signer.
    CreateUser,
    /// Create a group record led by the signer's user.
    CreateGroup,
    /// Create a sea record for the signer.
    CreateSea,
    /// Create a file in the signer's home tree.
    UserCreateFile,
    /// Create a directory chain in the signer's home tree.
    UserCreateDirectory,
    /// Delete a file from the signer's home tree.
    UserDeleteFile,
    /// Delete a directory recursively.
    UserDeleteDirectory,
    /// Rename a file or directory.
    UserUpdateName,
    /// Replace a file's content.
    UserUpdateFileData,
    /// Re-key a file.
    UserUpdateFileKey,
    /// Publish the plaintext of a registered key.
    UserPublishKey,
    /// Move a file or directory.
    UserMove,
    /// Share a file or directory into the shared tree.
    UserShare,
    /// A sea registers custody of granted fragments.
    SeaStoreFile,
    /// A sea confirms completed outbox operations.
    SeaConfirmOperations,
}

impl From<Action> for u8 {
    fn from(action: Action) -> u8 {
        match action {
            Action::Unset => 0,
            Action::CreateUser => 1,
            Action::CreateGroup => 2,
            Action::CreateSea => 3,
            Action::UserCreateFile => 10,
            Action::UserCreateDirectory => 11,
            Action::UserDeleteFile => 12,
            Action::UserDeleteDirectory => 13,
            Action::UserUpdateName => 14,
            Action::UserUpdateFileData => 15,
            Action::UserUpdateFileKey => 16,
            Action::UserPublishKey => 17,
            Action::UserMove => 18,
            Action::UserShare => 19,
            Action::SeaStoreFile => 30,
            Action::SeaConfirmOperations => 31,
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Action::Unset),
            1 => Ok(Action::CreateUser),
            2 => Ok(Action::CreateGroup),
            3 => Ok(Action::CreateSea),
            10 => Ok(Action::UserCreateFile),
            11 => Ok(Action::UserCreateDirectory),
            12 => Ok(Action::UserDeleteFile),
            13 => Ok(Action::UserDeleteDirectory),
            14 => Ok(Action::UserUpdateName),
            15 => Ok(Action::UserUpdateFileData),
            16 => Ok(Action::UserUpdateFileKey),
            17 => Ok(Action::UserPublishKey),
            18 => Ok(Action::UserMove),
            19 => Ok(Action::UserShare),
            // 20-27 are reserved for group actions
            30 => Ok(Action::SeaStoreFile),
            31 => Ok(Action::SeaConfirmOperations),
            other => Err(format!("Unknown action code: {other}")),
        }
    }
}

/// The decoded transaction payload.
///
/// `name` is the acting entity's registered name (user or sea); for the
/// create actions the new entity's name rides in `target` instead.
/// `target` carries zero, one or two operands depending on the action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeaStoragePayload {
    /// Requested action.
    pub action: Action,
    /// Acting entity name.
    pub name: String,
    /// Working directory, `/`-delimited and `/`-terminated.
    pub pwd: String,
    /// Action operands (names, paths), up to two.
    pub target: Vec<String>,
    /// Key material for key actions.
    pub key: Key,
    /// File description for file actions.
    pub file_info: Option<FileInfo>,
    /// Signed custody grants for `SeaStoreFile`.
    pub user_operations: Vec<Operation>,
    /// Outbox entries being confirmed by `SeaConfirmOperations`.
    pub sea_operations: Vec<SeaOperation>,
}

impl SeaStoragePayload {
    /// Decode a payload; anything but a complete decode is an invalid
    /// transaction.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ApplyError> {
        if data.is_empty() {
            return Err(ApplyError::invalid("Transaction must contain a payload"));
        }
        codec::from_bytes(data).map_err(|e| ApplyError::invalid(format!("Malformed payload: {e}")))
    }

    /// Encode to canonical bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ApplyError> {
        codec::to_bytes(self).map_err(|e| ApplyError::internal(e.to_string()))
    }
}
