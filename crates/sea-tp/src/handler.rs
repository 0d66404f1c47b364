//! # Transaction Handler
//!
//! Decodes the payload, resolves operands against the working
//! directory, and dispatches to the state facade. Validation failures
//! surface as invalid transactions, infrastructure failures as internal
//! errors; in both cases the runtime discards pending writes.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::address;
use crate::errors::ApplyError;
use crate::payload::{Action, SeaStoragePayload};
use crate::ports::{LedgerContext, TpProcessRequest, TransactionHandler};
use crate::state::SeaStorageState;
use sea_state::DeadlinePolicy;

/// The SeaStorage transaction family handler.
pub struct SeaStorageHandler {
    family_versions: Vec<String>,
    deadline: DeadlinePolicy,
}

impl Default for SeaStorageHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SeaStorageHandler {
    /// Construct a handler with the default deadline policy.
    pub fn new() -> Self {
        Self::with_policy(DeadlinePolicy::default())
    }

    /// Construct a handler with an explicit deadline policy for custody
    /// grants.
    pub fn with_policy(deadline: DeadlinePolicy) -> Self {
        Self {
            family_versions: vec![address::FAMILY_VERSION.to_string()],
            deadline,
        }
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Resolve an operand path against the working directory. Absolute
/// operands stand alone; relative ones append to `pwd`.
fn resolve_path(pwd: &str, target: &str) -> String {
    if target.starts_with('/') {
        target.to_string()
    } else {
        format!("{pwd}{target}")
    }
}

/// Fetch operand `index`, requiring it to be present and non-empty.
fn operand<'p>(payload: &'p SeaStoragePayload, index: usize) -> Result<&'p str, ApplyError> {
    match payload.target.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApplyError::invalid(format!(
            "Target operand {index} is missing or empty"
        ))),
    }
}

fn file_info(payload: SeaStoragePayload) -> Result<sea_state::root::FileInfo, ApplyError> {
    payload
        .file_info
        .ok_or_else(|| ApplyError::invalid("FileInfo is missing"))
}

impl TransactionHandler for SeaStorageHandler {
    fn family_name(&self) -> String {
        address::FAMILY_NAME.to_string()
    }

    fn family_versions(&self) -> Vec<String> {
        self.family_versions.clone()
    }

    fn namespaces(&self) -> Vec<String> {
        vec![address::namespace().to_string()]
    }

    fn apply(
        &self,
        request: &TpProcessRequest,
        context: &dyn LedgerContext,
    ) -> Result<(), ApplyError> {
        let signer = request.signer_public_key.as_str();
        let payload = SeaStoragePayload::from_bytes(&request.payload)?;
        let mut state = SeaStorageState::new(context);

        debug!(
            txn = %request.signature,
            signer = %signer,
            name = %payload.name,
            action = ?payload.action,
            "applying transaction"
        );

        match payload.action {
            Action::CreateUser => state.create_user(operand(&payload, 0)?, signer),
            Action::CreateGroup => {
                let leader = address::user_address(&payload.name, signer)
                    .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
                state.create_group(operand(&payload, 0)?, &leader)
            }
            Action::CreateSea => state.create_sea(operand(&payload, 0)?, signer),

            Action::UserCreateDirectory => {
                let path = resolve_path(&payload.pwd, operand(&payload, 0)?);
                state.user_create_directory(&payload.name, signer, &path)
            }
            Action::UserCreateFile => {
                let name = payload.name.clone();
                let pwd = payload.pwd.clone();
                state.user_create_file(&name, signer, &pwd, file_info(payload)?)
            }
            Action::UserDeleteFile => {
                state.user_delete_file(&payload.name, signer, &payload.pwd, operand(&payload, 0)?)
            }
            Action::UserDeleteDirectory => state.user_delete_directory(
                &payload.name,
                signer,
                &payload.pwd,
                operand(&payload, 0)?,
            ),
            Action::UserUpdateName => state.user_update_name(
                &payload.name,
                signer,
                &payload.pwd,
                operand(&payload, 0)?,
                operand(&payload, 1)?,
            ),
            Action::UserUpdateFileData => {
                let name = payload.name.clone();
                let pwd = payload.pwd.clone();
                state.user_update_file_data(&name, signer, &pwd, file_info(payload)?)
            }
            Action::UserUpdateFileKey => {
                let name = payload.name.clone();
                let pwd = payload.pwd.clone();
                state.user_update_file_key(&name, signer, &pwd, file_info(payload)?)
            }
            Action::UserPublishKey => {
                if payload.key.is_empty() {
                    return Err(ApplyError::invalid("Key is missing"));
                }
                state.user_publish_key(&payload.name, signer, &payload.key)
            }
            Action::UserMove => {
                let new_path = resolve_path(&payload.pwd, operand(&payload, 1)?);
                state.user_move(
                    &payload.name,
                    signer,
                    &payload.pwd,
                    operand(&payload, 0)?,
                    &new_path,
                )
            }
            Action::UserShare => {
                let dst_path = resolve_path(&payload.pwd, operand(&payload, 1)?);
                state.user_share(
                    &payload.name,
                    signer,
                    &payload.pwd,
                    operand(&payload, 0)?,
                    &dst_path,
                )
            }

            Action::SeaStoreFile => {
                if payload.user_operations.is_empty() {
                    return Err(ApplyError::invalid("No operations in payload"));
                }
                state.sea_store_file(
                    &payload.name,
                    signer,
                    payload.user_operations,
                    self.deadline,
                    now_secs(),
                )
            }
            Action::SeaConfirmOperations => {
                if payload.sea_operations.is_empty() {
                    return Err(ApplyError::invalid("No operations in payload"));
                }
                state.sea_confirm_operations(&payload.name, signer, &payload.sea_operations)
            }

            Action::Unset => Err(ApplyError::invalid("Action is unset")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryLedgerContext;

    const PK: &str = "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn request(payload: &SeaStoragePayload, signer: &str) -> TpProcessRequest {
        TpProcessRequest {
            signature: "txn-1".to_string(),
            signer_public_key: signer.to_string(),
            payload: payload.to_bytes().unwrap(),
        }
    }

    #[test]
    fn test_family_metadata() {
        let handler = SeaStorageHandler::new();
        assert_eq!(handler.family_name(), "SeaStorage");
        assert_eq!(handler.family_versions(), vec!["1.0.0".to_string()]);
        assert_eq!(handler.namespaces(), vec![address::namespace().to_string()]);
    }

    #[test]
    fn test_garbage_payload_is_invalid() {
        let handler = SeaStorageHandler::new();
        let context = MemoryLedgerContext::new();
        let request = TpProcessRequest {
            signature: "txn-1".to_string(),
            signer_public_key: PK.to_string(),
            payload: vec![0xde, 0xad, 0xbe, 0xef],
        };
        assert!(matches!(
            handler.apply(&request, &context),
            Err(ApplyError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_unset_action_rejected() {
        let handler = SeaStorageHandler::new();
        let context = MemoryLedgerContext::new();
        let payload = SeaStoragePayload::default();
        assert!(handler.apply(&request(&payload, PK), &context).is_err());
    }

    #[test]
    fn test_create_user_via_dispatch() {
        let handler = SeaStorageHandler::new();
        let context = MemoryLedgerContext::new();
        let payload = SeaStoragePayload {
            action: Action::CreateUser,
            target: vec!["alice".to_string()],
            ..Default::default()
        };
        handler.apply(&request(&payload, PK), &context).unwrap();
        let address = address::user_address("alice", PK).unwrap();
        assert!(context.entry(&address).is_some());
    }

    #[test]
    fn test_missing_operand_rejected() {
        let handler = SeaStorageHandler::new();
        let context = MemoryLedgerContext::new();
        let payload = SeaStoragePayload {
            action: Action::CreateUser,
            ..Default::default()
        };
        assert!(handler.apply(&request(&payload, PK), &context).is_err());
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/docs/", "inner/"), "/docs/inner/");
        assert_eq!(resolve_path("/docs/", "/other/"), "/other/");
    }
}
