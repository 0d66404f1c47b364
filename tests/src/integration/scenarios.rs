//! # End-to-End Scenarios
//!
//! Drives the complete transaction path — payload bytes in, canonical
//! state bytes out — through the handler against an in-memory ledger
//! context:
//!
//! ```text
//! [payload] ──apply──→ [SeaStorageHandler]
//!                              │
//!                    [SeaStorageState facade]
//!                              │ batched set_state
//!                    [MemoryLedgerContext]
//! ```
//!
//! The cast: Alice owns a file hierarchy, `s1` is a storage provider.
//! Each test replays the flow up to the stage it asserts on, so every
//! test runs against a state an actual ledger could have produced.

#[cfg(test)]
use sea_state::inode::Fragment;
#[cfg(test)]
use sea_state::root::FileInfo;
#[cfg(test)]
use sea_state::{codec, Operation, Sea, SeaAction, User};
#[cfg(test)]
use sea_tp::adapters::MemoryLedgerContext;
#[cfg(test)]
use sea_tp::{
    address, Action, SeaStorageHandler, SeaStoragePayload, TpProcessRequest, TransactionHandler,
};

#[cfg(test)]
const ALICE_PRIV: &str = "1111111111111111111111111111111111111111111111111111111111111111";
#[cfg(test)]
const SEA_PRIV: &str = "2222222222222222222222222222222222222222222222222222222222222222";
#[cfg(test)]
const MALLORY_PRIV: &str = "3333333333333333333333333333333333333333333333333333333333333333";

#[cfg(test)]
const KEY_1: &str = "00112233445566778899aabbccddeeff";
#[cfg(test)]
const KEY_2: &str = "ffeeddccbbaa99887766554433221100";
#[cfg(test)]
const HASH_1: &str = "content-hash-1";
#[cfg(test)]
const FRAG_1: &str = "fragment-hash-1";

/// A ledger plus the keys of everyone acting on it.
#[cfg(test)]
struct Scenario {
    context: MemoryLedgerContext,
    handler: SeaStorageHandler,
    alice_pk: String,
    sea_pk: String,
}

#[cfg(test)]
impl Scenario {
    fn new() -> Self {
        Self {
            context: MemoryLedgerContext::new(),
            handler: SeaStorageHandler::new(),
            alice_pk: sea_crypto::ecdsa::public_key_hex(ALICE_PRIV).unwrap(),
            sea_pk: sea_crypto::ecdsa::public_key_hex(SEA_PRIV).unwrap(),
        }
    }

    fn apply(&self, signer: &str, payload: SeaStoragePayload) -> Result<(), sea_tp::ApplyError> {
        let request = TpProcessRequest {
            signature: "txn".to_string(),
            signer_public_key: signer.to_string(),
            payload: payload.to_bytes().unwrap(),
        };
        self.handler.apply(&request, &self.context)
    }

    fn alice_address(&self) -> String {
        address::user_address("alice", &self.alice_pk).unwrap()
    }

    fn sea_address(&self) -> String {
        address::sea_address("s1", &self.sea_pk).unwrap()
    }

    fn load_alice(&self) -> User {
        codec::from_bytes(&self.context.entry(&self.alice_address()).unwrap()).unwrap()
    }

    fn load_sea(&self) -> Sea {
        codec::from_bytes(&self.context.entry(&self.sea_address()).unwrap()).unwrap()
    }

    fn file_info(key: &str) -> FileInfo {
        FileInfo {
            name: "a.bin".to_string(),
            size: 100,
            hash: HASH_1.to_string(),
            key: key.to_string(),
            fragments: vec![Fragment::new(FRAG_1.to_string(), 100, Vec::new())],
        }
    }

    /// Stage 1: Alice registers and creates `/docs/`.
    fn with_alice(self) -> Self {
        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::CreateUser,
                target: vec!["alice".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::UserCreateDirectory,
                name: "alice".to_string(),
                pwd: "/".to_string(),
                target: vec!["docs/".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        self
    }

    /// Stage 2: upload `a.bin` under key 1, then re-key it to key 2.
    fn with_rekeyed_file(self) -> Self {
        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::UserCreateFile,
                name: "alice".to_string(),
                pwd: "/docs/".to_string(),
                file_info: Some(Self::file_info(KEY_1)),
                ..Default::default()
            },
        )
        .unwrap();
        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::UserUpdateFileKey,
                name: "alice".to_string(),
                pwd: "/docs/".to_string(),
                file_info: Some(Self::file_info(KEY_2)),
                ..Default::default()
            },
        )
        .unwrap();
        self
    }

    /// Stage 3: `s1` registers, stores the fragment, and Alice shares
    /// the file.
    fn with_stored_and_shared(self) -> Self {
        self.apply(
            &self.sea_pk,
            SeaStoragePayload {
                action: Action::CreateSea,
                target: vec!["s1".to_string()],
                ..Default::default()
            },
        )
        .unwrap();

        let grant = Operation::sign(
            &self.alice_address(),
            &self.alice_pk,
            &self.sea_pk,
            "/docs/",
            "a.bin",
            FRAG_1,
            100,
            1_700_000_000,
            ALICE_PRIV,
        )
        .unwrap();
        self.apply(
            &self.sea_pk,
            SeaStoragePayload {
                action: Action::SeaStoreFile,
                name: "s1".to_string(),
                user_operations: vec![grant],
                ..Default::default()
            },
        )
        .unwrap();

        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::UserShare,
                name: "alice".to_string(),
                pwd: "/docs/".to_string(),
                target: vec!["a.bin".to_string(), "/docs/".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        self
    }

    /// Stage 4: Alice deletes the original file.
    fn with_deleted_file(self) -> Self {
        self.apply(
            &self.alice_pk,
            SeaStoragePayload {
                action: Action::UserDeleteFile,
                name: "alice".to_string(),
                pwd: "/docs/".to_string(),
                target: vec!["a.bin".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_list() {
        let scenario = Scenario::new().with_alice();
        let user = scenario.load_alice();
        assert!(user.root.list_directory("/docs/").unwrap().is_empty());

        // the record sits at namespace + user prefix + keyed name hash
        let address = scenario.alice_address();
        assert_eq!(address.len(), 70);
        let mut seed = b"alice".to_vec();
        seed.extend(hex::decode(&scenario.alice_pk).unwrap());
        let expected = format!(
            "{}{}{}",
            address::namespace(),
            &sea_crypto::sha256_hex(b"User")[..4],
            &sea_crypto::sha512_hex(&seed)[..60]
        );
        assert_eq!(address, expected);
    }

    #[test]
    fn test_rekey_leaves_single_key() {
        let scenario = Scenario::new().with_alice().with_rekeyed_file();
        let user = scenario.load_alice();

        assert_eq!(user.root.keys.keys.len(), 1);
        let entry = user.root.keys.search(KEY_2).unwrap();
        assert_eq!(entry.used, 1);
        assert!(user.root.keys.search(KEY_1).is_none());

        // no seas were attached, so no sea record was created either
        assert!(scenario.context.entry(&scenario.sea_address()).is_none());
    }

    #[test]
    fn test_store_then_share_fills_outbox() {
        let scenario = Scenario::new()
            .with_alice()
            .with_rekeyed_file()
            .with_stored_and_shared();

        let user = scenario.load_alice();
        let file = user.root.home.find_file("/docs/", "a.bin").unwrap();
        assert_eq!(file.fragments[0].seas.len(), 1);
        assert_eq!(file.fragments[0].seas[0].public_key, scenario.sea_pk);

        let sea = scenario.load_sea();
        assert_eq!(sea.handles, 1);
        assert_eq!(sea.operations.len(), 1);
        let op = sea.operations.values().next().unwrap();
        assert_eq!(op.action, SeaAction::UserShared);
        assert_eq!(op.hash, FRAG_1);

        // the shared record carries the disclosed copy
        let shared_address = address::user_shared_address("alice", &scenario.alice_pk).unwrap();
        assert!(scenario.context.entry(&shared_address).is_some());
    }

    #[test]
    fn test_delete_cascades_to_outbox() {
        let scenario = Scenario::new()
            .with_alice()
            .with_rekeyed_file()
            .with_stored_and_shared()
            .with_deleted_file();

        let user = scenario.load_alice();
        assert!(user.root.home.find_file("/docs/", "a.bin").is_err());
        // the shared copy is independent of the deleted original
        assert!(user.root.shared.find_file("/docs/", "a.bin").is_ok());

        let sea = scenario.load_sea();
        assert_eq!(sea.operations.len(), 2);
        let actions: Vec<SeaAction> = sea.operations.values().map(|op| op.action).collect();
        assert!(actions.contains(&SeaAction::UserShared));
        assert!(actions.contains(&SeaAction::UserDelete));
    }

    #[test]
    fn test_confirm_clears_outbox_keeps_handles() {
        let scenario = Scenario::new()
            .with_alice()
            .with_rekeyed_file()
            .with_stored_and_shared()
            .with_deleted_file();

        let pending: Vec<_> = scenario.load_sea().operations.values().cloned().collect();
        scenario
            .apply(
                &scenario.sea_pk,
                SeaStoragePayload {
                    action: Action::SeaConfirmOperations,
                    name: "s1".to_string(),
                    sea_operations: pending,
                    ..Default::default()
                },
            )
            .unwrap();

        let sea = scenario.load_sea();
        assert!(sea.operations.is_empty());
        // handles track custody, not the outbox
        assert_eq!(sea.handles, 1);
    }

    #[test]
    fn test_grant_for_other_sea_rejected() {
        let scenario = Scenario::new().with_alice().with_rekeyed_file();
        scenario
            .apply(
                &scenario.sea_pk,
                SeaStoragePayload {
                    action: Action::CreateSea,
                    target: vec!["s1".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        // the grant names mallory's key as the sea, but s1 submits it
        let mallory_pk = sea_crypto::ecdsa::public_key_hex(MALLORY_PRIV).unwrap();
        let grant = Operation::sign(
            &scenario.alice_address(),
            &scenario.alice_pk,
            &mallory_pk,
            "/docs/",
            "a.bin",
            FRAG_1,
            100,
            1_700_000_000,
            ALICE_PRIV,
        )
        .unwrap();

        let before_user = scenario.context.entry(&scenario.alice_address());
        let before_sea = scenario.context.entry(&scenario.sea_address());
        let err = scenario
            .apply(
                &scenario.sea_pk,
                SeaStoragePayload {
                    action: Action::SeaStoreFile,
                    name: "s1".to_string(),
                    user_operations: vec![grant],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, sea_tp::ApplyError::InvalidTransaction(_)));

        // nothing moved
        assert_eq!(scenario.context.entry(&scenario.alice_address()), before_user);
        assert_eq!(scenario.context.entry(&scenario.sea_address()), before_sea);
    }

    #[test]
    fn test_tampered_grant_rejected() {
        let scenario = Scenario::new().with_alice().with_rekeyed_file();
        scenario
            .apply(
                &scenario.sea_pk,
                SeaStoragePayload {
                    action: Action::CreateSea,
                    target: vec!["s1".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        let mut grant = Operation::sign(
            &scenario.alice_address(),
            &scenario.alice_pk,
            &scenario.sea_pk,
            "/docs/",
            "a.bin",
            FRAG_1,
            100,
            1_700_000_000,
            ALICE_PRIV,
        )
        .unwrap();
        grant.size = 1_000_000;

        let err = scenario
            .apply(
                &scenario.sea_pk,
                SeaStoragePayload {
                    action: Action::SeaStoreFile,
                    name: "s1".to_string(),
                    user_operations: vec![grant],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, sea_tp::ApplyError::InvalidTransaction(_)));
    }

    #[test]
    fn test_publish_key_is_idempotent() {
        let scenario = Scenario::new().with_alice();

        // upload with the ECIES ciphertext of the key, as a client would
        let cipher = sea_crypto::to_hex(
            &sea_crypto::encrypt(&scenario.alice_pk, &hex::decode(KEY_1).unwrap()).unwrap(),
        );
        scenario
            .apply(
                &scenario.alice_pk,
                SeaStoragePayload {
                    action: Action::UserCreateFile,
                    name: "alice".to_string(),
                    pwd: "/docs/".to_string(),
                    file_info: Some(Scenario::file_info(&cipher)),
                    ..Default::default()
                },
            )
            .unwrap();

        let publish = || SeaStoragePayload {
            action: Action::UserPublishKey,
            name: "alice".to_string(),
            key: KEY_1.to_string(),
            ..Default::default()
        };
        scenario.apply(&scenario.alice_pk, publish()).unwrap();
        let once = scenario.context.entry(&scenario.alice_address());
        scenario.apply(&scenario.alice_pk, publish()).unwrap();
        let twice = scenario.context.entry(&scenario.alice_address());
        assert_eq!(once, twice);

        let user = scenario.load_alice();
        assert_eq!(user.root.get_file("/docs/", "a.bin").unwrap().key, KEY_1);
    }

    #[test]
    fn test_move_between_directories() {
        let scenario = Scenario::new().with_alice().with_rekeyed_file();
        scenario
            .apply(
                &scenario.alice_pk,
                SeaStoragePayload {
                    action: Action::UserCreateDirectory,
                    name: "alice".to_string(),
                    pwd: "/".to_string(),
                    target: vec!["archive/".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();
        scenario
            .apply(
                &scenario.alice_pk,
                SeaStoragePayload {
                    action: Action::UserMove,
                    name: "alice".to_string(),
                    pwd: "/docs/".to_string(),
                    target: vec!["a.bin".to_string(), "/archive/".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();

        let user = scenario.load_alice();
        assert!(user.root.home.find_file("/docs/", "a.bin").is_err());
        assert!(user.root.home.find_file("/archive/", "a.bin").is_ok());
        assert_eq!(user.root.home.find_directory("/archive/").unwrap().size, 100);
        assert_eq!(user.root.home.find_directory("/docs/").unwrap().size, 0);
    }

    #[test]
    fn test_wrong_signer_cannot_touch_foreign_tree() {
        let scenario = Scenario::new().with_alice();
        let mallory_pk = sea_crypto::ecdsa::public_key_hex(MALLORY_PRIV).unwrap();
        // mallory signs a transaction claiming alice's name; the address
        // derivation sends it to a record that doesn't exist
        let err = scenario
            .apply(
                &mallory_pk,
                SeaStoragePayload {
                    action: Action::UserCreateDirectory,
                    name: "alice".to_string(),
                    pwd: "/".to_string(),
                    target: vec!["evil/".to_string()],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, sea_tp::ApplyError::InvalidTransaction(_)));
    }
}
