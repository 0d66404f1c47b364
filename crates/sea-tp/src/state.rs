//! # State Facade
//!
//! Per-transaction view of the ledger. Reads go through four caches
//! (user, group, sea, shared) so an address is fetched from the
//! validator at most once; writes are collected per transaction and
//! committed through a single `set_state`. The caches are only updated
//! after the whole batch is acknowledged, so a failure can never leave
//! the facade believing something the ledger does not.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::address;
use crate::errors::ApplyError;
use crate::ports::LedgerContext;
use sea_state::inode::{Directory, FragmentSea, SeaOperations};
use sea_state::root::{FileInfo, SharedRecord};
use sea_state::{codec, Address, DeadlinePolicy, Group, Operation, Sea, SeaOperation, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheKind {
    User,
    Group,
    Sea,
    Shared,
}

/// One staged write: which cache it belongs to, where, and what.
type SaveEntry = (CacheKind, Address, Vec<u8>);

/// Cached read-through/write-through state for one transaction.
pub struct SeaStorageState<'a> {
    context: &'a dyn LedgerContext,
    user_cache: BTreeMap<Address, Vec<u8>>,
    group_cache: BTreeMap<Address, Vec<u8>>,
    sea_cache: BTreeMap<Address, Vec<u8>>,
    shared_cache: BTreeMap<Address, Vec<u8>>,
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ApplyError> {
    codec::to_bytes(value).map_err(|e| ApplyError::internal(e.to_string()))
}

impl<'a> SeaStorageState<'a> {
    /// Construct a facade over a ledger context.
    pub fn new(context: &'a dyn LedgerContext) -> Self {
        Self {
            context,
            user_cache: BTreeMap::new(),
            group_cache: BTreeMap::new(),
            sea_cache: BTreeMap::new(),
            shared_cache: BTreeMap::new(),
        }
    }

    fn cache_mut(&mut self, kind: CacheKind) -> &mut BTreeMap<Address, Vec<u8>> {
        match kind {
            CacheKind::User => &mut self.user_cache,
            CacheKind::Group => &mut self.group_cache,
            CacheKind::Sea => &mut self.sea_cache,
            CacheKind::Shared => &mut self.shared_cache,
        }
    }

    fn cache(&self, kind: CacheKind) -> &BTreeMap<Address, Vec<u8>> {
        match kind {
            CacheKind::User => &self.user_cache,
            CacheKind::Group => &self.group_cache,
            CacheKind::Sea => &self.sea_cache,
            CacheKind::Shared => &self.shared_cache,
        }
    }

    /// Cache-first read of one address.
    fn read_through(
        &mut self,
        kind: CacheKind,
        address: &str,
    ) -> Result<Option<Vec<u8>>, ApplyError> {
        if let Some(bytes) = self.cache(kind).get(address) {
            return Ok(Some(bytes.clone()));
        }
        let results = self.context.get_state(&[address.to_string()])?;
        match results.get(address) {
            Some(bytes) if !bytes.is_empty() => {
                self.cache_mut(kind)
                    .insert(address.to_string(), bytes.clone());
                Ok(Some(bytes.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Commit staged writes in one batch; caches update only on full
    /// acknowledgement.
    fn save_batch(&mut self, entries: Vec<SaveEntry>) -> Result<(), ApplyError> {
        let map: BTreeMap<Address, Vec<u8>> = entries
            .iter()
            .map(|(_, address, bytes)| (address.clone(), bytes.clone()))
            .collect();
        let written = self.context.set_state(&map)?;
        if written.len() != map.len() {
            return Err(ApplyError::internal(
                "Fewer addresses in set response than requested",
            ));
        }
        for (kind, address, bytes) in entries {
            self.cache_mut(kind).insert(address, bytes);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Entity loads
    // -------------------------------------------------------------------------

    /// Load the user registered under `name` for this signer.
    pub fn get_user(&mut self, name: &str, public_key: &str) -> Result<(Address, User), ApplyError> {
        let address = address::user_address(name, public_key)
            .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
        let user = self.get_user_by_address(&address)?;
        if user.public_key != public_key {
            return Err(ApplyError::invalid(
                "Signer public key doesn't match the stored user key",
            ));
        }
        Ok((address, user))
    }

    /// Load a user record directly by address.
    pub fn get_user_by_address(&mut self, address: &str) -> Result<User, ApplyError> {
        match self.read_through(CacheKind::User, address)? {
            Some(bytes) => Ok(codec::from_bytes(&bytes)?),
            None => Err(ApplyError::invalid("User doesn't exist")),
        }
    }

    /// Load a group record by name.
    pub fn get_group(&mut self, name: &str) -> Result<(Address, Group), ApplyError> {
        let address = address::group_address(name);
        match self.read_through(CacheKind::Group, &address)? {
            Some(bytes) => Ok((address, codec::from_bytes(&bytes)?)),
            None => Err(ApplyError::invalid("Group doesn't exist")),
        }
    }

    /// Load the sea registered under `name` for this signer.
    pub fn get_sea(&mut self, name: &str, public_key: &str) -> Result<(Address, Sea), ApplyError> {
        let address = address::sea_address(name, public_key)
            .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
        let sea = self.get_sea_by_address(&address)?;
        if sea.public_key != public_key {
            return Err(ApplyError::invalid(
                "Signer public key doesn't match the stored sea key",
            ));
        }
        Ok((address, sea))
    }

    /// Load a sea record directly by address.
    pub fn get_sea_by_address(&mut self, address: &str) -> Result<Sea, ApplyError> {
        match self.read_through(CacheKind::Sea, address)? {
            Some(bytes) => Ok(codec::from_bytes(&bytes)?),
            None => Err(ApplyError::invalid("Sea doesn't exist")),
        }
    }

    /// Load a shared record, if any has been written yet.
    pub fn get_shared_record(&mut self, address: &str) -> Result<Option<SharedRecord>, ApplyError> {
        match self.read_through(CacheKind::Shared, address)? {
            Some(bytes) => Ok(Some(codec::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Entity creation
    // -------------------------------------------------------------------------

    /// Register a fresh user record for the signer.
    pub fn create_user(&mut self, name: &str, signer: &str) -> Result<(), ApplyError> {
        if name.is_empty() {
            return Err(ApplyError::invalid("User name must not be empty"));
        }
        let address = address::user_address(name, signer)
            .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
        if self.read_through(CacheKind::User, &address)?.is_some() {
            return Err(ApplyError::invalid("User already exists"));
        }
        let user = User::new(signer);
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// Register a fresh group led by `leader_address`.
    pub fn create_group(&mut self, name: &str, leader_address: &str) -> Result<(), ApplyError> {
        if name.is_empty() {
            return Err(ApplyError::invalid("Group name must not be empty"));
        }
        let address = address::group_address(name);
        if self.read_through(CacheKind::Group, &address)?.is_some() {
            return Err(ApplyError::invalid("Group already exists"));
        }
        let group = Group::new(name, leader_address);
        self.save_batch(vec![(CacheKind::Group, address, encode(&group)?)])
    }

    /// Register a fresh sea record for the signer.
    pub fn create_sea(&mut self, name: &str, signer: &str) -> Result<(), ApplyError> {
        if name.is_empty() {
            return Err(ApplyError::invalid("Sea name must not be empty"));
        }
        let address = address::sea_address(name, signer)
            .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
        if self.read_through(CacheKind::Sea, &address)?.is_some() {
            return Err(ApplyError::invalid("Sea already exists"));
        }
        let sea = Sea::new(signer);
        self.save_batch(vec![(CacheKind::Sea, address, encode(&sea)?)])
    }

    // -------------------------------------------------------------------------
    // User actions
    // -------------------------------------------------------------------------

    /// Load every sea an operation map touches and stage the additions.
    fn stage_sea_operations(
        &mut self,
        operations: SeaOperations,
        batch: &mut Vec<SaveEntry>,
    ) -> Result<(), ApplyError> {
        for (address, ops) in operations {
            let mut sea = self.get_sea_by_address(&address)?;
            sea.add_operations(ops)?;
            batch.push((CacheKind::Sea, address, encode(&sea)?));
        }
        Ok(())
    }

    /// `UserCreateDirectory`.
    pub fn user_create_directory(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        user.root.create_directory(path)?;
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// `UserCreateFile`.
    pub fn user_create_file(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        info: FileInfo,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        user.root.create_file(path, info)?;
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// `UserUpdateName`.
    pub fn user_update_name(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        target: &str,
        new_name: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        user.root.update_name(path, target, new_name)?;
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// `UserUpdateFileData`: replaces content and notifies every sea
    /// holding superseded fragments.
    pub fn user_update_file_data(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        info: FileInfo,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        let operations = user.root.update_file_data(path, info, signer, false)?;
        let mut batch = vec![(CacheKind::User, address, encode(&user)?)];
        self.stage_sea_operations(operations, &mut batch)?;
        self.save_batch(batch)
    }

    /// `UserUpdateFileKey`: re-keys and notifies seas in the same batch.
    pub fn user_update_file_key(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        info: FileInfo,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        let operations = user.root.update_file_key(path, info, signer, false)?;
        let mut batch = vec![(CacheKind::User, address, encode(&user)?)];
        self.stage_sea_operations(operations, &mut batch)?;
        self.save_batch(batch)
    }

    /// `UserDeleteFile`.
    pub fn user_delete_file(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        target: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        let operations = user.root.delete_file(path, target, signer, false)?;
        let mut batch = vec![(CacheKind::User, address, encode(&user)?)];
        self.stage_sea_operations(operations, &mut batch)?;
        self.save_batch(batch)
    }

    /// `UserDeleteDirectory`.
    pub fn user_delete_directory(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        target: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        let operations = user.root.delete_directory(path, target, signer, false)?;
        let mut batch = vec![(CacheKind::User, address, encode(&user)?)];
        self.stage_sea_operations(operations, &mut batch)?;
        self.save_batch(batch)
    }

    /// `UserPublishKey`.
    pub fn user_publish_key(
        &mut self,
        name: &str,
        signer: &str,
        key: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        user.root.publish_key(signer, key)?;
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// `UserMove`.
    pub fn user_move(
        &mut self,
        name: &str,
        signer: &str,
        path: &str,
        target: &str,
        new_path: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        user.root.move_inode(path, target, new_path)?;
        self.save_batch(vec![(CacheKind::User, address, encode(&user)?)])
    }

    /// `UserShare`: copies into the shared tree, refreshes the shared
    /// record with the disclosed keys, and notifies the holding seas.
    pub fn user_share(
        &mut self,
        name: &str,
        signer: &str,
        src_path: &str,
        target: &str,
        dst_path: &str,
    ) -> Result<(), ApplyError> {
        let (address, mut user) = self.get_user(name, signer)?;
        let (operations, disclosed) = user.root.share(src_path, target, dst_path, signer, false)?;

        let shared_address = address::user_shared_address(name, signer)
            .map_err(|_| ApplyError::invalid("Invalid signer public key"))?;
        let mut record = self
            .get_shared_record(&shared_address)?
            .unwrap_or_else(|| SharedRecord {
                directory: Directory::new("shared"),
                keys: Vec::new(),
            });
        record.directory = user.root.shared.clone();
        for key in disclosed {
            if !record.keys.iter().any(|k| k.index == key.index) {
                record.keys.push(key);
            }
        }

        let mut batch = vec![
            (CacheKind::User, address, encode(&user)?),
            (CacheKind::Shared, shared_address, encode(&record)?),
        ];
        self.stage_sea_operations(operations, &mut batch)?;
        self.save_batch(batch)
    }

    // -------------------------------------------------------------------------
    // Sea actions
    // -------------------------------------------------------------------------

    /// `SeaStoreFile`: register custody for each signed grant.
    ///
    /// Every grant must name the submitting sea, verify against its
    /// owner's key, and be fresh under the deadline policy. The owner's
    /// fragment gains a binding and the sea's handle count grows by one
    /// per grant.
    pub fn sea_store_file(
        &mut self,
        name: &str,
        signer: &str,
        operations: Vec<Operation>,
        policy: DeadlinePolicy,
        now: i64,
    ) -> Result<(), ApplyError> {
        let (sea_address, mut sea) = self.get_sea(name, signer)?;
        let mut owners: BTreeMap<Address, User> = BTreeMap::new();

        for operation in operations {
            if operation.sea != signer {
                return Err(ApplyError::invalid(
                    "Operation was not granted to the submitting sea",
                ));
            }
            if !operation.verify() {
                return Err(ApplyError::invalid("Operation signature is invalid"));
            }
            if !policy.accepts(operation.timestamp, now) {
                return Err(ApplyError::invalid("Operation is past its deadline"));
            }

            let user = match owners.entry(operation.address.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let loaded = self.get_user_by_address(entry.key())?;
                    entry.insert(loaded)
                }
            };
            if user.public_key != operation.owner {
                return Err(ApplyError::invalid(
                    "Operation owner doesn't match the stored user key",
                ));
            }
            user.root.add_sea(
                &operation.path,
                &operation.name,
                &operation.hash,
                FragmentSea::new(sea_address.clone(), signer.to_string(), operation.timestamp),
            )?;
            sea.handles += 1;
        }

        let mut batch = Vec::new();
        for (address, user) in owners {
            batch.push((CacheKind::User, address, encode(&user)?));
        }
        batch.push((CacheKind::Sea, sea_address, encode(&sea)?));
        self.save_batch(batch)
    }

    /// `SeaConfirmOperations`: drop confirmed entries from the outbox.
    pub fn sea_confirm_operations(
        &mut self,
        name: &str,
        signer: &str,
        operations: &[SeaOperation],
    ) -> Result<(), ApplyError> {
        let (address, mut sea) = self.get_sea(name, signer)?;
        sea.confirm_operations(operations)?;
        self.save_batch(vec![(CacheKind::Sea, address, encode(&sea)?)])
    }
}
