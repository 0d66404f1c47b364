//! # Root
//!
//! The per-entity composition of home tree, shared tree and key
//! registry. Every mutation enters through here: paths and names are
//! validated once, the tree does the structural work, key deltas are
//! applied to the registry, and directory sizes are recomputed along the
//! touched paths before the call returns.
//!
//! Sharing deep-copies the source subtree into the shared tree, so later
//! mutations of the original never leak into what was disclosed. The
//! copy's key references leave the private registry in the same step:
//! each referenced key is decremented and returned as a disclosed
//! [`FileKey`], which the caller records alongside the shared subtree.

use serde::{Deserialize, Serialize};

use crate::file_key::{FileKey, FileKeyMap};
use crate::inode::{Directory, File, Fragment, INode, INodeInfo, KeyDeltas, SeaOperations};
use crate::sea::SeaAction;
use crate::{Hash, Key, StateError};

/// Fixed name of the home tree root.
const HOME_NAME: &str = "home";
/// Fixed name of the shared tree root.
const SHARED_NAME: &str = "shared";

/// Transfer shape for file creation and update: what the client knows
/// about a file before the key registry assigns an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Hash of the encrypted content.
    pub hash: Hash,
    /// Encryption key material (ciphertext until published).
    pub key: Key,
    /// Content-addressed chunks.
    pub fragments: Vec<Fragment>,
}

/// What a user disclosed by sharing: the copied subtree plus the keys
/// that unlock it. Persisted at the entity's shared address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRecord {
    /// Snapshot of the entity's shared tree.
    pub directory: Directory,
    /// Disclosed keys by index.
    pub keys: Vec<FileKey>,
}

/// Home tree + shared tree + key registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// Private tree.
    pub home: Directory,
    /// Tree of disclosed copies.
    pub shared: Directory,
    /// Key registry for the home tree.
    pub keys: FileKeyMap,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a path: non-empty, starts and ends with `/`, no `//`.
pub fn valid_path(path: &str) -> Result<(), StateError> {
    if path.is_empty() || !path.starts_with('/') || !path.ends_with('/') {
        return Err(StateError::InvalidPath(path.to_string()));
    }
    let parts: Vec<&str> = path.split('/').collect();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            return Err(StateError::InvalidPath(path.to_string()));
        }
    }
    Ok(())
}

/// Check a name: non-empty, no `/`.
pub fn valid_name(name: &str) -> Result<(), StateError> {
    if name.is_empty() || name.contains('/') {
        return Err(StateError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Check a path and a name together.
pub fn valid_info(path: &str, name: &str) -> Result<(), StateError> {
    valid_path(path)?;
    valid_name(name)
}

impl Root {
    /// Construct a root with empty home and shared trees.
    pub fn new() -> Self {
        Self {
            home: Directory::new(HOME_NAME),
            shared: Directory::new(SHARED_NAME),
            keys: FileKeyMap::new(),
        }
    }

    /// Create every missing directory along `path` in the home tree.
    pub fn create_directory(&mut self, path: &str) -> Result<(), StateError> {
        valid_path(path)?;
        self.home.create_directory(path)?;
        Ok(())
    }

    /// Create a file at `path`, registering its key.
    pub fn create_file(&mut self, path: &str, info: FileInfo) -> Result<(), StateError> {
        valid_info(path, &info.name)?;
        let key_index = self.keys.add(&info.key, true)?;
        let file = File::new(&info.name, info.size, info.hash, key_index, info.fragments);
        if let Err(e) = self.home.create_file(path, file) {
            // the tree rejected the file; undo the key claim
            let mut deltas = KeyDeltas::new();
            let index = self.keys.add(&info.key, false)?;
            deltas.insert(index, -1);
            self.keys.apply_delta(&deltas);
            return Err(e);
        }
        self.home.update_directory_size(path);
        Ok(())
    }

    /// Rename a file or directory in place.
    pub fn update_name(&mut self, path: &str, name: &str, new_name: &str) -> Result<(), StateError> {
        valid_info(path, name)?;
        valid_name(new_name)?;
        self.home.update_name(path, name, new_name)
    }

    /// Replace a file's content, keeping its key.
    ///
    /// Returns the delete-style operations for the superseded fragments.
    pub fn update_file_data(
        &mut self,
        path: &str,
        info: FileInfo,
        owner: &str,
        group: bool,
    ) -> Result<SeaOperations, StateError> {
        valid_info(path, &info.name)?;
        let operations = self.home.update_file_data(
            path, &info.name, info.hash, info.size, info.fragments, owner, group, false,
        )?;
        self.home.update_directory_size(path);
        Ok(operations)
    }

    /// Re-key a file: register the new key, swap the index, release the
    /// old reference.
    ///
    /// The returned map carries both halves of the exchange in one
    /// batch: delete operations for the old fragments, while the new
    /// fragments are already live in the tree.
    pub fn update_file_key(
        &mut self,
        path: &str,
        info: FileInfo,
        owner: &str,
        group: bool,
    ) -> Result<SeaOperations, StateError> {
        valid_info(path, &info.name)?;
        let key_index = self.keys.add(&info.key, false)?;
        let (deltas, operations) = self.home.update_file_key(
            path, &info.name, key_index, info.hash, info.size, info.fragments, owner, group, false,
        )?;
        self.keys.apply_delta(&deltas);
        self.home.update_directory_size(path);
        Ok(operations)
    }

    /// Publish the plaintext of a registered key.
    pub fn publish_key(&mut self, public_key: &str, key: &str) -> Result<(), StateError> {
        self.keys.publish(public_key, key)
    }

    /// Delete a file, releasing its key reference.
    pub fn delete_file(
        &mut self,
        path: &str,
        name: &str,
        owner: &str,
        group: bool,
    ) -> Result<SeaOperations, StateError> {
        valid_info(path, name)?;
        let (operations, key_index) = self.home.delete_file(path, name, owner, group, false)?;
        let mut deltas = KeyDeltas::new();
        deltas.insert(key_index, -1);
        self.keys.apply_delta(&deltas);
        self.home.update_directory_size(path);
        Ok(operations)
    }

    /// Delete a directory recursively, releasing every key reference
    /// beneath it.
    pub fn delete_directory(
        &mut self,
        path: &str,
        name: &str,
        owner: &str,
        group: bool,
    ) -> Result<SeaOperations, StateError> {
        valid_info(path, name)?;
        let (operations, deltas) = self.home.delete_directory(path, name, owner, group, false)?;
        self.keys.apply_delta(&deltas);
        self.home.update_directory_size(path);
        Ok(operations)
    }

    /// Move a file or directory to another directory.
    pub fn move_inode(&mut self, path: &str, name: &str, new_path: &str) -> Result<(), StateError> {
        valid_info(path, name)?;
        valid_path(new_path)?;
        self.home.move_inode(path, name, new_path)?;
        self.home.update_directory_size(path);
        self.home.update_directory_size(new_path);
        Ok(())
    }

    /// Register a sea as holder of a fragment.
    pub fn add_sea(
        &mut self,
        path: &str,
        name: &str,
        hash: &str,
        sea: crate::inode::FragmentSea,
    ) -> Result<(), StateError> {
        valid_info(path, name)?;
        self.home.add_sea(path, name, hash, sea)
    }

    /// Share `name` under `src_path` into `dst_path` of the shared tree.
    ///
    /// The subtree is cloned, its key references move from the private
    /// registry to the returned disclosure list, and every fragment
    /// binding yields a share operation telling the provider to treat
    /// the bytes as retrievable.
    pub fn share(
        &mut self,
        src_path: &str,
        name: &str,
        dst_path: &str,
        owner: &str,
        group: bool,
    ) -> Result<(SeaOperations, Vec<FileKey>), StateError> {
        valid_info(src_path, name)?;
        valid_path(dst_path)?;
        let copy = self.home.find_inode(src_path, name)?.clone();

        let dst = self.shared.create_directory(dst_path)?;
        if dst.inodes.iter().any(|n| n.name() == name) {
            return Err(StateError::DuplicateName {
                path: dst_path.to_string(),
                name: name.to_string(),
            });
        }

        let mut operations = SeaOperations::new();
        let mut key_indices = Vec::new();
        copy.collect_share(
            SeaAction::shared(group),
            owner,
            true,
            &mut operations,
            &mut key_indices,
        );

        let mut disclosed = Vec::new();
        let mut deltas = KeyDeltas::new();
        for index in key_indices {
            if let Some(entry) = self.keys.get(&index) {
                if !disclosed.iter().any(|k: &FileKey| k.index == index) {
                    disclosed.push(entry.clone());
                }
            }
            *deltas.entry(index).or_insert(0) -= 1;
        }
        self.keys.apply_delta(&deltas);

        dst.inodes.push(copy);
        self.shared.update_directory_size(dst_path);
        Ok((operations, disclosed))
    }

    /// Read a file with its key material attached.
    pub fn get_file(&self, path: &str, name: &str) -> Result<FileInfo, StateError> {
        valid_info(path, name)?;
        let file = self.home.find_file(path, name)?;
        let key = self
            .keys
            .get(&file.key_index)
            .map(|k| k.key.clone())
            .unwrap_or_default();
        Ok(FileInfo {
            name: file.name.clone(),
            size: file.size,
            hash: file.hash.clone(),
            key,
            fragments: file.fragments.clone(),
        })
    }

    /// Read a directory of the home tree.
    pub fn get_directory(&self, path: &str) -> Result<&Directory, StateError> {
        valid_path(path)?;
        self.home.find_directory(path)
    }

    /// Read a file or directory of the home tree.
    pub fn get_inode(&self, path: &str, name: &str) -> Result<&INode, StateError> {
        valid_info(path, name)?;
        self.home.find_inode(path, name)
    }

    /// List a directory of the home tree.
    pub fn list_directory(&self, path: &str) -> Result<Vec<INodeInfo>, StateError> {
        valid_path(path)?;
        self.home.list(path)
    }

    /// Read a shared file.
    ///
    /// The key field is whatever the private registry still holds for
    /// its index; a key already moved to the disclosure list comes back
    /// empty here.
    pub fn get_shared_file(&self, path: &str, name: &str) -> Result<FileInfo, StateError> {
        valid_info(path, name)?;
        let file = self.shared.find_file(path, name)?;
        let key = self
            .keys
            .get(&file.key_index)
            .map(|k| k.key.clone())
            .unwrap_or_default();
        Ok(FileInfo {
            name: file.name.clone(),
            size: file.size,
            hash: file.hash.clone(),
            key,
            fragments: file.fragments.clone(),
        })
    }

    /// Read a file or directory of the shared tree.
    pub fn get_shared_inode(&self, path: &str, name: &str) -> Result<&INode, StateError> {
        valid_info(path, name)?;
        self.shared.find_inode(path, name)
    }

    /// List a directory of the shared tree.
    pub fn list_shared_directory(&self, path: &str) -> Result<Vec<INodeInfo>, StateError> {
        valid_path(path)?;
        self.shared.list(path)
    }
}
