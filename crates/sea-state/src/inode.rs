//! # INode Tree
//!
//! The content-addressed file tree. A node is either a [`File`] carrying
//! fragment metadata or a [`Directory`] carrying children; all recursion
//! is explicit over the enum, and `move` is detach-then-attach rather
//! than pointer aliasing, so the tree is always a strict hierarchy.
//!
//! Paths are absolute, `/`-separated, and `/`-terminated: `"/a/b/"`
//! names the directory `b` under `a`. The path parser walks the interior
//! components; a missing component is [`StateError::PathNotFound`] and a
//! file sitting where a directory is expected is
//! [`StateError::PathBlockedByFile`].
//!
//! Mutations that discard fragment bindings (delete, data replacement,
//! re-keying) return the provider work they caused: one delete-style
//! [`SeaOperation`] per `(fragment, sea)` pair, bucketed by sea address,
//! plus reference-count deltas for the key registry. Callers forward
//! those to the sea outboxes and the [`FileKeyMap`].
//!
//! Directory sizes are not maintained incrementally. Root-level
//! operations call [`Directory::update_directory_size`] once, after the
//! mutation, to recompute sums along the touched path.
//!
//! [`FileKeyMap`]: crate::file_key::FileKeyMap

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sea::{SeaAction, SeaOperation};
use crate::{Address, Hash, StateError};

/// Pending provider work bucketed by sea address.
pub type SeaOperations = BTreeMap<Address, Vec<SeaOperation>>;

/// Reference-count deltas for the file-key registry.
pub type KeyDeltas = BTreeMap<Hash, i32>;

/// A node in the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum INode {
    /// Leaf: an encrypted file split into fragments.
    File(File),
    /// Interior node: a directory of child nodes.
    Directory(Directory),
}

impl INode {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            INode::File(f) => &f.name,
            INode::Directory(d) => &d.name,
        }
    }

    /// Node size in bytes (directories: sum of children).
    pub fn size(&self) -> i64 {
        match self {
            INode::File(f) => f.size,
            INode::Directory(d) => d.size,
        }
    }

    /// Content hash.
    pub fn hash(&self) -> &Hash {
        match self {
            INode::File(f) => &f.hash,
            INode::Directory(d) => &d.hash,
        }
    }

    /// Whether this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, INode::Directory(_))
    }

    fn set_name(&mut self, name: &str) {
        match self {
            INode::File(f) => f.name = name.to_string(),
            INode::Directory(d) => d.name = name.to_string(),
        }
    }

    /// Walk the subtree collecting one operation per `(fragment, sea)`
    /// binding and every key index encountered.
    pub(crate) fn collect_share(
        &self,
        action: SeaAction,
        owner: &str,
        shared: bool,
        operations: &mut SeaOperations,
        key_indices: &mut Vec<Hash>,
    ) {
        match self {
            INode::File(file) => {
                key_indices.push(file.key_index.clone());
                file.append_sea_operations(action, owner, shared, operations);
            }
            INode::Directory(dir) => {
                for child in &dir.inodes {
                    child.collect_share(action, owner, shared, operations, key_indices);
                }
            }
        }
    }
}

/// An encrypted file: content hash, key reference, and the fragments
/// providers hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// File name, unique among siblings.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Hash of the encrypted content.
    pub hash: Hash,
    /// Index into the owning root's key registry.
    pub key_index: Hash,
    /// Content-addressed chunks, in upload order.
    pub fragments: Vec<Fragment>,
}

impl File {
    /// Construct a file record.
    pub fn new(name: &str, size: i64, hash: Hash, key_index: Hash, fragments: Vec<Fragment>) -> Self {
        Self {
            name: name.to_string(),
            size,
            hash,
            key_index,
            fragments,
        }
    }

    /// Append one operation per `(fragment, sea)` binding of this file.
    pub(crate) fn append_sea_operations(
        &self,
        action: SeaAction,
        owner: &str,
        shared: bool,
        operations: &mut SeaOperations,
    ) {
        for fragment in &self.fragments {
            for sea in &fragment.seas {
                operations
                    .entry(sea.address.clone())
                    .or_default()
                    .push(SeaOperation::new(action, owner, &fragment.hash, shared));
            }
        }
    }

    /// Delete-style operations for every current binding, used when the
    /// fragments are superseded or removed.
    pub(crate) fn delete_operations(&self, owner: &str, group: bool, shared: bool) -> SeaOperations {
        let mut operations = SeaOperations::new();
        self.append_sea_operations(SeaAction::delete(group), owner, shared, &mut operations);
        operations
    }
}

/// One content-addressed chunk of an encrypted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Hash of the fragment bytes.
    pub hash: Hash,
    /// Fragment size in bytes.
    pub size: i64,
    /// Providers holding this fragment, in registration order.
    pub seas: Vec<FragmentSea>,
}

impl Fragment {
    /// Construct a fragment record.
    pub fn new(hash: Hash, size: i64, seas: Vec<FragmentSea>) -> Self {
        Self { hash, size, seas }
    }
}

/// A binding stating that one sea holds one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSea {
    /// Ledger address of the sea.
    pub address: Address,
    /// The sea's public key.
    pub public_key: Hash,
    /// Replication weight.
    pub weight: i8,
    /// Unix seconds at registration.
    pub timestamp: i64,
}

impl FragmentSea {
    /// Construct a binding with default weight.
    pub fn new(address: Address, public_key: Hash, timestamp: i64) -> Self {
        Self {
            address,
            public_key,
            weight: 0,
            timestamp,
        }
    }
}

/// Listing entry for one directory child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct INodeInfo {
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Entry name.
    pub name: String,
    /// Entry size in bytes.
    pub size: i64,
}

impl From<&INode> for INodeInfo {
    fn from(node: &INode) -> Self {
        Self {
            is_dir: node.is_directory(),
            name: node.name().to_string(),
            size: node.size(),
        }
    }
}

/// A directory of child nodes with lazily recomputed size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Directory name, unique among siblings.
    pub name: String,
    /// Sum of child sizes, maintained by `update_directory_size`.
    pub size: i64,
    /// Content hash (unused for directories, kept for symmetry).
    pub hash: Hash,
    /// Children in creation order.
    pub inodes: Vec<INode>,
}

/// Interior components of a `/`-delimited, `/`-terminated path.
///
/// `"/a/b/"` yields `["a", "b"]`; `"/"` yields `[]`.
fn path_segments(path: &str) -> Vec<&str> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts[1..parts.len() - 1].to_vec()
}

impl Directory {
    /// Construct an empty directory.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            hash: Hash::new(),
            inodes: Vec::new(),
        }
    }

    fn child_directory(&self, segment: &str, walked: &str) -> Result<&Directory, StateError> {
        match self.inodes.iter().find(|n| n.name() == segment) {
            Some(INode::Directory(dir)) => Ok(dir),
            Some(INode::File(_)) => {
                Err(StateError::PathBlockedByFile(format!("{walked}{segment}")))
            }
            None => Err(StateError::PathNotFound(format!("{walked}{segment}/"))),
        }
    }

    fn child_directory_mut(
        &mut self,
        segment: &str,
        walked: &str,
    ) -> Result<&mut Directory, StateError> {
        match self.inodes.iter_mut().find(|n| n.name() == segment) {
            Some(INode::Directory(dir)) => Ok(dir),
            Some(INode::File(_)) => {
                Err(StateError::PathBlockedByFile(format!("{walked}{segment}")))
            }
            None => Err(StateError::PathNotFound(format!("{walked}{segment}/"))),
        }
    }

    fn descend_or_create(&mut self, segment: &str, walked: &str) -> Result<&mut Directory, StateError> {
        if let Some(i) = self.inodes.iter().position(|n| n.name() == segment) {
            return match &mut self.inodes[i] {
                INode::Directory(dir) => Ok(dir),
                INode::File(_) => Err(StateError::PathBlockedByFile(format!("{walked}{segment}"))),
            };
        }
        self.inodes.push(INode::Directory(Directory::new(segment)));
        match self.inodes.last_mut() {
            Some(INode::Directory(dir)) => Ok(dir),
            _ => unreachable!("directory was just pushed"),
        }
    }

    /// Resolve `path` to the directory it names.
    pub fn find_directory(&self, path: &str) -> Result<&Directory, StateError> {
        let mut dir = self;
        let mut walked = String::from("/");
        for segment in path_segments(path) {
            dir = dir.child_directory(segment, &walked)?;
            walked.push_str(segment);
            walked.push('/');
        }
        Ok(dir)
    }

    /// Resolve `path` to the directory it names, mutably.
    pub fn find_directory_mut(&mut self, path: &str) -> Result<&mut Directory, StateError> {
        let mut dir = self;
        let mut walked = String::from("/");
        for segment in path_segments(path) {
            dir = dir.child_directory_mut(segment, &walked)?;
            walked.push_str(segment);
            walked.push('/');
        }
        Ok(dir)
    }

    /// Find the file `name` under `path`.
    pub fn find_file(&self, path: &str, name: &str) -> Result<&File, StateError> {
        self.find_directory(path)?
            .inodes
            .iter()
            .find_map(|n| match n {
                INode::File(f) if f.name == name => Some(f),
                _ => None,
            })
            .ok_or_else(|| StateError::FileNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    /// Find the file `name` under `path`, mutably.
    pub fn find_file_mut(&mut self, path: &str, name: &str) -> Result<&mut File, StateError> {
        self.find_directory_mut(path)?
            .inodes
            .iter_mut()
            .find_map(|n| match n {
                INode::File(f) if f.name == name => Some(f),
                _ => None,
            })
            .ok_or_else(|| StateError::FileNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    /// Find the file or directory `name` under `path`.
    pub fn find_inode(&self, path: &str, name: &str) -> Result<&INode, StateError> {
        self.find_directory(path)?
            .inodes
            .iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| StateError::INodeNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    /// Create every missing directory along `path` and return the last.
    ///
    /// Existing directories are descended into; a file anywhere on the
    /// way aborts with [`StateError::PathBlockedByFile`].
    pub fn create_directory(&mut self, path: &str) -> Result<&mut Directory, StateError> {
        let mut dir = self;
        let mut walked = String::from("/");
        for segment in path_segments(path) {
            dir = dir.descend_or_create(segment, &walked)?;
            walked.push_str(segment);
            walked.push('/');
        }
        Ok(dir)
    }

    /// Append `file` under `path`. Sibling names must stay unique.
    pub fn create_file(&mut self, path: &str, file: File) -> Result<(), StateError> {
        let dir = self.find_directory_mut(path)?;
        if dir.inodes.iter().any(|n| n.name() == file.name) {
            return Err(StateError::DuplicateName {
                path: path.to_string(),
                name: file.name,
            });
        }
        dir.inodes.push(INode::File(file));
        Ok(())
    }

    /// Rename the file or directory `name` under `path`.
    pub fn update_name(&mut self, path: &str, name: &str, new_name: &str) -> Result<(), StateError> {
        let dir = self.find_directory_mut(path)?;
        let pos = dir
            .inodes
            .iter()
            .position(|n| n.name() == name)
            .ok_or_else(|| StateError::INodeNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })?;
        if dir
            .inodes
            .iter()
            .enumerate()
            .any(|(i, n)| i != pos && n.name() == new_name)
        {
            return Err(StateError::DuplicateName {
                path: path.to_string(),
                name: new_name.to_string(),
            });
        }
        dir.inodes[pos].set_name(new_name);
        Ok(())
    }

    /// Replace the content of the file `name` under `path`.
    ///
    /// Returns delete-style operations for every binding of the old
    /// fragments so providers can free the superseded bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn update_file_data(
        &mut self,
        path: &str,
        name: &str,
        hash: Hash,
        size: i64,
        fragments: Vec<Fragment>,
        owner: &str,
        group: bool,
        shared: bool,
    ) -> Result<SeaOperations, StateError> {
        let file = self.find_file_mut(path, name)?;
        let operations = file.delete_operations(owner, group, shared);
        file.hash = hash;
        file.size = size;
        file.fragments = fragments;
        Ok(operations)
    }

    /// Re-key the file `name` under `path`.
    ///
    /// As [`Directory::update_file_data`], and additionally returns the
    /// `{old key: -1, new key: +1}` deltas for the key registry.
    #[allow(clippy::too_many_arguments)]
    pub fn update_file_key(
        &mut self,
        path: &str,
        name: &str,
        key_index: Hash,
        hash: Hash,
        size: i64,
        fragments: Vec<Fragment>,
        owner: &str,
        group: bool,
        shared: bool,
    ) -> Result<(KeyDeltas, SeaOperations), StateError> {
        let file = self.find_file_mut(path, name)?;
        let mut deltas = KeyDeltas::new();
        *deltas.entry(file.key_index.clone()).or_insert(0) -= 1;
        *deltas.entry(key_index.clone()).or_insert(0) += 1;
        let operations = file.delete_operations(owner, group, shared);
        file.key_index = key_index;
        file.hash = hash;
        file.size = size;
        file.fragments = fragments;
        Ok((deltas, operations))
    }

    /// Remove the file `name` under `path`.
    ///
    /// Returns the provider operations for its bindings and the key
    /// index it referenced.
    pub fn delete_file(
        &mut self,
        path: &str,
        name: &str,
        owner: &str,
        group: bool,
        shared: bool,
    ) -> Result<(SeaOperations, Hash), StateError> {
        let dir = self.find_directory_mut(path)?;
        let pos = dir
            .inodes
            .iter()
            .position(|n| matches!(n, INode::File(f) if f.name == name))
            .ok_or_else(|| StateError::FileNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })?;
        let INode::File(file) = dir.inodes.remove(pos) else {
            unreachable!("position matched a file");
        };
        let operations = file.delete_operations(owner, group, shared);
        Ok((operations, file.key_index))
    }

    /// Remove the directory `name` under `path`, recursively.
    ///
    /// Returns the provider operations for every binding beneath it and
    /// one `-1` key delta per file removed.
    pub fn delete_directory(
        &mut self,
        path: &str,
        name: &str,
        owner: &str,
        group: bool,
        shared: bool,
    ) -> Result<(SeaOperations, KeyDeltas), StateError> {
        let dir = self.find_directory_mut(path)?;
        let pos = dir
            .inodes
            .iter()
            .position(|n| matches!(n, INode::Directory(d) if d.name == name))
            .ok_or_else(|| StateError::PathNotFound(format!("{path}{name}/")))?;
        let INode::Directory(removed) = dir.inodes.remove(pos) else {
            unreachable!("position matched a directory");
        };
        let mut operations = SeaOperations::new();
        let mut deltas = KeyDeltas::new();
        removed.collect_subtree(owner, group, shared, &mut operations, &mut deltas);
        Ok((operations, deltas))
    }

    fn collect_subtree(
        &self,
        owner: &str,
        group: bool,
        shared: bool,
        operations: &mut SeaOperations,
        deltas: &mut KeyDeltas,
    ) {
        for node in &self.inodes {
            match node {
                INode::File(file) => {
                    *deltas.entry(file.key_index.clone()).or_insert(0) -= 1;
                    file.append_sea_operations(SeaAction::delete(group), owner, shared, operations);
                }
                INode::Directory(dir) => {
                    dir.collect_subtree(owner, group, shared, operations, deltas);
                }
            }
        }
    }

    /// Detach `name` from `path` and attach it under `new_path`.
    ///
    /// If the destination turns out to live inside the detached subtree
    /// the node is put back and the lookup error is returned.
    pub fn move_inode(&mut self, path: &str, name: &str, new_path: &str) -> Result<(), StateError> {
        {
            let src = self.find_directory(path)?;
            if !src.inodes.iter().any(|n| n.name() == name) {
                return Err(StateError::INodeNotFound {
                    path: path.to_string(),
                    name: name.to_string(),
                });
            }
        }
        {
            let dst = self.find_directory(new_path)?;
            if dst.inodes.iter().any(|n| n.name() == name) {
                return Err(StateError::DuplicateName {
                    path: new_path.to_string(),
                    name: name.to_string(),
                });
            }
        }
        let node = {
            let src = self.find_directory_mut(path)?;
            let pos = src
                .inodes
                .iter()
                .position(|n| n.name() == name)
                .ok_or_else(|| StateError::INodeNotFound {
                    path: path.to_string(),
                    name: name.to_string(),
                })?;
            src.inodes.remove(pos)
        };
        match self.find_directory_mut(new_path) {
            Ok(dst) => {
                dst.inodes.push(node);
                Ok(())
            }
            Err(e) => {
                if let Ok(src) = self.find_directory_mut(path) {
                    src.inodes.push(node);
                }
                Err(e)
            }
        }
    }

    /// Register `sea` as a holder of the fragment `hash` on the file
    /// `name` under `path`. A sea may hold a fragment at most once.
    pub fn add_sea(
        &mut self,
        path: &str,
        name: &str,
        hash: &str,
        sea: FragmentSea,
    ) -> Result<(), StateError> {
        let file = self.find_file_mut(path, name)?;
        let fragment = file
            .fragments
            .iter_mut()
            .find(|f| f.hash == hash)
            .ok_or_else(|| StateError::FragmentNotFound(hash.to_string()))?;
        if fragment.seas.iter().any(|s| s.public_key == sea.public_key) {
            return Err(StateError::DuplicateSea(sea.public_key));
        }
        fragment.seas.push(sea);
        Ok(())
    }

    /// List the children of the directory at `path`.
    pub fn list(&self, path: &str) -> Result<Vec<INodeInfo>, StateError> {
        Ok(self
            .find_directory(path)?
            .inodes
            .iter()
            .map(INodeInfo::from)
            .collect())
    }

    /// Recompute directory sizes along `path`, deepest first.
    pub fn update_directory_size(&mut self, path: &str) {
        self.update_size_segments(&path_segments(path));
    }

    fn update_size_segments(&mut self, segments: &[&str]) {
        if let Some((first, rest)) = segments.split_first() {
            let child = self.inodes.iter_mut().find_map(|n| match n {
                INode::Directory(d) if d.name == *first => Some(d),
                _ => None,
            });
            if let Some(dir) = child {
                dir.update_size_segments(rest);
            }
        }
        self.size = self.inodes.iter().map(INode::size).sum();
    }
}
