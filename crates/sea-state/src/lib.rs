//! # Sea State - World State for the SeaStorage Transaction Processor
//!
//! Pure domain logic: everything in this crate mutates in-memory
//! structures and reports typed errors; nothing here touches the ledger.
//!
//! ## Modules
//!
//! - `inode`: content-addressed file tree (files, directories, fragments)
//! - `file_key`: reference-counted registry of encryption keys
//! - `root`: home tree + shared tree + key map, with path validation
//! - `sea`: storage providers and their operation outboxes
//! - `user` / `group`: entity aggregates owning a [`root::Root`]
//! - `operation`: signed proof-of-custody records
//! - `codec`: canonical byte encoding shared by state and payloads
//!
//! Determinism is a hard requirement: every collection that reaches the
//! wire is ordered (`Vec`, `BTreeMap`, `BTreeSet`) and the codec pins
//! integer width and byte order, so equal state always encodes to equal
//! bytes on every node.

#![warn(clippy::all)]

pub mod codec;
pub mod errors;
pub mod file_key;
pub mod group;
pub mod inode;
pub mod operation;
pub mod root;
pub mod sea;
pub mod user;

pub use errors::StateError;
pub use file_key::{FileKey, FileKeyMap};
pub use group::{Group, Role};
pub use inode::{Directory, File, Fragment, FragmentSea, INode, INodeInfo};
pub use operation::{DeadlinePolicy, Operation};
pub use root::{FileInfo, Root, SharedRecord};
pub use sea::{Sea, SeaAction, SeaOperation};
pub use user::User;

/// Hex-encoded hash. SHA-512 digests are 128 chars; operation and
/// fragment hashes keep whatever width their producer emitted.
pub type Hash = String;

/// Hex-encoded ledger address, 70 chars: 6-char namespace, 4-char type
/// prefix, 60-char name hash.
pub type Address = String;

/// Hex-encoded encryption key (or its ECIES ciphertext before
/// publication).
pub type Key = String;
