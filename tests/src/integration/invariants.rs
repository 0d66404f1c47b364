//! # State Invariants
//!
//! Properties that must hold after any committed mutation, checked over
//! randomized-ish but deterministic operation sequences:
//!
//! 1. A key's reference count equals the number of home-tree files
//!    pointing at it.
//! 2. Every directory's size is the sum of its children's.
//! 3. Sibling names stay unique through create, rename and move.
//! 4. Canonical encoding round-trips every persisted entity.

#[cfg(test)]
use sea_state::inode::{Directory, File, Fragment, FragmentSea, INode};
#[cfg(test)]
use sea_state::root::FileInfo;
#[cfg(test)]
use sea_state::{codec, Group, Operation, Role, Root, Sea, SeaAction, SeaOperation, User};

/// Count home-tree files referencing `index`.
#[cfg(test)]
fn reference_count(dir: &Directory, index: &str) -> i32 {
    dir.inodes
        .iter()
        .map(|node| match node {
            INode::File(f) => i32::from(f.key_index == index),
            INode::Directory(d) => reference_count(d, index),
        })
        .sum()
}

/// Assert size sums recursively, returning this directory's size.
#[cfg(test)]
fn assert_sizes(dir: &Directory) -> i64 {
    let sum: i64 = dir
        .inodes
        .iter()
        .map(|node| match node {
            INode::File(f) => f.size,
            INode::Directory(d) => assert_sizes(d),
        })
        .sum();
    assert_eq!(dir.size, sum, "directory {} size drifted", dir.name);
    dir.size
}

/// Assert sibling-name uniqueness recursively.
#[cfg(test)]
fn assert_unique_names(dir: &Directory) {
    for (i, a) in dir.inodes.iter().enumerate() {
        for b in &dir.inodes[i + 1..] {
            assert_ne!(a.name(), b.name(), "duplicate sibling in {}", dir.name);
        }
    }
    for node in &dir.inodes {
        if let INode::Directory(d) = node {
            assert_unique_names(d);
        }
    }
}

#[cfg(test)]
fn assert_key_counts(root: &Root) {
    for (index, entry) in &root.keys.keys {
        assert_eq!(
            entry.used,
            reference_count(&root.home, index),
            "key {index} count drifted"
        );
        assert!(entry.used >= 1, "zero-reference key {index} survived");
    }
}

#[cfg(test)]
fn info(name: &str, key: &str, size: i64) -> FileInfo {
    FileInfo {
        name: name.to_string(),
        size,
        hash: format!("hash-{name}"),
        key: key.to_string(),
        fragments: vec![Fragment::new(format!("frag-{name}"), size, Vec::new())],
    }
}

#[cfg(test)]
const KEY_A: &str = "aaaa0000aaaa0000aaaa0000aaaa0000";
#[cfg(test)]
const KEY_B: &str = "bbbb0000bbbb0000bbbb0000bbbb0000";
#[cfg(test)]
const KEY_C: &str = "cccc0000cccc0000cccc0000cccc0000";

#[cfg(test)]
mod tests {
    use super::*;

    /// A mutation sequence exercising every tree operation, with the
    /// three invariants re-checked after each step.
    #[test]
    fn test_invariants_across_mutation_sequence() {
        let mut root = Root::new();
        let check = |root: &Root| {
            assert_key_counts(root);
            assert_sizes(&root.home);
            assert_sizes(&root.shared);
            assert_unique_names(&root.home);
            assert_unique_names(&root.shared);
        };

        root.create_directory("/docs/reports/").unwrap();
        check(&root);

        // two files sharing one key, one on its own
        root.create_file("/docs/", info("a.bin", KEY_A, 100)).unwrap();
        root.create_file("/docs/reports/", info("b.bin", KEY_A, 50)).unwrap();
        root.create_file("/docs/", info("c.bin", KEY_B, 25)).unwrap();
        check(&root);
        assert_eq!(root.keys.search(KEY_A).unwrap().used, 2);

        // re-keying one of the sharers must not disturb the other
        root.update_file_key("/docs/", info("a.bin", KEY_C, 100), "owner", false)
            .unwrap();
        check(&root);
        assert_eq!(root.keys.search(KEY_A).unwrap().used, 1);
        assert_eq!(root.keys.search(KEY_C).unwrap().used, 1);

        root.update_file_data("/docs/", info("c.bin", KEY_B, 75), "owner", false)
            .unwrap();
        check(&root);

        root.update_name("/docs/", "c.bin", "c2.bin").unwrap();
        check(&root);

        root.move_inode("/docs/", "a.bin", "/docs/reports/").unwrap();
        check(&root);

        root.delete_file("/docs/reports/", "b.bin", "owner", false).unwrap();
        check(&root);
        assert!(root.keys.search(KEY_A).is_none());

        root.delete_directory("/docs/", "reports", "owner", false).unwrap();
        check(&root);
        assert!(root.keys.search(KEY_C).is_none());
        assert_eq!(root.home.size, 75);
    }

    #[test]
    fn test_update_data_keeps_key_count() {
        let mut root = Root::new();
        root.create_directory("/d/").unwrap();
        root.create_file("/d/", info("f", KEY_A, 10)).unwrap();
        for size in [20, 30, 40] {
            root.update_file_data("/d/", info("f", KEY_A, size), "owner", false)
                .unwrap();
            assert_key_counts(&root);
            assert_sizes(&root.home);
        }
        assert_eq!(root.keys.search(KEY_A).unwrap().used, 1);
    }

    // -------------------------------------------------------------------------
    // Round-trips: decode(encode(x)) == x for every persisted entity
    // -------------------------------------------------------------------------

    fn roundtrip<T>(value: &T)
    where
        T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = codec::to_bytes(value).unwrap();
        let back: T = codec::from_bytes(&bytes).unwrap();
        assert_eq!(&back, value);
        // canonical: encoding is a pure function of the value
        assert_eq!(codec::to_bytes(&back).unwrap(), bytes);
    }

    #[test]
    fn test_entity_roundtrips() {
        let mut root = Root::new();
        root.create_directory("/docs/").unwrap();
        root.create_file("/docs/", info("a.bin", KEY_A, 100)).unwrap();
        root.home
            .add_sea(
                "/docs/",
                "a.bin",
                "frag-a.bin",
                FragmentSea::new("sea-addr".to_string(), "sea-pk".to_string(), 7),
            )
            .unwrap();
        root.share("/docs/", "a.bin", "/out/", "owner-pk", false).unwrap();
        roundtrip(&root);

        let mut user = User::new("alice-pk");
        user.join_group("group-addr");
        user.root = root;
        roundtrip(&user);

        let mut group = Group::new("team", "leader");
        group.update_member_role("leader", "dev", Role::Developer);
        roundtrip(&group);

        let mut sea = Sea::new("sea-pk");
        sea.handles = 3;
        sea.add_operations(vec![
            SeaOperation::new(SeaAction::UserDelete, "owner", "f1", false),
            SeaOperation::new(SeaAction::GroupShared, "owner", "f2", true),
        ])
        .unwrap();
        roundtrip(&sea);

        let file = File::new(
            "a.bin",
            100,
            "h".to_string(),
            "k".to_string(),
            vec![Fragment::new("f".to_string(), 100, Vec::new())],
        );
        roundtrip(&file);
        roundtrip(&INode::File(file));
        roundtrip(&Directory::new("home"));

        let operation = Operation::sign(
            "addr",
            "owner-pk",
            "sea-pk",
            "/docs/",
            "a.bin",
            "f1",
            100,
            1_700_000_000,
            "1111111111111111111111111111111111111111111111111111111111111111",
        )
        .unwrap();
        roundtrip(&operation);
    }

    #[test]
    fn test_canonical_bytes_are_signer_independent() {
        // two structurally equal seas built in different insertion
        // orders must encode identically
        let mut sea1 = Sea::new("pk");
        sea1.add_operations(vec![
            SeaOperation::new(SeaAction::UserDelete, "o", "f1", false),
            SeaOperation::new(SeaAction::UserShared, "o", "f2", true),
        ])
        .unwrap();
        let mut sea2 = Sea::new("pk");
        sea2.add_operations(vec![
            SeaOperation::new(SeaAction::UserShared, "o", "f2", true),
            SeaOperation::new(SeaAction::UserDelete, "o", "f1", false),
        ])
        .unwrap();
        assert_eq!(
            codec::to_bytes(&sea1).unwrap(),
            codec::to_bytes(&sea2).unwrap()
        );
    }
}
