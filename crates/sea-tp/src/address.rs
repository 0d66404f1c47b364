//! # Address Contract
//!
//! Every record lives under a 70-hex-char address: a 6-char family
//! namespace, a 4-char type prefix, and 60 chars of name hash. The
//! namespace is the head of SHA-512 of the family name; type prefixes
//! are heads of SHA-256 of the type tag; shared variants OR the shared
//! prefix bytes onto the base type's. The processor registers exactly
//! this one namespace with the ledger.

use std::sync::OnceLock;

use sea_crypto::CryptoError;
use sea_state::Address;

/// Transaction family name, also the namespace seed.
pub const FAMILY_NAME: &str = "SeaStorage";

/// Transaction family version.
pub const FAMILY_VERSION: &str = "1.0.0";

/// Chars of name hash in an address.
const NAME_HASH_LEN: usize = 60;

fn prefix_bytes(tag: &str) -> [u8; 2] {
    let digest = sea_crypto::sha256(tag.as_bytes());
    [digest[0], digest[1]]
}

fn or_prefix(a: [u8; 2], b: [u8; 2]) -> [u8; 2] {
    [a[0] | b[0], a[1] | b[1]]
}

/// The 6-hex-char family namespace.
pub fn namespace() -> &'static str {
    static NS: OnceLock<String> = OnceLock::new();
    NS.get_or_init(|| sea_crypto::sha512_hex(FAMILY_NAME.as_bytes())[..6].to_string())
}

fn user_prefix() -> &'static str {
    static P: OnceLock<String> = OnceLock::new();
    P.get_or_init(|| sea_crypto::to_hex(&prefix_bytes("User")))
}

fn group_prefix() -> &'static str {
    static P: OnceLock<String> = OnceLock::new();
    P.get_or_init(|| sea_crypto::to_hex(&prefix_bytes("Group")))
}

fn sea_prefix() -> &'static str {
    static P: OnceLock<String> = OnceLock::new();
    P.get_or_init(|| sea_crypto::to_hex(&prefix_bytes("Sea")))
}

fn user_shared_prefix() -> &'static str {
    static P: OnceLock<String> = OnceLock::new();
    P.get_or_init(|| sea_crypto::to_hex(&or_prefix(prefix_bytes("Shared"), prefix_bytes("User"))))
}

fn group_shared_prefix() -> &'static str {
    static P: OnceLock<String> = OnceLock::new();
    P.get_or_init(|| sea_crypto::to_hex(&or_prefix(prefix_bytes("Shared"), prefix_bytes("Group"))))
}

fn keyed_name_hash(name: &str, public_key: &str) -> Result<String, CryptoError> {
    let mut data = name.as_bytes().to_vec();
    data.extend(sea_crypto::from_hex(public_key)?);
    Ok(sea_crypto::sha512_hex(&data)[..NAME_HASH_LEN].to_string())
}

fn plain_name_hash(name: &str) -> String {
    sea_crypto::sha512_hex(name.as_bytes())[..NAME_HASH_LEN].to_string()
}

/// Address of a user record.
pub fn user_address(name: &str, public_key: &str) -> Result<Address, CryptoError> {
    Ok(format!(
        "{}{}{}",
        namespace(),
        user_prefix(),
        keyed_name_hash(name, public_key)?
    ))
}

/// Address of a group record.
pub fn group_address(name: &str) -> Address {
    format!("{}{}{}", namespace(), group_prefix(), plain_name_hash(name))
}

/// Address of a sea record.
pub fn sea_address(name: &str, public_key: &str) -> Result<Address, CryptoError> {
    Ok(format!(
        "{}{}{}",
        namespace(),
        sea_prefix(),
        keyed_name_hash(name, public_key)?
    ))
}

/// Address of a user's shared record.
pub fn user_shared_address(name: &str, public_key: &str) -> Result<Address, CryptoError> {
    Ok(format!(
        "{}{}{}",
        namespace(),
        user_shared_prefix(),
        keyed_name_hash(name, public_key)?
    ))
}

/// Address of a group's shared record.
pub fn group_shared_address(name: &str) -> Address {
    format!(
        "{}{}{}",
        namespace(),
        group_shared_prefix(),
        plain_name_hash(name)
    )
}

/// Whether an address belongs to this family's namespace.
pub fn is_family_address(address: &str) -> bool {
    address.len() == 70 && address.starts_with(namespace())
}
