//! Physical filename codec.
//!
//! A stored file's only persisted representation is its filename:
//!
//! ```text
//! <public_key>_<private_key>_<base_name>.<extension>
//! ```
//!
//! Keys are fixed-width hexadecimal (16 characters) and can never contain
//! the `_` delimiter, so every physical name decomposes unambiguously even
//! when the original name itself contains `_` or `.`.

use super::keys::FileKeys;
use super::KEY_LENGTH;

/// Delimiter separating the key segments from the original name.
pub const KEY_DELIMITER: char = '_';

/// The parts recovered from a physical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName<'a> {
    /// Download capability.
    pub public_key: &'a str,
    /// Deletion capability.
    pub private_key: &'a str,
    /// Original base name (may be empty).
    pub base: &'a str,
    /// Original extension without the dot (may be empty).
    pub extension: &'a str,
}

impl DecodedName<'_> {
    /// The original client-supplied filename.
    ///
    /// A name stored without an extension round-trips back without the
    /// trailing separator the encoded form carries.
    pub fn display_name(&self) -> String {
        if self.extension.is_empty() {
            self.base.to_string()
        } else {
            format!("{}.{}", self.base, self.extension)
        }
    }
}

/// Split an original filename on its last `.` into base and extension.
///
/// A name with no `.` is all base with an empty extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((base, ext)) => (base, ext),
        None => (name, ""),
    }
}

/// Encode a key pair and an original filename into the physical filename.
///
/// The base and extension are always joined with `.`, even when the
/// extension is empty; a name without an extension therefore encodes with
/// a trailing separator.
pub fn encode(keys: &FileKeys, original_name: &str) -> String {
    let (base, ext) = split_name(original_name);
    format!(
        "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{base}.{ext}",
        keys.public_key, keys.private_key
    )
}

/// Decode a physical filename back into keys and original name parts.
///
/// Returns `None` for names that do not follow the encoding (foreign files
/// in the storage directory are skipped by lookups, not errors).
pub fn decode(physical: &str) -> Option<DecodedName<'_>> {
    let bytes = physical.as_bytes();

    let public_key = physical.get(..KEY_LENGTH)?;
    if bytes.get(KEY_LENGTH) != Some(&(KEY_DELIMITER as u8)) {
        return None;
    }

    let private_start = KEY_LENGTH + 1;
    let private_key = physical.get(private_start..private_start + KEY_LENGTH)?;
    if bytes.get(private_start + KEY_LENGTH) != Some(&(KEY_DELIMITER as u8)) {
        return None;
    }

    if !is_key(public_key) || !is_key(private_key) {
        return None;
    }

    let rest = &physical[private_start + KEY_LENGTH + 1..];
    let (base, extension) = split_name(rest);

    Some(DecodedName {
        public_key,
        private_key,
        base,
        extension,
    })
}

/// Whether a physical filename is reachable through the given public key.
pub fn matches_public_key(physical: &str, public_key: &str) -> bool {
    !public_key.is_empty() && physical.starts_with(&format!("{public_key}{KEY_DELIMITER}"))
}

/// Whether a physical filename is deletable through the given private key.
pub fn matches_private_key(physical: &str, private_key: &str) -> bool {
    !private_key.is_empty()
        && physical.contains(&format!("{KEY_DELIMITER}{private_key}{KEY_DELIMITER}"))
}

fn is_key(s: &str) -> bool {
    s.len() == KEY_LENGTH && s.chars().all(|c| c.is_ascii_hexdigit())
}
