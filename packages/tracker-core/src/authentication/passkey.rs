//! The passkey token.
//!
//! A private tracker embeds a passkey in the announce URL it hands to each
//! registered user. The announce engine receives the passkey back with every
//! request and resolves the owning [`User`](crate::authentication::User)
//! through the storage connection.
//!
//! Passkeys are opaque 32-character alphanumeric tokens. They are issued by
//! the tracker owner and never expire; revoking one means removing its user.
use std::fmt;
use std::str::FromStr;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::PASSKEY_LENGTH;

/// The token a private tracker uses to recognize a user.
///
/// ```
/// use bittorrent_announce_core::authentication::Passkey;
///
/// let passkey: Passkey = "YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ".parse().unwrap();
///
/// assert_eq!(passkey.value(), "YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ");
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passkey(String);

impl Passkey {
    /// Draws a fresh passkey from the thread-local random number generator.
    #[must_use]
    pub fn random() -> Self {
        let token = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(PASSKEY_LENGTH)
            .map(char::from)
            .collect();

        Self(token)
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Passkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Passkey {
    type Err = ParsePasskeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.bytes().position(|byte| !byte.is_ascii_alphanumeric()) {
            Some(offset) => Err(ParsePasskeyError::UnexpectedChar { offset }),
            None if raw.len() == PASSKEY_LENGTH => Ok(Self(raw.to_owned())),
            None => Err(ParsePasskeyError::WrongLength { found: raw.len() }),
        }
    }
}

/// The reasons a string is refused as a passkey.
#[derive(Debug, thiserror::Error)]
pub enum ParsePasskeyError {
    /// The string is not exactly 32 characters long.
    #[error("expected a 32 character passkey, got {found} characters")]
    WrongLength { found: usize },

    /// The string holds something besides ascii letters and digits. The
    /// offset points at the first offending byte.
    #[error("passkeys hold only ascii letters and digits, found another byte at offset {offset}")]
    UnexpectedChar { offset: usize },
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ParsePasskeyError, Passkey};

    const WELL_FORMED: &str = "YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ";

    #[test]
    fn a_well_formed_string_parses_into_a_passkey() {
        let passkey = Passkey::from_str(WELL_FORMED).unwrap();

        assert_eq!(passkey.value(), WELL_FORMED);
        assert_eq!(passkey.to_string(), WELL_FORMED);
    }

    #[test]
    fn random_passkeys_are_well_formed_and_distinct() {
        let one = Passkey::random();
        let another = Passkey::random();

        assert!(Passkey::from_str(one.value()).is_ok());
        assert_ne!(one, another);
    }

    #[test]
    fn strings_of_the_wrong_length_are_refused() {
        assert!(matches!(
            Passkey::from_str("tooShort"),
            Err(ParsePasskeyError::WrongLength { found: 8 })
        ));

        let too_long = format!("{WELL_FORMED}0");

        assert!(matches!(
            Passkey::from_str(&too_long),
            Err(ParsePasskeyError::WrongLength { found: 33 })
        ));
    }

    #[test]
    fn non_alphanumeric_bytes_are_refused_with_their_offset() {
        // A dash where the 21st character should be.
        let with_dash = "YZSl4lMZupRuOpSRC3kr-KR5BPB14nrJ";

        assert!(matches!(
            Passkey::from_str(with_dash),
            Err(ParsePasskeyError::UnexpectedChar { offset: 20 })
        ));
    }
}
