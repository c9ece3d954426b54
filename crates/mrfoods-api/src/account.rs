//! Registered accounts

use mrfoods_util::Username;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered user. Also the shape of the active session slot.
///
/// `password` holds whatever credential encoding the account was created
/// with: an Argon2 PHC string, or plain text for legacy records.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: Username,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub initials: String,
}

impl Account {
    /// Initials from the first and last whitespace-separated name tokens.
    ///
    /// A single token contributes one letter; an empty name yields "".
    pub fn derive_initials(full_name: &str) -> String {
        let mut tokens = full_name.split_whitespace();
        let first = tokens.next();
        let last = tokens.next_back();

        [first, last]
            .into_iter()
            .flatten()
            .filter_map(|token| token.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Initials to show in a user badge, falling back to the full name,
    /// then the username.
    pub fn badge(&self) -> String {
        if !self.initials.is_empty() {
            return self.initials.clone();
        }
        let from_name = Self::derive_initials(&self.full_name);
        if !from_name.is_empty() {
            return from_name;
        }
        self.username
            .as_str()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("initials", &self.initials)
            .finish()
    }
}
