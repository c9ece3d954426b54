//! Identity store: the active session and registered accounts

use mrfoods_api::Account;
use mrfoods_config::PasswordStorage;
use mrfoods_store::{AuditEventType, Slot, Store, StoreExt, StoreResult};
use mrfoods_util::Username;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{AccountError, AccountResult, FieldError, encode_password, record, verify_password};

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 5..=10;
const PASSWORD_CHARS: std::ops::RangeInclusive<usize> = 5..=15;
const MAX_FULL_NAME_WORDS: usize = 15;

/// Whether persisted identity state has been read yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
}

/// What the rest of the system may know about the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView<'a> {
    /// Identity not yet rehydrated
    Loading,
    SignedOut,
    SignedIn(&'a Username),
}

/// Details submitted at sign-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

impl SignUpRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }

    /// Every field rule this request violates
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let username_len = self.username.chars().count();
        if !USERNAME_CHARS.contains(&username_len) {
            errors.push(FieldError::UsernameLength(username_len));
        }
        if self.username.chars().any(char::is_whitespace) {
            errors.push(FieldError::UsernameWhitespace);
        }

        let password_len = self.password.chars().count();
        if !PASSWORD_CHARS.contains(&password_len) {
            errors.push(FieldError::PasswordLength(password_len));
        }

        if !is_valid_email(&self.email) {
            errors.push(FieldError::InvalidEmail(self.email.clone()));
        }

        let words = self.full_name.split_whitespace().count();
        if words > MAX_FULL_NAME_WORDS {
            errors.push(FieldError::FullNameTooLong(words));
        }

        errors
    }
}

/// Local part, `@`, and a domain with a dot that is neither first nor last
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Holds at most one active session plus the durable account list
pub struct IdentityStore {
    store: Arc<dyn Store>,
    password_storage: PasswordStorage,
    phase: LoadPhase,
    session: Option<Account>,
    accounts: Vec<Account>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn Store>, password_storage: PasswordStorage) -> Self {
        Self {
            store,
            password_storage,
            phase: LoadPhase::Loading,
            session: None,
            accounts: Vec::new(),
        }
    }

    /// Restore the session and account list from the store. Corrupt slots
    /// are discarded and treated as empty.
    pub fn rehydrate(&mut self) -> StoreResult<()> {
        self.session = self.store.load_or_discard::<Account>(Slot::User)?;
        self.accounts = self
            .store
            .load_or_discard::<Vec<Account>>(Slot::Users)?
            .unwrap_or_default();
        self.phase = LoadPhase::Ready;

        info!(
            session = ?self.session.as_ref().map(|a| a.username.as_str()),
            accounts = self.accounts.len(),
            "Identity rehydrated"
        );
        Ok(())
    }

    /// Rehydrate if that has not happened yet
    pub fn ensure_ready(&mut self) -> StoreResult<()> {
        if self.phase == LoadPhase::Loading {
            self.rehydrate()?;
        }
        Ok(())
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// The active session, if any
    pub fn current(&self) -> Option<&Account> {
        self.session.as_ref()
    }

    pub fn session_view(&self) -> SessionView<'_> {
        match (self.phase, &self.session) {
            (LoadPhase::Loading, _) => SessionView::Loading,
            (LoadPhase::Ready, None) => SessionView::SignedOut,
            (LoadPhase::Ready, Some(account)) => SessionView::SignedIn(&account.username),
        }
    }

    /// Registered accounts in creation order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username.as_str() == username)
    }

    /// Activate the session for an exact username and password match
    pub fn sign_in(&mut self, username: &str, password: &str) -> AccountResult<&Account> {
        self.ensure_ready()?;

        let account = match self.find(username) {
            Some(account) if verify_password(&account.password, password) => account.clone(),
            Some(_) => {
                self.sign_in_failed(username, "invalid password");
                return Err(AccountError::InvalidCredentials);
            }
            None => {
                self.sign_in_failed(username, "unknown user");
                return Err(AccountError::UnknownUser(Username::new(username)));
            }
        };

        self.store.save(Slot::User, &account)?;
        info!(username = %account.username, "Signed in");
        record(
            &*self.store,
            AuditEventType::SignedIn {
                username: account.username.clone(),
            },
        );

        Ok(self.session.insert(account))
    }

    fn sign_in_failed(&self, username: &str, reason: &str) {
        debug!(username, reason, "Sign-in rejected");
        record(
            &*self.store,
            AuditEventType::SignInFailed {
                username: Username::new(username),
                reason: reason.to_string(),
            },
        );
    }

    /// Register a new account and sign it in.
    ///
    /// A taken username is reported before any field rule; a taken email
    /// (compared case-insensitively) after them.
    pub fn sign_up(&mut self, request: SignUpRequest) -> AccountResult<&Account> {
        self.ensure_ready()?;

        if self.find(&request.username).is_some() {
            return Err(AccountError::DuplicateUsername(Username::new(
                request.username,
            )));
        }

        let errors = request.validate();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let email = request.email.trim();
        if self
            .accounts
            .iter()
            .any(|a| a.email.trim().eq_ignore_ascii_case(email))
        {
            return Err(AccountError::DuplicateEmail(email.to_string()));
        }

        let account = Account {
            username: Username::new(request.username),
            password: encode_password(&request.password, self.password_storage)?,
            email: email.to_string(),
            initials: Account::derive_initials(&request.full_name),
            full_name: request.full_name,
        };

        let mut accounts = self.accounts.clone();
        accounts.push(account.clone());
        self.store.save(Slot::Users, &accounts)?;
        self.accounts = accounts;

        self.store.save(Slot::User, &account)?;
        info!(
            username = %account.username,
            total_accounts = self.accounts.len(),
            "Account created"
        );
        record(
            &*self.store,
            AuditEventType::AccountCreated {
                username: account.username.clone(),
            },
        );

        Ok(self.session.insert(account))
    }

    /// Clear the session. Accounts are untouched.
    pub fn logout(&mut self) -> StoreResult<Option<Username>> {
        self.ensure_ready()?;

        let Some(account) = self.session.take() else {
            return Ok(None);
        };
        self.store.remove_slot(Slot::User)?;

        info!(username = %account.username, "Signed out");
        record(
            &*self.store,
            AuditEventType::SignedOut {
                username: account.username.clone(),
            },
        );
        Ok(Some(account.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrfoods_store::{MemoryStore, SqliteStore};

    fn plain_identity(store: Arc<dyn Store>) -> IdentityStore {
        let mut identity = IdentityStore::new(store, PasswordStorage::Plain);
        identity.rehydrate().unwrap();
        identity
    }

    fn alice() -> SignUpRequest {
        SignUpRequest::new("alice1", "pass123", "a@b.com", "Alice Smith")
    }

    #[test]
    fn test_starts_loading_until_rehydrated() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = IdentityStore::new(store, PasswordStorage::Plain);
        assert_eq!(identity.phase(), LoadPhase::Loading);
        assert_eq!(identity.session_view(), SessionView::Loading);

        identity.rehydrate().unwrap();
        assert_eq!(identity.phase(), LoadPhase::Ready);
        assert_eq!(identity.session_view(), SessionView::SignedOut);
    }

    #[test]
    fn test_sign_up_derives_initials_and_signs_in() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store.clone());

        let account = identity.sign_up(alice()).unwrap().clone();
        assert_eq!(account.initials, "AS");
        assert_eq!(identity.current(), Some(&account));
        assert_eq!(identity.accounts().len(), 1);

        // Written through to both slots
        let session: Account = store.load(Slot::User).unwrap().unwrap();
        assert_eq!(session, account);
        let accounts: Vec<Account> = store.load(Slot::Users).unwrap().unwrap();
        assert_eq!(accounts, vec![account]);
    }

    #[test]
    fn test_sign_in_after_logout() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store.clone());
        identity.sign_up(alice()).unwrap();

        assert_eq!(
            identity.logout().unwrap(),
            Some(Username::new("alice1"))
        );
        assert!(identity.current().is_none());
        assert_eq!(store.read_slot(Slot::User).unwrap(), None);
        assert_eq!(identity.accounts().len(), 1);

        let account = identity.sign_in("alice1", "pass123").unwrap().clone();
        assert_eq!(&account, &identity.accounts()[0]);
        assert_eq!(
            identity.session_view(),
            SessionView::SignedIn(&Username::new("alice1"))
        );
    }

    #[test]
    fn test_wrong_password_leaves_accounts_untouched() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store.clone());
        identity.sign_up(alice()).unwrap();
        identity.logout().unwrap();
        let before = store.read_slot(Slot::Users).unwrap();

        let result = identity.sign_in("alice1", "wrong1");
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
        assert!(identity.current().is_none());
        assert_eq!(store.read_slot(Slot::Users).unwrap(), before);
    }

    #[test]
    fn test_unknown_user() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store);

        let result = identity.sign_in("nobody1", "pass123");
        assert!(matches!(result, Err(AccountError::UnknownUser(u)) if u.as_str() == "nobody1"));
    }

    #[test]
    fn test_username_match_is_exact() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store);
        identity.sign_up(alice()).unwrap();

        assert!(matches!(
            identity.sign_in("Alice1", "pass123"),
            Err(AccountError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_duplicate_username_reported_before_field_errors() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store);
        identity.sign_up(alice()).unwrap();

        // Every other field is invalid, the duplicate still wins
        let result = identity.sign_up(SignUpRequest::new("alice1", "x", "nope", ""));
        assert!(matches!(result, Err(AccountError::DuplicateUsername(_))));
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store);
        identity.sign_up(alice()).unwrap();

        let result = identity.sign_up(SignUpRequest::new("bobby1", "pass123", "A@B.COM", "Bob"));
        assert!(matches!(result, Err(AccountError::DuplicateEmail(_))));
        assert_eq!(identity.accounts().len(), 1);
    }

    #[test]
    fn test_validation_collects_every_violation() {
        let request = SignUpRequest::new("a b", "1234", "a@bcom", "");
        let errors = request.validate();
        assert_eq!(
            errors,
            vec![
                FieldError::UsernameLength(3),
                FieldError::UsernameWhitespace,
                FieldError::PasswordLength(4),
                FieldError::InvalidEmail("a@bcom".into()),
            ]
        );

        let long_name = vec!["word"; 16].join(" ");
        let errors = SignUpRequest::new("alice1", "pass123", "a@b.com", long_name).validate();
        assert_eq!(errors, vec![FieldError::FullNameTooLong(16)]);

        assert!(alice().validate().is_empty());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@com."));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn test_rehydrate_restores_session() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        {
            let mut identity = plain_identity(store.clone());
            identity.sign_up(alice()).unwrap();
        }

        let identity = plain_identity(store);
        assert_eq!(
            identity.current().map(|a| a.username.as_str()),
            Some("alice1")
        );
    }

    #[test]
    fn test_corrupt_session_slot_is_discarded() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        store.write_slot(Slot::User, "{\"username\": 42").unwrap();
        store.write_slot(Slot::Users, "not json").unwrap();

        let identity = plain_identity(store.clone());
        assert!(identity.current().is_none());
        assert!(identity.accounts().is_empty());
        assert_eq!(store.read_slot(Slot::User).unwrap(), None);
        assert_eq!(store.read_slot(Slot::Users).unwrap(), None);
    }

    #[test]
    fn test_operations_rehydrate_first() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        {
            let mut identity = plain_identity(store.clone());
            identity.sign_up(alice()).unwrap();
            identity.logout().unwrap();
        }

        // No explicit rehydrate: sign-in still sees the stored account
        let mut identity = IdentityStore::new(store, PasswordStorage::Plain);
        assert!(identity.sign_in("alice1", "pass123").is_ok());
        assert_eq!(identity.phase(), LoadPhase::Ready);
    }

    #[test]
    fn test_argon2_accounts_and_legacy_plain_records() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let legacy = Account {
            username: Username::new("legacy1"),
            password: "oldpass".into(),
            email: "old@example.com".into(),
            full_name: "Old Timer".into(),
            initials: "OT".into(),
        };
        store.save(Slot::Users, &vec![legacy]).unwrap();

        let mut identity = IdentityStore::new(store.clone(), PasswordStorage::Argon2);
        identity.rehydrate().unwrap();

        let created = identity.sign_up(alice()).unwrap().clone();
        assert!(created.password.starts_with("$argon2"));
        identity.logout().unwrap();

        assert!(identity.sign_in("alice1", "pass123").is_ok());
        assert!(identity.sign_in("legacy1", "oldpass").is_ok());
        assert!(matches!(
            identity.sign_in("alice1", "$argon2"),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_plain_password_with_hash_like_prefix_signs_in() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut identity = plain_identity(store);
        identity
            .sign_up(SignUpRequest::new(
                "carol1",
                "$argon2xy",
                "carol@example.com",
                "Carol King",
            ))
            .unwrap();
        identity.logout().unwrap();

        assert_eq!(
            identity.sign_in("carol1", "$argon2xy").unwrap().username,
            Username::new("carol1")
        );
    }

    #[test]
    fn test_failed_write_keeps_account_list() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn Store> = memory.clone();
        let mut identity = plain_identity(store);

        memory.set_fail_writes(true);
        assert!(matches!(
            identity.sign_up(alice()),
            Err(AccountError::Store(_))
        ));
        assert!(identity.accounts().is_empty());
        assert!(identity.current().is_none());
    }
}
