use log::{info, warn};
use shared::User;

use super::credentials::{hash_password, PasswordResetStorage};
use crate::storage::{AddOutcome, FileConnection, RecordStore, UpdateOutcome};

/// Account management and login checks over the users file
pub struct UserService {
    store: RecordStore<User>,
    reset_storage: PasswordResetStorage,
}

impl UserService {
    pub fn new(connection: &FileConnection) -> Self {
        Self::with_reset_storage(connection, PasswordResetStorage::default())
    }

    pub fn with_reset_storage(connection: &FileConnection, reset_storage: PasswordResetStorage) -> Self {
        Self {
            store: RecordStore::open(connection.users_path(), connection.delimiter()),
            reset_storage,
        }
    }

    /// Create an account, storing the hash of `password`
    pub fn register(&mut self, username: &str, password: &str, email: &str, role: &str) -> AddOutcome {
        self.add_user(User::new(username, hash_password(password), email, role))
    }

    /// Store `user` as given unless the username is already taken
    pub fn add_user(&mut self, user: User) -> AddOutcome {
        let username = user.username.clone();
        let outcome = self.store.add_if_absent(user, |existing| existing.has_username(&username));
        match &outcome {
            AddOutcome::Added => info!("Added user '{}'", username),
            AddOutcome::DuplicateSkipped => info!("Username '{}' already exists, not adding", username),
            AddOutcome::Malformed(reason) => warn!("Could not add user '{}': {}", username, reason),
        }
        outcome
    }

    pub fn username_exists(&self, username: &str) -> bool {
        self.store.any(|user| user.has_username(username))
    }

    /// True when a user with this username and password exists.
    ///
    /// An unknown username and a wrong password both yield `false`.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let hashed_input = hash_password(password);
        let authenticated = self.store.any(|user| user.authenticate(username, &hashed_input));
        info!("Authentication for '{}': {}", username, if authenticated { "ok" } else { "rejected" });
        authenticated
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.store.find(|user| user.has_username(username))
    }

    /// Role tag of `username`, if the user exists
    pub fn role_of(&self, username: &str) -> Option<&str> {
        self.find_user(username).map(|user| user.role.as_str())
    }

    /// Overwrite the password of the user matching both `username` and `email`.
    ///
    /// With the default `PasswordResetStorage::Plaintext` the new password is
    /// stored unhashed, so `authenticate` will not accept it afterwards. A
    /// password that cannot be stored on one line is rejected.
    pub fn reset_password(&mut self, username: &str, email: &str, new_password: &str) -> UpdateOutcome {
        let stored = self.reset_storage.stored_value(new_password);
        let outcome = self
            .store
            .update_first(|user| user.matches(username, email), |user| user.password = stored);

        match &outcome {
            UpdateOutcome::NotFound => {
                info!("Password reset rejected for '{}': no matching account", username)
            }
            UpdateOutcome::Rejected(reason) => {
                warn!("Password reset rejected for '{}': {}", username, reason)
            }
            UpdateOutcome::Updated if self.reset_storage == PasswordResetStorage::Plaintext => {
                warn!("Password for '{}' was reset and stored without hashing", username)
            }
            UpdateOutcome::Updated => info!("Password for '{}' was reset", username),
        }
        outcome
    }

    pub fn users(&self) -> &[User] {
        self.store.records()
    }

    pub fn store(&self) -> &RecordStore<User> {
        &self.store
    }
}
