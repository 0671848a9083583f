//! Users collection and the signup operation.

use crate::collection::{Collection, Document};
use crate::error::{StoreError, StoreResult};
use crate::password::PasswordHasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A registered user. The password is only ever stored hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl Document for UserRecord {
    const COLLECTION: &'static str = "users";

    fn unique_key(&self) -> Option<String> {
        Some(self.username.clone())
    }
}

/// Signup form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    Created(UserRecord),
    UsernameTaken,
}

pub struct UserRepository {
    users: Collection<UserRecord>,
    hasher: PasswordHasher,
}

impl UserRepository {
    pub fn open(dir: &Path, hasher: PasswordHasher) -> StoreResult<Self> {
        Ok(Self {
            users: Collection::open_in(dir)?,
            hasher,
        })
    }

    /// Hash the password and insert the user.
    ///
    /// The collection's unique key on `username` decides duplicates; the
    /// early lookup only avoids paying for a hash when the name is taken.
    pub fn register(&self, signup: &Signup) -> StoreResult<SignupOutcome> {
        if self.users.contains_key(&signup.username)? {
            return Ok(SignupOutcome::UsernameTaken);
        }

        let record = UserRecord {
            username: signup.username.clone(),
            email: signup.email.clone(),
            hashed_password: self.hasher.hash(&signup.password)?,
            created_at: Utc::now(),
        };

        match self.users.insert(record.clone()) {
            Ok(()) => {
                tracing::info!(username = %record.username, "user registered");
                Ok(SignupOutcome::Created(record))
            }
            Err(StoreError::DuplicateKey { .. }) => Ok(SignupOutcome::UsernameTaken),
            Err(e) => Err(e),
        }
    }

    pub fn find(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        self.users.find_by_key(username)
    }

    pub fn all(&self) -> StoreResult<Vec<UserRecord>> {
        self.users.all()
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.users.len()
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }
}
