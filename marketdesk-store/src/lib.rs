//! MarketDesk Store: users and leads as JSONL document collections.
//!
//! - `Collection<T>`: append-only JSONL file with an optional unique key
//! - Users: bcrypt-hashed signup with username uniqueness
//! - Leads: form submissions and CSV export

pub mod collection;
pub mod error;
pub mod lead;
pub mod password;
pub mod user;

pub use collection::{Collection, Document};
pub use error::{StoreError, StoreResult};
pub use lead::{LeadForm, LeadRecord, LeadRepository};
pub use password::{PasswordHasher, DEFAULT_COST};
pub use user::{Signup, SignupOutcome, UserRecord, UserRepository};

use std::path::{Path, PathBuf};

/// Both collections rooted at one data directory.
pub struct Store {
    data_dir: PathBuf,
    pub users: UserRepository,
    pub leads: LeadRepository,
}

impl Store {
    pub fn open(data_dir: impl Into<PathBuf>, hasher: PasswordHasher) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let store = Self {
            users: UserRepository::open(&data_dir, hasher)?,
            leads: LeadRepository::open(&data_dir)?,
            data_dir,
        };
        tracing::info!(
            dir = %store.data_dir.display(),
            users = store.users.count()?,
            leads = store.leads.count()?,
            "store opened"
        );
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
