//! Salted one-way password hashing (bcrypt).

use crate::error::{StoreError, StoreResult};

/// bcrypt work factor used when the config does not override it.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// bcrypt accepts costs 4 through 31.
    pub fn new(cost: u32) -> StoreResult<Self> {
        if !(4..=31).contains(&cost) {
            return Err(StoreError::PasswordHash(format!(
                "cost {cost} outside 4..=31"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash with a fresh random salt. The result embeds salt and cost.
    pub fn hash(&self, password: &str) -> StoreResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| StoreError::PasswordHash(e.to_string()))
    }

    pub fn verify(&self, password: &str, hashed: &str) -> StoreResult<bool> {
        bcrypt::verify(password, hashed).map_err(|e| StoreError::PasswordHash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let hasher = PasswordHasher::new(4).unwrap();
        let a = hasher.hash("secret123").unwrap();
        let b = hasher.hash("secret123").unwrap();

        assert_ne!(a, "secret123");
        assert_ne!(a, b);
        assert!(hasher.verify("secret123", &a).unwrap());
        assert!(!hasher.verify("secret124", &a).unwrap());
    }

    #[test]
    fn cost_out_of_range_rejected() {
        assert!(PasswordHasher::new(3).is_err());
        assert!(PasswordHasher::new(32).is_err());
        assert_eq!(PasswordHasher::new(10).unwrap().cost(), 10);
    }
}
