use crate::error::DomainError;

/// bcrypt work factor used when none is configured.
pub const DEFAULT_COST: u32 = 10;

/// Hashes and verifies secrets with bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let secret = secret.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
            .await
            .map_err(|e| DomainError::Hashing(e.to_string()))?
            .map_err(|e| DomainError::Hashing(e.to_string()))
    }

    /// Returns false for a wrong secret or a malformed hash.
    pub async fn verify(&self, secret: &str, hash: &str) -> Result<bool, DomainError> {
        let secret = secret.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
            .await
            .map_err(|e| DomainError::Hashing(e.to_string()))?;
        Ok(verified.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("Secret@123").await.unwrap();
        assert_ne!(hash, "Secret@123");
        assert!(hasher.verify("Secret@123", &hash).await.unwrap());
        assert!(!hasher.verify("secret@123", &hash).await.unwrap());
        assert!(!hasher.verify("Secret@123", "not-a-hash").await.unwrap());
    }
}
