//! Password hashing with Argon2id.
//!
//! Only PHC-formatted hashes are stored. Plaintext passwords are held in
//! [`Zeroizing`] buffers and never logged.

use std::sync::{Arc, OnceLock};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::Error;

/// Salted Argon2 hash in PHC string form, e.g. `$argon2id$v=19$...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Plaintext hashed once per hasher to stand in for accounts that do not
/// exist.
const DUMMY_PASSWORD: &str = "medlink-no-such-account";

/// Hashes and verifies account passwords.
///
/// Clones share the lazily built dummy hash used by
/// [`CredentialHasher::check`].
///
/// # Examples
/// ```
/// use medlink::domain::CredentialHasher;
///
/// let hasher = CredentialHasher::with_params(1024, 1, 1).unwrap();
/// let hash = hasher.hash("hunter22").unwrap();
/// assert!(hasher.verify("hunter22", &hash));
/// assert!(!hasher.verify("hunter23", &hash));
/// ```
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy: Arc<OnceLock<Option<PasswordHash>>>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl Default for CredentialHasher {
    /// Argon2id with the crate's recommended parameters.
    fn default() -> Self {
        Self::from_argon2(Argon2::default())
    }
}

impl CredentialHasher {
    /// Argon2id with explicit memory (KiB), iteration and lane costs.
    ///
    /// Cheap parameters keep test suites fast; production uses
    /// [`CredentialHasher::default`].
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, Error> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|err| Error::internal(format!("invalid argon2 parameters: {err}")))?;
        Ok(Self::from_argon2(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        Self {
            argon2,
            dummy: Arc::new(OnceLock::new()),
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of Argon2 verifications run by this hasher and its clones.
    #[cfg(test)]
    pub(crate) fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    fn dummy_hash(&self) -> Option<&PasswordHash> {
        self.dummy
            .get_or_init(|| match self.hash(DUMMY_PASSWORD) {
                Ok(hash) => Some(hash),
                Err(error) => {
                    tracing::error!(%error, "dummy password hash unavailable");
                    None
                }
            })
            .as_ref()
    }

    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, Error> {
        let plaintext = Zeroizing::new(plaintext.as_bytes().to_vec());
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(&plaintext, &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|err: password_hash::Error| {
                Error::internal(format!("password hashing failed: {err}"))
            })
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A malformed stored hash verifies as `false`; the parameters embedded in
    /// the hash win over this hasher's own.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);
        match PhcHash::new(hash.as_ref()) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(error) => {
                tracing::warn!(%error, "stored password hash is not a valid PHC string");
                false
            }
        }
    }

    /// Check `plaintext` against `stored` on the blocking thread pool.
    ///
    /// With no stored hash the password is still verified, against a dummy
    /// hash built with this hasher's parameters, and the check fails. Unknown
    /// accounts then cost as much as wrong passwords.
    pub async fn check(
        &self,
        plaintext: &str,
        stored: Option<PasswordHash>,
    ) -> Result<bool, Error> {
        let hasher = self.clone();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify(&plaintext, &hash),
            None => {
                if let Some(dummy) = hasher.dummy_hash() {
                    hasher.verify(&plaintext, dummy);
                }
                false
            }
        })
        .await
        .map_err(|err| Error::internal(format!("password check task failed: {err}")))
    }

    /// [`CredentialHasher::hash`] on the blocking thread pool.
    pub async fn hash_blocking(&self, plaintext: &str) -> Result<PasswordHash, Error> {
        let hasher = self.clone();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> CredentialHasher {
        CredentialHasher::with_params(1024, 1, 1).expect("cheap params")
    }

    #[rstest]
    fn hashes_are_salted(hasher: CredentialHasher) {
        let first = hasher.hash("secret").expect("hash");
        let second = hasher.hash("secret").expect("hash");
        assert_ne!(first, second);
        assert!(first.as_ref().starts_with("$argon2id$"));
        assert!(!first.as_ref().contains("secret"));
    }

    #[rstest]
    #[case("secret", true)]
    #[case("Secret", false)]
    #[case("", false)]
    fn verifies_only_the_original_password(
        hasher: CredentialHasher,
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let hash = hasher.hash("secret").expect("hash");
        assert_eq!(hasher.verify(attempt, &hash), expected);
    }

    #[rstest]
    fn malformed_hash_never_verifies(hasher: CredentialHasher) {
        let hash = PasswordHash::from_stored("plaintext-from-a-bad-import");
        assert!(!hasher.verify("plaintext-from-a-bad-import", &hash));
    }

    #[rstest]
    #[tokio::test]
    async fn check_verifies_even_without_a_stored_hash(hasher: CredentialHasher) {
        let stored = hasher.hash("secret").expect("hash");
        let before = hasher.verification_count();

        assert!(hasher.check("secret", Some(stored)).await.expect("check"));
        assert!(!hasher.check("secret", None).await.expect("check"));
        assert!(!hasher.check(DUMMY_PASSWORD, None).await.expect("check"));

        assert_eq!(hasher.verification_count() - before, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn hash_blocking_produces_verifiable_hashes(hasher: CredentialHasher) {
        let hash = hasher.hash_blocking("secret").await.expect("hash");
        assert!(hasher.verify("secret", &hash));
    }

    #[rstest]
    fn rejects_impossible_parameters() {
        assert!(CredentialHasher::with_params(1, 0, 0).is_err());
    }
}
