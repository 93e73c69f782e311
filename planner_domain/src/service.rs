use crate::error::AuthError;
use crate::hashing_service::HashingService;
use crate::mappers::account_entity_to_account;
use crate::models::{Account, AuthResult};
use crate::TokenService;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use planner_data::entities::{AccountEntity, SaltedHash};
use planner_data::repositories::AccountRepository;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Lifetime of a session token issued by `login`
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

pub const MAX_USERNAME_LENGTH: usize = 64;

/// Account service trait defining registration and authentication
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a new account. Does not log the user in.
    async fn register(&self, username: &str, password: &str) -> AuthResult<Account>;

    /// Log in and return a session token
    async fn login(&self, username: &str, password: &str) -> AuthResult<String>;

    /// Resolve a session token to the username it was issued for
    fn authenticate(&self, session_token: &str) -> AuthResult<String>;
}

/// Implementation of AccountService
pub struct AccountServiceImpl {
    account_repository: Arc<dyn AccountRepository>,
    token_service: Arc<dyn TokenService>,
    hashing_service: Arc<dyn HashingService>,
    // Verified against when the username is unknown, so both login failures
    // cost the same.
    dummy_hash: Option<SaltedHash>,
}

impl AccountServiceImpl {
    /// Create a new account service instance
    pub fn new(
        account_repository: Arc<dyn AccountRepository>,
        token_service: Arc<dyn TokenService>,
        hashing_service: Arc<dyn HashingService>,
    ) -> Self {
        // One byte fits any length limit that admits a password at all.
        let dummy_hash = hashing_service.hash_password("x").ok();
        Self {
            account_repository,
            token_service,
            hashing_service,
            dummy_hash,
        }
    }

    fn validate_username(username: &str) -> AuthResult<()> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidInput("username must not be empty".to_string()));
        }
        if username.len() > MAX_USERNAME_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "username must be at most {} bytes",
                MAX_USERNAME_LENGTH
            )));
        }
        Ok(())
    }

    /// Password hashing is deliberately slow, keep it off the async workers
    async fn hash_password(&self, password: &str) -> AuthResult<SaltedHash> {
        let hashing_service = self.hashing_service.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hashing_service.hash_password(&password))
            .await
            .map_err(|e| AuthError::InternalError(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, salted_hash: SaltedHash) -> AuthResult<bool> {
        let hashing_service = self.hashing_service.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hashing_service.verify(&password, &salted_hash))
            .await
            .map_err(|e| AuthError::InternalError(format!("hashing task failed: {}", e)))
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(&self, username: &str, password: &str) -> AuthResult<Account> {
        Self::validate_username(username)?;

        let existing = self
            .account_repository
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("Failed to find account by username: {}", e);
                AuthError::from(e)
            })?;
        if existing.is_some() {
            warn!(username, "Registration rejected: username already exists");
            return Err(AuthError::DuplicateUsername);
        }

        let salted_hash = self.hash_password(password).await?;

        // A concurrent registration may have won since the lookup above; the
        // store's uniqueness constraint turns that into DuplicateUsername.
        let account = self
            .account_repository
            .insert_unique(AccountEntity::new(username.to_string(), salted_hash))
            .await
            .map_err(|e| {
                let e = AuthError::from(e);
                match &e {
                    AuthError::DuplicateUsername => {
                        warn!(username, "Registration lost a race for the username")
                    }
                    _ => error!("Failed to insert account: {}", e),
                }
                e
            })?;

        info!(username, "Registered account");
        Ok(account_entity_to_account(account))
    }

    async fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        let account = self
            .account_repository
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("Failed to find account by username: {}", e);
                AuthError::from(e)
            })?;

        let valid = match account {
            Some(account) => self.verify_password(password, account.salted_hash).await?,
            None => {
                if let Some(dummy_hash) = self.dummy_hash.clone() {
                    self.verify_password(password, dummy_hash).await?;
                }
                false
            }
        };

        if !valid {
            warn!(username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let session_token = self
            .token_service
            .issue(username, Utc::now(), Duration::seconds(SESSION_TTL_SECS))
            .map_err(|e| {
                error!("Failed to create session token: {}", e);
                e
            })?;

        info!(username, "Logged in");
        Ok(session_token)
    }

    fn authenticate(&self, session_token: &str) -> AuthResult<String> {
        self.token_service.verify(session_token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing_service::Pbkdf2HashingService;
    use crate::token_service::{JwtTokenService, TokenConfig};
    use jsonwebtoken::Algorithm;
    use planner_data::memory::InMemoryAccountRepository;
    use std::num::NonZeroU32;

    struct Fixture {
        service: Arc<AccountServiceImpl>,
        accounts: Arc<InMemoryAccountRepository>,
        tokens: Arc<JwtTokenService>,
    }

    fn setup() -> Fixture {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let tokens = Arc::new(JwtTokenService::new(TokenConfig::new(
            "secret".to_owned(),
            "audience".to_owned(),
            "issuer".to_owned(),
            Algorithm::HS256,
        )));
        let hashing_service = Arc::new(Pbkdf2HashingService::new(
            NonZeroU32::new(1_000).unwrap(),
            16,
            128,
        ));

        let service = Arc::new(AccountServiceImpl::new(
            accounts.clone(),
            tokens.clone(),
            hashing_service,
        ));

        Fixture {
            service,
            accounts,
            tokens,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let fixture = setup();

        let account = fixture.service.register("alice", "password123").await.unwrap();
        assert_eq!(account.username, "alice");
        assert!(!account.id.is_empty());

        let token = fixture.service.login("alice", "password123").await.unwrap();
        assert_eq!(fixture.service.authenticate(&token).unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_the_password() {
        let fixture = setup();
        fixture.service.register("alice", "password123").await.unwrap();

        let stored = fixture
            .accounts
            .find_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.salted_hash.hash, "password123");
        assert!(!stored.salted_hash.hash.contains("password123"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_hash() {
        let fixture = setup();
        fixture.service.register("bob", "pw1").await.unwrap();
        let first = fixture.accounts.find_by_username("bob").await.unwrap().unwrap();

        let result = fixture.service.register("bob", "pw2").await;

        assert!(matches!(result, Err(AuthError::DuplicateUsername)));
        let stored = fixture.accounts.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(stored.salted_hash, first.salted_hash);
        assert_eq!(fixture.accounts.count().await, 1);

        assert!(fixture.service.login("bob", "pw1").await.is_ok());
        assert!(fixture.service.login("bob", "pw2").await.is_err());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let fixture = setup();
        fixture.service.register("bob", "rightpw").await.unwrap();

        let unknown = fixture.service.login("nouser", "x").await.unwrap_err();
        let wrong = fixture.service.login("bob", "wrongpw").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    struct CountingHasher {
        inner: Pbkdf2HashingService,
        verifies: std::sync::atomic::AtomicUsize,
    }

    impl HashingService for CountingHasher {
        fn hash_password(&self, value: &str) -> Result<SaltedHash, AuthError> {
            self.inner.hash_password(value)
        }

        fn verify(&self, value: &str, salted_hash: &SaltedHash) -> bool {
            self.verifies
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.verify(value, salted_hash)
        }
    }

    #[tokio::test]
    async fn test_unknown_user_still_verifies_with_short_password_limit() {
        let hasher = Arc::new(CountingHasher {
            inner: Pbkdf2HashingService::new(NonZeroU32::new(1_000).unwrap(), 16, 8),
            verifies: Default::default(),
        });
        let service = AccountServiceImpl::new(
            Arc::new(InMemoryAccountRepository::new()),
            setup().tokens,
            hasher.clone(),
        );
        assert!(service.dummy_hash.is_some());

        let result = service.login("nouser", "pw").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(hasher.verifies.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let fixture = setup();
        fixture.service.register("Bob", "pw").await.unwrap();

        let result = fixture.service.login("bob", "pw").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(fixture.service.register("bob", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_registration_input() {
        let fixture = setup();

        assert!(matches!(
            fixture.service.register("", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            fixture.service.register("   ", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            fixture.service.register(&"u".repeat(MAX_USERNAME_LENGTH + 1), "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            fixture.service.register("alice", "").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            fixture.service.register("alice", &"p".repeat(129)).await,
            Err(AuthError::InvalidInput(_))
        ));
        assert_eq!(fixture.accounts.count().await, 0);
    }

    #[tokio::test]
    async fn test_login_token_lives_one_day() {
        let fixture = setup();
        fixture.service.register("alice", "pw").await.unwrap();

        let before = Utc::now();
        let token = fixture.service.login("alice", "pw").await.unwrap();

        let almost = before + Duration::seconds(SESSION_TTL_SECS - 60);
        assert_eq!(fixture.tokens.verify(&token, almost).unwrap(), "alice");

        let after = Utc::now() + Duration::seconds(SESSION_TTL_SECS + 1);
        assert!(matches!(
            fixture.tokens.verify(&token, after),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_foreign_tokens() {
        let fixture = setup();
        let foreign = JwtTokenService::new(TokenConfig::new(
            "other-secret".to_owned(),
            "audience".to_owned(),
            "issuer".to_owned(),
            Algorithm::HS256,
        ))
        .issue("alice", Utc::now(), Duration::days(1))
        .unwrap();

        let result = fixture.service.authenticate(&foreign);
        assert!(matches!(result, Err(AuthError::BadSignature)));
        assert!(result.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_reported_as_bad_credentials() {
        let fixture = setup();
        fixture.accounts.set_unavailable(true);

        let login = fixture.service.login("alice", "pw").await.unwrap_err();
        let register = fixture.service.register("alice", "pw").await.unwrap_err();

        assert!(matches!(login, AuthError::DataError(_)));
        assert!(matches!(register, AuthError::DataError(_)));
        assert!(!login.is_unauthorized());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_admits_exactly_one() {
        let fixture = setup();

        let first = {
            let service = fixture.service.clone();
            tokio::spawn(async move { service.register("carol", "pw-one").await })
        };
        let second = {
            let service = fixture.service.clone();
            tokio::spawn(async move { service.register("carol", "pw-two").await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::DuplicateUsername)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(fixture.accounts.count().await, 1);
    }
}
