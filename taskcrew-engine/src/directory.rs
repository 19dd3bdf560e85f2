/// Principal directory: registration, approval, authentication
///
/// Role is chosen at registration and never changes. Admins start `Active`;
/// managers and employees start `Pending` and must be promoted by an admin
/// before they can authenticate or be assigned work. Deactivation is the
/// admin-side off switch.
///
/// Authentication exchanges email + password for a signed, time-limited
/// assertion of `(principal_id, role)`; `verify` turns a presented assertion
/// back into an [`AuthContext`] or fails with `Unauthenticated`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskcrew_engine::directory::Directory;
/// use taskcrew_shared::config::TokenConfig;
/// use taskcrew_shared::models::principal::{RegisterInput, Role};
/// use taskcrew_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let directory = Directory::new(
///     Arc::new(MemoryStore::new()),
///     TokenConfig::new("a-development-secret-of-32-bytes!"),
/// );
///
/// let admin = directory
///     .register(Role::Admin, RegisterInput {
///         name: "Root Admin".to_string(),
///         email: "root@example.com".to_string(),
///         phone: None,
///         password: "Adm1n!pass".to_string(),
///     })
///     .await?;
///
/// let session = directory.authenticate("root@example.com", "Adm1n!pass").await?;
/// let ctx = directory.verify(&session.token)?;
/// assert_eq!(ctx.principal_id, admin.id);
/// # Ok(())
/// # }
/// ```
///
/// [`AuthContext`]: taskcrew_shared::auth::context::AuthContext
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use taskcrew_shared::auth::authorization::{require, Action, Supervision};
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::auth::password::{hash_password, validate_password_strength, verify_password};
use taskcrew_shared::auth::token::{issue_token, verify_token, Claims};
use taskcrew_shared::config::TokenConfig;
use taskcrew_shared::error::{CoreResult, Error};
use taskcrew_shared::models::principal::{Principal, PrincipalStatus, RegisterInput, Role};
use taskcrew_shared::store::Store;

/// Result of a successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// Authenticated principal ID
    pub principal_id: Uuid,

    /// Principal role
    pub role: Role,

    /// Signed assertion to present on subsequent requests
    pub token: String,

    /// When the assertion expires
    pub expires_at: DateTime<Utc>,
}

/// Principal directory service
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn Store>,
    token: TokenConfig,
}

impl Directory {
    /// Creates a directory over the given store
    pub fn new(store: Arc<dyn Store>, token: TokenConfig) -> Self {
        Directory { store, token }
    }

    /// Registers a new principal with the given role
    ///
    /// The role is immutable afterwards. Admins start active; managers and
    /// employees start pending and cannot authenticate until approved.
    ///
    /// # Errors
    ///
    /// - `Validation` for bad fields or a weak password
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, role: Role, input: RegisterInput) -> CoreResult<Principal> {
        input.validate()?;
        validate_password_strength(&input.password)
            .map_err(|reason| Error::validation("password", &reason))?;

        let password_hash = hash_password(&input.password)?;
        let principal = Principal::new(role, &input, password_hash);
        let principal = self.store.insert_principal(principal).await?;

        tracing::info!(
            principal_id = %principal.id,
            role = %principal.role,
            status = principal.status.as_str(),
            "principal registered"
        );

        Ok(principal)
    }

    /// Sets a principal's account status (admin only)
    ///
    /// This is the `Pending → Active` approval path and the deactivation
    /// path. Role never changes here or anywhere else.
    pub async fn set_status(
        &self,
        actor: &AuthContext,
        principal_id: Uuid,
        status: PrincipalStatus,
    ) -> CoreResult<Principal> {
        require(actor, &Action::ApproveAccounts, &Supervision::none())?;

        let mut principal = self
            .store
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| Error::not_found("principal", principal_id))?;

        principal.status = status;
        principal.updated_at = Utc::now();
        let principal = self.store.update_principal(principal).await?;

        tracing::info!(
            principal_id = %principal.id,
            status = principal.status.as_str(),
            approved_by = %actor.principal_id,
            "principal status changed"
        );

        Ok(principal)
    }

    /// Exchanges credentials for a signed assertion
    ///
    /// Only active principals may authenticate. Failures are deliberately
    /// indistinguishable from the caller's side.
    pub async fn authenticate(&self, email: &str, password: &str) -> CoreResult<AuthSession> {
        let invalid = || Error::Unauthenticated("invalid credentials".to_string());

        let principal = self
            .store
            .find_principal_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &principal.password_hash)? {
            return Err(invalid());
        }

        if !principal.is_active() {
            return Err(Error::Unauthenticated("account is not active".to_string()));
        }

        // Best-effort; losing a last-login write never fails the request
        let mut stamped = principal.clone();
        stamped.last_login_at = Some(Utc::now());
        if let Err(e) = self.store.update_principal(stamped).await {
            tracing::warn!(principal_id = %principal.id, error = %e, "failed to stamp last login");
        }

        let claims = Claims::new(principal.id, principal.role, self.token.ttl());
        let token = issue_token(&claims, &self.token.secret)?;

        tracing::info!(principal_id = %principal.id, role = %principal.role, "authenticated");

        Ok(AuthSession {
            principal_id: principal.id,
            role: principal.role,
            token,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        })
    }

    /// Verifies a presented assertion into an [`AuthContext`]
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for any invalid, expired, or tampered assertion
    ///
    /// [`AuthContext`]: taskcrew_shared::auth::context::AuthContext
    pub fn verify(&self, token: &str) -> CoreResult<AuthContext> {
        let claims = verify_token(token, &self.token.secret)?;
        Ok(AuthContext::from_claims(&claims))
    }

    /// Fetches a principal by id
    pub async fn get(&self, principal_id: Uuid) -> CoreResult<Principal> {
        self.store
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| Error::not_found("principal", principal_id))
    }
}
