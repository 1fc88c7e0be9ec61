//! Authentication and authorization middleware for Axum
//!
//! `auth_middleware` turns a valid bearer token into an [`AuthUser`] on the
//! request extensions. The role gates run in front of protected routes and
//! either pass the request through or terminate it with one of the denial
//! responses defined in [`AuthError`].

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jobboard_db::{Database, DbError, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};
use crate::rbac::has_minimum_role;

/// Authenticated caller identity, valid for one request
///
/// `role` doubles as the per-request role cache: it is populated either from
/// the token at authentication time or by [`resolve_role`] after the first
/// storage lookup, and every later gate in the same request reuses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Option<i64>,
    pub email: String,
    pub role: Option<Role>,
}

impl AuthUser {
    /// Create from JWT claims
    ///
    /// A role string the registry does not know parses to `None`, which
    /// forces a storage lookup instead of trusting the token.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.parse().ok(),
            email: claims.email.clone(),
            role: Role::from_str(&claims.role).ok(),
        }
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    if !header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(&header[7..])
}

/// Authentication middleware
///
/// Extracts and validates JWT tokens from the Authorization header.
/// If valid, it adds the AuthUser to request extensions. Requests without
/// an Authorization header pass through unauthenticated; the gates decide
/// whether that is acceptable per route.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(header) = auth_header {
        let token = extract_bearer_token(header)?;
        let claims = jwt_manager.validate_token(token)?;
        let user = AuthUser::from_claims(&claims);

        debug!("Authenticated user: {}", user.email);

        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Role lookup used by the resolver
///
/// Abstracts the user storage so the resolver can be exercised against a
/// mock. The production implementation projects only the role column.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError>;
}

#[async_trait]
impl RoleStore for Database {
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError> {
        Database::find_role_by_id(self, id).await
    }
}

/// Resolve the caller's role for the current request
///
/// At most one storage lookup per request: a role already on the identity is
/// returned as-is, and a looked-up role is written back onto the identity so
/// later gates in the same request skip the lookup. Storage faults are
/// logged here and surface only as [`AuthError::AuthorizationFailed`].
pub async fn resolve_role(
    identity: &mut AuthUser,
    store: &dyn RoleStore,
) -> Result<Role, AuthError> {
    if let Some(role) = &identity.role {
        return Ok(role.clone());
    }

    let Some(id) = identity.id else {
        return Err(AuthError::UserNotFound);
    };

    match store.find_role_by_id(id).await {
        Ok(Some(role)) => {
            identity.role = Some(role.clone());
            Ok(role)
        }
        Ok(None) => Err(AuthError::UserNotFound),
        Err(err) => {
            error!("Role lookup failed for user {}: {}", id, err);
            Err(AuthError::AuthorizationFailed)
        }
    }
}

/// Authorization gate placed in front of protected routes
///
/// Two variants with deliberately different semantics: the allow-list checks
/// exact membership with no hierarchy involved, while the minimum variant
/// accepts the named role or anything above it. Call sites pick whichever
/// rule they mean; the two are not interchangeable.
#[derive(Debug, Clone)]
pub enum RoleGate {
    AllowList(Vec<Role>),
    Minimum(Role),
}

/// Allow-list gate factory: exactly these roles, nothing implied by hierarchy
pub fn allow_roles<I>(roles: I) -> RoleGate
where
    I: IntoIterator<Item = Role>,
{
    RoleGate::AllowList(roles.into_iter().collect())
}

/// Minimum-level gate factory: this role or anything more privileged
pub fn require_minimum_role(role: Role) -> RoleGate {
    RoleGate::Minimum(role)
}

impl RoleGate {
    /// Run the full precondition / resolve / decide chain
    ///
    /// Transport-free: returns the resolved role on allow and a denial
    /// [`AuthError`] otherwise. The axum adapter below translates the error
    /// into the terminal response.
    pub async fn authorize(
        &self,
        identity: Option<&mut AuthUser>,
        store: &dyn RoleStore,
    ) -> Result<Role, AuthError> {
        let identity = identity.ok_or(AuthError::AuthenticationRequired)?;
        if identity.id.is_none() {
            return Err(AuthError::AuthenticationRequired);
        }

        let role = resolve_role(identity, store).await?;
        self.decide(&role)?;
        Ok(role)
    }

    /// Apply the variant-specific rule to an already-resolved role
    fn decide(&self, role: &Role) -> Result<(), AuthError> {
        match self {
            RoleGate::AllowList(allowed) => {
                if allowed.contains(role) {
                    Ok(())
                } else {
                    let list = allowed
                        .iter()
                        .map(Role::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    Err(AuthError::InsufficientPermissions(format!(
                        "Insufficient permissions. Required roles: {}",
                        list
                    )))
                }
            }
            RoleGate::Minimum(required) => {
                if has_minimum_role(role.as_str(), required.as_str()) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientPermissions(format!(
                        "Insufficient permissions. Minimum role required: {}",
                        required.as_str()
                    )))
                }
            }
        }
    }
}

/// Axum adapter for [`RoleGate`]
///
/// Attach with `middleware::from_fn_with_state((db, gate), role_gate)`.
/// On allow, the downstream handler sees the identity with its role cached;
/// on deny, the handler never runs.
pub async fn role_gate(
    State((db, gate)): State<(Database, RoleGate)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = request.extensions_mut().get_mut::<AuthUser>();
    gate.authorize(identity, &db).await?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Call-counting stand-in for user storage
    struct MockStore {
        role: Option<Role>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockStore {
        fn returning(role: Option<Role>) -> Self {
            Self {
                role,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                role: None,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RoleStore for MockStore {
        async fn find_role_by_id(&self, _id: i64) -> Result<Option<Role>, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DbError::NotFound("simulated storage fault".to_string()));
            }
            Ok(self.role.clone())
        }
    }

    fn identity_with_role(role: Role) -> AuthUser {
        AuthUser {
            id: Some(1),
            email: "user@example.com".to_string(),
            role: Some(role),
        }
    }

    fn identity_without_role(id: i64) -> AuthUser {
        AuthUser {
            id: Some(id),
            email: "user@example.com".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_resolver_uses_cached_role() {
        let store = MockStore::returning(Some(Role::Admin));
        let mut identity = identity_with_role(Role::JobSeeker);

        let role = resolve_role(&mut identity, &store).await.unwrap();
        assert_eq!(role, Role::JobSeeker);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolver_caches_looked_up_role() {
        let store = MockStore::returning(Some(Role::Employer));
        let mut identity = identity_without_role(42);

        let role = resolve_role(&mut identity, &store).await.unwrap();
        assert_eq!(role, Role::Employer);
        assert_eq!(identity.role, Some(Role::Employer));

        // Second resolution hits the cache, not the store
        let role = resolve_role(&mut identity, &store).await.unwrap();
        assert_eq!(role, Role::Employer);
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resolver_missing_id_is_not_found() {
        let store = MockStore::returning(Some(Role::Admin));
        let mut identity = AuthUser {
            id: None,
            email: "user@example.com".to_string(),
            role: None,
        };

        let err = resolve_role(&mut identity, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolver_missing_record_is_not_found() {
        let store = MockStore::returning(None);
        let mut identity = identity_without_role(42);

        let err = resolve_role(&mut identity, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_resolver_converts_storage_fault() {
        let store = MockStore::failing();
        let mut identity = identity_without_role(42);

        let err = resolve_role(&mut identity, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationFailed));
        // The storage fault itself never crosses the resolver boundary
        assert_eq!(err.to_string(), "Authorization check failed");
    }

    #[tokio::test]
    async fn test_gate_denies_missing_identity() {
        let store = MockStore::returning(Some(Role::Admin));
        let gate = allow_roles([Role::Admin]);

        let err = gate.authorize(None, &store).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationRequired));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gate_denies_identity_without_id() {
        let store = MockStore::returning(Some(Role::Admin));
        let gate = require_minimum_role(Role::JobSeeker);
        let mut identity = AuthUser {
            id: None,
            email: "user@example.com".to_string(),
            // Even a cached role does not make up for a missing user id
            role: Some(Role::Admin),
        };

        let err = gate.authorize(Some(&mut identity), &store).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_gate_unknown_user_is_not_found() {
        let store = MockStore::returning(None);
        let gate = require_minimum_role(Role::Employer);
        let mut identity = identity_without_role(42);

        let err = gate.authorize(Some(&mut identity), &store).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_allow_list_is_exact_and_lists_roles() {
        let store = MockStore::returning(Some(Role::JobSeeker));
        let gate = allow_roles([Role::Employer, Role::Admin]);
        let mut identity = identity_with_role(Role::JobSeeker);

        let err = gate.authorize(Some(&mut identity), &store).await.unwrap_err();
        match err {
            AuthError::InsufficientPermissions(message) => {
                assert_eq!(
                    message,
                    "Insufficient permissions. Required roles: EMPLOYER, ADMIN"
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Cached role: the store was never consulted
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_allow_list_ignores_hierarchy() {
        let store = MockStore::returning(Some(Role::Admin));
        // ADMIN outranks EMPLOYER but is not in the list, so it is denied
        let gate = allow_roles([Role::Employer]);
        let mut identity = identity_with_role(Role::Admin);

        assert!(gate.authorize(Some(&mut identity), &store).await.is_err());
    }

    #[tokio::test]
    async fn test_minimum_gate_accepts_higher_role() {
        let store = MockStore::returning(Some(Role::Admin));
        let gate = require_minimum_role(Role::Employer);
        let mut identity = identity_with_role(Role::Admin);

        let role = gate.authorize(Some(&mut identity), &store).await.unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[tokio::test]
    async fn test_minimum_gate_denial_names_required_role() {
        let store = MockStore::returning(Some(Role::JobSeeker));
        let gate = require_minimum_role(Role::Employer);
        let mut identity = identity_with_role(Role::JobSeeker);

        let err = gate.authorize(Some(&mut identity), &store).await.unwrap_err();
        match err {
            AuthError::InsufficientPermissions(message) => {
                assert_eq!(
                    message,
                    "Insufficient permissions. Minimum role required: EMPLOYER"
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gate_converts_storage_fault() {
        let store = MockStore::failing();
        let gate = allow_roles([Role::Admin]);
        let mut identity = identity_without_role(42);

        let err = gate.authorize(Some(&mut identity), &store).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationFailed));
    }

    #[tokio::test]
    async fn test_two_gates_share_one_lookup() {
        let store = MockStore::returning(Some(Role::Employer));
        let mut identity = identity_without_role(42);

        let first = require_minimum_role(Role::Employer);
        first.authorize(Some(&mut identity), &store).await.unwrap();

        let second = allow_roles([Role::Employer, Role::Admin]);
        second.authorize(Some(&mut identity), &store).await.unwrap();

        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc").unwrap(), "abc");
        assert!(extract_bearer_token("Basic abc").is_err());
    }

    #[test]
    fn test_from_claims_unknown_role_forces_lookup() {
        let claims = Claims {
            sub: "7".to_string(),
            email: "user@example.com".to_string(),
            role: "SUPERUSER".to_string(),
            exp: 0,
            iat: 0,
        };
        let user = AuthUser::from_claims(&claims);
        assert_eq!(user.id, Some(7));
        assert_eq!(user.role, None);
    }
}
