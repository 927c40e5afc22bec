/// Request authentication context
///
/// After the API's JWT middleware validates a Bearer token, it inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// axum's `Extension` extractor; services receive it for party and role
/// checks.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use lendit_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {} ({})", auth.username, auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};

use super::jwt::Claims;
use crate::models::role::RoleName;

/// Authenticated identity attached to each request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username (stable identity key for party checks)
    pub username: String,

    /// Roles held by the user
    pub roles: Vec<RoleName>,
}

impl AuthContext {
    /// Builds the context from validated JWT claims
    ///
    /// Unknown role names in the token are ignored rather than rejected, so
    /// tokens minted before a role was retired still authenticate.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            roles: claims
                .roles
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect(),
        }
    }

    /// Checks whether the user holds a specific role
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// Checks whether the user holds any of the given roles
    pub fn has_any_role(&self, roles: &[RoleName]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_from_claims() {
        let claims = Claims::new(
            5,
            "cinnamon",
            vec!["lender".to_string(), "user".to_string()],
            TokenType::Access,
        );

        let ctx = AuthContext::from_claims(&claims);
        assert_eq!(ctx.user_id, 5);
        assert_eq!(ctx.username, "cinnamon");
        assert!(ctx.has_role(RoleName::Lender));
        assert!(ctx.has_role(RoleName::User));
        assert!(!ctx.has_role(RoleName::Admin));
    }

    #[test]
    fn test_unknown_roles_ignored() {
        let claims = Claims::new(
            5,
            "cinnamon",
            vec!["superuser".to_string(), "user".to_string()],
            TokenType::Access,
        );

        let ctx = AuthContext::from_claims(&claims);
        assert_eq!(ctx.roles, vec![RoleName::User]);
    }

    #[test]
    fn test_has_any_role() {
        let ctx = AuthContext {
            user_id: 1,
            username: "admin".to_string(),
            roles: vec![RoleName::Admin],
        };

        assert!(ctx.has_any_role(&[RoleName::Admin, RoleName::Lender]));
        assert!(!ctx.has_any_role(&[RoleName::Lender, RoleName::User]));
        assert!(!ctx.has_any_role(&[]));
    }
}
