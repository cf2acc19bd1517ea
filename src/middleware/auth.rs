use axum::{response::{Response, IntoResponse}};
use axum::middleware::Next;
use axum::http::Request;

use crate::dtos::product::ProductType;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn from_header(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    // The product types this role may observe
    pub fn visible_types(&self) -> &'static [ProductType] {
        match self {
            Role::User => &[ProductType::Public],
            Role::Admin => &[ProductType::Public, ProductType::Private],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub role: Role,
}

// Resolves X-User-Role once at the boundary; handlers only see the Role enum
pub async fn require_role(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let header = req.headers()
        .get("X-User-Role")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let value = match header {
        Some(v) => v,
        None => return AppError::Unauthorized.into_response(),
    };

    let role = match Role::from_header(value) {
        Some(r) => r,
        None => {
            return AppError::forbidden("Admin role required for this operation").into_response()
        }
    };

    req.extensions_mut().insert(AuthContext { role });

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_roles() {
        assert_eq!(Role::from_header("user"), Some(Role::User));
        assert_eq!(Role::from_header("admin"), Some(Role::Admin));
    }

    #[test]
    fn rejects_unknown_roles() {
        assert_eq!(Role::from_header("manager"), None);
        assert_eq!(Role::from_header("Admin"), None);
        assert_eq!(Role::from_header(""), None);
    }

    #[test]
    fn user_sees_only_public() {
        assert_eq!(Role::User.visible_types(), &[ProductType::Public]);
    }

    #[test]
    fn admin_sees_public_and_private() {
        assert_eq!(
            Role::Admin.visible_types(),
            &[ProductType::Public, ProductType::Private]
        );
    }
}
