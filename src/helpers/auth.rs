use actix_web::HttpRequest;
use diesel::PgConnection;

use crate::errors::ApiError;
use crate::helpers::users::authenticate;
use crate::models::User;

pub const EMAIL_HEADER: &str = "X-User-Email";
pub const PASSWORD_HEADER: &str = "X-User-Password";

fn header_value<'a>(req: &'a HttpRequest, header: &str) -> Option<&'a str> {
    req.headers().get(header)?.to_str().ok()
}

/// Resolves the acting user from the per-request credential headers. This is
/// the only place that reads credentials off a request; everything under
/// helpers/ takes the resolved actor as an explicit argument.
pub fn resolve_actor(req: &HttpRequest, db: &PgConnection) -> Result<User, ApiError> {
    let user_email = header_value(req, EMAIL_HEADER).ok_or(ApiError::Unauthenticated)?;
    let password = header_value(req, PASSWORD_HEADER).ok_or(ApiError::Unauthenticated)?;

    authenticate(db, user_email, password)
}

/// Same as resolve_actor but for endpoints that serve guests too. Only a
/// credential failure downgrades to a guest; other errors still surface.
pub fn resolve_actor_optional(req: &HttpRequest, db: &PgConnection) -> Result<Option<User>, ApiError> {
    match resolve_actor(req, db) {
        Ok(user) => Ok(Some(user)),
        Err(ApiError::Unauthenticated) => Ok(None),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connect, create_user};
    use actix_web::test::TestRequest;

    #[test]
    #[ignore] // needs a migrated postgres at TEST_DATABASE_URL / DATABASE_URL
    fn missing_or_bad_credentials_resolve_to_guest() {
        let db = connect();
        let (user, _) = create_user(&db);

        let anonymous = TestRequest::default().to_http_request();
        assert!(resolve_actor_optional(&anonymous, &db).unwrap().is_none());

        let wrong_password = TestRequest::default()
            .header(EMAIL_HEADER, user.email.clone())
            .header(PASSWORD_HEADER, "not-the-password")
            .to_http_request();
        assert!(resolve_actor_optional(&wrong_password, &db).unwrap().is_none());

        let valid = TestRequest::default()
            .header(EMAIL_HEADER, user.email.clone())
            .header(PASSWORD_HEADER, "hunter2")
            .to_http_request();
        let resolved = resolve_actor_optional(&valid, &db).unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
    }
}
