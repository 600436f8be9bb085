//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::{FutureExt, LocalBoxFuture};

use quill_core::domain::User;
use quill_core::policy::Actor;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user, reloaded from the store on every request.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.user)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AppError::Internal("Server configuration error".into()));
            };
            let Some(token) = token else {
                return Err(AppError::Unauthorized(
                    "Not authorized to access this route".into(),
                ));
            };

            let user = state.accounts.authenticate(&token).await?;
            Ok(Identity { user })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let ok = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        let lowercase = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer abc"))
            .to_http_request();
        let basic = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic Zm9vOmJhcg=="))
            .to_http_request();
        let empty = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();

        assert_eq!(bearer_token(&ok).as_deref(), Some("abc.def"));
        assert_eq!(bearer_token(&lowercase).as_deref(), Some("abc"));
        assert_eq!(bearer_token(&basic), None);
        assert_eq!(bearer_token(&empty), None);
        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }
}
