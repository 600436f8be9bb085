//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::{Registration, Session};
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use super::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn auth_response(session: Session) -> AuthResponse {
    AuthResponse {
        success: true,
        token: session.token,
        user: user_response(session.user),
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let session = state
        .accounts
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    Ok(HttpResponse::Created().json(auth_response(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.accounts.login(&body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(auth_response(session)))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(identity.user))))
}
