//! Category handlers.

use actix_web::{HttpResponse, web};

use quill_shared::dto::CreateCategoryRequest;
use quill_shared::{ApiResponse, ListResponse};

use super::category_response;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list_categories().await?;

    Ok(HttpResponse::Ok().json(ListResponse::new(
        categories.into_iter().map(category_response).collect(),
    )))
}

/// POST /api/categories
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state.categories.create_category(&body.name).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(category_response(category))))
}
