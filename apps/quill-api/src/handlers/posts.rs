//! Post handlers: listing, lookup, mutations and comments.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::PostKey;
use quill_core::services::ListPostsQuery;
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateCommentRequest, PaginationResponse, PostListResponse};

use super::form::PostForm;
use super::{comment_response, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw query string; numbers are parsed leniently by the service.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

/// Mutation routes only take identifiers; anything else names no post.
fn post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post not found".into()))
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let page = state
        .posts
        .list_posts(&ListPostsQuery {
            page: params.page,
            limit: params.limit,
            category: params.category,
            search: params.search,
        })
        .await?;

    let data: Vec<_> = page.items.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(PostListResponse {
        success: true,
        count: data.len(),
        pagination: PaginationResponse {
            page: page.pagination.page,
            limit: page.pagination.limit,
            total_pages: page.pagination.total_pages,
            total_posts: page.pagination.total_items,
        },
        data,
    }))
}

/// GET /api/posts/{idOrSlug}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = PostKey::parse(&path.into_inner());
    let post = state.posts.get_post(&key).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let form = PostForm::read(&req, payload, state.max_image_bytes).await?;
    let input = form.into_input(state.images.as_ref()).await?;

    let post = state.posts.create_post(&identity.actor(), input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    let form = PostForm::read(&req, payload, state.max_image_bytes).await?;
    let input = form.into_input(state.images.as_ref()).await?;

    let post = state.posts.update_post(&identity.actor(), id, input).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    state.posts.delete_post(&identity.actor(), id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({}))))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let id = post_id(&path)?;
    let comment = state
        .posts
        .add_comment(&identity.actor(), id, &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        comment_response(comment),
        "Comment added successfully",
    )))
}
