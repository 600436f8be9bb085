//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod form;
mod health;
mod posts;

use actix_web::web;

use quill_core::domain::{AuthorSummary, Category, CommentView, PostView, User};
use quill_shared::dto::{
    AuthorResponse, CategoryRef, CategoryResponse, CommentResponse, PostResponse, UserResponse,
};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{key}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list_categories))
                    .route("", web::post().to(categories::create_category)),
            ),
    );
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role.to_string(),
    }
}

fn author_response(author: AuthorSummary) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username,
    }
}

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

fn comment_response(comment: CommentView) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        user: comment.user.map(author_response),
        content: comment.content,
        created_at: comment.created_at,
    }
}

fn post_response(post: PostView) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        excerpt: post.excerpt,
        slug: post.slug,
        category: post.category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }),
        author: post.author.map(author_response),
        tags: post.tags,
        featured_image: post.featured_image,
        view_count: post.view_count,
        comments: post.comments.into_iter().map(comment_response).collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
