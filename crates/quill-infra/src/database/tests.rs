use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
use serde_json::json;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::{post, user};
use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_row(id: Uuid, comments: serde_json::Value) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        excerpt: None,
        slug: "test-post-1".to_owned(),
        category_id: Uuid::new_v4(),
        author_id: Uuid::new_v4(),
        tags: json!(["rust", "web"]),
        featured_image: "default-post.jpg".to_owned(),
        view_count: 3,
        comments,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn user_row(role: &str) -> user::Model {
    let now = Utc::now();
    user::Model {
        id: Uuid::new_v4(),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password_hash: "$argon2id$stub".to_owned(),
        role: role.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_decodes_embedded_json() {
    let post_id = Uuid::new_v4();
    let comment = Comment::new(Uuid::new_v4(), "First!".into());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id, json!([comment]))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.tags, vec!["rust", "web"]);
    assert_eq!(post.comments, vec![comment]);
    assert_eq!(post.view_count, 3);
}

#[tokio::test]
async fn test_malformed_comments_are_a_query_error() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id, json!({"not": "a list"}))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.find_by_slug("test-post-1").await,
        Err(RepoError::Query(_))
    ));
}

#[tokio::test]
async fn test_find_user_by_email_parses_role() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("author")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.role, Role::Author);
    assert_eq!(user.username, "ada");
}

#[tokio::test]
async fn test_unknown_role_is_a_query_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("superuser")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    assert!(matches!(
        repo.find_by_email("ada@example.com").await,
        Err(RepoError::Query(_))
    ));
}

#[tokio::test]
async fn test_summaries_skip_the_query_for_no_ids() {
    // No results queued: any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresUserRepository::new(db);

    assert!(repo.find_summaries(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_increment_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.increment_view_count(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_increment_returns_the_stored_row() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id, json!([]))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post = repo.increment_view_count(post_id).await.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.view_count, 3);
}

#[tokio::test]
async fn test_delete_and_comment_report_missing_rows() {
    let nothing = || MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([nothing(), nothing()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let comment = Comment::new(Uuid::new_v4(), "hello".into());

    assert!(matches!(
        repo.delete(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
    assert!(matches!(
        repo.push_comment(Uuid::new_v4(), &comment).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_push_comment_appends_in_one_statement() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let comment = Comment::new(Uuid::new_v4(), "hello".into());

    assert!(repo.push_comment(Uuid::new_v4(), &comment).await.is_ok());
}

#[tokio::test]
async fn test_driver_errors_become_query_errors() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Query(RuntimeErr::Internal("boom".into()))])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.find_by_slug("anything").await,
        Err(RepoError::Query(_))
    ));
}
