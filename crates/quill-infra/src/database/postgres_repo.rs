//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use serde_json::json;
use uuid::Uuid;

use quill_core::domain::{AuthorSummary, Category, Comment, Post, PostFilter, User};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository, UserRepository};
use quill_core::services::mask_email;

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, corrupt_row, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result
            .map(|model| User::try_from(model).map_err(corrupt_row))
            .transpose()
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<AuthorSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorSummary {
                id: row.id,
                username: row.username,
            })
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let rows = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// `%term%` for a case-insensitive LIKE, with the term matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &PostFilter) -> Select<PostEntity> {
    let mut condition = Condition::all();

    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }

    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(pattern.clone()))
                .add(Expr::cust_with_values(
                    r#"EXISTS (SELECT 1 FROM jsonb_array_elements_text("posts"."tags") AS t(tag) WHERE LOWER(t.tag) LIKE ?)"#,
                    [pattern],
                )),
        );
    }

    PostEntity::find().filter(condition)
}

fn into_post(model: post::Model) -> Result<Post, RepoError> {
    Post::try_from(model).map_err(corrupt_row)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(into_post).transpose()
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let rows = filtered(filter)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter().map(into_post).collect()
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        filtered(filter).count(&self.db).await.map_err(map_db_err)
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        // Counters and comments are not part of the statement, so concurrent
        // views or comments survive an edit.
        let changes = post::ActiveModel {
            id: Unchanged(post.id),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            excerpt: Set(post.excerpt.clone()),
            category_id: Set(post.category_id),
            tags: Set(json!(post.tags)),
            featured_image: Set(post.featured_image.clone()),
            updated_at: Set(post.updated_at.into()),
            ..Default::default()
        };

        let model = changes.update(&self.db).await.map_err(map_db_err)?;
        into_post(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<Post, RepoError> {
        let rows = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .next()
            .ok_or(RepoError::NotFound)
            .and_then(into_post)
    }

    async fn push_comment(&self, post_id: Uuid, comment: &Comment) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Comments,
                Expr::cust_with_values(r#""comments" || ?"#, [json!([comment])]),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
