//! Post entity for SeaORM.
//!
//! Tags and comments are embedded as JSONB arrays, so appending a comment
//! is a single-row update.

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde_json::json;

use quill_core::domain::Post;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub excerpt: Option<String>,
    #[sea_orm(unique)]
    pub slug: String,
    pub category_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub featured_image: String,
    pub view_count: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Post {
    type Error = serde_json::Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            title: model.title,
            content: model.content,
            excerpt: model.excerpt,
            slug: model.slug,
            category_id: model.category_id,
            author_id: model.author_id,
            tags: serde_json::from_value(model.tags)?,
            featured_image: model.featured_image,
            view_count: model.view_count,
            comments: serde_json::from_value(model.comments)?,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            slug: Set(post.slug),
            category_id: Set(post.category_id),
            author_id: Set(post.author_id),
            tags: Set(json!(post.tags)),
            featured_image: Set(post.featured_image),
            view_count: Set(post.view_count),
            comments: Set(json!(post.comments)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
