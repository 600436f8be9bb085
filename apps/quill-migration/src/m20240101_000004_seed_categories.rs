use sea_orm_migration::prelude::*;

use quill_core::domain::{Category, DEFAULT_CATEGORIES};

use crate::m20240101_000002_create_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::Id,
                Categories::Name,
                Categories::Slug,
                Categories::CreatedAt,
                Categories::UpdatedAt,
            ])
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .to_owned();

        for name in DEFAULT_CATEGORIES {
            let category = Category::new(name.to_string());
            insert
                .values([
                    category.id.into(),
                    category.name.into(),
                    category.slug.into(),
                    category.created_at.into(),
                    category.updated_at.into(),
                ])
                .map_err(|e| DbErr::Custom(e.to_string()))?;
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Categories::Table)
                    .and_where(Expr::col(Categories::Name).is_in(DEFAULT_CATEGORIES))
                    .to_owned(),
            )
            .await
    }
}
