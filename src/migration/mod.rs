//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_movies;
mod m20250301_000003_create_series;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_movies::Migration),
            Box::new(m20250301_000003_create_series::Migration),
        ]
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    ProviderId,
    Provider,
    Email,
    Name,
    CreatedAt,
    UpdatedAt,
}

/// Columns shared by the movies and series tables.
#[derive(DeriveIden)]
pub enum LibraryItem {
    Id,
    TmdbId,
    Title,
    PosterPath,
    TmdbScore,
    Score,
    Watched,
    UserId,
    CreatedAt,
    UpdatedAt,
}

/// Create a library table with its owner foreign key and per-user uniqueness index.
async fn create_library_table(
    manager: &SchemaManager<'_>,
    table: impl IntoIden + Copy + 'static,
    date_column: impl IntoIden + 'static,
    table_name: &str,
) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(ColumnDef::new(LibraryItem::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(LibraryItem::TmdbId).integer().not_null())
                .col(ColumnDef::new(LibraryItem::Title).string().not_null())
                .col(ColumnDef::new(LibraryItem::PosterPath).string().null())
                .col(ColumnDef::new(date_column).date().null())
                .col(ColumnDef::new(LibraryItem::TmdbScore).double().not_null())
                .col(
                    ColumnDef::new(LibraryItem::Score)
                        .double()
                        .not_null()
                        .default(0.0),
                )
                .col(
                    ColumnDef::new(LibraryItem::Watched)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(LibraryItem::UserId).uuid().not_null())
                .col(
                    ColumnDef::new(LibraryItem::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(LibraryItem::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name(format!("fk_{}_user_id", table_name))
                        .from(table, LibraryItem::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(format!("idx_{}_tmdb_id_user_id", table_name))
                .table(table)
                .col(LibraryItem::TmdbId)
                .col(LibraryItem::UserId)
                .unique()
                .to_owned(),
        )
        .await?;

    // Listing filters on owner and watched flag, ordered by catalog score
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(format!("idx_{}_user_id_watched", table_name))
                .table(table)
                .col(LibraryItem::UserId)
                .col(LibraryItem::Watched)
                .col(LibraryItem::TmdbScore)
                .to_owned(),
        )
        .await?;

    Ok(())
}
