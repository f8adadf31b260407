use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApiCredentials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiCredentials::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiCredentials::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApiCredentials::AppId).string().not_null())
                    .col(
                        ColumnDef::new(ApiCredentials::AppSecret)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiCredentials::RedirectUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiCredentials::IsActive)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiCredentials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiCredentials::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApiCredentials::Table, ApiCredentials::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(ApiCredentials::Table)
                    .col(ApiCredentials::UserId)
                    .name("idx_api_credentials_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiCredentials::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ApiCredentials {
    Table,
    Id,
    UserId,
    AppId,
    AppSecret,
    RedirectUrl,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
