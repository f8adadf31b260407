use sea_orm::entity::prelude::*;

/// The tenant user. Single-user deployment: exactly one row exists, seeded
/// by the initial migration; its id is the `TENANT_USER_ID` config value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::api_credentials::Entity")]
    ApiCredentials,
    #[sea_orm(has_many = "super::fyers_tokens::Entity")]
    FyersTokens,
}

impl Related<super::api_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiCredentials.def()
    }
}

impl Related<super::fyers_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FyersTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
