use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use swingdesk_broker_schema::{api_credentials, fyers_tokens, users};

use crate::domain::repository::{CredentialRepository, TokenRepository, UserRepository};
use crate::domain::types::{Credential, CredentialDraft, FyersToken, NewFyersToken, TenantUser};
use crate::error::BrokerServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<TenantUser>, BrokerServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }
}

fn user_from_model(model: users::Model) -> TenantUser {
    TenantUser {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Credential repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialRepository {
    pub db: DatabaseConnection,
}

impl CredentialRepository for DbCredentialRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<Credential>, BrokerServiceError> {
        let models = api_credentials::Entity::find()
            .filter(api_credentials::Column::UserId.eq(user_id))
            .order_by_asc(api_credentials::Column::Id)
            .all(&self.db)
            .await
            .context("list credentials")?;
        Ok(models.into_iter().map(credential_from_model).collect())
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Credential>, BrokerServiceError> {
        let model = api_credentials::Entity::find()
            .filter(api_credentials::Column::Id.eq(id))
            .filter(api_credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find credential")?;
        Ok(model.map(credential_from_model))
    }

    async fn find_active(&self, user_id: i64) -> Result<Option<Credential>, BrokerServiceError> {
        let model = api_credentials::Entity::find()
            .filter(api_credentials::Column::UserId.eq(user_id))
            .filter(api_credentials::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find active credential")?;
        Ok(model.map(credential_from_model))
    }

    async fn create_active(
        &self,
        user_id: i64,
        draft: &CredentialDraft,
    ) -> Result<Credential, BrokerServiceError> {
        let draft = draft.clone();
        let model = self
            .db
            .transaction::<_, api_credentials::Model, sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    deactivate_all(txn, user_id).await?;
                    let now = Utc::now();
                    api_credentials::ActiveModel {
                        user_id: Set(user_id),
                        app_id: Set(draft.app_id),
                        app_secret: Set(draft.app_secret),
                        redirect_url: Set(draft.redirect_url),
                        is_active: Set(true),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                })
            })
            .await
            .context("create active credential")?;
        Ok(credential_from_model(model))
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        draft: &CredentialDraft,
    ) -> Result<bool, BrokerServiceError> {
        let existing = api_credentials::Entity::find()
            .filter(api_credentials::Column::Id.eq(id))
            .filter(api_credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find credential for update")?;
        let Some(_) = existing else {
            return Ok(false);
        };
        api_credentials::ActiveModel {
            id: Set(id),
            app_id: Set(draft.app_id.clone()),
            app_secret: Set(draft.app_secret.clone()),
            redirect_url: Set(draft.redirect_url.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update credential")?;
        Ok(true)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, BrokerServiceError> {
        let result = api_credentials::Entity::delete_many()
            .filter(api_credentials::Column::Id.eq(id))
            .filter(api_credentials::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete credential")?;
        Ok(result.rows_affected > 0)
    }

    async fn activate(&self, user_id: i64, id: i64) -> Result<bool, BrokerServiceError> {
        let activated = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    let target = api_credentials::Entity::find()
                        .filter(api_credentials::Column::Id.eq(id))
                        .filter(api_credentials::Column::UserId.eq(user_id))
                        .one(txn)
                        .await?;
                    if target.is_none() {
                        return Ok(false);
                    }
                    deactivate_all(txn, user_id).await?;
                    api_credentials::ActiveModel {
                        id: Set(id),
                        is_active: Set(true),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(true)
                })
            })
            .await
            .context("activate credential")?;
        Ok(activated)
    }
}

async fn deactivate_all(txn: &DatabaseTransaction, user_id: i64) -> Result<(), sea_orm::DbErr> {
    api_credentials::Entity::update_many()
        .col_expr(api_credentials::Column::IsActive, Expr::value(false))
        .col_expr(api_credentials::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(api_credentials::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    Ok(())
}

fn credential_from_model(model: api_credentials::Model) -> Credential {
    Credential {
        id: model.id,
        user_id: model.user_id,
        app_id: model.app_id,
        app_secret: model.app_secret,
        redirect_url: model.redirect_url,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Token repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

impl TokenRepository for DbTokenRepository {
    async fn find_latest(&self, user_id: i64) -> Result<Option<FyersToken>, BrokerServiceError> {
        let model = fyers_tokens::Entity::find()
            .filter(fyers_tokens::Column::UserId.eq(user_id))
            .order_by_desc(fyers_tokens::Column::CreatedAt)
            .order_by_desc(fyers_tokens::Column::Id)
            .one(&self.db)
            .await
            .context("find latest token")?;
        Ok(model.map(token_from_model))
    }

    async fn insert(&self, token: &NewFyersToken) -> Result<FyersToken, BrokerServiceError> {
        let model = fyers_tokens::ActiveModel {
            user_id: Set(token.user_id),
            access_token: Set(token.access_token.clone()),
            refresh_token: Set(token.refresh_token.clone()),
            expires_at: Set(token.expires_at),
            created_at: Set(token.created_at),
            updated_at: Set(token.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert token")?;
        Ok(token_from_model(model))
    }

    async fn delete(&self, id: i64) -> Result<bool, BrokerServiceError> {
        let result = fyers_tokens::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete token")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_all(&self, user_id: i64) -> Result<u64, BrokerServiceError> {
        let result = fyers_tokens::Entity::delete_many()
            .filter(fyers_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete all tokens")?;
        Ok(result.rows_affected)
    }
}

fn token_from_model(model: fyers_tokens::Model) -> FyersToken {
    FyersToken {
        id: model.id,
        user_id: model.user_id,
        access_token: model.access_token,
        refresh_token: model.refresh_token,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
