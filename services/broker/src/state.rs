use sea_orm::DatabaseConnection;

use crate::guard::TokenGate;
use crate::infra::db::{DbCredentialRepository, DbTokenRepository, DbUserRepository};
use crate::infra::fyers::FyersAuthClient;
use crate::usecase::lifecycle::{RefreshGate, RefreshIfNeededUseCase};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub fyers: FyersAuthClient,
    pub jwt_secret: String,
    pub tenant_user_id: i64,
    pub refresh_gate: RefreshGate,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn credential_repo(&self) -> DbCredentialRepository {
        DbCredentialRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn refresh_if_needed(
        &self,
    ) -> RefreshIfNeededUseCase<DbCredentialRepository, DbTokenRepository, FyersAuthClient> {
        RefreshIfNeededUseCase {
            credentials: self.credential_repo(),
            tokens: self.token_repo(),
            fyers: self.fyers.clone(),
            gate: self.refresh_gate.clone(),
            user_id: self.tenant_user_id,
        }
    }

    pub fn token_gate(
        &self,
    ) -> TokenGate<DbCredentialRepository, DbTokenRepository, FyersAuthClient> {
        TokenGate {
            refresh: self.refresh_if_needed(),
            tokens: self.token_repo(),
            fyers: self.fyers.clone(),
        }
    }
}
