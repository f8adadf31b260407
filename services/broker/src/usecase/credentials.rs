use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::domain::repository::CredentialRepository;
use crate::domain::types::{Credential, CredentialDraft, SECRET_MASK};
use crate::error::BrokerServiceError;

/// Outward-facing credential representation. The secret never leaves the
/// service; the fixed mask takes its place.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialView {
    pub id: i64,
    pub app_id: String,
    pub app_secret: String,
    pub redirect_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Credential> for CredentialView {
    fn from(c: Credential) -> Self {
        Self {
            id: c.id,
            app_id: c.app_id,
            app_secret: SECRET_MASK.to_owned(),
            redirect_url: c.redirect_url,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

pub struct CredentialInput {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_url: String,
}

impl CredentialInput {
    /// Field checks mirroring the persisted column contracts.
    fn into_draft(self) -> Result<CredentialDraft, BrokerServiceError> {
        let invalid = |reason: &str| BrokerServiceError::InvalidCredential(reason.to_owned());
        if self.app_id.trim().is_empty() || self.app_id.len() > 50 {
            return Err(invalid("app_id must be 1-50 characters"));
        }
        if self.app_secret.trim().is_empty() || self.app_secret.len() > 100 {
            return Err(invalid("app_secret must be 1-100 characters"));
        }
        if self.redirect_url.len() > 255 || Url::parse(&self.redirect_url).is_err() {
            return Err(invalid("redirect_url must be a valid URL of at most 255 characters"));
        }
        Ok(CredentialDraft {
            app_id: self.app_id,
            app_secret: self.app_secret,
            redirect_url: self.redirect_url,
        })
    }
}

// ── ListCredentials ──────────────────────────────────────────────────────────

pub struct ListCredentialsUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> ListCredentialsUseCase<R> {
    pub async fn execute(&self, user_id: i64) -> Result<Vec<CredentialView>, BrokerServiceError> {
        let credentials = self.repo.list(user_id).await?;
        Ok(credentials.into_iter().map(CredentialView::from).collect())
    }
}

// ── GetActiveCredential ──────────────────────────────────────────────────────

pub struct GetActiveCredentialUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> GetActiveCredentialUseCase<R> {
    pub async fn execute(&self, user_id: i64) -> Result<CredentialView, BrokerServiceError> {
        let credential = self
            .repo
            .find_active(user_id)
            .await?
            .ok_or(BrokerServiceError::CredentialNotFound)?;
        Ok(credential.into())
    }
}

// ── CreateCredential ─────────────────────────────────────────────────────────

/// Submitting a new credential set supersedes every existing one: the
/// repository deactivates all rows and inserts the new active row in a single
/// transaction, so no committed state has two active credentials.
pub struct CreateCredentialUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> CreateCredentialUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i64,
        input: CredentialInput,
    ) -> Result<CredentialView, BrokerServiceError> {
        let draft = input.into_draft()?;
        let credential = self.repo.create_active(user_id, &draft).await?;
        Ok(credential.into())
    }
}

// ── UpdateCredential ─────────────────────────────────────────────────────────

pub struct UpdateCredentialUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> UpdateCredentialUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i64,
        id: i64,
        input: CredentialInput,
    ) -> Result<(), BrokerServiceError> {
        let draft = input.into_draft()?;
        if !self.repo.update(user_id, id, &draft).await? {
            return Err(BrokerServiceError::CredentialNotFound);
        }
        Ok(())
    }
}

// ── DeleteCredential ─────────────────────────────────────────────────────────

pub struct DeleteCredentialUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> DeleteCredentialUseCase<R> {
    pub async fn execute(&self, user_id: i64, id: i64) -> Result<(), BrokerServiceError> {
        if !self.repo.delete(user_id, id).await? {
            return Err(BrokerServiceError::CredentialNotFound);
        }
        Ok(())
    }
}

// ── ActivateCredential ───────────────────────────────────────────────────────

pub struct ActivateCredentialUseCase<R: CredentialRepository> {
    pub repo: R,
}

impl<R: CredentialRepository> ActivateCredentialUseCase<R> {
    pub async fn execute(&self, user_id: i64, id: i64) -> Result<(), BrokerServiceError> {
        if !self.repo.activate(user_id, id).await? {
            return Err(BrokerServiceError::CredentialNotFound);
        }
        Ok(())
    }
}
