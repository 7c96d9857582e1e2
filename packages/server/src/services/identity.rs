use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::{error, warn};

use crate::config::RecoveryConfig;
use crate::entity::user;
use crate::error::AppError;
use crate::utils::hash;

/// A resolved actor, passed explicitly into every core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

impl From<&user::Model> for Identity {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Maps a presented username + secret to at most one identity.
pub struct IdentityResolver<'a, C: ConnectionTrait> {
    conn: &'a C,
    recovery: &'a RecoveryConfig,
}

impl<'a, C: ConnectionTrait> IdentityResolver<'a, C> {
    pub fn new(conn: &'a C, recovery: &'a RecoveryConfig) -> Self {
        Self { conn, recovery }
    }

    /// Resolve a login attempt.
    ///
    /// A matching username/password wins. Otherwise, if the secret equals the
    /// configured recovery secret, the recovery identity is returned
    /// (regardless of the username typed) and provisioned if needed.
    pub async fn resolve(&self, username: &str, secret: &str) -> Result<Option<Identity>, AppError> {
        if let Some(user) = self.find_by_username(username).await? {
            let valid = hash::verify_password(secret, &user.password)
                .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
            if valid {
                return Ok(Some(Identity::from(&user)));
            }
        }

        if self.is_recovery_secret(secret) {
            return self.resolve_recovery(username).await;
        }

        Ok(None)
    }

    fn is_recovery_secret(&self, secret: &str) -> bool {
        matches!(&self.recovery.secret, Some(expected) if !expected.is_empty() && expected == secret)
    }

    async fn resolve_recovery(&self, presented_username: &str) -> Result<Option<Identity>, AppError> {
        let Some(account) = self.upsert_recovery_account().await? else {
            return Ok(None);
        };
        if !account.is_admin {
            error!(
                target: "audit",
                username = %account.username,
                "recovery account exists without admin rights; refusing recovery login"
            );
            return Ok(None);
        }

        warn!(
            target: "audit",
            user_id = account.id,
            presented_username,
            "recovery credential used"
        );
        Ok(Some(Identity::from(&account)))
    }

    /// Fetch the recovery account, creating it on first use.
    ///
    /// Its stored password hash covers a random secret generated here once,
    /// so the account cannot be entered through a normal password login.
    /// Returns `None` when another account already holds the recovery email.
    async fn upsert_recovery_account(&self) -> Result<Option<user::Model>, AppError> {
        if let Some(existing) = self.find_by_username(&self.recovery.username).await? {
            return Ok(Some(existing));
        }
        if self.email_held_by_other_account().await? {
            return Ok(None);
        }

        let password = hash::hash_password(&hash::unguessable_secret())
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let account = user::ActiveModel {
            email: Set(self.recovery.email.to_lowercase()),
            username: Set(self.recovery.username.clone()),
            password: Set(password),
            is_admin: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = user::Entity::insert(account)
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            // Lost a race against a registration taking the recovery email.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                if self.email_held_by_other_account().await? {
                    return Ok(None);
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        self.find_by_username(&self.recovery.username)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::Internal("recovery account missing after upsert".into()))
    }

    async fn email_held_by_other_account(&self) -> Result<bool, AppError> {
        let holder = user::Entity::find()
            .filter(user::Column::Email.eq(self.recovery.email.to_lowercase()))
            .one(self.conn)
            .await?;
        match holder {
            Some(holder) if holder.username != self.recovery.username => {
                error!(
                    target: "audit",
                    holder = %holder.username,
                    email = %self.recovery.email,
                    "recovery email belongs to another account; refusing recovery login"
                );
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, AppError> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(self.conn)
            .await?)
    }
}
