//! Application users and credential checks.

use anyhow::Context;
use entity::user;
use platform_authn::{hash_password, verify_password};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{instrument, warn};

use crate::error::{HrError, HrResult};

/// Looks a user up by name and checks the password against the stored
/// argon2 hash. Unknown users and wrong passwords are indistinguishable.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> HrResult<user::Model> {
    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    match found {
        Some(account) if verify_password(password, &account.password_hash) => Ok(account),
        _ => {
            warn!(username, "rejected login");
            Err(HrError::Unauthorized)
        }
    }
}

#[instrument(skip(db, password))]
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
    role: &str,
    tenant_id: &str,
) -> anyhow::Result<user::Model> {
    let password_hash = hash_password(password).context("hash password")?;
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        tenant_id: Set(tenant_id.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("insert user {username}"))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn valid_credentials_return_the_account() {
        let db = testing::db().await;
        create_user(&db, "admin", "admin123", "Admin", "default")
            .await
            .unwrap();
        let account = authenticate(&db, "admin", "admin123").await.unwrap();
        assert_eq!(account.role, "Admin");
        assert_ne!(account.password_hash, "admin123");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_rejected() {
        let db = testing::db().await;
        create_user(&db, "analyst", "analyst123", "User", "default")
            .await
            .unwrap();
        assert!(matches!(
            authenticate(&db, "analyst", "nope").await,
            Err(HrError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&db, "ghost", "analyst123").await,
            Err(HrError::Unauthorized)
        ));
    }
}
