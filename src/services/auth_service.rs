use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{check, finish, ServiceError, ServiceResult};
use crate::auth::{generate_jwt, hash_password, verify_password};
use crate::config::AppConfig;
use crate::database::{Query, Repository, Store, Transaction};
use crate::models::User;
use crate::validation::account::{Credentials, Signup};
use crate::validation::checks;

/// A user together with a freshly signed session token
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

pub(crate) async fn find_by_email(tx: &mut dyn Transaction, email: &str) -> ServiceResult<Option<User>> {
    let query = Query::all().with("email", email.to_lowercase());
    Ok(tx.select_one::<User>(&query).await?)
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn signin(&self, credentials: Credentials) -> ServiceResult<Session> {
        let mut tx = self.store.begin().await?;
        let user = find_by_email(&mut *tx, &credentials.email).await;
        let user = finish(tx, user).await?;

        let Some(user) = user else {
            tracing::info!("Sign-in for unknown email");
            return Err(ServiceError::rule("Email not found"));
        };
        if !verify_password(&credentials.password, &user.password_hash) {
            tracing::info!("Sign-in with wrong password for user {}", user.id);
            return Err(ServiceError::rule("Invalid credentials"));
        }

        let token = generate_jwt(&user, &self.config.security)?;
        Ok(Session { user, token })
    }

    /// Register a regular (non-admin) account and sign it in.
    pub async fn signup(&self, input: Signup) -> ServiceResult<Session> {
        let user = self.register(input, false).await?;
        let token = generate_jwt(&user, &self.config.security)?;
        tracing::info!("Registered user {}", user.id);
        Ok(Session { user, token })
    }

    pub(crate) async fn register(&self, input: Signup, is_admin: bool) -> ServiceResult<User> {
        let password_hash = hash_password(&input.password, self.config.security.bcrypt_cost)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email.to_lowercase(),
            password_hash,
            name: input.name,
            year_of_birth: input.year_of_birth,
            is_male: input.is_male,
            is_admin,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        let result = async {
            let mut errors = Vec::new();
            checks::email_available(&mut *tx, &user.email, &mut errors).await?;
            check(errors)?;
            tx.create(&user).await?;
            Ok::<_, ServiceError>(())
        }
        .await;
        finish(tx, result).await?;
        Ok(user)
    }
}
