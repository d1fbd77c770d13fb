use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth_service::{find_by_email, AuthService, Session};
use super::{finish, ServiceError, ServiceResult};
use crate::auth::{generate_jwt, hash_password, verify_password};
use crate::config::AppConfig;
use crate::database::{Query, Repository, Store};
use crate::models::{User, UserProfile};
use crate::validation::account::{PasswordChange, Profile, Signup};
use crate::validation::FieldError;

const SEARCH_FIELDS: &[&str] = &["name", "email"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<UserProfile>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

pub struct UserService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// One page of non-admin users, optionally narrowed by a
    /// case-insensitive match on name or email.
    pub async fn list(&self, params: &UserListParams) -> ServiceResult<UserPage> {
        let api = &self.config.api;
        let page = params.page.unwrap_or(1).max(1);
        let limit = params
            .limit
            .unwrap_or(u64::from(api.default_page_size))
            .clamp(1, u64::from(api.max_page_size.max(1)));
        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| ServiceError::Invalid(vec![FieldError::new("page", "page is out of range")]))?;

        let mut query = Query::all().with("isAdmin", false).order_by("name");
        if let Some(term) = params.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.search(SEARCH_FIELDS, term);
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            let total = tx.count_of::<User>(&query).await?;
            let users = tx.select_any::<User>(&query.clone().page(offset, limit)).await?;
            Ok::<_, ServiceError>((total, users))
        }
        .await;
        let (total_users, users) = finish(tx, result).await?;

        Ok(UserPage {
            users: users.iter().map(UserProfile::from).collect(),
            current_page: page,
            total_pages: total_users.div_ceil(limit),
            total_users,
        })
    }

    /// Overwrite name, birth year and gender, then sign a token carrying the
    /// new values.
    pub async fn update_profile(&self, user_id: Uuid, profile: Profile) -> ServiceResult<Session> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let mut user = tx.get_404::<User>(user_id).await?;
            user.name = profile.name;
            user.year_of_birth = profile.year_of_birth;
            user.is_male = profile.is_male;
            tx.save(&mut user).await?;
            Ok::<_, ServiceError>(user)
        }
        .await;
        let user = finish(tx, result).await?;

        let token = generate_jwt(&user, &self.config.security)?;
        Ok(Session { user, token })
    }

    pub async fn change_password(&self, user_id: Uuid, change: PasswordChange) -> ServiceResult<()> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let mut user = tx.get_404::<User>(user_id).await?;
            if !verify_password(&change.old_password, &user.password_hash) {
                return Err(ServiceError::rule("Old password is incorrect"));
            }
            user.password_hash = hash_password(&change.new_password, self.config.security.bcrypt_cost)?;
            tx.save(&mut user).await?;
            Ok::<_, ServiceError>(())
        }
        .await;
        finish(tx, result).await?;
        tracing::info!("Password changed for user {}", user_id);
        Ok(())
    }

    /// Create an administrator account. Only reachable from the CLI.
    pub async fn create_admin(&self, input: Signup) -> ServiceResult<User> {
        let auth = AuthService::new(self.store.clone(), self.config.clone());
        let user = auth.register(input, true).await?;
        tracing::info!("Created admin {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Grant admin rights to an existing account. Only reachable from the CLI.
    pub async fn promote(&self, email: &str) -> ServiceResult<User> {
        let mut tx = self.store.begin().await?;
        let result = async {
            let mut user = find_by_email(&mut *tx, email)
                .await?
                .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
            user.is_admin = true;
            tx.save(&mut user).await?;
            Ok::<_, ServiceError>(user)
        }
        .await;
        finish(tx, result).await
    }
}
