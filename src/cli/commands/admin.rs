use std::sync::Arc;

use serde_json::json;

use super::store::open;
use crate::cli::{utils::output_success, OutputFormat};
use crate::models::UserProfile;
use crate::services::UserService;
use crate::validation::{account, FieldError};

pub struct NewAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
    pub year_of_birth: i64,
    pub is_male: bool,
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate with the same rules as sign-up, then store the account as admin
pub async fn create(admin: NewAdmin, output_format: OutputFormat) -> anyhow::Result<()> {
    let (store, config) = open().await?;

    let body = json!({
        "email": admin.email,
        "name": admin.name,
        "password": admin.password,
        "yearOfBirth": admin.year_of_birth,
        "isMale": admin.is_male,
    });
    let input = account::signup(&body, config.security.min_password_length)
        .map_err(|errors| anyhow::anyhow!("Invalid account: {}", describe(&errors)))?;

    let user = UserService::new(store, Arc::new(config))
        .create_admin(input)
        .await?;

    output_success(
        &output_format,
        &format!("Created admin {}", user.email),
        Some(json!({ "user": UserProfile::from(&user) })),
    )
}

pub async fn promote(email: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let (store, config) = open().await?;

    let user = UserService::new(store, Arc::new(config)).promote(email).await?;

    output_success(
        &output_format,
        &format!("{} is now an admin", user.email),
        Some(json!({ "user": UserProfile::from(&user) })),
    )
}
