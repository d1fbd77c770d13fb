//! Body validators for sign-in, sign-up and profile routes.

use chrono::{Datelike, Utc};
use serde_json::Value;

use super::{Presence, Rules, Validated};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub year_of_birth: i64,
    pub is_male: bool,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub year_of_birth: i64,
    pub is_male: bool,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

pub fn signin(body: &Value) -> Validated<Credentials> {
    let mut rules = Rules::new(body);
    let email = rules.email("email", Presence::Required);
    let password = rules.string("password", Presence::Required);
    rules.finish(|| {
        Some(Credentials {
            email: email?,
            password: password?,
        })
    })
}

pub fn signup(body: &Value, min_password_length: usize) -> Validated<Signup> {
    let mut rules = Rules::new(body);
    let email = rules.email("email", Presence::Required);
    let password = password(&mut rules, "password", min_password_length);
    let name = rules.string("name", Presence::Required);
    let year_of_birth = year_of_birth(&mut rules);
    let is_male = rules.boolean("isMale", Presence::Required);
    rules.finish(|| {
        Some(Signup {
            email: email?,
            password: password?,
            name: name?,
            year_of_birth: year_of_birth?,
            is_male: is_male?,
        })
    })
}

pub fn profile(body: &Value) -> Validated<Profile> {
    let mut rules = Rules::new(body);
    let name = rules.string("name", Presence::Required);
    let year_of_birth = year_of_birth(&mut rules);
    let is_male = rules.boolean("isMale", Presence::Required);
    rules.finish(|| {
        Some(Profile {
            name: name?,
            year_of_birth: year_of_birth?,
            is_male: is_male?,
        })
    })
}

pub fn password_change(body: &Value, min_password_length: usize) -> Validated<PasswordChange> {
    let mut rules = Rules::new(body);
    let old_password = rules.string("oldPassword", Presence::Required);
    let new_password = password(&mut rules, "newPassword", min_password_length);
    if let (Some(old), Some(new)) = (&old_password, &new_password) {
        if old == new {
            rules.push("newPassword", "New password must differ from the old password");
        }
    }
    rules.finish(|| {
        Some(PasswordChange {
            old_password: old_password?,
            new_password: new_password?,
        })
    })
}

fn password(rules: &mut Rules<'_>, field: &str, min_length: usize) -> Option<String> {
    let password = rules.string(field, Presence::Required)?;
    if password.chars().count() < min_length {
        rules.push(field, format!("Password must be at least {min_length} characters long"));
        return None;
    }
    Some(password)
}

fn year_of_birth(rules: &mut Rules<'_>) -> Option<i64> {
    let this_year = i64::from(Utc::now().year());
    rules.integer("yearOfBirth", Presence::Required, 1900, this_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_normalizes_email() {
        let body = json!({
            "email": " Ada@Example.COM ",
            "password": "secret1",
            "name": "Ada",
            "yearOfBirth": 1990,
            "isMale": false,
        });
        let input = signup(&body, 6).unwrap();
        assert_eq!(input.email, "ada@example.com");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let body = json!({
            "email": "ada@example.com",
            "password": "abc",
            "name": "Ada",
            "yearOfBirth": 1990,
            "isMale": false,
        });
        let errors = signup(&body, 6).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
        assert_eq!(errors[0].message, "Password must be at least 6 characters long");
    }

    #[test]
    fn new_password_must_change() {
        let body = json!({ "oldPassword": "secret1", "newPassword": "secret1" });
        let errors = password_change(&body, 6).unwrap_err();
        assert_eq!(errors[0].field, "newPassword");
    }

    #[test]
    fn year_of_birth_cannot_be_in_the_future() {
        let body = json!({ "name": "Ada", "yearOfBirth": 3000, "isMale": false });
        assert!(profile(&body).is_err());
    }
}
