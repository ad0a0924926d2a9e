// Users of the admin surface.
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{FieldErrors, Result}, logic::types::UserId};

const TOKEN_LENGTH: usize = 40;

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
#[derive(sqlx::Type)]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    // Only shown once, when the user is created.
    #[serde(default, skip_serializing)]
    pub api_token: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn build(name: &str, email: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            role,
            ..Default::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);

        let valid_email = match self.email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
        if !valid_email {
            errors.add("email", "is not a valid address");
        }

        errors.into_result()
    }
}

// A fresh random token for authenticating API calls.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn tokens_are_alphanumeric() {
        let token = generate_token(&mut StdRng::seed_from_u64(5));
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn email_is_checked() {
        assert!(User::build("Sam", "sam@league.test", Role::Editor).validate().is_ok());
        assert!(User::build("Sam", "sam.league.test", Role::Editor).validate().is_err());
        assert!(User::build("", "sam@league.test", Role::Admin).validate().is_err());
    }

    #[test]
    fn tokens_stay_out_of_json() {
        let mut user = User::build("Sam", "sam@league.test", Role::Admin);
        user.api_token = "secret".to_string();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("api_token").is_none());
        assert_eq!(json["role"], "Admin");
    }
}
