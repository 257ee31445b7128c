use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    Buyer,
    Driver,
    #[default]
    #[serde(other)]
    Customer,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl HasId for User {
    type IdType = u64;
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone", "phone number must be 10 digits"))
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= 6 {
        Ok(())
    } else {
        Err(ValidationError::new(
            "password",
            "password must be at least 6 characters",
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub phone: String,
    pub password: String,
}

impl Credentials {
    pub fn new<P: Into<String>, S: Into<String>>(phone: P, password: S) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_phone(&self.phone)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub name: String,
    pub phone: String,
    pub password: String,
}

impl Signup {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_phone(&self.phone)?;
        validate_password(&self.password)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "name can not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdate {
    pub role: Role,
}
