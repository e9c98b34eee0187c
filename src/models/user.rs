//! Session and administration models.

use serde::{Deserialize, Serialize};

use crate::api::{ApiCompany, ApiUser};

/// Role of the signed-in session user, checked by route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Viewer => "viewer",
        }
    }
}

/// The authenticated user held by the auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Account type of a managed platform user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Admin,
    #[default]
    Normal,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Normal => "normal",
        }
    }

    fn from_api(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("admin") => Self::Admin,
            _ => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Revoked,
}

/// A managed platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub role: AccountRole,
    pub status: UserStatus,
    pub last_login: Option<String>,
}

impl From<ApiUser> for User {
    fn from(api: ApiUser) -> Self {
        let status = match api.status.as_deref().map(str::to_lowercase).as_deref() {
            Some("revoked") => UserStatus::Revoked,
            _ => UserStatus::Active,
        };
        Self {
            role: AccountRole::from_api(api.role.as_deref()),
            id: api.id,
            name: api.name,
            email: api.email,
            company: api.company.unwrap_or_default(),
            status,
            last_login: api.last_login,
        }
    }
}

impl User {
    /// Case-insensitive match on name or email.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q) || self.email.to_lowercase().contains(&q)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Active,
    Expired,
}

/// A customer company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub poc_name: String,
    /// Not returned by the backend; kept for display parity.
    pub poc_email: String,
    pub poc_mobile: String,
    pub location: String,
    pub validity: String,
    pub status: CompanyStatus,
    pub total_users: u32,
}

impl From<ApiCompany> for Company {
    fn from(api: ApiCompany) -> Self {
        let status = if api.status.as_deref() == Some("Active") {
            CompanyStatus::Active
        } else {
            CompanyStatus::Expired
        };
        Self {
            id: api.id,
            name: api.company_name.unwrap_or_default(),
            poc_name: api.poc_name.unwrap_or_default(),
            poc_email: String::new(),
            poc_mobile: api.poc_contact.unwrap_or_default(),
            location: api.location.unwrap_or_default(),
            validity: api.validity.unwrap_or_default(),
            status,
            total_users: api
                .users
                .as_deref()
                .and_then(|u| u.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Company {
    /// Case-insensitive match on company or point-of-contact name.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q) || self.poc_name.to_lowercase().contains(&q)
    }
}
