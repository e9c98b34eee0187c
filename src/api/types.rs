//! Wire formats of the Truverizen backend.
//!
//! The backend is loose about types: ids arrive as numbers or strings and
//! most text fields may be null or missing, so everything optional is
//! `#[serde(default)]` and ids go through [`flexible_id`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept an id that is a JSON number or string and normalise it to a string.
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn flexible_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.is_null())
        .map(|v| value_to_string(&v)))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `POST /authenticate` request body.
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /authenticate` response body.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub user: Option<ApiAuthUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAuthUser {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// One record of `GET /show_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiHistoryItem {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_text")]
    pub tool: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub document_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub processed_time: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub original_document: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub processed_document: Option<String>,
}

/// One record of `GET /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "flexible_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub last_login: Option<String>,
}

/// One record of `GET /get_companies`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCompany {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub poc_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub poc_contact: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub users: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub validity: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub status: Option<String>,
}

/// `POST /create_user` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewUserPayload {
    pub name: String,
    pub company: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// `PUT /update_user/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserPayload {
    pub name: String,
    pub company: String,
    pub email: String,
    pub role: String,
}

/// `POST /add_company` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewCompanyPayload {
    pub company_name: String,
    pub poc_name: String,
    pub poc_contact: String,
    pub location: String,
    pub users: String,
    pub validity: String,
    pub status: String,
    pub actions: String,
}

impl NewCompanyPayload {
    /// A freshly registered company: active, no users yet.
    pub fn new(
        company_name: String,
        poc_name: String,
        poc_contact: String,
        location: String,
        validity: String,
    ) -> Self {
        Self {
            company_name,
            poc_name,
            poc_contact,
            location,
            users: "0".to_string(),
            validity,
            status: "Active".to_string(),
            actions: "None".to_string(),
        }
    }
}

/// `POST /get_ai_indexing_processed` request body.
#[derive(Debug, Serialize)]
pub struct IndexingRequest<'a> {
    pub base_64: &'a str,
}

/// `POST /get_ai_indexing_processed` response body.
#[derive(Debug, Deserialize)]
pub struct IndexingResponse {
    #[serde(default)]
    pub processed_base64: Option<String>,
}
