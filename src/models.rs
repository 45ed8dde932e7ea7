use serde::{Deserialize, Serialize};

use crate::users::Role;

/// Record identifier, shared by every entity and by the backend API.
pub type Id = i64;

/// Lightweight reference to a person held by another record
/// (a group's teacher, an order's customer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Id,
    pub full_name: String,
    #[serde(default)]
    pub login: String,
}

impl PersonRef {
    pub fn new(id: Id, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            login: String::new(),
        }
    }
}

// Backend wire types

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<UserDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<UserDto>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateGroupRequest {
    pub group_name: String,
    pub teacher_id: Id,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhotoResponse {
    pub id: Id,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminPresentResponse {
    pub id: Id,
    pub name: String,
    pub price_coins: u32,
    pub stock: u32,
    #[serde(default)]
    pub photos: Vec<PhotoResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MobilePresentResponse {
    pub id: Id,
    pub name: String,
    pub price_coins: u32,
    pub stock: u32,
    #[serde(default)]
    pub photo_ids: Vec<Id>,
}

/// Partial update: absent fields are left untouched by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresentUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_coins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}
