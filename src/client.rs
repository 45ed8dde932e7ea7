//! Thin typed client for the gift shop backend.
//!
//! Every call resolves at most once: there is no retry, timeout override or
//! cancellation. Non-2xx responses become [`ApiError::Http`], carrying the
//! backend's `{code, message, timestamp}` envelope when one is present.

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PRESENT_PAGES, UNKNOWN_ERROR_CODE};
use crate::gifts::ImageData;
use crate::models::{
    AdminPresentResponse, CreateGroupRequest, ErrorResponse, GroupDto, Id, MobilePresentResponse,
    PresentUpdateRequest, UserDto,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status} ({code}): {message}")]
    Http {
        status: u16,
        code: String,
        message: String,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

/// Coarse classification of an [`ApiError`], driven by the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Server,
    Network,
    Decode,
    Other,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Http { status, .. } => match *status {
                400 | 422 => ErrorKind::BadRequest,
                401 => ErrorKind::Unauthorized,
                403 => ErrorKind::Forbidden,
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                500..=599 => ErrorKind::Server,
                _ => ErrorKind::Other,
            },
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Decode(_) => ErrorKind::Decode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps the response to `Ok(None)` for empty successes (204 or no body).
    async fn handle<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            let envelope = serde_json::from_slice::<ErrorResponse>(&body).ok();
            let code = envelope
                .as_ref()
                .map(|e| e.code.clone())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
            let message = envelope
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    )
                });
            warn!(status = status.as_u16(), %code, %message, "backend request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                code,
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = resp.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    async fn json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        Self::handle(resp)
            .await?
            .ok_or_else(|| ApiError::Decode("empty response body".to_string()))
    }

    async fn empty(resp: reqwest::Response) -> Result<(), ApiError> {
        Self::handle::<IgnoredAny>(resp).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(method = "GET", path, "backend request");
        let resp = self.http.get(self.url(path)).send().await?;
        Self::json(resp).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "backend request");
        let resp = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::json(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(method = "DELETE", path, "backend request");
        let resp = self.http.delete(self.url(path)).send().await?;
        Self::empty(resp).await
    }

    fn photo_form(photos: &[ImageData]) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for photo in photos {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(photo.format.mime())?;
            form = form.part("photos", part);
        }
        Ok(form)
    }

    // Users

    pub async fn current_user(&self) -> Result<UserDto, ApiError> {
        self.get("/users/me").await
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>, ApiError> {
        self.get("/users").await
    }

    pub async fn get_user(&self, id: Id) -> Result<UserDto, ApiError> {
        self.get(&format!("/users/{}", id)).await
    }

    pub async fn create_user(&self, user: &UserDto) -> Result<UserDto, ApiError> {
        self.send_json(reqwest::Method::POST, "/users", user).await
    }

    pub async fn update_user(&self, id: Id, user: &UserDto) -> Result<UserDto, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/users/{}", id), user)
            .await
    }

    pub async fn delete_user(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/users/{}", id)).await
    }

    // Groups

    pub async fn list_groups(&self) -> Result<Vec<GroupDto>, ApiError> {
        self.get("/groups").await
    }

    pub async fn get_group(&self, id: Id) -> Result<GroupDto, ApiError> {
        self.get(&format!("/groups/{}", id)).await
    }

    pub async fn create_group(&self, group: &CreateGroupRequest) -> Result<GroupDto, ApiError> {
        self.send_json(reqwest::Method::POST, "/groups", group).await
    }

    pub async fn update_group(&self, id: Id, group: &GroupDto) -> Result<GroupDto, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/groups/{}", id), group)
            .await
    }

    pub async fn delete_group(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/groups/{}", id)).await
    }

    pub async fn add_student(&self, group_id: Id, student_id: Id) -> Result<GroupDto, ApiError> {
        let path = format!("/groups/{}/students/{}", group_id, student_id);
        debug!(method = "POST", path, "backend request");
        let resp = self.http.post(self.url(&path)).send().await?;
        Self::json(resp).await
    }

    pub async fn remove_student(&self, group_id: Id, student_id: Id) -> Result<GroupDto, ApiError> {
        let path = format!("/groups/{}/students/{}", group_id, student_id);
        debug!(method = "DELETE", path, "backend request");
        let resp = self.http.delete(self.url(&path)).send().await?;
        Self::json(resp).await
    }

    // Presents

    pub async fn list_presents(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Vec<MobilePresentResponse>, ApiError> {
        self.get(&format!("/presents?page={}&size={}", page, size))
            .await
    }

    /// Walks the catalogue page by page until a short page comes back,
    /// reading at most `MAX_PRESENT_PAGES` pages.
    pub async fn all_presents(&self) -> Result<Vec<MobilePresentResponse>, ApiError> {
        let mut presents = Vec::new();
        for page in 0..MAX_PRESENT_PAGES {
            let batch = self.list_presents(page, DEFAULT_PAGE_SIZE).await?;
            if batch.len() < DEFAULT_PAGE_SIZE as usize {
                presents.extend(batch);
                return Ok(presents);
            }
            presents.extend(batch);
        }
        warn!(
            pages = MAX_PRESENT_PAGES,
            "present listing never returned a short page, stopping"
        );
        Ok(presents)
    }

    pub async fn get_present(&self, id: Id) -> Result<AdminPresentResponse, ApiError> {
        self.get(&format!("/presents/{}", id)).await
    }

    pub async fn search_presents(&self, query: &str) -> Result<Vec<MobilePresentResponse>, ApiError> {
        debug!(method = "GET", path = "/presents/search", query, "backend request");
        let resp = self
            .http
            .get(self.url("/presents/search"))
            .query(&[("query", query)])
            .send()
            .await?;
        Self::json(resp).await
    }

    /// Scalar fields travel in the query string, photos as multipart parts.
    pub async fn create_present(
        &self,
        name: &str,
        price_coins: u32,
        stock: u32,
        photos: &[ImageData],
    ) -> Result<AdminPresentResponse, ApiError> {
        debug!(method = "POST", path = "/presents", photos = photos.len(), "backend request");
        let form = Self::photo_form(photos)?;
        let resp = self
            .http
            .post(self.url("/presents"))
            .query(&[
                ("name", name.to_string()),
                ("priceCoins", price_coins.to_string()),
                ("stock", stock.to_string()),
            ])
            .multipart(form)
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn update_present(
        &self,
        id: Id,
        update: &PresentUpdateRequest,
    ) -> Result<AdminPresentResponse, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/presents/{}", id), update)
            .await
    }

    pub async fn delete_present(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/presents/{}", id)).await
    }

    pub async fn add_photos(
        &self,
        present_id: Id,
        photos: &[ImageData],
    ) -> Result<AdminPresentResponse, ApiError> {
        let path = format!("/presents/{}/photos", present_id);
        debug!(method = "POST", path, photos = photos.len(), "backend request");
        let form = Self::photo_form(photos)?;
        let resp = self.http.post(self.url(&path)).multipart(form).send().await?;
        Self::json(resp).await
    }

    pub async fn delete_photo(&self, present_id: Id, photo_id: Id) -> Result<(), ApiError> {
        self.delete(&format!("/presents/{}/photos/{}", present_id, photo_id))
            .await
    }

    pub fn photo_url(&self, present_id: Id, photo_id: Id) -> String {
        self.url(&format!("/presents/{}/photos/{}", present_id, photo_id))
    }
}
