//! HTTP client for the listing API.
//!
//! Identity is carried by an explicit [`Session`] returned from
//! [`ApiClient::sign_in`] and passed to every owner-scoped call. Nothing is
//! kept in global state; dropping the session is signing out.

use reqwest::{Client, Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{MessageResponse, ProductResponse, ProductsResponse, UserResponse};
use crate::model::{NewProduct, Product, ProductPatch, SignIn, User};
use crate::photos::{PhotoUpload, UploadOutcome};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// A signed-in user. Owner-scoped calls act on behalf of this identity.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn external_id(&self) -> &str {
        &self.user.external_id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Fields of a new listing; the owner comes from the session.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub car_model: String,
    pub plate_number: String,
    pub pictures: Vec<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn product_url(&self, session: &Session, id: Option<i64>) -> String {
        let owner = urlencoding::encode(session.external_id());
        match id {
            Some(id) => self.url(&format!("/api/user/product/{owner}/{id}")),
            None => self.url(&format!("/api/user/product/{owner}")),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<MessageResponse>().await {
            Ok(body) => body.message,
            Err(_) => "<unreadable error body>".to_string(),
        };

        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Rejected(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    pub async fn sign_in(&self, profile: &SignIn) -> Result<Session> {
        let response = self.http.post(self.url("/api/auth/google")).json(profile).send().await?;
        let body: UserResponse = Self::decode(response).await?;
        Ok(Session { user: body.user })
    }

    pub async fn create_product(&self, session: &Session, draft: ProductDraft) -> Result<Product> {
        let payload = NewProduct {
            owner_id: Some(session.external_id().to_string()),
            name: Some(draft.name),
            description: Some(draft.description),
            car_model: Some(draft.car_model),
            plate_number: Some(draft.plate_number),
            pictures: Some(draft.pictures),
        };

        let response = self.http.post(self.url("/api/user/product")).json(&payload).send().await?;
        let body: ProductResponse = Self::decode(response).await?;
        Ok(body.product)
    }

    /// The server answers 404 for an owner without listings; callers get an empty list.
    pub async fn list_products(&self, session: &Session) -> Result<Vec<Product>> {
        let response = self.http.get(self.product_url(session, None)).send().await?;
        match Self::decode::<ProductsResponse>(response).await {
            Ok(body) => Ok(body.products),
            Err(ClientError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn get_product(&self, session: &Session, id: i64) -> Result<Product> {
        let response = self.http.get(self.product_url(session, Some(id))).send().await?;
        let body: ProductsResponse = Self::decode(response).await?;
        body.products
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("product {id}")))
    }

    pub async fn update_product(&self, session: &Session, id: i64, patch: &ProductPatch) -> Result<Product> {
        let response = self
            .http
            .put(self.product_url(session, Some(id)))
            .json(patch)
            .send()
            .await?;
        let body: ProductResponse = Self::decode(response).await?;
        Ok(body.product)
    }

    pub async fn delete_product(&self, session: &Session, id: i64) -> Result<()> {
        let response = self.http.delete(self.product_url(session, Some(id))).send().await?;
        let _: MessageResponse = Self::decode(response).await?;
        Ok(())
    }

    /// Sends a photo batch. `existing` is how many photos the listing already holds.
    pub async fn upload_photos(&self, existing: usize, photos: Vec<PhotoUpload>) -> Result<UploadOutcome> {
        let mut form = multipart::Form::new().text("existing", existing.to_string());
        for photo in photos {
            let part = multipart::Part::bytes(photo.data)
                .file_name(photo.file_name)
                .mime_str(&photo.content_type)?;
            form = form.part("file", part);
        }

        let response = self.http.post(self.url("/api/user/photos")).multipart(form).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(external_id: &str) -> Session {
        Session {
            user: User {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                external_id: external_id.into(),
                email_verified: true,
                picture_url: None,
            },
        }
    }

    #[test]
    fn product_urls_are_scoped_to_the_session() {
        let client = ApiClient::new("http://localhost:5000/");
        let session = session("1234 5678");

        assert_eq!(
            client.product_url(&session, None),
            "http://localhost:5000/api/user/product/1234%205678"
        );
        assert_eq!(
            client.product_url(&session, Some(7)),
            "http://localhost:5000/api/user/product/1234%205678/7"
        );
    }
}
