use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Upper bound on photos attached to a single listing.
pub const MAX_PICTURES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(rename = "googleId")]
    pub external_id: String,
    #[serde(rename = "verifiedEmail")]
    pub email_verified: bool,
    #[serde(rename = "picture")]
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(rename = "googleId")]
    pub owner_id: String,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "CarModel")]
    pub car_model: String,
    #[serde(rename = "NumberPlate")]
    pub plate_number: String,
    #[serde(rename = "picture")]
    pub pictures: Vec<String>,
}

/// Sign-in payload as sent by the client after the identity provider hands back a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignIn {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "googleId", alias = "externalId")]
    pub external_id: Option<String>,
    #[serde(rename = "verifiedEmail", alias = "emailVerified")]
    pub email_verified: Option<bool>,
    #[serde(rename = "picture", alias = "pictureUrl")]
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "googleId")]
    pub owner_id: Option<String>,
    #[serde(rename = "ProductName")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "CarModel")]
    pub car_model: Option<String>,
    #[serde(rename = "NumberPlate")]
    pub plate_number: Option<String>,
    #[serde(rename = "picture")]
    pub pictures: Option<Vec<String>>,
}

/// Partial update. Empty strings and empty arrays count as "not provided",
/// so a field can never be cleared through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(rename = "ProductName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "CarModel", skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(rename = "NumberPlate", skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(rename = "picture", skip_serializing_if = "Option::is_none")]
    pub pictures: Option<Vec<String>>,
}

/// A sign-in that passed presence checks.
#[derive(Debug, Clone)]
pub struct ValidSignIn {
    pub name: String,
    pub email: String,
    pub external_id: String,
    pub email_verified: bool,
    pub picture_url: String,
}

#[derive(Debug, Clone)]
pub struct ValidProduct {
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub car_model: String,
    pub plate_number: String,
    pub pictures: Vec<String>,
}

/// The subset of a patch that will actually be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub car_model: Option<String>,
    pub plate_number: Option<String>,
    pub pictures: Option<Vec<String>>,
}

fn missing_fields() -> ApiError {
    ApiError::Validation("Missing required fields in request body".to_string())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn check_picture_count(count: usize) -> Result<(), ApiError> {
    if count > MAX_PICTURES {
        return Err(ApiError::Validation(format!(
            "You can upload a maximum of {MAX_PICTURES} picture URLs."
        )));
    }
    Ok(())
}

impl SignIn {
    pub fn validate(self) -> Result<ValidSignIn, ApiError> {
        // email_verified only has to be defined, false is a valid answer
        match (
            present(self.name),
            present(self.email),
            present(self.external_id),
            self.email_verified,
            present(self.picture_url),
        ) {
            (Some(name), Some(email), Some(external_id), Some(email_verified), Some(picture_url)) => {
                Ok(ValidSignIn {
                    name,
                    email,
                    external_id,
                    email_verified,
                    picture_url,
                })
            }
            _ => Err(missing_fields()),
        }
    }
}

impl NewProduct {
    pub fn validate(self) -> Result<ValidProduct, ApiError> {
        let (Some(owner_id), Some(name), Some(description), Some(car_model), Some(plate_number), Some(pictures)) = (
            present(self.owner_id),
            present(self.name),
            present(self.description),
            present(self.car_model),
            present(self.plate_number),
            self.pictures,
        ) else {
            return Err(missing_fields());
        };

        check_picture_count(pictures.len())?;

        Ok(ValidProduct {
            owner_id,
            name,
            description,
            car_model,
            plate_number,
            pictures,
        })
    }
}

impl ProductPatch {
    pub fn validate(self) -> Result<ValidPatch, ApiError> {
        let pictures = self.pictures.filter(|p| !p.is_empty());
        if let Some(pictures) = &pictures {
            check_picture_count(pictures.len())?;
        }

        Ok(ValidPatch {
            name: present(self.name),
            description: present(self.description),
            car_model: present(self.car_model),
            plate_number: present(self.plate_number),
            pictures,
        })
    }
}

impl ValidPatch {
    pub fn is_empty(&self) -> bool {
        *self == ValidPatch::default()
    }
}
