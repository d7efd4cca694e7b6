//! Form types and parsing
//!
//! Urlencoded form bodies for registration, login, profile and comment
//! forms; multipart parsing for the post form, which may carry an image.
//! On validation failure handlers re-render the form template with the
//! collected messages and the submitted values.

use anyhow::Context;
use axum::extract::Multipart;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::models::{CreateUserInput, UpdateProfileInput};
use crate::web::error::PageError;

/// Pagination query string (`?page=N`).
///
/// Kept as a raw string so that no value a user types into the URL can
/// fail extraction; anything unparseable reads as page 1 and
/// out-of-range numbers are clamped by the feed service.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested 1-based page number
    pub fn number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Registration form body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegistrationForm {
    /// Field-level checks the service cannot do (password confirmation).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.password1 != self.password2 {
            errors.push("The two password fields do not match".to_string());
        }
        errors
    }

    pub fn into_input(self) -> CreateUserInput {
        CreateUserInput {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password: self.password1,
        }
    }
}

/// Login form body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Profile edit form body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl ProfileForm {
    pub fn into_input(self) -> UpdateProfileInput {
        UpdateProfileInput {
            username: Some(self.username),
            email: Some(self.email),
            first_name: Some(self.first_name),
            last_name: Some(self.last_name),
        }
    }
}

/// Comment form body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

/// Post form, parsed from a multipart body.
///
/// `pub_date` is kept as the raw submitted string so the form can be
/// re-rendered verbatim on validation errors; `image` is the media-
/// relative path of an already-saved upload, if one was attached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    pub is_published: bool,
    pub image: Option<String>,
}

impl PostForm {
    /// Read the multipart body, saving an attached image to the media
    /// directory as a side effect.
    pub async fn from_multipart(
        mut multipart: Multipart,
        media: &MediaConfig,
    ) -> Result<Self, PageError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| PageError::Validation(format!("Malformed form body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = text_field(field).await?,
                "text" => form.text = text_field(field).await?,
                "pub_date" => form.pub_date = text_field(field).await?,
                "category" => form.category_id = id_field(field).await?,
                "location" => form.location_id = id_field(field).await?,
                "is_published" => {
                    let value = text_field(field).await?;
                    form.is_published = matches!(value.as_str(), "on" | "true" | "1");
                }
                "image" => {
                    if let Some(path) = save_image(field, media).await? {
                        form.image = Some(path);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Parse the submitted `pub_date`. An empty field means "now".
    pub fn parsed_pub_date(&self) -> Result<DateTime<Utc>, String> {
        let raw = self.pub_date.trim();
        if raw.is_empty() {
            return Ok(Utc::now());
        }

        // Accepted shapes: the datetime-local input with and without
        // seconds, and the space-separated equivalents.
        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];
        for format in FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }

        Err(format!("Enter a valid date/time, got '{}'", raw))
    }
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, PageError> {
    field
        .text()
        .await
        .map_err(|e| PageError::Validation(format!("Malformed form field: {}", e)))
}

async fn id_field(field: axum::extract::multipart::Field<'_>) -> Result<Option<i64>, PageError> {
    let value = text_field(field).await?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| PageError::Validation(format!("Invalid selection: '{}'", trimmed)))
}

/// Save an uploaded image below the media directory, returning its
/// media-relative path. Empty file parts (no file chosen) yield `None`.
async fn save_image(
    field: axum::extract::multipart::Field<'_>,
    media: &MediaConfig,
) -> Result<Option<String>, PageError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| PageError::Validation(format!("Failed to read upload: {}", e)))?;

    if data.is_empty() {
        return Ok(None);
    }
    if !media.is_type_allowed(&content_type) {
        return Err(PageError::Validation(format!(
            "Unsupported image type: {}",
            content_type
        )));
    }
    if data.len() as u64 > media.max_file_size {
        return Err(PageError::Validation(format!(
            "Image exceeds the {} byte limit",
            media.max_file_size
        )));
    }

    let filename = format!("{}.{}", Uuid::new_v4(), media.get_extension(&content_type));
    let relative = format!("posts/{}", filename);
    let target_dir = media.path.join("posts");

    tokio::fs::create_dir_all(&target_dir)
        .await
        .with_context(|| format!("Failed to create media directory: {:?}", target_dir))?;
    tokio::fs::write(target_dir.join(&filename), &data)
        .await
        .context("Failed to store uploaded image")?;

    Ok(Some(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_is_lenient() {
        assert_eq!(PageQuery { page: None }.number(), 1);
        assert_eq!(PageQuery { page: Some("3".into()) }.number(), 3);
        assert_eq!(PageQuery { page: Some("abc".into()) }.number(), 1);
        assert_eq!(PageQuery { page: Some("-2".into()) }.number(), 1);
    }

    #[test]
    fn test_registration_password_mismatch() {
        let form = RegistrationForm {
            password1: "wonderland42".to_string(),
            password2: "wanderland42".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().len(), 1);

        let matching = RegistrationForm {
            password1: "wonderland42".to_string(),
            password2: "wonderland42".to_string(),
            ..Default::default()
        };
        assert!(matching.validate().is_empty());
    }

    #[test]
    fn test_post_form_pub_date_formats() {
        let mut form = PostForm::default();

        form.pub_date = "2026-03-01T09:30".to_string();
        let parsed = form.parsed_pub_date().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T09:30:00+00:00");

        form.pub_date = "2026-03-01 09:30:15".to_string();
        assert!(form.parsed_pub_date().is_ok());

        form.pub_date = "yesterday".to_string();
        assert!(form.parsed_pub_date().is_err());
    }

    #[test]
    fn test_post_form_empty_pub_date_means_now() {
        let form = PostForm::default();
        let parsed = form.parsed_pub_date().unwrap();
        assert!((Utc::now() - parsed).num_seconds() < 5);
    }
}
