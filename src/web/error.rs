//! Page error taxonomy
//!
//! Failures surface to the end user as rendered pages or redirects,
//! never as raw faults:
//! - `NotFound` covers both genuinely absent entities and
//!   absent-by-policy lookups (hidden posts, foreign comments)
//! - `Unauthenticated` redirects to the login page
//! - `Validation` is a fallback for form input that reached a service
//!   without being re-rendered by the handler
//! - `Internal` renders a generic error page and logs the cause
//!
//! There is deliberately no 403 variant: ownership violations come out
//! as `NotFound` or as handler-level redirects.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::services::{CommentServiceError, FeedError, PostServiceError, UserServiceError};

/// Error type returned by all page handlers
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Entity absent, or absent-by-policy
    #[error("Page not found")]
    NotFound,

    /// Auth-required route hit without a session
    #[error("Authentication required")]
    Unauthenticated,

    /// Form input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Page not found</title></head>
<body><h1>404 &mdash; Page not found</h1>
<p>The page you requested does not exist.</p>
<p><a href="/">Back to the feed</a></p></body>
</html>"#;

const SERVER_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Server error</title></head>
<body><h1>500 &mdash; Something went wrong</h1>
<p><a href="/">Back to the feed</a></p></body>
</html>"#;

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => {
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
            }
            PageError::Unauthenticated => Redirect::to("/login/").into_response(),
            PageError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Html(format!(
                    "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
                     <title>Invalid input</title></head><body><h1>Invalid input</h1>\
                     <p>{}</p><p><a href=\"/\">Back to the feed</a></p></body></html>",
                    tera::escape_html(&message)
                )))
                    .into_response()
            }
            PageError::Internal(err) => {
                tracing::error!(error = ?err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

impl From<PostServiceError> for PageError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(_) => PageError::NotFound,
            PostServiceError::ValidationError(msg) => PageError::Validation(msg),
            PostServiceError::InternalError(err) => PageError::Internal(err),
        }
    }
}

impl From<CommentServiceError> for PageError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::NotFound(_) => PageError::NotFound,
            CommentServiceError::ValidationError(msg) => PageError::Validation(msg),
            CommentServiceError::InternalError(err) => PageError::Internal(err),
        }
    }
}

impl From<FeedError> for PageError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(_) => PageError::NotFound,
            FeedError::InternalError(err) => PageError::Internal(err),
        }
    }
}

impl From<UserServiceError> for PageError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::NotFound(_) => PageError::NotFound,
            UserServiceError::ValidationError(msg) | UserServiceError::UserExists(msg) => {
                PageError::Validation(msg)
            }
            UserServiceError::AuthenticationError(msg) => PageError::Validation(msg),
            UserServiceError::InternalError(err) => PageError::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_404() {
        let response = PageError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = PageError::Unauthenticated.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/login/"
        );
    }

    #[test]
    fn test_service_not_found_maps_to_not_found() {
        let err: PageError = PostServiceError::NotFound(7).into();
        assert!(matches!(err, PageError::NotFound));

        let err: PageError = CommentServiceError::NotFound("comment".into()).into();
        assert!(matches!(err, PageError::NotFound));

        let err: PageError = FeedError::NotFound("category".into()).into();
        assert!(matches!(err, PageError::NotFound));
    }
}
