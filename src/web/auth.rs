//! Authentication plumbing and account handlers
//!
//! Session cookies are opaque tokens resolved against the sessions
//! table. A request passes through `load_current_user` first, which
//! attaches the viewer to the request when the cookie checks out; the
//! `CurrentUser` extractor then guards auth-required handlers by
//! redirecting anonymous visitors to the login page, before any
//! ownership checks or form validation run.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::models::User;
use crate::services::{LoginInput, UserServiceError};
use crate::web::error::PageError;
use crate::web::forms::{LoginForm, RegistrationForm};
use crate::web::state::AppState;
use crate::web::templates::TemplateEngine;

/// Name of the session cookie
const SESSION_COOKIE: &str = "session";

/// Session cookie lifetime in seconds (matches the stored expiry)
const SESSION_COOKIE_MAX_AGE: i64 = 7 * 24 * 60 * 60;

/// The authenticated viewer, attached to the request by
/// [`load_current_user`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The viewer when authentication is optional
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    pub fn as_ref(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(PageError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts.extensions.get::<CurrentUser>().map(|u| u.0.clone()),
        ))
    }
}

/// Extract the session token from the Cookie header
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookie_header.split(';') {
        if let Some(token) = cookie.trim().strip_prefix("session=") {
            return Some(token.to_string());
        }
    }
    None
}

/// Middleware resolving the session cookie to a user.
///
/// Runs for every request; handlers decide via `CurrentUser` /
/// `OptionalUser` whether an anonymous viewer is acceptable.
pub async fn load_current_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Session validation failed");
            }
        }
    }
    next.run(request).await
}

fn session_cookie_headers(token: &str) -> HeaderMap {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_COOKIE_MAX_AGE
    );
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

fn clear_cookie_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    headers
}

/// GET /registration/
pub async fn registration_form(
    State(state): State<AppState>,
    viewer: OptionalUser,
) -> Result<Response, PageError> {
    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("form", &RegistrationForm::default());
    context.insert("errors", &Vec::<String>::new());
    Ok(state
        .templates
        .render("registration/registration_form.html", &context)?
        .into_response())
}

/// POST /registration/
///
/// On success the new account is not logged in; the response redirects
/// to the login page.
pub async fn register(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, PageError> {
    let mut errors = form.validate();

    if errors.is_empty() {
        match state.user_service.register(form.clone().into_input()).await {
            Ok(_) => return Ok(Redirect::to("/login/").into_response()),
            Err(UserServiceError::ValidationError(msg))
            | Err(UserServiceError::UserExists(msg)) => errors.push(msg),
            Err(err) => return Err(err.into()),
        }
    }

    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("form", &form);
    context.insert("errors", &errors);
    Ok(state
        .templates
        .render("registration/registration_form.html", &context)?
        .into_response())
}

/// GET /login/
pub async fn login_form(
    State(state): State<AppState>,
    viewer: OptionalUser,
) -> Result<Response, PageError> {
    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("form", &LoginForm::default());
    context.insert("errors", &Vec::<String>::new());
    Ok(state
        .templates
        .render("registration/login.html", &context)?
        .into_response())
}

/// POST /login/
pub async fn login(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state
        .user_service
        .login(LoginInput::new(form.username.clone(), form.password.clone()))
        .await
    {
        Ok(session) => {
            let headers = session_cookie_headers(&session.id);
            Ok((headers, Redirect::to("/")).into_response())
        }
        Err(UserServiceError::AuthenticationError(msg)) => {
            let mut context = TemplateEngine::context_for(viewer.as_ref());
            let mut form = form;
            form.password.clear();
            context.insert("form", &form);
            context.insert("errors", &vec![msg]);
            Ok(state
                .templates
                .render("registration/login.html", &context)?
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /logout/
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }
    Ok((clear_cookie_headers(), Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_session_token() {
        let headers = headers_with_cookie("session=tok-123");
        assert_eq!(extract_session_token(&headers), Some("tok-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=tok-456; lang=en");
        assert_eq!(extract_session_token(&headers), Some("tok-456".to_string()));
    }

    #[test]
    fn test_extract_session_token_missing() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        let headers = headers_with_cookie("theme=dark");
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let headers = session_cookie_headers("tok");
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let headers = clear_cookie_headers();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
