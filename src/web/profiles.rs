//! Profile page handlers
//!
//! A profile shows its owner's feed: the full set (any state) when the
//! viewer is the owner, the publicly visible subset for everyone else.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;

use crate::services::UserServiceError;
use crate::web::auth::{CurrentUser, OptionalUser};
use crate::web::error::PageError;
use crate::web::forms::{PageQuery, ProfileForm};
use crate::web::state::AppState;
use crate::web::templates::TemplateEngine;

fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// GET /profile/{username}/
pub async fn profile(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let profile_user = state
        .user_service
        .get_by_username(&username)
        .await?
        .ok_or(PageError::NotFound)?;

    let page = state
        .feed_service
        .profile_feed(&profile_user, viewer.as_ref(), Utc::now(), query.number())
        .await?;

    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("profile", &profile_user);
    context.insert("page_obj", &page);
    Ok(state.templates.render("blog/profile.html", &context)?.into_response())
}

/// GET /profile/edit/
pub async fn edit_profile_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, PageError> {
    let form = ProfileForm {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
    };
    render_profile_form(&state, &user, form, Vec::new())
}

/// POST /profile/edit/
pub async fn edit_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, PageError> {
    match state
        .user_service
        .update_profile(user.id, form.clone().into_input())
        .await
    {
        Ok(updated) => Ok(Redirect::to(&profile_url(&updated.username)).into_response()),
        Err(UserServiceError::ValidationError(msg)) | Err(UserServiceError::UserExists(msg)) => {
            render_profile_form(&state, &user, form, vec![msg])
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /profile_redirect/
pub async fn profile_redirect(CurrentUser(user): CurrentUser) -> Response {
    Redirect::to(&profile_url(&user.username)).into_response()
}

fn render_profile_form(
    state: &AppState,
    user: &crate::models::User,
    form: ProfileForm,
    errors: Vec<String>,
) -> Result<Response, PageError> {
    let mut context = TemplateEngine::context_for(Some(user));
    context.insert("form", &form);
    context.insert("errors", &errors);
    Ok(state
        .templates
        .render("registration/profile_form.html", &context)?
        .into_response())
}
