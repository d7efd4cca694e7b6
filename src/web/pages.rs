//! Static informational pages

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::web::auth::OptionalUser;
use crate::web::error::PageError;
use crate::web::state::AppState;
use crate::web::templates::TemplateEngine;

/// GET /about/
pub async fn about(
    State(state): State<AppState>,
    viewer: OptionalUser,
) -> Result<Response, PageError> {
    let context = TemplateEngine::context_for(viewer.as_ref());
    Ok(state.templates.render("pages/about.html", &context)?.into_response())
}

/// GET /rules/
pub async fn rules(
    State(state): State<AppState>,
    viewer: OptionalUser,
) -> Result<Response, PageError> {
    let context = TemplateEngine::context_for(viewer.as_ref());
    Ok(state.templates.render("pages/rules.html", &context)?.into_response())
}
