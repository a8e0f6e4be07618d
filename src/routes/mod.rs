use actix_files::NamedFile;
use actix_identity::Identity;
use actix_session::Session;
use actix_web::{get, HttpResponse, Responder};
use tera::Context;

use crate::{errors::AppError, utils, TEMPLATES};

pub mod auth;
pub mod inventory;
pub mod views;

pub(crate) fn render(template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    let rendered = TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template {}: {}", template, e);
        AppError::Template(e)
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header(("Location", location.to_owned()))
        .finish()
}

pub(crate) fn login_redirect(next: &str) -> HttpResponse {
    see_other(&format!("/auth/login?next={}", next))
}

/// Common context keys every page template expects: title, login state and
/// the pending flash message, if any.
pub(crate) fn base_context(title: &str, session: &Session, identity: &Option<Identity>) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("logged_in", &identity.is_some());
    if let Some(flash) = utils::take_flash(session) {
        context.insert("flash", &flash);
    }
    context
}

/// The numeric id of the logged-in user. A session carrying a non-numeric
/// identity is treated as anonymous.
pub(crate) fn current_user_id(identity: &Option<Identity>) -> Result<Option<i64>, AppError> {
    match identity {
        None => Ok(None),
        Some(identity) => match identity.id()?.parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                log::warn!("Session identity is not a numeric user id");
                Ok(None)
            }
        },
    }
}

/// favicon handler
#[get("/favicon")]
pub async fn favicon_handler() -> Result<impl Responder, AppError> {
    Ok(NamedFile::open("static/favicon.ico")?)
}
