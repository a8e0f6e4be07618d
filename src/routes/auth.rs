//! Registration, login and logout.

use actix_identity::Identity;
use actix_session::Session;
use actix_web::{
    get, post,
    web::{self, Data},
    HttpMessage, HttpRequest, HttpResponse,
};
use serde::Deserialize;

use crate::{
    db,
    errors::AppError,
    forms::{FormError, LoginForm, RegisterForm},
    utils, AppState,
};

use super::{base_context, current_user_id, render, see_other};

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

impl NextQuery {
    /// Post-login target. Only same-site paths are honored.
    fn target(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => "/low_stock",
        }
    }
}

#[get("/register")]
pub async fn register_handler(
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_some() {
        return Ok(see_other("/low_stock"));
    }

    let mut context = base_context("Register", &session, &identity);
    context.insert("username", "");
    context.insert("errors", &Vec::<FormError>::new());
    render("auth/register.html", &context)
}

#[post("/register")]
pub async fn register_form_handler(
    web::Form(form): web::Form<RegisterForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_some() {
        return Ok(see_other("/low_stock"));
    }

    let username = form.username.trim().to_owned();
    let mut errors = form.validate();
    if errors.is_empty()
        && db::get_user_by_username(&state, &username).await?.is_some()
    {
        errors.push(FormError {
            field: "username",
            message: "This username is already taken.".to_owned(),
        });
    }

    if errors.is_empty() {
        match db::create_user(&state, &username, &form.password).await {
            Ok(_) => {
                utils::flash(
                    &session,
                    "success",
                    "Registration complete. You can log in now.",
                );
                return Ok(see_other("/auth/login"));
            }
            // Backstop for a registration racing this one.
            Err(AppError::Conflict(message)) => {
                errors.push(FormError {
                    field: "username",
                    message,
                });
            }
            Err(e) => return Err(e),
        }
    }

    let mut context = base_context("Register", &session, &identity);
    context.insert("username", &username);
    context.insert("errors", &errors);
    render("auth/register.html", &context)
}

#[get("/login")]
pub async fn login_handler(
    query: web::Query<NextQuery>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_some() {
        return Ok(see_other("/low_stock"));
    }

    let mut context = base_context("Log in", &session, &identity);
    context.insert("next", query.target());
    context.insert("username", "");
    context.insert("errors", &Vec::<FormError>::new());
    render("auth/login.html", &context)
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<LoginForm>,
    query: web::Query<NextQuery>,
    state: Data<AppState>,
    request: HttpRequest,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_some() {
        return Ok(see_other("/low_stock"));
    }

    let errors = form.validate();
    if !errors.is_empty() {
        let mut context = base_context("Log in", &session, &identity);
        context.insert("next", query.target());
        context.insert("username", form.username.trim());
        context.insert("errors", &errors);
        return render("auth/login.html", &context);
    }

    let user = db::get_user_by_username(&state, form.username.trim()).await?;
    let verified = match &user {
        Some(user) => utils::verify_password(&form.password, &user.pwd_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        log::warn!("Failed login attempt for {:?}", form.username.trim());
        utils::flash(&session, "danger", "Invalid username or password.");
        return Ok(see_other("/auth/login"));
    };
    Identity::login(&request.extensions(), user.id.to_string())?;
    log::info!("User {} logged in", user.username);

    Ok(see_other(query.target()))
}

#[post("/logout")]
pub async fn logout_handler(identity: Identity) -> HttpResponse {
    identity.logout();
    see_other("/auth/login")
}
