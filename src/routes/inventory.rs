//! Item and category CRUD.

use actix_identity::Identity;
use actix_session::Session;
use actix_web::{
    get, post,
    web::{self, Data},
    HttpResponse,
};

use crate::{
    db,
    errors::AppError,
    forms::{CategoryForm, FormError, ItemForm},
    utils, AppState,
};

use super::{base_context, current_user_id, login_redirect, render, see_other};

#[get("/add")]
pub async fn add_item_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/add"));
    }

    let categories = db::get_all_categories(&state).await?;
    let mut context = base_context("Add item", &session, &identity);
    context.insert("categories", &categories);
    context.insert("form", &ItemForm::default());
    context.insert("errors", &Vec::<FormError>::new());
    context.insert("action", "/inventory/add");
    render("inventory/add_edit.html", &context)
}

#[post("/add")]
pub async fn add_item_form_handler(
    web::Form(form): web::Form<ItemForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let Some(user_id) = current_user_id(&identity)? else {
        return Ok(login_redirect("/inventory/add"));
    };

    let categories = db::get_all_categories(&state).await?;
    match form.validate(&categories) {
        Ok(data) => {
            let item = db::create_item(&state, &data, user_id).await?;
            utils::flash(
                &session,
                "success",
                &format!("Item \"{}\" was added to the inventory.", item.name),
            );
            Ok(see_other("/all_inventory"))
        }
        Err(errors) => {
            let mut context = base_context("Add item", &session, &identity);
            context.insert("categories", &categories);
            context.insert("form", &form);
            context.insert("errors", &errors);
            context.insert("action", "/inventory/add");
            render("inventory/add_edit.html", &context)
        }
    }
}

#[get("/edit/{id}")]
pub async fn edit_item_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect(&format!("/inventory/edit/{}", item_id)));
    }

    let item = db::get_item_by_id(&state, item_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let categories = db::get_all_categories(&state).await?;

    let mut context = base_context("Edit item", &session, &identity);
    context.insert("categories", &categories);
    context.insert("form", &ItemForm::from_item(&item));
    context.insert("errors", &Vec::<FormError>::new());
    context.insert("action", &format!("/inventory/edit/{}", item_id));
    render("inventory/add_edit.html", &context)
}

#[post("/edit/{id}")]
pub async fn edit_item_form_handler(
    web::Form(form): web::Form<ItemForm>,
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect(&format!("/inventory/edit/{}", item_id)));
    }

    let categories = db::get_all_categories(&state).await?;
    match form.validate(&categories) {
        Ok(data) => {
            let item = db::update_item(&state, item_id, &data).await?;
            utils::flash(
                &session,
                "success",
                &format!("Item \"{}\" was updated.", item.name),
            );
            Ok(see_other("/all_inventory"))
        }
        Err(errors) => {
            let mut context = base_context("Edit item", &session, &identity);
            context.insert("categories", &categories);
            context.insert("form", &form);
            context.insert("errors", &errors);
            context.insert("action", &format!("/inventory/edit/{}", item_id));
            render("inventory/add_edit.html", &context)
        }
    }
}

#[post("/delete/{id}")]
pub async fn delete_item_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/low_stock"));
    }

    let item = db::get_item_by_id(&state, item_id)
        .await?
        .ok_or(AppError::NotFound)?;
    db::delete_item(&state, item.id).await?;

    utils::flash(
        &session,
        "info",
        &format!("Item \"{}\" was deleted.", item.name),
    );
    Ok(see_other("/low_stock"))
}

#[get("/categories")]
pub async fn manage_categories_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/categories"));
    }

    let categories = db::get_all_categories(&state).await?;
    let mut context = base_context("Manage categories", &session, &identity);
    context.insert("categories", &categories);
    context.insert("form", &CategoryForm::default());
    context.insert("errors", &Vec::<FormError>::new());
    render("inventory/manage_categories.html", &context)
}

#[post("/categories")]
pub async fn create_category_handler(
    web::Form(form): web::Form<CategoryForm>,
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/categories"));
    }

    match form.validate() {
        Ok(data) => match db::create_category(&state, &data.name, &data.color_hex).await {
            Ok(category) => {
                utils::flash(
                    &session,
                    "success",
                    &format!("Category \"{}\" was added.", category.name),
                );
                Ok(see_other("/inventory/categories"))
            }
            Err(AppError::Conflict(message)) => {
                utils::flash(&session, "danger", &message);
                Ok(see_other("/inventory/categories"))
            }
            Err(e) => Err(e),
        },
        Err(errors) => {
            let categories = db::get_all_categories(&state).await?;
            let mut context = base_context("Manage categories", &session, &identity);
            context.insert("categories", &categories);
            context.insert("form", &form);
            context.insert("errors", &errors);
            render("inventory/manage_categories.html", &context)
        }
    }
}

#[get("/categories/edit/{id}")]
pub async fn edit_category_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/categories"));
    }

    let category = db::get_category_by_id(&state, category_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut context = base_context("Edit category", &session, &identity);
    context.insert("form", &CategoryForm::from_category(&category));
    context.insert("errors", &Vec::<FormError>::new());
    context.insert("action", &format!("/inventory/categories/edit/{}", category_id));
    render("inventory/edit_category.html", &context)
}

#[post("/categories/edit/{id}")]
pub async fn edit_category_form_handler(
    web::Form(form): web::Form<CategoryForm>,
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/categories"));
    }

    match form.validate() {
        Ok(data) => {
            match db::update_category(&state, category_id, &data.name, &data.color_hex).await {
                Ok(category) => {
                    utils::flash(
                        &session,
                        "success",
                        &format!("Category \"{}\" was updated.", category.name),
                    );
                    Ok(see_other("/inventory/categories"))
                }
                Err(AppError::Conflict(message)) => {
                    utils::flash(&session, "danger", &message);
                    Ok(see_other(&format!(
                        "/inventory/categories/edit/{}",
                        category_id
                    )))
                }
                Err(e) => Err(e),
            }
        }
        Err(errors) => {
            let mut context = base_context("Edit category", &session, &identity);
            context.insert("form", &form);
            context.insert("errors", &errors);
            context.insert("action", &format!("/inventory/categories/edit/{}", category_id));
            render("inventory/edit_category.html", &context)
        }
    }
}

#[post("/categories/delete/{id}")]
pub async fn delete_category_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/inventory/categories"));
    }

    match db::delete_category(&state, category_id).await {
        Ok(category) => {
            utils::flash(
                &session,
                "info",
                &format!("Category \"{}\" was deleted.", category.name),
            );
            Ok(see_other("/inventory/categories"))
        }
        Err(AppError::Conflict(message)) => {
            utils::flash(&session, "danger", &message);
            Ok(see_other("/inventory/categories"))
        }
        Err(e) => Err(e),
    }
}
