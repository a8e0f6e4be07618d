//! Listing pages: the low-stock overview, the full inventory and the
//! per-category view.

use actix_identity::Identity;
use actix_session::Session;
use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use serde::Serialize;

use crate::{
    db,
    errors::AppError,
    structs::{Category, StockItem, StockItemRow},
    AppState,
};

use super::{base_context, current_user_id, login_redirect, render, see_other};

/// Row shape the listing templates work with: the raw item plus its category
/// and the precomputed status fields.
#[derive(Serialize, Debug)]
pub(crate) struct ItemView {
    pub id: i64,
    pub name: String,
    pub fill_level: f64,
    pub package_note: Option<String>,
    pub category_id: i64,
    pub category_name: String,
    pub category_color: String,
    pub status_text: String,
    pub low_stock: bool,
}

impl ItemView {
    fn from_row(row: StockItemRow) -> Self {
        let status_text = row.status_text();
        let low_stock = row.is_low_stock();
        ItemView {
            id: row.id,
            name: row.name,
            fill_level: row.fill_level,
            package_note: row.package_note,
            category_id: row.category_id,
            category_name: row.category_name,
            category_color: row.category_color,
            status_text,
            low_stock,
        }
    }

    fn from_item(item: StockItem, category: &Category) -> Self {
        let status_text = item.status_text();
        let low_stock = item.is_low_stock();
        ItemView {
            id: item.id,
            name: item.name,
            fill_level: item.fill_level,
            package_note: item.package_note,
            category_id: item.category_id,
            category_name: category.name.clone(),
            category_color: category.color_hex.clone(),
            status_text,
            low_stock,
        }
    }
}

#[get("/")]
pub async fn index_handler() -> HttpResponse {
    see_other("/low_stock")
}

#[get("/low_stock")]
pub async fn low_stock_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/low_stock"));
    }

    let items: Vec<ItemView> = db::get_low_stock_items(&state)
        .await?
        .into_iter()
        .map(ItemView::from_row)
        .collect();

    let mut context = base_context("Running low", &session, &identity);
    context.insert("items", &items);
    render("inventory/low_stock.html", &context)
}

#[get("/all_inventory")]
pub async fn all_inventory_handler(
    state: Data<AppState>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect("/all_inventory"));
    }

    let items: Vec<ItemView> = db::get_all_items(&state)
        .await?
        .into_iter()
        .map(ItemView::from_row)
        .collect();

    let mut context = base_context("All inventory", &session, &identity);
    context.insert("items", &items);
    render("inventory/list.html", &context)
}

#[get("/category/{id}")]
pub async fn category_detail_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    identity: Option<Identity>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    if current_user_id(&identity)?.is_none() {
        return Ok(login_redirect(&format!("/category/{}", category_id)));
    }

    let category = db::get_category_by_id(&state, category_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // No join needed here, the category is already known.
    let items: Vec<ItemView> = db::get_items_by_category(&state, category_id)
        .await?
        .into_iter()
        .map(|item| ItemView::from_item(item, &category))
        .collect();

    let title = format!("Category: {}", category.name);
    let mut context = base_context(&title, &session, &identity);
    context.insert("items", &items);
    render("inventory/list.html", &context)
}
