use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub pwd_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color_hex: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct StockItem {
    pub id: i64,
    pub name: String,
    /// 1.0 = one full package, 0.0 = empty. May exceed 1.0 for multiple packages.
    pub fill_level: f64,
    pub low_stock_threshold: f64,
    pub package_note: Option<String>,
    pub category_id: i64,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Stock item joined with its category, as returned by the listing queries.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct StockItemRow {
    pub id: i64,
    pub name: String,
    pub fill_level: f64,
    pub low_stock_threshold: f64,
    pub package_note: Option<String>,
    pub category_id: i64,
    pub category_name: String,
    pub category_color: String,
}
