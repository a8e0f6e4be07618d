//! Form payloads and their validation.
//!
//! Handlers deserialize the raw urlencoded bodies into these structs, then
//! call `validate` to get either a typed payload or the field-level errors
//! that get rendered back into the form.

use serde::{Deserialize, Serialize};

use crate::structs::{Category, StockItem};

pub const DEFAULT_CATEGORY_COLOR: &str = "#94a3b8";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

fn err(field: &'static str, message: impl Into<String>) -> FormError {
    FormError {
        field,
        message: message.into(),
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push(err("username", "Username is required."));
        }
        if self.password.is_empty() {
            errors.push(err("password", "Password is required."));
        }
        errors
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.push(err("username", "Username is required."));
        } else if username.len() < 4 || username.len() > 25 {
            errors.push(err("username", "Username must be 4 to 25 characters long."));
        }
        if self.password.is_empty() {
            errors.push(err("password", "Password is required."));
        }
        if self.password != self.password2 {
            errors.push(err("password2", "Passwords must match."));
        }
        errors
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ItemForm {
    pub name: String,
    pub category_id: String,
    pub fill_level: String,
    pub low_stock_threshold: String,
    #[serde(default)]
    pub package_note: String,
}

/// Validated item payload, ready for the repository layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    pub name: String,
    pub category_id: i64,
    pub fill_level: f64,
    pub low_stock_threshold: f64,
    pub package_note: Option<String>,
}

impl Default for ItemForm {
    fn default() -> Self {
        ItemForm {
            name: String::new(),
            category_id: String::new(),
            fill_level: "1.0".to_owned(),
            low_stock_threshold: "0.25".to_owned(),
            package_note: String::new(),
        }
    }
}

impl ItemForm {
    /// Prefills the edit form from an existing item.
    pub fn from_item(item: &StockItem) -> Self {
        ItemForm {
            name: item.name.clone(),
            category_id: item.category_id.to_string(),
            fill_level: item.fill_level.to_string(),
            low_stock_threshold: item.low_stock_threshold.to_string(),
            package_note: item.package_note.clone().unwrap_or_default(),
        }
    }

    /// `categories` is the list the select field was populated from; a posted
    /// id outside it is rejected the same way an unparsable one is.
    pub fn validate(&self, categories: &[Category]) -> Result<ItemData, Vec<FormError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(err("name", "Product name is required."));
        } else if name.len() > 150 {
            errors.push(err("name", "Product name must be at most 150 characters long."));
        }

        let category_id = match self.category_id.trim().parse::<i64>() {
            Ok(id) if categories.iter().any(|c| c.id == id) => Some(id),
            _ => {
                errors.push(err("category_id", "Please pick a valid category."));
                None
            }
        };

        let fill_level = match self.fill_level.trim().parse::<f64>() {
            Ok(v) if v >= 0.0 => Some(v),
            Ok(_) => {
                errors.push(err("fill_level", "Quantity must not be negative."));
                None
            }
            Err(_) => {
                errors.push(err("fill_level", "Quantity must be a number."));
                None
            }
        };

        let low_stock_threshold = match self.low_stock_threshold.trim().parse::<f64>() {
            Ok(v) if v >= 0.0 => Some(v),
            Ok(_) => {
                errors.push(err("low_stock_threshold", "Threshold must not be negative."));
                None
            }
            Err(_) => {
                errors.push(err("low_stock_threshold", "Threshold must be a number."));
                None
            }
        };

        let note = self.package_note.trim();
        if note.len() > 200 {
            errors.push(err("package_note", "Note must be at most 200 characters long."));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ItemData {
            name: name.to_owned(),
            category_id: category_id.unwrap(),
            fill_level: fill_level.unwrap(),
            low_stock_threshold: low_stock_threshold.unwrap(),
            package_note: if note.is_empty() {
                None
            } else {
                Some(note.to_owned())
            },
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub color_hex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryData {
    pub name: String,
    pub color_hex: String,
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Default for CategoryForm {
    fn default() -> Self {
        CategoryForm {
            name: String::new(),
            color_hex: DEFAULT_CATEGORY_COLOR.to_owned(),
        }
    }
}

impl CategoryForm {
    pub fn from_category(category: &Category) -> Self {
        CategoryForm {
            name: category.name.clone(),
            color_hex: category.color_hex.clone(),
        }
    }

    pub fn validate(&self) -> Result<CategoryData, Vec<FormError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(err("name", "Category name is required."));
        } else if name.len() > 100 {
            errors.push(err("name", "Category name must be at most 100 characters long."));
        }

        let color = self.color_hex.trim();
        let color = if color.is_empty() {
            DEFAULT_CATEGORY_COLOR
        } else {
            color
        };
        if !is_hex_color(color) {
            errors.push(err("color_hex", "Color must look like #rrggbb."));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CategoryData {
            name: name.to_owned(),
            color_hex: color.to_lowercase(),
        })
    }
}
