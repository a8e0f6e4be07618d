//! Repository layer: every query the handlers need, as explicit functions
//! returning materialized rows.

use crate::{
    errors::AppError,
    forms::ItemData,
    structs::{Category, StockItem, StockItemRow, User},
    AppState,
};

/// Maps a unique-constraint violation to a user-visible conflict, everything
/// else to a plain database error.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_owned())
        }
        _ => AppError::Database(e),
    }
}

// --- users ---

pub async fn get_user_by_id(state: &AppState, id: i64) -> Result<Option<User>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
}

pub async fn get_user_by_username(
    state: &AppState,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&pool)
        .await
}

pub async fn create_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let created_at = chrono::Utc::now().to_string();
    let pwd_hash = crate::utils::hash_password(password)?;
    let pool = state.db_pool.clone();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, pwd_hash, created_at, updated_at) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(username)
    .bind(pwd_hash)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_on_unique(e, "This username is already taken."))?;
    log::info!("User created: {}", user.username);
    Ok(user)
}

/// Items created by the user stay behind, their attribution set to NULL by
/// the schema.
pub async fn delete_user(state: &AppState, id: i64) -> Result<(), sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    log::info!("User with id {} deleted", id);
    Ok(())
}

// --- categories ---

pub async fn get_all_categories(state: &AppState) -> Result<Vec<Category>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&pool)
        .await
}

pub async fn get_category_by_id(
    state: &AppState,
    id: i64,
) -> Result<Option<Category>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
}

pub async fn create_category(
    state: &AppState,
    name: &str,
    color_hex: &str,
) -> Result<Category, AppError> {
    let pool = state.db_pool.clone();
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, color_hex) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(color_hex)
    .fetch_one(&pool)
    .await
    .map_err(|e| conflict_on_unique(e, "A category with this name already exists."))?;
    log::info!("Category created: {}", category.name);
    Ok(category)
}

pub async fn update_category(
    state: &AppState,
    id: i64,
    name: &str,
    color_hex: &str,
) -> Result<Category, AppError> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $1, color_hex = $2 WHERE id = $3 RETURNING *",
    )
    .bind(name)
    .bind(color_hex)
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| conflict_on_unique(e, "A category with this name already exists."))?
    .ok_or(AppError::NotFound)
}

/// Refuses to delete a category that still has items. The count and the
/// delete run in one transaction so a concurrent insert cannot slip between
/// them.
pub async fn delete_category(state: &AppState, id: i64) -> Result<Category, AppError> {
    let pool = state.db_pool.clone();
    let mut tx = pool.begin().await?;

    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    let item_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM stock_items WHERE category_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if item_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a category that still contains items. Move them first.".to_owned(),
        ));
    }

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log::info!("Category deleted: {}", category.name);
    Ok(category)
}

// --- stock items ---

const ITEM_LISTING: &str = "SELECT si.id, si.name, si.fill_level, si.low_stock_threshold, \
     si.package_note, si.category_id, c.name AS category_name, c.color_hex AS category_color \
     FROM stock_items si JOIN categories c ON c.id = si.category_id";

pub async fn get_low_stock_items(state: &AppState) -> Result<Vec<StockItemRow>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let sql = format!(
        "{} WHERE si.fill_level <= si.low_stock_threshold ORDER BY c.name, si.name",
        ITEM_LISTING
    );
    sqlx::query_as::<_, StockItemRow>(&sql).fetch_all(&pool).await
}

pub async fn get_all_items(state: &AppState) -> Result<Vec<StockItemRow>, sqlx::Error> {
    let pool = state.db_pool.clone();
    let sql = format!("{} ORDER BY c.name, si.name", ITEM_LISTING);
    sqlx::query_as::<_, StockItemRow>(&sql).fetch_all(&pool).await
}

pub async fn get_items_by_category(
    state: &AppState,
    category_id: i64,
) -> Result<Vec<StockItem>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE category_id = $1")
        .bind(category_id)
        .fetch_all(&pool)
        .await
}

pub async fn get_item_by_id(state: &AppState, id: i64) -> Result<Option<StockItem>, sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await
}

pub async fn create_item(
    state: &AppState,
    data: &ItemData,
    user_id: i64,
) -> Result<StockItem, AppError> {
    let created_at = chrono::Utc::now().to_string();
    let pool = state.db_pool.clone();
    let item = sqlx::query_as::<_, StockItem>(
        "INSERT INTO stock_items \
         (name, fill_level, low_stock_threshold, package_note, category_id, user_id, \
          created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(&data.name)
    .bind(data.fill_level)
    .bind(data.low_stock_threshold)
    .bind(&data.package_note)
    .bind(data.category_id)
    .bind(user_id)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&pool)
    .await
    .map_err(AppError::Database)?;
    log::info!("Item created: {}", item.name);
    Ok(item)
}

pub async fn update_item(
    state: &AppState,
    id: i64,
    data: &ItemData,
) -> Result<StockItem, AppError> {
    let updated_at = chrono::Utc::now().to_string();
    let pool = state.db_pool.clone();
    sqlx::query_as::<_, StockItem>(
        "UPDATE stock_items SET name = $1, fill_level = $2, low_stock_threshold = $3, \
         package_note = $4, category_id = $5, updated_at = $6 WHERE id = $7 RETURNING *",
    )
    .bind(&data.name)
    .bind(data.fill_level)
    .bind(data.low_stock_threshold)
    .bind(&data.package_note)
    .bind(data.category_id)
    .bind(&updated_at)
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(AppError::Database)?
    .ok_or(AppError::NotFound)
}

pub async fn delete_item(state: &AppState, id: i64) -> Result<(), sqlx::Error> {
    let pool = state.db_pool.clone();
    sqlx::query("DELETE FROM stock_items WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    log::info!("Item with id {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!().run(&pool).await.expect("migrations");
        AppState { db_pool: pool }
    }

    fn item(name: &str, category_id: i64, fill: f64, threshold: f64) -> ItemData {
        ItemData {
            name: name.to_owned(),
            category_id,
            fill_level: fill,
            low_stock_threshold: threshold,
            package_note: None,
        }
    }

    #[tokio::test]
    async fn low_stock_listing_filters_and_sorts() {
        let state = test_state().await;
        let user = create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let baking = create_category(&state, "Baking", "#f97316").await.unwrap();

        create_item(&state, &item("Rice", pantry.id, 0.2, 0.25), user.id)
            .await
            .unwrap();
        create_item(&state, &item("Salt", pantry.id, 3.0, 0.25), user.id)
            .await
            .unwrap();
        create_item(&state, &item("Yeast", baking.id, 0.1, 0.25), user.id)
            .await
            .unwrap();
        create_item(&state, &item("Flour", baking.id, 0.25, 0.25), user.id)
            .await
            .unwrap();

        let low = get_low_stock_items(&state).await.unwrap();
        assert!(low.iter().all(|r| r.fill_level <= r.low_stock_threshold));
        let names: Vec<(&str, &str)> = low
            .iter()
            .map(|r| (r.category_name.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("Baking", "Flour"), ("Baking", "Yeast"), ("Pantry", "Rice")]
        );

        let all = get_all_items(&state).await.unwrap();
        let names: Vec<(&str, &str)> = all
            .iter()
            .map(|r| (r.category_name.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Baking", "Flour"),
                ("Baking", "Yeast"),
                ("Pantry", "Rice"),
                ("Pantry", "Salt")
            ]
        );
    }

    #[tokio::test]
    async fn items_by_category_is_filtered() {
        let state = test_state().await;
        let user = create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let baking = create_category(&state, "Baking", "#f97316").await.unwrap();
        create_item(&state, &item("Rice", pantry.id, 1.0, 0.25), user.id)
            .await
            .unwrap();
        create_item(&state, &item("Flour", baking.id, 1.0, 0.25), user.id)
            .await
            .unwrap();

        let items = get_items_by_category(&state, pantry.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Rice");
    }

    #[tokio::test]
    async fn category_with_items_cannot_be_deleted() {
        let state = test_state().await;
        let user = create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let rice = create_item(&state, &item("Rice", pantry.id, 1.0, 0.25), user.id)
            .await
            .unwrap();

        let err = delete_category(&state, pantry.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Category and item survive the refused delete.
        assert!(get_category_by_id(&state, pantry.id).await.unwrap().is_some());
        assert!(get_item_by_id(&state, rice.id).await.unwrap().is_some());

        delete_item(&state, rice.id).await.unwrap();
        delete_category(&state, pantry.id).await.unwrap();
        assert!(get_category_by_id(&state, pantry.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_missing_category_is_not_found() {
        let state = test_state().await;
        let err = delete_category(&state, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let state = test_state().await;
        create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let err = create_user(&state, "alice", "other-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn duplicate_category_name_is_a_conflict() {
        let state = test_state().await;
        create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let err = create_category(&state, "Pantry", "#f97316").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_keeps_their_items() {
        let state = test_state().await;
        let user = create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let rice = create_item(&state, &item("Rice", pantry.id, 1.0, 0.25), user.id)
            .await
            .unwrap();
        assert_eq!(rice.user_id, Some(user.id));

        delete_user(&state, user.id).await.unwrap();
        assert!(get_user_by_id(&state, user.id).await.unwrap().is_none());

        let rice = get_item_by_id(&state, rice.id).await.unwrap().unwrap();
        assert_eq!(rice.user_id, None);
    }

    #[tokio::test]
    async fn updating_missing_item_is_not_found() {
        let state = test_state().await;
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let err = update_item(&state, 42, &item("Rice", pantry.id, 1.0, 0.25))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn update_item_changes_all_fields() {
        let state = test_state().await;
        let user = create_user(&state, "alice", "hunter2hunter2").await.unwrap();
        let pantry = create_category(&state, "Pantry", "#94a3b8").await.unwrap();
        let baking = create_category(&state, "Baking", "#f97316").await.unwrap();
        let rice = create_item(&state, &item("Rice", pantry.id, 1.0, 0.25), user.id)
            .await
            .unwrap();

        let mut data = item("Basmati rice", baking.id, 0.5, 1.0);
        data.package_note = Some("1 kg bag".to_owned());
        let updated = update_item(&state, rice.id, &data).await.unwrap();
        assert_eq!(updated.name, "Basmati rice");
        assert_eq!(updated.category_id, baking.id);
        assert_eq!(updated.fill_level, 0.5);
        assert_eq!(updated.low_stock_threshold, 1.0);
        assert_eq!(updated.package_note.as_deref(), Some("1 kg bag"));
    }
}
