//! Product Storage
//! Mission: Persist the product catalog with SQLite

use crate::catalog::models::{ListFilter, NewProduct, Product, ProductPatch};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, params_from_iter, types::Value, Connection};
use tracing::info;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, price, category, description, stock, image, active, created_at";

/// Product storage with SQLite backend
pub struct ProductStore {
    db_path: String,
}

impl ProductStore {
    /// Create a new product store and initialize the database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                stock INTEGER NOT NULL DEFAULT 0,
                image TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
        let id_str: String = row.get(0)?;
        Ok(Product {
            id: Uuid::parse_str(&id_str).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            name: row.get(1)?,
            price: row.get(2)?,
            category: row.get(3)?,
            description: row.get(4)?,
            stock: row.get(5)?,
            image: row.get(6)?,
            active: row.get::<_, i64>(7)? != 0,
            created_at: row.get(8)?,
        })
    }

    /// Insert a new product. Records are created active with a generated id
    /// and creation timestamp.
    pub fn insert(&self, new: &NewProduct) -> Result<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            price: new.price,
            category: new.category.clone(),
            description: new.description.clone(),
            stock: new.stock,
            image: new.image.clone(),
            active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO products (id, name, price, category, description, stock, image, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                product.id.to_string(),
                product.name,
                product.price,
                product.category,
                product.description,
                product.stock,
                product.image,
                product.active as i64,
                product.created_at,
            ],
        )?;

        info!("Created product {} ({})", product.name, product.id);

        Ok(product)
    }

    /// List products, newest first. Without `include_inactive` only active
    /// records are returned; the `category` filter is an exact match and
    /// `search` is a case-insensitive substring match against name,
    /// description, and category.
    pub fn list(&self, filter: &ListFilter, include_inactive: bool) -> Result<Vec<Product>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1");
        let mut values: Vec<Value> = Vec::new();

        if !include_inactive {
            sql.push_str(" AND active = 1");
        }

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(" AND category = ?");
            values.push(Value::from(category.to_string()));
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(
                " AND (LOWER(name) LIKE ? OR LOWER(description) LIKE ? OR LOWER(category) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            for _ in 0..3 {
                values.push(Value::from(pattern.clone()));
            }
        }

        sql.push_str(" ORDER BY created_at DESC");

        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_from_iter(values), Self::row_to_product)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Fetch one product by id
    pub fn get(&self, id: &Uuid, include_inactive: bool) -> Result<Option<Product>> {
        let sql = if include_inactive {
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1")
        } else {
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND active = 1")
        };

        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&sql)?;
        let result = stmt.query_row(params![id.to_string()], Self::row_to_product);

        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the addressed fields of a product and return the updated
    /// record, or `None` when no record matches the id. Fields absent from
    /// the patch (including the image reference) are preserved.
    pub fn update(&self, id: &Uuid, patch: &ProductPatch) -> Result<Option<Product>> {
        if patch.is_empty() {
            return self.get(id, true);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?");
            values.push(Value::from(name.clone()));
        }
        if let Some(price) = patch.price {
            sets.push("price = ?");
            values.push(Value::from(price));
        }
        if let Some(category) = &patch.category {
            sets.push("category = ?");
            values.push(Value::from(category.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            values.push(Value::from(description.clone()));
        }
        if let Some(stock) = patch.stock {
            sets.push("stock = ?");
            values.push(Value::from(stock));
        }
        if let Some(image) = &patch.image {
            sets.push("image = ?");
            values.push(Value::from(image.clone()));
        }

        let sql = format!("UPDATE products SET {} WHERE id = ?", sets.join(", "));
        values.push(Value::from(id.to_string()));

        let conn = Connection::open(&self.db_path)?;
        let rows_affected = conn.execute(&sql, params_from_iter(values))?;

        if rows_affected == 0 {
            return Ok(None);
        }

        info!("Updated product {}", id);

        self.get(id, true)
    }

    /// Soft-delete a product: flip `active` to false, keep the row. Returns
    /// `false` when no record matches the id. There is no reactivate path.
    pub fn soft_delete(&self, id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let rows_affected = conn.execute(
            "UPDATE products SET active = 0 WHERE id = ?1",
            params![id.to_string()],
        )?;

        if rows_affected > 0 {
            info!("Soft-deleted product {}", id);
        }

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (ProductStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = ProductStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: 9.99,
            category: category.to_string(),
            description: format!("{name} description"),
            stock: 0,
            image: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (store, _temp) = create_test_store();

        let created = store.insert(&new_product("Widget", "tools")).unwrap();
        assert!(created.active);
        assert_eq!(created.stock, 0);

        let fetched = store.get(&created.id, false).unwrap().unwrap();
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.price, 9.99);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    fn test_list_newest_first() {
        let (store, _temp) = create_test_store();

        store.insert(&new_product("First", "tools")).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.insert(&new_product("Second", "tools")).unwrap();

        let products = store.list(&ListFilter::default(), false).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Second");
        assert_eq!(products[1].name, "First");
    }

    #[test]
    fn test_list_category_filter_exact() {
        let (store, _temp) = create_test_store();

        store.insert(&new_product("Hammer", "tools")).unwrap();
        store.insert(&new_product("Apple", "food")).unwrap();

        let filter = ListFilter {
            category: Some("tools".to_string()),
            search: None,
        };
        let products = store.list(&filter, false).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Hammer");

        // Exact match, not substring
        let filter = ListFilter {
            category: Some("tool".to_string()),
            search: None,
        };
        assert!(store.list(&filter, false).unwrap().is_empty());
    }

    #[test]
    fn test_list_search_case_insensitive() {
        let (store, _temp) = create_test_store();

        store.insert(&new_product("Claw Hammer", "tools")).unwrap();
        store.insert(&new_product("Apple", "food")).unwrap();

        let filter = ListFilter {
            category: None,
            search: Some("HAMMER".to_string()),
        };
        let products = store.list(&filter, false).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Claw Hammer");

        // Search also matches category and description
        let filter = ListFilter {
            category: None,
            search: Some("FOO".to_string()),
        };
        let products = store.list(&filter, false).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Apple");
    }

    #[test]
    fn test_soft_delete_hides_from_public_listing() {
        let (store, _temp) = create_test_store();

        let product = store.insert(&new_product("Widget", "tools")).unwrap();
        assert!(store.soft_delete(&product.id).unwrap());

        // Gone from the public view
        assert!(store.list(&ListFilter::default(), false).unwrap().is_empty());
        assert!(store.get(&product.id, false).unwrap().is_none());

        // Still in storage, visible to authenticated listing
        let all = store.list(&ListFilter::default(), true).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].active);
        assert!(store.get(&product.id, true).unwrap().is_some());
    }

    #[test]
    fn test_soft_delete_unknown_id() {
        let (store, _temp) = create_test_store();
        assert!(!store.soft_delete(&Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_update_partial_preserves_image() {
        let (store, _temp) = create_test_store();

        let mut draft = new_product("Widget", "tools");
        draft.image = Some("/uploads/123-456.jpg".to_string());
        let product = store.insert(&draft).unwrap();

        let patch = ProductPatch {
            price: Some(19.99),
            ..Default::default()
        };
        let updated = store.update(&product.id, &patch).unwrap().unwrap();

        assert_eq!(updated.price, 19.99);
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.image.as_deref(), Some("/uploads/123-456.jpg"));
    }

    #[test]
    fn test_update_replaces_image_when_supplied() {
        let (store, _temp) = create_test_store();

        let mut draft = new_product("Widget", "tools");
        draft.image = Some("/uploads/old.jpg".to_string());
        let product = store.insert(&draft).unwrap();

        let patch = ProductPatch {
            image: Some("/uploads/new.png".to_string()),
            ..Default::default()
        };
        let updated = store.update(&product.id, &patch).unwrap().unwrap();
        assert_eq!(updated.image.as_deref(), Some("/uploads/new.png"));
    }

    #[test]
    fn test_update_unknown_id() {
        let (store, _temp) = create_test_store();

        let patch = ProductPatch {
            price: Some(1.0),
            ..Default::default()
        };
        assert!(store.update(&Uuid::new_v4(), &patch).unwrap().is_none());
    }

    #[test]
    fn test_empty_patch_returns_current_record() {
        let (store, _temp) = create_test_store();
        let product = store.insert(&new_product("Widget", "tools")).unwrap();

        let unchanged = store
            .update(&product.id, &ProductPatch::default())
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "Widget");
        assert_eq!(unchanged.price, 9.99);
    }
}
