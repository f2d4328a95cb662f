//! Catalog Models
//! Mission: Define the product record and its request/validation types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub stock: i64,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: String,
}

/// Validated fields for a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub stock: i64,
    pub image: Option<String>,
}

/// Partial update: only supplied fields are replaced. A `None` image keeps
/// the stored reference.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.stock.is_none()
            && self.image.is_none()
    }
}

/// Query filters for product listing
#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Raw text fields collected from a multipart form, before validation
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub stock: Option<String>,
}

impl ProductForm {
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            "price" => self.price = Some(value),
            "category" => self.category = Some(value),
            "description" => self.description = Some(value),
            "stock" => self.stock = Some(value),
            _ => {} // unknown fields ignored
        }
    }

    /// Validate into a complete new-product record. `name`, `price` and
    /// `category` are required; `stock` defaults to 0.
    pub fn into_new(self, image: Option<String>) -> Result<NewProduct, String> {
        let name = self
            .name
            .filter(|v| !v.trim().is_empty())
            .ok_or("Missing required fields: name, price, category")?;
        let price_raw = self
            .price
            .filter(|v| !v.trim().is_empty())
            .ok_or("Missing required fields: name, price, category")?;
        let category = self
            .category
            .filter(|v| !v.trim().is_empty())
            .ok_or("Missing required fields: name, price, category")?;

        let price = parse_price(&price_raw)?;
        let stock = match self.stock.filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_stock(&raw)?,
            None => 0,
        };

        Ok(NewProduct {
            name,
            price,
            category,
            description: self.description.unwrap_or_default(),
            stock,
            image,
        })
    }

    /// Validate into a partial update. Only supplied fields are parsed.
    pub fn into_patch(self, image: Option<String>) -> Result<ProductPatch, String> {
        let price = match self.price.filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(parse_price(&raw)?),
            None => None,
        };
        let stock = match self.stock.filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(parse_stock(&raw)?),
            None => None,
        };

        Ok(ProductPatch {
            name: self.name.filter(|v| !v.trim().is_empty()),
            price,
            category: self.category.filter(|v| !v.trim().is_empty()),
            description: self.description,
            stock,
            image,
        })
    }
}

fn parse_price(raw: &str) -> Result<f64, String> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Invalid price: {raw}"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be non-negative: {raw}"));
    }
    Ok(price)
}

fn parse_stock(raw: &str) -> Result<i64, String> {
    let stock: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Invalid stock: {raw}"))?;
    if stock < 0 {
        return Err(format!("Stock must be non-negative: {raw}"));
    }
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> ProductForm {
        let mut form = ProductForm::default();
        form.set_field("name", "Widget".to_string());
        form.set_field("price", "9.99".to_string());
        form.set_field("category", "tools".to_string());
        form.set_field("description", "A fine widget".to_string());
        form.set_field("stock", "5".to_string());
        form
    }

    #[test]
    fn test_form_into_new_product() {
        let product = full_form().into_new(None).unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 9.99);
        assert_eq!(product.category, "tools");
        assert_eq!(product.stock, 5);
        assert!(product.image.is_none());
    }

    #[test]
    fn test_stock_defaults_to_zero() {
        let mut form = ProductForm::default();
        form.set_field("name", "Widget".to_string());
        form.set_field("price", "9.99".to_string());
        form.set_field("category", "tools".to_string());

        let product = form.into_new(None).unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.description, "");
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        for missing in ["name", "price", "category"] {
            let mut form = full_form();
            form.set_field(missing, "".to_string());
            assert!(form.into_new(None).is_err(), "{missing} should be required");
        }
    }

    #[test]
    fn test_negative_price_and_stock_rejected() {
        let mut form = full_form();
        form.set_field("price", "-1.50".to_string());
        assert!(form.into_new(None).is_err());

        let mut form = full_form();
        form.set_field("stock", "-3".to_string());
        assert!(form.into_new(None).is_err());
    }

    #[test]
    fn test_unparsable_numbers_rejected() {
        let mut form = full_form();
        form.set_field("price", "cheap".to_string());
        assert!(form.into_new(None).is_err());

        let mut form = full_form();
        form.set_field("stock", "many".to_string());
        assert!(form.into_new(None).is_err());
    }

    #[test]
    fn test_form_into_patch_partial() {
        let mut form = ProductForm::default();
        form.set_field("price", "19.99".to_string());

        let patch = form.into_patch(None).unwrap();
        assert_eq!(patch.price, Some(19.99));
        assert!(patch.name.is_none());
        assert!(patch.stock.is_none());
        assert!(!patch.is_empty());

        let empty = ProductForm::default().into_patch(None).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_patch_rejects_bad_numbers() {
        let mut form = ProductForm::default();
        form.set_field("price", "-5".to_string());
        assert!(form.into_patch(None).is_err());
    }

    #[test]
    fn test_unknown_form_fields_ignored() {
        let mut form = full_form();
        form.set_field("bogus", "value".to_string());
        assert!(form.into_new(None).is_ok());
    }
}
