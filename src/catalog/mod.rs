//! Product Catalog Module
//! Mission: CRUD over the products table with soft deletes and image uploads

pub mod api;
pub mod images;
pub mod models;
pub mod store;

pub use api::CatalogState;
pub use images::ImageStore;
pub use store::ProductStore;
