//! Authentication Module
//! Mission: Secure API access with signed bearer tokens

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, optional_auth_middleware};
pub use user_store::UserStore;
