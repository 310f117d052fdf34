//! kpub ADS - client for the NASA Astrophysics Data System search API
//!
//! Issues search queries, pages through the results and wraps each
//! returned document in an [`Article`].

pub mod api;
pub mod article;
pub mod config;
pub mod query;

pub use api::{AdsClient, SearchPage};
pub use article::Article;
pub use config::{AdsConfig, resolve_token};
pub use query::{FIELDS, identifier_query, is_valid_month, monthly_query};
