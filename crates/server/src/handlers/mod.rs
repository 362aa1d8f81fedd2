//! HTTP request handlers.

pub mod admin;
pub mod content;
pub mod health;

pub use admin::*;
pub use content::*;
pub use health::*;
