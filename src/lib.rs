pub mod api;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod services;
