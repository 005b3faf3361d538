//! Domain services. Every operation takes the store as an explicit
//! connection parameter so handlers can run it inside their transaction
//! and tests can run it against a plain connection.

pub mod carts;
pub mod products;
pub mod reviews;
pub mod users;
