//! Database entity models.
//!
//! Each struct maps a table row via `sqlx::FromRow`; wire-format DTOs built
//! from these live next to the route handlers that serve them. JSON field
//! names are camelCase to match what the client applications expect.

pub mod cart;
pub mod order;
pub mod product;
pub mod rider;
pub mod user;
