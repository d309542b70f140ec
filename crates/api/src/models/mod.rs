//! Domain types for the API.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{CartEntry, CartLine};
pub use product::{Category, NewProduct, Product};
pub use user::{User, UserProfile};
