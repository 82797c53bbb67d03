//! Pure data structures shared by the stores, serializable the way they are persisted.

pub mod cart;
pub mod location;
pub mod order;
pub mod product;
pub mod shop;
pub mod user;

pub use cart::*;
pub use location::*;
pub use order::*;
pub use product::*;
pub use shop::*;
pub use user::*;
