pub mod product;

pub use product::{Product, ProductFields, ProductId, ProductPayload, UserId};
