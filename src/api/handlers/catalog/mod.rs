//! Catalog CRUD endpoints.
//!
//! Categories, products and reviews follow the same shape: list/create on
//! the collection, get/update/delete on the item, plus two aggregate reads
//! (`categories/with-count`, `products/with-reviews`). List payloads are
//! trimmed; detail payloads carry all fields.

pub mod categories;
pub mod products;
pub mod reviews;
pub(crate) mod storage;
pub mod types;
