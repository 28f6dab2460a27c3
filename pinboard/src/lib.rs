//! Pinboard sets: user-curated boards that other entities are pinned to.
//!
//! The crate holds the business rules only. Storage, sessions, and access
//! decisions come from the host through the traits in [`host`]; [`pins`]
//! validates and applies pin/unpin requests and [`search`] builds the
//! access-filtered query for the "pin to set" picker.

pub mod access;
pub mod errors;
pub mod form;
pub mod host;
pub mod id;
pub mod keys;
pub mod pins;
pub mod search;
pub mod types;

pub use access::{AccessId, pinboard_write_accesses};
pub use errors::{SetsError, StoreError};
pub use host::{AccessControl, EntityStore, MemoryHost, RedisHost, Session};
pub use id::Guid;
pub use pins::{PinAction, PinChange, PinManager, PinTarget};
pub use search::{FilterCondition, SearchRequest, SetQuery, build_search_query};
pub use types::{Entity, PINNED_RELATIONSHIP, SET_SUBTYPE, SetEntity, UserEntity};
