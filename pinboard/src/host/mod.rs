//! Interfaces to the host platform.
//!
//! Entity storage, relationship edges, and access decisions belong to the host.
//! The pin manager and search filter only talk to these traits, so a host can
//! back them with whatever store it already has. Two hosts ship with the crate:
//! [`MemoryHost`] for tests and fixtures, and [`RedisHost`].

pub mod memory;
pub mod redis_store;

pub use memory::{Fixture, MemoryHost};
pub use redis_store::RedisHost;

use crate::{
    access::AccessId,
    errors::StoreError,
    id::Guid,
    search::SetQuery,
    types::{Entity, SetEntity, UserEntity},
};

/// Entity and relationship storage.
///
/// `create_relationship` and `remove_relationship` must each be atomic; no
/// other coordination is expected from callers.
pub trait EntityStore {
    fn resolve_entity(&self, guid: Guid) -> Result<Option<Entity>, StoreError>;

    /// Returns `false` when the edge already existed.
    fn create_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError>;

    /// Returns `false` when there was no edge to remove.
    fn remove_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError>;

    fn check_relationship(&self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError>;

    /// Execute a set query built by [`crate::search::build_search_query`].
    fn query_sets(&self, query: &SetQuery) -> Result<Vec<SetEntity>, StoreError>;
}

/// Access decisions delegated to the host.
pub trait AccessControl {
    /// Every access level `user` holds, before any pinboard filtering.
    fn granted_access_levels(&self, user: Guid) -> Result<Vec<AccessId>, StoreError>;

    fn is_administrator(&self, user: &UserEntity) -> Result<bool, StoreError>;

    fn can_edit(&self, user: &UserEntity, entity: &Entity) -> Result<bool, StoreError>;
}

/// Request context supplied by the host: who is logged in for this call.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<UserEntity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn logged_in(user: UserEntity) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&UserEntity> {
        self.user.as_ref()
    }
}
