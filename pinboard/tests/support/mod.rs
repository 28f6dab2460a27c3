#![allow(dead_code)]

use chrono::{Duration, Utc};
use pinboard::{
    AccessControl, AccessId, EntityStore, Guid, MemoryHost, SetEntity, SetQuery, StoreError, UserEntity,
    types::{ContentEntity, Entity, EntityType, FRIEND_RELATIONSHIP, Relationship},
};

pub const OWNER: u64 = 1;
pub const FRIEND: u64 = 2;
pub const STRANGER: u64 = 3;
pub const ADMIN: u64 = 4;
pub const POST: u64 = 10;

pub fn user(guid: u64) -> UserEntity {
    let names = ["", "owner", "friend", "stranger", "admin"];
    let name = names.get(guid as usize).copied().unwrap_or("user");
    let user = UserEntity::new(Guid::new(guid), name);
    if guid == ADMIN { user.administrator() } else { user }
}

pub fn post(guid: u64, owner: u64) -> Entity {
    Entity::Content(ContentEntity {
        guid: Guid::new(guid),
        owner_guid: Guid::new(owner),
        entity_type: EntityType::Object,
        subtype: Some("blog".to_string()),
        title: Some("A post".to_string()),
        description: None,
        access_id: AccessId::Public,
        time_created: Utc::now(),
    })
}

/// Users 1-4, a post, and `owner` friended by nobody but friending `friend`.
pub fn seeded_host() -> MemoryHost {
    let mut host = MemoryHost::new();
    for guid in [OWNER, FRIEND, STRANGER, ADMIN] {
        host.insert(Entity::User(user(guid)));
    }
    host.insert(post(POST, FRIEND));
    host.add_relationship(Relationship::new(Guid::new(OWNER), FRIEND_RELATIONSHIP, Guid::new(FRIEND)));
    host
}

/// Add a set created `age_minutes` ago.
pub fn add_set(host: &mut MemoryHost, guid: u64, owner: u64, title: &str, write: AccessId, age_minutes: i64) {
    let set = SetEntity::new(Guid::new(guid), Guid::new(owner), title)
        .with_write_access(write)
        .with_time_created(Utc::now() - Duration::minutes(age_minutes));
    host.insert(Entity::Set(set));
}

/// Wraps a host and counts relationship mutations.
pub struct RecordingHost {
    pub inner: MemoryHost,
    pub mutations: usize,
}

impl RecordingHost {
    pub fn new(inner: MemoryHost) -> Self {
        Self { inner, mutations: 0 }
    }
}

impl EntityStore for RecordingHost {
    fn resolve_entity(&self, guid: Guid) -> Result<Option<Entity>, StoreError> {
        self.inner.resolve_entity(guid)
    }

    fn create_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        self.mutations += 1;
        self.inner.create_relationship(guid_one, relationship, guid_two)
    }

    fn remove_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        self.mutations += 1;
        self.inner.remove_relationship(guid_one, relationship, guid_two)
    }

    fn check_relationship(&self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        self.inner.check_relationship(guid_one, relationship, guid_two)
    }

    fn query_sets(&self, query: &SetQuery) -> Result<Vec<SetEntity>, StoreError> {
        self.inner.query_sets(query)
    }
}

impl AccessControl for RecordingHost {
    fn granted_access_levels(&self, user: Guid) -> Result<Vec<AccessId>, StoreError> {
        self.inner.granted_access_levels(user)
    }

    fn is_administrator(&self, user: &UserEntity) -> Result<bool, StoreError> {
        self.inner.is_administrator(user)
    }

    fn can_edit(&self, user: &UserEntity, entity: &Entity) -> Result<bool, StoreError> {
        self.inner.can_edit(user, entity)
    }
}
