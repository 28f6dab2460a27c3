use std::cell::RefCell;

use log::{debug, info};
use redis::{Client, Commands, Connection, cmd, pipe};

use crate::{
    access::{AccessId, default_can_edit},
    errors::StoreError,
    host::{AccessControl, EntityStore, Fixture},
    id::Guid,
    keys::KeyContext,
    search::SetQuery,
    types::{Entity, SET_SUBTYPE, SetEntity, UserEntity},
};

/// Host backed by a Redis server.
///
/// Entities are JSON documents; relationships are a forward and a reverse Redis
/// set per edge label, written together in one `MULTI`/`EXEC`. Calls are
/// synchronous and the connection is not shared across threads.
pub struct RedisHost {
    connection: RefCell<Connection>,
    prefix: String,
}

impl RedisHost {
    pub fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let connection = client.get_connection()?;
        Ok(Self::from_connection(connection, prefix))
    }

    pub fn from_connection(connection: Connection, prefix: impl Into<String>) -> Self {
        Self {
            connection: RefCell::new(connection),
            prefix: prefix.into(),
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    /// Store an entity, indexing it when it is a set.
    pub fn put_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        let keys = self.key_context();
        let json = serde_json::to_string(entity)?;
        let mut pipeline = pipe();
        pipeline.atomic().set(keys.entity(entity.guid()), json).ignore();
        if entity.is_set() {
            pipeline
                .sadd(keys.subtype_index(SET_SUBTYPE), entity.guid().get())
                .ignore();
        } else {
            pipeline
                .srem(keys.subtype_index(SET_SUBTYPE), entity.guid().get())
                .ignore();
        }
        pipeline.query::<()>(&mut *self.connection.borrow_mut())?;
        Ok(())
    }

    pub fn add_collection_member(&self, collection: i64, user: Guid) -> Result<(), StoreError> {
        let keys = self.key_context();
        pipe()
            .atomic()
            .sadd(keys.access_collection(collection), user.get())
            .ignore()
            .sadd(keys.user_collections(user), collection)
            .ignore()
            .query::<()>(&mut *self.connection.borrow_mut())?;
        Ok(())
    }

    /// Load every entity, edge, and collection of a fixture.
    pub fn import(&mut self, fixture: &Fixture) -> Result<usize, StoreError> {
        for entity in &fixture.entities {
            self.put_entity(entity)?;
        }
        for edge in &fixture.relationships {
            self.create_relationship(edge.guid_one, &edge.relationship, edge.guid_two)?;
        }
        for collection in &fixture.collections {
            for member in &collection.members {
                self.add_collection_member(collection.id, *member)?;
            }
        }
        info!(
            "imported {} entities and {} relationships under '{}'",
            fixture.entities.len(),
            fixture.relationships.len(),
            self.prefix
        );
        Ok(fixture.entities.len())
    }

    /// Delete every key under this host's prefix.
    pub fn cleanup(&self) -> Result<u64, StoreError> {
        const SCAN_COUNT: usize = 1000;
        let pattern = format!("{}:*", self.prefix);
        let mut conn = self.connection.borrow_mut();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query(&mut *conn)?;

            if !keys.is_empty() {
                let deleted: u64 = cmd("DEL").arg(&keys).query(&mut *conn)?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }

    fn load_sets(&self) -> Result<Vec<SetEntity>, StoreError> {
        let keys = self.key_context();
        let mut conn = self.connection.borrow_mut();
        let guids: Vec<u64> = conn.smembers(keys.subtype_index(SET_SUBTYPE))?;
        if guids.is_empty() {
            return Ok(Vec::new());
        }

        let entity_keys: Vec<String> = guids.iter().map(|guid| keys.entity(guid)).collect();
        let documents: Vec<Option<String>> = cmd("MGET").arg(&entity_keys).query(&mut *conn)?;

        let mut sets = Vec::with_capacity(documents.len());
        for document in documents.into_iter().flatten() {
            if let Entity::Set(set) = serde_json::from_str::<Entity>(&document)? {
                sets.push(set);
            }
        }
        Ok(sets)
    }
}

impl EntityStore for RedisHost {
    fn resolve_entity(&self, guid: Guid) -> Result<Option<Entity>, StoreError> {
        let raw: Option<String> = self.connection.borrow_mut().get(self.key_context().entity(guid))?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    fn create_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        let keys = self.key_context();
        let (added, _): (u64, u64) = pipe()
            .atomic()
            .sadd(keys.relation(relationship, guid_one), guid_two.get())
            .sadd(keys.relation_reverse(relationship, guid_two), guid_one.get())
            .query(&mut *self.connection.borrow_mut())?;
        debug!("redis SADD {guid_one} --{relationship}--> {guid_two}: {added}");
        Ok(added == 1)
    }

    fn remove_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        let keys = self.key_context();
        let (removed, _): (u64, u64) = pipe()
            .atomic()
            .srem(keys.relation(relationship, guid_one), guid_two.get())
            .srem(keys.relation_reverse(relationship, guid_two), guid_one.get())
            .query(&mut *self.connection.borrow_mut())?;
        debug!("redis SREM {guid_one} --{relationship}--> {guid_two}: {removed}");
        Ok(removed == 1)
    }

    fn check_relationship(&self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        let present: bool = self
            .connection
            .borrow_mut()
            .sismember(self.key_context().relation(relationship, guid_one), guid_two.get())?;
        Ok(present)
    }

    fn query_sets(&self, query: &SetQuery) -> Result<Vec<SetEntity>, StoreError> {
        let candidates = self.load_sets()?;
        query.select(self, candidates)
    }
}

impl AccessControl for RedisHost {
    fn granted_access_levels(&self, user: Guid) -> Result<Vec<AccessId>, StoreError> {
        let collections: Vec<i64> = self
            .connection
            .borrow_mut()
            .smembers(self.key_context().user_collections(user))?;
        let mut levels = vec![AccessId::Public, AccessId::LoggedIn];
        levels.extend(collections.into_iter().map(AccessId::collection));
        Ok(levels)
    }

    fn is_administrator(&self, user: &UserEntity) -> Result<bool, StoreError> {
        Ok(user.admin)
    }

    fn can_edit(&self, user: &UserEntity, entity: &Entity) -> Result<bool, StoreError> {
        default_can_edit(self, user, entity)
    }
}
