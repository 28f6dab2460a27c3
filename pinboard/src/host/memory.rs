use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    access::{AccessId, default_can_edit},
    errors::StoreError,
    host::{AccessControl, EntityStore},
    id::Guid,
    search::SetQuery,
    types::{Entity, Relationship, SetEntity, UserEntity},
};

/// Host backed by plain collections. Used by tests and the CLI's fixture mode.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    entities: BTreeMap<Guid, Entity>,
    relationships: BTreeSet<Relationship>,
    collections: BTreeMap<i64, BTreeSet<Guid>>,
}

/// Serialized form of a [`MemoryHost`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Access collection members, keyed by collection id.
    #[serde(default)]
    pub collections: Vec<CollectionMembers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMembers {
    pub id: i64,
    pub members: Vec<Guid>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.guid(), entity)
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> bool {
        self.relationships.insert(relationship)
    }

    pub fn add_collection_member(&mut self, collection: i64, user: Guid) {
        self.collections.entry(collection).or_default().insert(user);
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let mut host = Self::new();
        for entity in fixture.entities {
            host.insert(entity);
        }
        host.relationships.extend(fixture.relationships);
        for collection in fixture.collections {
            host.collections
                .entry(collection.id)
                .or_default()
                .extend(collection.members);
        }
        host
    }

    pub fn to_fixture(&self) -> Fixture {
        Fixture {
            entities: self.entities.values().cloned().collect(),
            relationships: self.relationships.iter().cloned().collect(),
            collections: self
                .collections
                .iter()
                .map(|(id, members)| CollectionMembers {
                    id: *id,
                    members: members.iter().copied().collect(),
                })
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.to_fixture())?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl EntityStore for MemoryHost {
    fn resolve_entity(&self, guid: Guid) -> Result<Option<Entity>, StoreError> {
        Ok(self.entities.get(&guid).cloned())
    }

    fn create_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        Ok(self
            .relationships
            .insert(Relationship::new(guid_one, relationship, guid_two)))
    }

    fn remove_relationship(&mut self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        Ok(self
            .relationships
            .remove(&Relationship::new(guid_one, relationship, guid_two)))
    }

    fn check_relationship(&self, guid_one: Guid, relationship: &str, guid_two: Guid) -> Result<bool, StoreError> {
        Ok(self
            .relationships
            .contains(&Relationship::new(guid_one, relationship, guid_two)))
    }

    fn query_sets(&self, query: &SetQuery) -> Result<Vec<SetEntity>, StoreError> {
        let candidates = self.entities.values().filter_map(Entity::as_set).cloned();
        query.select(self, candidates)
    }
}

impl AccessControl for MemoryHost {
    fn granted_access_levels(&self, user: Guid) -> Result<Vec<AccessId>, StoreError> {
        let mut levels = vec![AccessId::Public, AccessId::LoggedIn];
        levels.extend(
            self.collections
                .iter()
                .filter(|(_, members)| members.contains(&user))
                .map(|(id, _)| AccessId::collection(*id)),
        );
        Ok(levels)
    }

    fn is_administrator(&self, user: &UserEntity) -> Result<bool, StoreError> {
        Ok(user.admin)
    }

    fn can_edit(&self, user: &UserEntity, entity: &Entity) -> Result<bool, StoreError> {
        default_can_edit(self, user, entity)
    }
}
