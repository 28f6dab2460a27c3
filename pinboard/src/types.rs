use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{access::AccessId, id::Guid};

/// Subtype tag carried by every set object.
pub const SET_SUBTYPE: &str = "au_set";
/// Edge label for an entity pinned to a set.
pub const PINNED_RELATIONSHIP: &str = "pinned";
/// Edge label for `guid_one` having friended `guid_two`.
pub const FRIEND_RELATIONSHIP: &str = "friend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Object,
    User,
    Group,
    Site,
}

impl EntityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityType::Object => "object",
            EntityType::User => "user",
            EntityType::Group => "group",
            EntityType::Site => "site",
        }
    }
}

/// Anything stored by the host. The variant is the capability: only
/// [`Entity::Set`] can receive pins and only [`Entity::User`] can act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Content(ContentEntity),
    Set(SetEntity),
    User(UserEntity),
}

impl Entity {
    pub fn guid(&self) -> Guid {
        match self {
            Entity::Content(content) => content.guid,
            Entity::Set(set) => set.guid,
            Entity::User(user) => user.guid,
        }
    }

    /// Users own themselves.
    pub fn owner_guid(&self) -> Guid {
        match self {
            Entity::Content(content) => content.owner_guid,
            Entity::Set(set) => set.owner_guid,
            Entity::User(user) => user.guid,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::Content(content) => content.entity_type,
            Entity::Set(_) => EntityType::Object,
            Entity::User(_) => EntityType::User,
        }
    }

    pub fn subtype(&self) -> Option<&str> {
        match self {
            Entity::Content(content) => content.subtype.as_deref(),
            Entity::Set(_) => Some(SET_SUBTYPE),
            Entity::User(_) => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetEntity> {
        match self {
            Entity::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserEntity> {
        match self {
            Entity::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Entity::Set(_))
    }

    /// Title for listings; users fall back to their display name.
    pub fn display_title(&self) -> &str {
        match self {
            Entity::Content(content) => content.title.as_deref().unwrap_or_default(),
            Entity::Set(set) => &set.title,
            Entity::User(user) => &user.name,
        }
    }
}

/// Any pinnable item that is not a set or a user (blog posts, files, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntity {
    pub guid: Guid,
    pub owner_guid: Guid,
    #[serde(default = "default_object_type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "AccessId::public")]
    pub access_id: AccessId,
    #[serde(default = "Utc::now")]
    pub time_created: DateTime<Utc>,
}

fn default_object_type() -> EntityType {
    EntityType::Object
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CommentsStatus {
    #[default]
    On,
    Off,
}

/// A user-curated pinboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntity {
    pub guid: Guid,
    pub owner_guid: Guid,
    #[serde(default)]
    pub container_guid: Option<Guid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Who may view the set.
    #[serde(default = "AccessId::public")]
    pub access_id: AccessId,
    /// Who, besides the owner, may pin into the set.
    #[serde(default = "AccessId::private")]
    pub write_access_id: AccessId,
    #[serde(default)]
    pub comments_on: CommentsStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub time_created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub time_updated: DateTime<Utc>,
}

impl SetEntity {
    pub fn new(guid: Guid, owner_guid: Guid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            guid,
            owner_guid,
            container_guid: Some(owner_guid),
            title: title.into(),
            description: String::new(),
            excerpt: None,
            access_id: AccessId::Public,
            write_access_id: AccessId::Private,
            comments_on: CommentsStatus::On,
            tags: Vec::new(),
            time_created: now,
            time_updated: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_write_access(mut self, write_access_id: AccessId) -> Self {
        self.write_access_id = write_access_id.canonical();
        self
    }

    pub fn with_time_created(mut self, time_created: DateTime<Utc>) -> Self {
        self.time_created = time_created;
        self.time_updated = time_created;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntity {
    pub guid: Guid,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default = "Utc::now")]
    pub time_created: DateTime<Utc>,
}

impl UserEntity {
    pub fn new(guid: Guid, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            guid,
            name: username.clone(),
            username,
            admin: false,
            time_created: Utc::now(),
        }
    }

    pub fn administrator(mut self) -> Self {
        self.admin = true;
        self
    }
}

/// Directed edge `guid_one --relationship--> guid_two`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub guid_one: Guid,
    pub relationship: String,
    pub guid_two: Guid,
}

impl Relationship {
    pub fn new(guid_one: Guid, relationship: impl Into<String>, guid_two: Guid) -> Self {
        Self {
            guid_one,
            relationship: relationship.into(),
            guid_two,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_object_type_and_subtype() {
        let set = Entity::Set(SetEntity::new(Guid::new(20), Guid::new(1), "Trips"));
        assert_eq!(set.entity_type(), EntityType::Object);
        assert_eq!(set.subtype(), Some(SET_SUBTYPE));
        assert!(set.is_set());
        assert!(set.as_user().is_none());
    }

    #[test]
    fn users_own_themselves() {
        let user = Entity::User(UserEntity::new(Guid::new(3), "ana"));
        assert_eq!(user.owner_guid(), Guid::new(3));
        assert_eq!(user.entity_type().as_str(), "user");
    }

    #[test]
    fn set_defaults_from_json() {
        let json = r#"{"kind":"set","guid":20,"owner_guid":1,"title":"Trips"}"#;
        let entity: Entity = serde_json::from_str(json).expect("set should deserialize");
        let set = entity.as_set().expect("variant should be set");
        assert_eq!(set.write_access_id, AccessId::Private);
        assert_eq!(set.access_id, AccessId::Public);
        assert_eq!(set.comments_on, CommentsStatus::On);
    }
}
