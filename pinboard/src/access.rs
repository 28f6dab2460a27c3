//! Access levels and the write-access rules for pinning into sets.
//!
//! A set carries two access levels: `access_id` decides who can see it and
//! `write_access_id` decides which non-owners may pin into it. The helpers here
//! compute which write levels a viewer can use and are shared by the bundled
//! hosts when answering `can_edit`.

use std::collections::BTreeSet;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    errors::StoreError,
    host::{AccessControl, EntityStore},
    types::{Entity, FRIEND_RELATIONSHIP, SetEntity, UserEntity},
};

/// Access level, encoded on the wire with the host's integer ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum AccessId {
    /// Placeholder meaning "site default"; never grants anything by itself.
    Default,
    Private,
    LoggedIn,
    Public,
    Friends,
    /// Membership-based access collection. Ids -2 to 2 are reserved for the
    /// named levels; build through [`AccessId::collection`] to stay canonical.
    Collection(i64),
}

impl AccessId {
    pub const fn id(self) -> i64 {
        match self {
            AccessId::Default => -1,
            AccessId::Private => 0,
            AccessId::LoggedIn => 1,
            AccessId::Public => 2,
            AccessId::Friends => -2,
            AccessId::Collection(id) => id,
        }
    }

    /// Level for host collection `id`, mapping reserved ids to their named level.
    pub fn collection(id: i64) -> Self {
        Self::from(id)
    }

    /// The form this level takes after an integer round trip.
    pub fn canonical(self) -> Self {
        Self::from(self.id())
    }

    /// Levels that need a relationship check rather than a flat grant.
    pub const fn is_relationship_scoped(self) -> bool {
        matches!(self, AccessId::Private | AccessId::Friends)
    }

    pub(crate) fn public() -> Self {
        AccessId::Public
    }

    pub(crate) fn private() -> Self {
        AccessId::Private
    }
}

impl From<i64> for AccessId {
    fn from(value: i64) -> Self {
        match value {
            -1 => AccessId::Default,
            0 => AccessId::Private,
            1 => AccessId::LoggedIn,
            2 => AccessId::Public,
            -2 => AccessId::Friends,
            other => AccessId::Collection(other),
        }
    }
}

impl From<AccessId> for i64 {
    fn from(value: AccessId) -> Self {
        value.id()
    }
}

impl std::fmt::Display for AccessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessId::Default => f.write_str("default"),
            AccessId::Private => f.write_str("private"),
            AccessId::LoggedIn => f.write_str("logged_in"),
            AccessId::Public => f.write_str("public"),
            AccessId::Friends => f.write_str("friends"),
            AccessId::Collection(id) => write!(f, "collection:{id}"),
        }
    }
}

/// Access levels `user` may pin into through a flat grant.
///
/// Anonymous viewers get only [`AccessId::Public`]. `Private` and `Friends`
/// are always removed because they are decided per set owner.
pub fn pinboard_write_accesses<A>(acl: &A, user: Option<&UserEntity>) -> Result<Vec<AccessId>, StoreError>
where
    A: AccessControl + ?Sized,
{
    let Some(user) = user else {
        return Ok(vec![AccessId::Public]);
    };

    let levels: BTreeSet<AccessId> = acl
        .granted_access_levels(user.guid)?
        .into_iter()
        .map(AccessId::canonical)
        .filter(|level| !level.is_relationship_scoped())
        .collect();

    Ok(levels.into_iter().collect())
}

/// Whether the set's write access admits `user`, ownership aside.
pub fn write_access_permits<S>(
    store: &S,
    set: &SetEntity,
    user: &UserEntity,
    granted: &[AccessId],
) -> Result<bool, StoreError>
where
    S: EntityStore + ?Sized,
{
    match set.write_access_id.canonical() {
        AccessId::Private | AccessId::Default => Ok(false),
        AccessId::Friends => store.check_relationship(set.owner_guid, FRIEND_RELATIONSHIP, user.guid),
        level => Ok(granted.iter().any(|held| held.canonical() == level)),
    }
}

/// Edit rule used by the bundled hosts: administrators and owners may edit
/// anything, other users may edit a set its write access admits them to.
pub fn default_can_edit<H>(host: &H, user: &UserEntity, entity: &Entity) -> Result<bool, StoreError>
where
    H: EntityStore + AccessControl + ?Sized,
{
    if host.is_administrator(user)? || entity.owner_guid() == user.guid {
        return Ok(true);
    }

    let Some(set) = entity.as_set() else {
        return Ok(false);
    };

    let granted = host.granted_access_levels(user.guid)?;
    let permitted = write_access_permits(host, set, user, &granted)?;
    trace!(
        "write access {} on set {} for user {}: {}",
        set.write_access_id, set.guid, user.guid, permitted
    );
    Ok(permitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::MemoryHost,
        id::Guid,
        types::{Relationship, SetEntity},
    };

    struct FixedGrants(Vec<AccessId>);

    impl AccessControl for FixedGrants {
        fn granted_access_levels(&self, _user: Guid) -> Result<Vec<AccessId>, StoreError> {
            Ok(self.0.clone())
        }

        fn is_administrator(&self, user: &UserEntity) -> Result<bool, StoreError> {
            Ok(user.admin)
        }

        fn can_edit(&self, _user: &UserEntity, _entity: &Entity) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[test]
    fn access_ids_round_trip_through_integers() {
        for raw in [-2, -1, 0, 1, 2, 7] {
            assert_eq!(i64::from(AccessId::from(raw)), raw);
        }
        assert_eq!(AccessId::from(7), AccessId::Collection(7));
        assert_eq!(serde_json::to_string(&AccessId::Friends).unwrap(), "-2");
    }

    #[test]
    fn reserved_collection_ids_map_to_named_levels() {
        assert_eq!(AccessId::collection(0), AccessId::Private);
        assert_eq!(AccessId::collection(2), AccessId::Public);
        assert_eq!(AccessId::collection(7), AccessId::Collection(7));
        assert_eq!(AccessId::Collection(-2).canonical(), AccessId::Friends);
    }

    #[test]
    fn raw_reserved_collection_grants_nothing_extra() {
        let host = MemoryHost::new();
        let member = UserEntity::new(Guid::new(3), "member");
        let set = SetEntity::new(Guid::new(20), Guid::new(1), "Odd").with_write_access(AccessId::Collection(0));
        let granted = [AccessId::Collection(0)];

        assert!(!write_access_permits(&host, &set, &member, &granted).unwrap());
    }

    #[test]
    fn anonymous_viewer_gets_public_only() {
        let acl = FixedGrants(vec![AccessId::LoggedIn, AccessId::Collection(9)]);
        assert_eq!(pinboard_write_accesses(&acl, None).unwrap(), vec![AccessId::Public]);
    }

    #[test]
    fn private_and_friends_are_stripped() {
        let acl = FixedGrants(vec![
            AccessId::Public,
            AccessId::Private,
            AccessId::LoggedIn,
            AccessId::Friends,
            AccessId::Collection(12),
            AccessId::Public,
        ]);
        let user = UserEntity::new(Guid::new(1), "ana");
        let levels = pinboard_write_accesses(&acl, Some(&user)).unwrap();
        assert_eq!(levels, vec![AccessId::LoggedIn, AccessId::Public, AccessId::Collection(12)]);
    }

    #[test]
    fn friends_write_access_follows_owner_friendship() {
        let mut host = MemoryHost::new();
        let owner = UserEntity::new(Guid::new(1), "owner");
        let friend = UserEntity::new(Guid::new(2), "friend");
        let stranger = UserEntity::new(Guid::new(3), "stranger");
        host.add_relationship(Relationship::new(owner.guid, FRIEND_RELATIONSHIP, friend.guid));

        let set = SetEntity::new(Guid::new(20), owner.guid, "Shared").with_write_access(AccessId::Friends);

        assert!(write_access_permits(&host, &set, &friend, &[]).unwrap());
        assert!(!write_access_permits(&host, &set, &stranger, &[]).unwrap());
    }

    #[test]
    fn private_write_access_admits_only_owner_and_admins() {
        let mut host = MemoryHost::new();
        let owner = UserEntity::new(Guid::new(1), "owner");
        let other = UserEntity::new(Guid::new(2), "other");
        let admin = UserEntity::new(Guid::new(3), "admin").administrator();
        let set = Entity::Set(SetEntity::new(Guid::new(20), owner.guid, "Mine"));
        host.insert(set.clone());

        assert!(default_can_edit(&host, &owner, &set).unwrap());
        assert!(!default_can_edit(&host, &other, &set).unwrap());
        assert!(default_can_edit(&host, &admin, &set).unwrap());
    }
}
