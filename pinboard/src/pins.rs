//! Pinning entities into sets.
//!
//! Every mutation goes through [`PinManager::sanity_check`], which resolves the
//! entity, the set, and the acting user and rejects with the first failing
//! rule. The relationship edge is only touched after all checks pass.

use log::{debug, info};

use crate::{
    errors::SetsError,
    host::{AccessControl, EntityStore, Session},
    id::Guid,
    types::{Entity, PINNED_RELATIONSHIP, SetEntity, UserEntity},
};

/// Everything resolved by a passing sanity check.
#[derive(Debug, Clone)]
pub struct PinTarget {
    pub entity: Entity,
    pub set: SetEntity,
    pub user: UserEntity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Pin,
    Unpin,
}

impl PinAction {
    const fn past_tense(self) -> &'static str {
        match self {
            PinAction::Pin => "pinned",
            PinAction::Unpin => "unpinned",
        }
    }

    const fn preposition(self) -> &'static str {
        match self {
            PinAction::Pin => "to",
            PinAction::Unpin => "from",
        }
    }
}

/// Outcome of [`PinManager::apply`].
#[derive(Debug, Clone)]
pub struct PinChange {
    pub target: PinTarget,
    /// Whether an edge was created or removed.
    pub changed: bool,
}

/// Pin and unpin operations for one request.
pub struct PinManager<'a, H: ?Sized> {
    host: &'a mut H,
    session: &'a Session,
}

impl<'a, H> PinManager<'a, H>
where
    H: EntityStore + AccessControl + ?Sized,
{
    pub fn new(host: &'a mut H, session: &'a Session) -> Self {
        Self { host, session }
    }

    /// Validate a pin or unpin of `entity` into `set`.
    ///
    /// `acting_user` is used when it resolves to a user; otherwise the session
    /// user acts.
    pub fn sanity_check(&self, entity: Guid, set: Guid, acting_user: Option<Guid>) -> Result<PinTarget, SetsError> {
        let entity = self
            .host
            .resolve_entity(entity)?
            .ok_or(SetsError::InvalidEntity { guid: Some(entity) })?;

        let set = match self.host.resolve_entity(set)? {
            Some(Entity::Set(resolved)) => resolved,
            _ => return Err(SetsError::InvalidSet { guid: Some(set) }),
        };

        if set.guid == entity.guid() {
            return Err(SetsError::RecursivePin { guid: set.guid });
        }

        let user = self.acting_user(acting_user)?.ok_or(SetsError::InvalidUser)?;

        if !self.host.can_edit(&user, &Entity::Set(set.clone()))? {
            return Err(SetsError::CannotEdit {
                user: user.guid,
                set: set.guid,
            });
        }

        Ok(PinTarget { entity, set, user })
    }

    fn acting_user(&self, acting_user: Option<Guid>) -> Result<Option<UserEntity>, SetsError> {
        if let Some(guid) = acting_user {
            match self.host.resolve_entity(guid)? {
                Some(Entity::User(user)) => return Ok(Some(user)),
                _ => debug!("acting user {guid} is not a user, falling back to session"),
            }
        }
        Ok(self.session.user().cloned())
    }

    /// Pin `entity` into `set`. Returns `false` when the store reports that no
    /// edge was created, e.g. because the entity was already pinned.
    pub fn pin(&mut self, entity: Guid, set: Guid, acting_user: Option<Guid>) -> Result<bool, SetsError> {
        self.apply(PinAction::Pin, entity, set, acting_user)
            .map(|change| change.changed)
    }

    /// Unpin `entity` from `set`. Returns `false` when there was nothing to remove.
    pub fn unpin(&mut self, entity: Guid, set: Guid, acting_user: Option<Guid>) -> Result<bool, SetsError> {
        self.apply(PinAction::Unpin, entity, set, acting_user)
            .map(|change| change.changed)
    }

    /// Check once, then create or remove the edge. The returned change carries
    /// everything the check resolved.
    pub fn apply(
        &mut self,
        action: PinAction,
        entity: Guid,
        set: Guid,
        acting_user: Option<Guid>,
    ) -> Result<PinChange, SetsError> {
        let target = self.checked(entity, set, acting_user)?;
        let (entity, set) = (target.entity.guid(), target.set.guid);
        let changed = match action {
            PinAction::Pin => self.host.create_relationship(entity, PINNED_RELATIONSHIP, set)?,
            PinAction::Unpin => self.host.remove_relationship(entity, PINNED_RELATIONSHIP, set)?,
        };
        info!(
            "user {} {} {entity} {} set {set} (changed: {changed})",
            target.user.guid,
            action.past_tense(),
            action.preposition()
        );
        Ok(PinChange { target, changed })
    }

    /// Whether `entity` is currently pinned to `set`.
    pub fn is_pinned(&self, entity: Guid, set: Guid) -> Result<bool, SetsError> {
        is_pinned(&*self.host, entity, set)
    }

    fn checked(&self, entity: Guid, set: Guid, acting_user: Option<Guid>) -> Result<PinTarget, SetsError> {
        self.sanity_check(entity, set, acting_user).inspect_err(|err| {
            debug!("pin check rejected {entity} -> {set}: {err}");
        })
    }
}

/// Whether `entity` is pinned to `set`, without resolving a session.
pub fn is_pinned<S>(store: &S, entity: Guid, set: Guid) -> Result<bool, SetsError>
where
    S: EntityStore + ?Sized,
{
    Ok(store.check_relationship(entity, PINNED_RELATIONSHIP, set)?)
}
