use log::debug;
use serde::Deserialize;

use crate::{
    access::{AccessId, pinboard_write_accesses},
    errors::SetsError,
    host::{AccessControl, EntityStore},
    id::Guid,
    search::{FilterCondition, Join, SetQuery, TextField, ViewContext},
    types::{FRIEND_RELATIONSHIP, UserEntity},
};

/// Size of the non-paginated "latest sets" listing in the pin picker.
pub const DEFAULT_RESULT_LIMIT: u64 = 5;

/// Build the query listing sets `viewer` could pin `root` into.
///
/// With `mine_only` the results are the viewer's own sets. Otherwise a
/// non-administrator sees sets whose write access is one of their flat grants,
/// sets with friends write access owned by someone who friended them, and
/// their own sets. `root` itself is always excluded. A non-empty `query`
/// additionally requires a case-insensitive match on title or description.
pub fn build_search_query<H>(
    host: &H,
    viewer: Option<&UserEntity>,
    root: Guid,
    query: Option<&str>,
    mine_only: bool,
) -> Result<SetQuery, SetsError>
where
    H: EntityStore + AccessControl + ?Sized,
{
    let root_entity = host
        .resolve_entity(root)?
        .ok_or(SetsError::InvalidEntity { guid: Some(root) })?;

    let mut set_query = SetQuery::new()
        .with_pagination(false)
        .with_limit(DEFAULT_RESULT_LIMIT)
        .with_view_context(ViewContext::AjaxResults)
        .with_target_entity(root_entity.guid())
        .with_join(Join::ObjectsEntity);

    if mine_only {
        // Anonymous viewers own nothing.
        set_query = set_query.with_owner_guids(viewer.map(|user| user.guid));
    } else {
        let is_admin = match viewer {
            Some(user) => host.is_administrator(user)?,
            None => false,
        };
        if !is_admin {
            let writable = pinboard_write_accesses(host, viewer)?;
            set_query = set_query.with_condition(write_scope(viewer, writable));
        }
    }

    set_query = set_query.with_condition(FilterCondition::guid_not(root_entity.guid()));

    if let Some(text) = query.filter(|text| !text.is_empty()) {
        set_query = set_query.with_condition(FilterCondition::text_contains(
            [TextField::Title, TextField::Description],
            text,
        ));
    }

    debug!(
        "pinboard search for root {} by {:?}: {}",
        root,
        viewer.map(|user| user.guid),
        set_query.describe().join(" AND ")
    );
    Ok(set_query)
}

fn write_scope(viewer: Option<&UserEntity>, writable: Vec<AccessId>) -> FilterCondition {
    let mut branches = vec![FilterCondition::write_access_in(writable)];
    if let Some(user) = viewer {
        branches.push(FilterCondition::and([
            FilterCondition::write_access_in([AccessId::Friends]),
            FilterCondition::owner_related_to(FRIEND_RELATIONSHIP, user.guid),
        ]));
        branches.push(FilterCondition::owner_in([user.guid]));
    }
    FilterCondition::or(branches)
}

/// Parameters of a pin-picker search as they arrive from the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub entity_guid: Option<Guid>,
    #[serde(default)]
    pub query: Option<String>,
    /// Only the literal `"false"` widens the search beyond the viewer's sets.
    #[serde(default)]
    pub filter_mine: Option<String>,
}

impl SearchRequest {
    pub fn mine_only(&self) -> bool {
        self.filter_mine.as_deref() != Some("false")
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|query| !query.is_empty())
    }

    /// Build the query for this request on behalf of `viewer`.
    pub fn build<H>(&self, host: &H, viewer: Option<&UserEntity>) -> Result<SetQuery, SetsError>
    where
        H: EntityStore + AccessControl + ?Sized,
    {
        let root = self.entity_guid.ok_or(SetsError::InvalidEntity { guid: None })?;
        build_search_query(host, viewer, root, self.query(), self.mine_only())
    }
}
