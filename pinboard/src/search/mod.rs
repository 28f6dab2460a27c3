//! # Set queries
//!
//! Searches over sets are described by a [`SetQuery`]: a structured, composable
//! query that a host executes against its own store. Nothing in here
//! concatenates user input into query text; every value travels as data inside
//! a [`FilterCondition`].
//!
//! ```
//! use pinboard::access::AccessId;
//! use pinboard::id::Guid;
//! use pinboard::search::{FilterCondition, SetQuery, TextField};
//!
//! let query = SetQuery::new()
//!     .with_condition(FilterCondition::or([
//!         FilterCondition::write_access_in([AccessId::Public]),
//!         FilterCondition::owner_in([Guid::new(1)]),
//!     ]))
//!     .with_condition(FilterCondition::guid_not(Guid::new(20)))
//!     .with_condition(FilterCondition::text_contains([TextField::Title], "trip"))
//!     .with_limit(5);
//!
//! assert_eq!(
//!     query.conditions[0].to_clause(),
//!     "(write_access_id IN (public) OR owner_guid IN (1))"
//! );
//! ```

pub mod picker;

pub use picker::{DEFAULT_RESULT_LIMIT, SearchRequest, build_search_query};

use std::{cmp::Ordering, fmt};

use serde::Serialize;

use crate::{
    access::AccessId,
    errors::StoreError,
    host::EntityStore,
    id::Guid,
    types::{EntityType, SET_SUBTYPE, SetEntity},
};

/// Result ordering. The picker always lists the newest sets first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
    #[default]
    NewestFirst,
}

impl SearchSort {
    pub const fn as_clause(self) -> &'static str {
        match self {
            SearchSort::NewestFirst => "time_created DESC",
        }
    }
}

/// Searchable text columns of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Description,
}

impl TextField {
    pub const fn as_str(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Description => "description",
        }
    }

    fn value(self, set: &SetEntity) -> &str {
        match self {
            TextField::Title => &set.title,
            TextField::Description => &set.description,
        }
    }
}

/// Extra data a host must join in to evaluate a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Join {
    /// Object columns (title, description).
    ObjectsEntity,
    /// The set's `write_access_id` metadata.
    WriteAccessMetadata,
}

/// How the listing facility should render results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    /// Compact rows for the pin-to-set picker.
    AjaxResults,
    #[default]
    Full,
}

/// A composable filter over sets.
///
/// Leaf conditions test a single property; `And` and `Or` build boolean
/// expressions. An empty `And` matches everything, an empty `Or` nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterCondition {
    GuidNot {
        guid: Guid,
    },
    OwnerIn {
        owners: Vec<Guid>,
    },
    WriteAccessIn {
        levels: Vec<AccessId>,
    },
    /// The owner has an edge `owner --relationship--> subject`.
    OwnerRelatedTo {
        relationship: String,
        subject: Guid,
    },
    /// Case-insensitive substring match on any of the fields.
    TextContains {
        fields: Vec<TextField>,
        value: String,
    },
    And {
        conditions: Vec<FilterCondition>,
    },
    Or {
        conditions: Vec<FilterCondition>,
    },
}

impl FilterCondition {
    #[inline]
    pub fn guid_not(guid: Guid) -> Self {
        Self::GuidNot { guid }
    }

    #[inline]
    pub fn owner_in(owners: impl IntoIterator<Item = Guid>) -> Self {
        Self::OwnerIn {
            owners: owners.into_iter().collect(),
        }
    }

    #[inline]
    pub fn write_access_in(levels: impl IntoIterator<Item = AccessId>) -> Self {
        Self::WriteAccessIn {
            levels: levels.into_iter().collect(),
        }
    }

    #[inline]
    pub fn owner_related_to(relationship: impl Into<String>, subject: Guid) -> Self {
        Self::OwnerRelatedTo {
            relationship: relationship.into(),
            subject,
        }
    }

    #[inline]
    pub fn text_contains(fields: impl IntoIterator<Item = TextField>, value: impl Into<String>) -> Self {
        Self::TextContains {
            fields: fields.into_iter().collect(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn and(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::And {
            conditions: conditions.into_iter().collect(),
        }
    }

    #[inline]
    pub fn or(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::Or {
            conditions: conditions.into_iter().collect(),
        }
    }

    /// Joins needed to evaluate this condition.
    pub fn required_joins(&self) -> Vec<Join> {
        let mut joins = Vec::new();
        self.collect_joins(&mut joins);
        joins
    }

    fn collect_joins(&self, joins: &mut Vec<Join>) {
        let join = match self {
            Self::WriteAccessIn { .. } => Join::WriteAccessMetadata,
            Self::TextContains { .. } => Join::ObjectsEntity,
            Self::And { conditions } | Self::Or { conditions } => {
                for condition in conditions {
                    condition.collect_joins(joins);
                }
                return;
            }
            Self::GuidNot { .. } | Self::OwnerIn { .. } | Self::OwnerRelatedTo { .. } => return,
        };
        if !joins.contains(&join) {
            joins.push(join);
        }
    }

    /// Evaluate against a set. Relationship conditions consult `store`.
    pub fn matches<S>(&self, set: &SetEntity, store: &S) -> Result<bool, StoreError>
    where
        S: EntityStore + ?Sized,
    {
        match self {
            Self::GuidNot { guid } => Ok(set.guid != *guid),
            Self::OwnerIn { owners } => Ok(owners.contains(&set.owner_guid)),
            Self::WriteAccessIn { levels } => Ok(levels.contains(&set.write_access_id)),
            Self::OwnerRelatedTo { relationship, subject } => {
                store.check_relationship(set.owner_guid, relationship, *subject)
            }
            Self::TextContains { fields, value } => {
                let needle = value.to_lowercase();
                Ok(fields
                    .iter()
                    .any(|field| field.value(set).to_lowercase().contains(&needle)))
            }
            Self::And { conditions } => {
                for condition in conditions {
                    if !condition.matches(set, store)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or { conditions } => {
                for condition in conditions {
                    if condition.matches(set, store)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Human-readable rendering, for logs and `--explain` output.
    pub fn to_clause(&self) -> String {
        match self {
            Self::GuidNot { guid } => format!("guid != {guid}"),
            Self::OwnerIn { owners } => format!("owner_guid IN ({})", join_display(owners)),
            Self::WriteAccessIn { levels } => format!("write_access_id IN ({})", join_display(levels)),
            Self::OwnerRelatedTo { relationship, subject } => {
                format!("owner_guid --{relationship}--> {subject}")
            }
            Self::TextContains { fields, value } => {
                let names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                format!("{} CONTAINS {:?}", names.join("|"), value)
            }
            Self::And { conditions } => compose(conditions, " AND "),
            Self::Or { conditions } => compose(conditions, " OR "),
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_clause())
    }
}

fn join_display<T: fmt::Display>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn compose(conditions: &[FilterCondition], separator: &str) -> String {
    let clauses: Vec<String> = conditions.iter().map(FilterCondition::to_clause).collect();
    match clauses.len() {
        0 => String::new(),
        1 => clauses.into_iter().next().unwrap_or_default(),
        _ => format!("({})", clauses.join(separator)),
    }
}

/// Query over set entities, executed by the host.
///
/// All top-level conditions are ANDed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetQuery {
    pub types: Vec<EntityType>,
    pub subtypes: Vec<String>,
    /// Restrict to these owners when present.
    pub owner_guids: Option<Vec<Guid>>,
    pub conditions: Vec<FilterCondition>,
    pub joins: Vec<Join>,
    pub sort: SearchSort,
    pub limit: Option<u64>,
    pub pagination: bool,
    pub view_context: ViewContext,
    /// Entity the results are offered for (the item being pinned).
    pub target_entity_guid: Option<Guid>,
}

impl Default for SetQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SetQuery {
    pub fn new() -> Self {
        Self {
            types: vec![EntityType::Object],
            subtypes: vec![SET_SUBTYPE.to_string()],
            owner_guids: None,
            conditions: Vec::new(),
            joins: Vec::new(),
            sort: SearchSort::default(),
            limit: None,
            pagination: true,
            view_context: ViewContext::default(),
            target_entity_guid: None,
        }
    }

    #[inline]
    pub fn with_owner_guids(mut self, owners: impl IntoIterator<Item = Guid>) -> Self {
        self.owner_guids = Some(owners.into_iter().collect());
        self
    }

    /// Add a condition and record the joins it needs.
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        for join in condition.required_joins() {
            self = self.with_join(join);
        }
        self.conditions.push(condition);
        self
    }

    #[inline]
    pub fn with_join(mut self, join: Join) -> Self {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
        self
    }

    #[inline]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_pagination(mut self, pagination: bool) -> Self {
        self.pagination = pagination;
        self
    }

    #[inline]
    pub fn with_view_context(mut self, view_context: ViewContext) -> Self {
        self.view_context = view_context;
        self
    }

    #[inline]
    pub fn with_target_entity(mut self, guid: Guid) -> Self {
        self.target_entity_guid = Some(guid);
        self
    }

    pub fn matches<S>(&self, set: &SetEntity, store: &S) -> Result<bool, StoreError>
    where
        S: EntityStore + ?Sized,
    {
        if !self.types.contains(&EntityType::Object) || !self.subtypes.iter().any(|s| s == SET_SUBTYPE) {
            return Ok(false);
        }
        if let Some(owners) = &self.owner_guids
            && !owners.contains(&set.owner_guid)
        {
            return Ok(false);
        }
        for condition in &self.conditions {
            if !condition.matches(set, store)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Filter, order, and window `candidates`. Hosts without a native query
    /// engine call this from [`EntityStore::query_sets`].
    pub fn select<S, I>(&self, store: &S, candidates: I) -> Result<Vec<SetEntity>, StoreError>
    where
        S: EntityStore + ?Sized,
        I: IntoIterator<Item = SetEntity>,
    {
        let mut selected = Vec::new();
        for set in candidates {
            if self.matches(&set, store)? {
                selected.push(set);
            }
        }

        selected.sort_by(|a, b| self.compare(a, b));

        let limit = self
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        selected.truncate(limit);
        Ok(selected)
    }

    fn compare(&self, a: &SetEntity, b: &SetEntity) -> Ordering {
        match self.sort {
            SearchSort::NewestFirst => b
                .time_created
                .cmp(&a.time_created)
                .then_with(|| b.guid.cmp(&a.guid)),
        }
    }

    /// One line per clause, for diagnostics.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let types: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
        lines.push(format!("type IN ({}) AND subtype IN ({})", types.join(", "), self.subtypes.join(", ")));
        if let Some(owners) = &self.owner_guids {
            lines.push(format!("owner_guid IN ({})", join_display(owners)));
        }
        lines.extend(self.conditions.iter().map(FilterCondition::to_clause));
        let mut tail = format!("ORDER BY {}", self.sort.as_clause());
        if let Some(limit) = self.limit {
            tail.push_str(&format!(" LIMIT {limit}"));
        }
        lines.push(tail);
        lines
    }
}
