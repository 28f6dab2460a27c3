use serde::{Deserialize, Serialize};

use crate::{
    access::AccessId,
    id::Guid,
    types::{CommentsStatus, SetEntity},
};

/// Values for the set edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub access_id: AccessId,
    pub write_access_id: AccessId,
    pub comments_on: CommentsStatus,
    pub tags: Vec<String>,
    pub container_guid: Option<Guid>,
    pub guid: Option<Guid>,
}

impl Default for SetForm {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            access_id: AccessId::Default,
            write_access_id: AccessId::Private,
            comments_on: CommentsStatus::On,
            tags: Vec::new(),
            container_guid: None,
            guid: None,
        }
    }
}

/// Values left behind by a failed submission. Present fields win.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StickyValues {
    pub title: Option<String>,
    pub description: Option<String>,
    pub access_id: Option<AccessId>,
    pub write_access_id: Option<AccessId>,
    pub comments_on: Option<CommentsStatus>,
    pub tags: Option<Vec<String>>,
    pub container_guid: Option<Guid>,
    pub guid: Option<Guid>,
}

impl SetForm {
    /// Defaults, overridden by `set`, overridden by `sticky`.
    pub fn prepare(set: Option<&SetEntity>, sticky: Option<StickyValues>) -> Self {
        let mut form = Self::default();

        if let Some(set) = set {
            form.title = Some(set.title.clone());
            form.description = Some(set.description.clone());
            form.access_id = set.access_id;
            form.write_access_id = set.write_access_id;
            form.comments_on = set.comments_on;
            form.tags = set.tags.clone();
            form.container_guid = set.container_guid;
            form.guid = Some(set.guid);
        }

        if let Some(sticky) = sticky {
            form.title = sticky.title.or(form.title);
            form.description = sticky.description.or(form.description);
            form.access_id = sticky.access_id.unwrap_or(form.access_id);
            form.write_access_id = sticky.write_access_id.unwrap_or(form.write_access_id);
            form.comments_on = sticky.comments_on.unwrap_or(form.comments_on);
            form.tags = sticky.tags.unwrap_or(form.tags);
            form.container_guid = sticky.container_guid.or(form.container_guid);
            form.guid = sticky.guid.or(form.guid);
        }

        form
    }
}
