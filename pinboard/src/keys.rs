/// Redis key construction for [`crate::host::RedisHost`].
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn entity(&self, guid: impl std::fmt::Display) -> String {
        format!("{}:entity:{}", self.prefix, guid)
    }

    /// Targets of `guid_one --relationship--> *`.
    pub fn relation(&self, relationship: &str, guid_one: impl std::fmt::Display) -> String {
        format!("{}:rel:{}:{}", self.prefix, relationship, guid_one)
    }

    /// Sources of `* --relationship--> guid_two`.
    pub fn relation_reverse(&self, relationship: &str, guid_two: impl std::fmt::Display) -> String {
        format!("{}:rel:{}_reverse:{}", self.prefix, relationship, guid_two)
    }

    /// Guids of every entity with the given subtype.
    pub fn subtype_index(&self, subtype: &str) -> String {
        format!("{}:subtype:{}", self.prefix, subtype)
    }

    /// Members of an access collection.
    pub fn access_collection(&self, collection: i64) -> String {
        format!("{}:acl:{}", self.prefix, collection)
    }

    /// Collections a user belongs to.
    pub fn user_collections(&self, user: impl std::fmt::Display) -> String {
        format!("{}:acl_user:{}", self.prefix, user)
    }
}
