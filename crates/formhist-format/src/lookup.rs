//! Entity lookup seam
//!
//! References stored in records (linked records, users, owner roles) are
//! resolved through an [`EntityLookup`] supplied by the host. The lookup owns
//! access control: it must only return what its `Access` value allows.

use crate::error::LookupError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of a referenced entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Another record
    Record,
    /// A user account
    User,
    /// A role within an application
    Role,
}

impl EntityKind {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::User => "user",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    /// Linked record, shown by its human-facing identifier
    Record {
        /// Storage id
        id: String,
        /// Stable human identifier
        #[serde(rename = "incrementalId")]
        incremental_id: String,
    },
    /// User account
    User {
        /// Storage id
        id: String,
        /// Login name
        username: String,
    },
    /// Role, optionally scoped to an application
    Role {
        /// Storage id
        id: String,
        /// Role title
        title: String,
        /// Name of the owning application
        #[serde(default, skip_serializing_if = "Option::is_none")]
        application: Option<String>,
    },
}

impl Entity {
    /// Create record entity
    #[must_use]
    pub fn record(id: impl Into<String>, incremental_id: impl Into<String>) -> Self {
        Self::Record {
            id: id.into(),
            incremental_id: incremental_id.into(),
        }
    }

    /// Create user entity
    #[must_use]
    pub fn user(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self::User {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Create role entity
    #[must_use]
    pub fn role(id: impl Into<String>, title: impl Into<String>, application: Option<String>) -> Self {
        Self::Role {
            id: id.into(),
            title: title.into(),
            application,
        }
    }

    /// Storage id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Record { id, .. } | Self::User { id, .. } | Self::Role { id, .. } => id,
        }
    }

    /// Entity kind
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Record { .. } => EntityKind::Record,
            Self::User { .. } => EntityKind::User,
            Self::Role { .. } => EntityKind::Role,
        }
    }

    /// Label shown in place of the id
    ///
    /// Roles render as `"<application> - <title>"`, or the bare title when
    /// they belong to no application.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Record { incremental_id, .. } => incremental_id.clone(),
            Self::User { username, .. } => username.clone(),
            Self::Role {
                title,
                application: Some(application),
                ..
            } => format!("{application} - {title}"),
            Self::Role { title, .. } => title.clone(),
        }
    }
}

/// Access-controlled batch lookup of referenced entities
///
/// Implementations must drop entities the `access` value does not allow
/// reading; missing ids are not an error.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Caller permissions, opaque to the formatter
    type Access: Send + Sync;

    /// Fetch every readable entity of `kind` among `ids`
    async fn find_many(
        &self,
        kind: EntityKind,
        ids: &[String],
        access: &Self::Access,
    ) -> Result<Vec<Entity>, LookupError>;
}

#[async_trait]
impl<L: EntityLookup> EntityLookup for Arc<L> {
    type Access = L::Access;

    async fn find_many(
        &self,
        kind: EntityKind,
        ids: &[String],
        access: &Self::Access,
    ) -> Result<Vec<Entity>, LookupError> {
        (**self).find_many(kind, ids, access).await
    }
}
