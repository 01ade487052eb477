//! Resource shapes returned by the API, plus typed identifiers.
//!
//! These are plain decode targets: created by JSON decoding, read by the
//! caller, discarded. Missing fields and explicit `null`s decode to their
//! defaults so partial payloads (e.g. `"createdBy": {}`) are accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decodes `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a collection.
    CollectionId
);
id_type!(
    /// Identifier of a document.
    DocumentId
);
id_type!(
    /// Identifier of a public share link of a document.
    DocumentShareId
);
id_type!(
    /// Short slug used in document URLs.
    DocumentUrlId
);
id_type!(
    /// Identifier of a user.
    UserId
);

/// Access level granted to workspace members on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    ReadWrite,
}

/// Sort order of documents within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sort {
    #[serde(deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(deserialize_with = "null_as_default")]
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collection {
    #[serde(deserialize_with = "null_as_default")]
    pub id: CollectionId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub sort: Option<Sort>,
    #[serde(deserialize_with = "null_as_default")]
    pub index: String,
    #[serde(deserialize_with = "null_as_default")]
    pub color: String,
    pub icon: Option<String>,
    /// `None` means members only get access through explicit memberships.
    pub permission: Option<Permission>,
    #[serde(deserialize_with = "null_as_default")]
    pub private: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: UserId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_suspended: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    #[serde(deserialize_with = "null_as_default")]
    pub id: DocumentId,
    pub collection_id: Option<CollectionId>,
    pub parent_document_id: Option<DocumentId>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_width: bool,
    pub emoji: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url_id: DocumentUrlId,
    #[serde(deserialize_with = "null_as_default")]
    pub collaborators: Vec<User>,
    #[serde(deserialize_with = "null_as_default")]
    pub pinned: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub template: bool,
    pub template_id: Option<DocumentId>,
    #[serde(deserialize_with = "null_as_default")]
    pub revision: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<User>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<User>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One node of a collection's document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub id: DocumentId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<DocumentSummary>,
}

/// The nested document tree of a collection, as returned by `collections.documents`.
pub type DocumentStructure = Vec<DocumentSummary>;

/// Upload descriptor returned by `attachments.create`.
///
/// The file itself is uploaded separately: POST `form` fields plus the file to
/// `upload_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    #[serde(deserialize_with = "null_as_default")]
    pub max_upload_size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub upload_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub form: serde_json::Map<String, serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub attachment: AttachmentDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub document_id: Option<DocumentId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_decodes_with_sparse_fields() {
        let col: Collection = serde_json::from_str(
            r##"{"id":"c1","name":"Human Resources","permission":"read_write","color":"#123123","deletedAt":null}"##,
        )
        .unwrap();
        assert_eq!(col.id.as_str(), "c1");
        assert_eq!(col.permission, Some(Permission::ReadWrite));
        assert!(col.deleted_at.is_none());
        assert!(col.sort.is_none());
    }

    #[test]
    fn test_collection_decodes_null_fields_as_defaults() {
        let col: Collection = serde_json::from_str(
            r#"{"id":"c1","name":"HR","description":null,"color":null,"index":null,"private":null}"#,
        )
        .unwrap();
        assert_eq!(col.name, "HR");
        assert_eq!(col.description, "");
        assert_eq!(col.color, "");
        assert_eq!(col.index, "");
        assert!(!col.private);
    }

    #[test]
    fn test_document_and_tree_decode_null_fields_as_defaults() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"d1","title":null,"text":null,"urlId":null,"collaborators":null,"revision":null}"#,
        )
        .unwrap();
        assert_eq!(doc.id.as_str(), "d1");
        assert!(doc.title.is_empty());
        assert!(doc.url_id.is_empty());
        assert!(doc.collaborators.is_empty());
        assert_eq!(doc.revision, 0);

        let tree: DocumentStructure =
            serde_json::from_str(r#"[{"id":"d1","title":"T","url":null,"children":null}]"#).unwrap();
        assert!(tree[0].url.is_empty());
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_attachment_decodes_null_fields_as_defaults() {
        let attachment: Attachment = serde_json::from_str(
            r#"{"maxUploadSize":null,"uploadUrl":"https://u","form":null,"attachment":{"name":"a","size":null,"url":null}}"#,
        )
        .unwrap();
        assert_eq!(attachment.max_upload_size, 0);
        assert!(attachment.form.is_empty());
        assert_eq!(attachment.attachment.size, 0);
        assert!(attachment.attachment.url.is_empty());
    }

    #[test]
    fn test_document_accepts_empty_user_objects() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"d1","createdBy":{},"updatedAt":"2019-08-24T14:15:22Z","collaborators":[]}"#,
        )
        .unwrap();
        assert_eq!(doc.created_by, Some(User::default()));
        assert!(doc.updated_at.is_some());
    }

    #[test]
    fn test_document_summary_decodes_nested_children() {
        let tree: DocumentStructure = serde_json::from_str(
            r#"[{"id":"doc2","title":"Doc 2","url":"https://doc2.url","children":[{"id":"doc2-1","title":"Doc 2-1","url":"https://doc2-1.url"}]}]"#,
        )
        .unwrap();
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id.as_str(), "doc2-1");
        assert!(tree[0].children[0].children.is_empty());
    }

    #[test]
    fn test_permission_wire_names() {
        assert_eq!(serde_json::to_string(&Permission::Read).unwrap(), r#""read""#);
        assert_eq!(
            serde_json::to_string(&Permission::ReadWrite).unwrap(),
            r#""read_write""#
        );
    }
}
