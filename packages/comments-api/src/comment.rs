//! Comment entity and the draft body used for create and update requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored comment.
///
/// `id` is assigned by the store on creation and never changes afterwards.
/// A comment with `id == 0` has not been persisted yet.
///
/// # Example
///
/// ```json
/// {
///   "id": 7,
///   "slug": "/articles/rust-ownership",
///   "body": "Great write-up.",
///   "author": "dude",
///   "created_at": "2026-10-17T12:00:00Z",
///   "updated_at": "2026-10-17T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: u64,

    /// Identifies the parent article or thread. Many comments share a slug.
    #[serde(default)]
    pub slug: String,

    /// Free-text comment body.
    #[serde(default)]
    pub body: String,

    /// Free-text author name.
    #[serde(default)]
    pub author: String,

    /// When the store first persisted the comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the store last modified the comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Returns `true` if the comment has not been assigned an identity yet.
    pub fn is_transient(&self) -> bool {
        self.id == 0
    }
}

/// Body of `POST /api/comment` and `PUT /api/comment/{id}`.
///
/// Every field defaults to the empty string so a partial JSON object decodes,
/// and an explicit `null` counts as empty. Capitalised keys (`Slug`, `Body`,
/// `Author`) are accepted for existing clients. On update, empty fields leave
/// the stored value untouched. Any `id` or timestamp sent by the client is
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentDraft {
    #[serde(default, alias = "Slug", alias = "SLUG", deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(default, alias = "Body", alias = "BODY", deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default, alias = "Author", alias = "AUTHOR", deserialize_with = "null_as_empty")]
    pub author: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CommentDraft {
    pub fn new(
        slug: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            body: body.into(),
            author: author.into(),
        }
    }

    /// Merge the non-empty fields of this draft onto `target`.
    ///
    /// Returns `true` if any field of `target` changed.
    pub fn merge_into(&self, target: &mut Comment) -> bool {
        let mut changed = false;
        for (patch, field) in [
            (&self.slug, &mut target.slug),
            (&self.body, &mut target.body),
            (&self.author, &mut target.author),
        ] {
            if !patch.is_empty() && *patch != *field {
                field.clone_from(patch);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Comment {
        Comment {
            id: 3,
            slug: "/a".into(),
            body: "old".into(),
            author: "dude".into(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn draft_ignores_client_supplied_id() {
        let json = r#"{"id": 42, "slug": "/a", "author": "dude", "body": "hi"}"#;
        let draft: CommentDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft, CommentDraft::new("/a", "hi", "dude"));
    }

    #[test]
    fn partial_draft_decodes_with_empty_defaults() {
        let draft: CommentDraft = serde_json::from_str(r#"{"body":"new"}"#).unwrap();
        assert_eq!(draft.body, "new");
        assert!(draft.slug.is_empty());
        assert!(draft.author.is_empty());
    }

    #[test]
    fn draft_accepts_capitalised_keys() {
        let json = r#"{"Slug": "/x", "Author": "a", "Body": "b"}"#;
        let draft: CommentDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft, CommentDraft::new("/x", "b", "a"));
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let json = r#"{"slug": null, "body": "hi", "author": null}"#;
        let draft: CommentDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft, CommentDraft::new("", "hi", ""));
    }

    #[test]
    fn non_string_field_is_still_rejected() {
        assert!(serde_json::from_str::<CommentDraft>(r#"{"body": 5}"#).is_err());
    }

    #[test]
    fn merge_only_touches_non_empty_fields() {
        let mut c = stored();
        let changed = CommentDraft::new("", "new", "").merge_into(&mut c);
        assert!(changed);
        assert_eq!(c.body, "new");
        assert_eq!(c.slug, "/a");
        assert_eq!(c.author, "dude");
    }

    #[test]
    fn merge_with_identical_values_reports_no_change() {
        let mut c = stored();
        assert!(!CommentDraft::new("/a", "", "dude").merge_into(&mut c));
        assert!(!CommentDraft::default().merge_into(&mut c));
    }

    #[test]
    fn transient_comment_omits_timestamps() {
        let c = Comment {
            id: 0,
            ..stored()
        };
        assert!(c.is_transient());
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["slug"], "/a");
        assert!(v.get("created_at").is_none());
    }
}
