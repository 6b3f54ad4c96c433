//! Request and response types for the comments HTTP API.
//!
//! Shared by the server, the `comments` CLI, and the conformance suite so
//! that all three agree on the wire format.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/api/comment[?slug=]` | → `Vec<`[`Comment`]`>` |
//! | POST | `/api/comment` | [`CommentDraft`] → [`Comment`] |
//! | GET | `/api/comment/{id}` | → [`Comment`] |
//! | PUT | `/api/comment/{id}` | [`CommentDraft`] → [`Comment`] |
//! | DELETE | `/api/comment/{id}` | → [`Envelope`] |
//! | GET | `/api/health` | → [`Envelope`] |
//!
//! Every error response is an [`Envelope`] carrying both a context message and
//! the underlying error text.

pub mod comment;
pub mod envelope;

pub use comment::{Comment, CommentDraft};
pub use envelope::{messages, Envelope};
