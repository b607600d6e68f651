mod blogs;
mod comments;

pub use blogs::{BlogChanges, BlogDraft, BlogService, BlogView, LikeOutcome};
pub use comments::{CommentService, CommentView};
