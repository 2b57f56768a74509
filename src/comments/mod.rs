pub mod store;
pub mod tree;

/// Resource types that can carry comments. Likes additionally accept
/// `comment` targets; see `likes::store`.
pub const RESOURCE_NEWS: &str = "news";
pub const RESOURCE_COMMENT: &str = "comment";
