/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Post service: Post lifecycle, including cascading comment deletion
/// - Comment service: Comment creation and tree-shaped reads
/// - User service: Account creation and lookup
/// - Tree: Comment tree materialization shared by the above
pub mod comments;
pub mod posts;
pub mod tree;
pub mod users;

// Re-export commonly used services
pub use comments::CommentService;
pub use posts::PostService;
pub use tree::build_tree;
pub use users::UserService;
