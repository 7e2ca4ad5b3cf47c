/// Data models for blog-service
///
/// This module defines structures for:
/// - User: Account owning posts and comments
/// - Post: A blog entry
/// - Comment: A comment on a post, optionally replying to another comment
/// - CommentTree: A comment with its replies resolved, computed on read
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment record. `parent_id` of `None` marks a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a user; the hash is computed before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
}

/// A comment together with its direct replies, each expanded down to the
/// leaves. Replies keep the order the store returned them in.
///
/// Serializes as the comment's own fields plus a `replies` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTree {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(default)]
    pub replies: Vec<CommentTree>,
}

impl CommentTree {
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.comment.id
    }

    /// Number of comments in this tree, the root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }

    /// Identifiers of every comment in the tree, in pre-order.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.comment.id);
            stack.extend(node.replies.iter().rev());
        }
        ids
    }

    /// Encode the tree as JSON in the same shape the derived `Serialize`
    /// produces, without recursing, so reply depth is bounded by memory only.
    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_json(&mut out)?;
        Ok(out)
    }

    /// Encode a list of trees as a JSON array; see [`CommentTree::to_json_vec`].
    pub fn list_to_json_vec(trees: &[CommentTree]) -> serde_json::Result<Vec<u8>> {
        let mut out = vec![b'['];
        for (i, tree) in trees.iter().enumerate() {
            if i > 0 {
                out.push(b',');
            }
            tree.write_json(&mut out)?;
        }
        out.push(b']');
        Ok(out)
    }

    fn write_json(&self, out: &mut Vec<u8>) -> serde_json::Result<()> {
        enum Step<'a> {
            Open(&'a CommentTree),
            Separator,
            Close,
        }

        let mut steps = vec![Step::Open(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(node) => {
                    // A comment always encodes as a non-empty object; reopen it
                    // to append `replies`.
                    let mut head = serde_json::to_vec(&node.comment)?;
                    head.pop();
                    out.extend_from_slice(&head);
                    out.extend_from_slice(b",\"replies\":[");

                    steps.push(Step::Close);
                    for (i, reply) in node.replies.iter().enumerate().rev() {
                        steps.push(Step::Open(reply));
                        if i > 0 {
                            steps.push(Step::Separator);
                        }
                    }
                }
                Step::Separator => out.push(b','),
                Step::Close => out.extend_from_slice(b"]}"),
            }
        }
        Ok(())
    }
}

// The derived drop glue would recurse once per reply level.
impl Drop for CommentTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, parent_id: Option<i64>) -> Comment {
        let now = Utc::now();
        Comment {
            id,
            post_id: 1,
            user_id: 1,
            parent_id,
            content: format!("comment {id}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tree_serializes_flat_fields_with_replies() {
        let tree = CommentTree {
            comment: comment(1, None),
            replies: vec![CommentTree::leaf(comment(2, Some(1)))],
        };

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["id"], 1);
        assert!(value["parent_id"].is_null());
        assert_eq!(value["replies"][0]["id"], 2);
        assert_eq!(value["replies"][0]["parent_id"], 1);
        assert_eq!(value["replies"][0]["replies"], serde_json::json!([]));

        let back: CommentTree = serde_json::from_value(value).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn node_count_and_preorder_ids() {
        let tree = CommentTree {
            comment: comment(1, None),
            replies: vec![
                CommentTree {
                    comment: comment(2, Some(1)),
                    replies: vec![CommentTree::leaf(comment(4, Some(2)))],
                },
                CommentTree::leaf(comment(3, Some(1))),
            ],
        };

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.ids(), vec![1, 2, 4, 3]);
    }

    #[test]
    fn json_encoding_matches_derived_serialize() {
        let tree = CommentTree {
            comment: comment(1, None),
            replies: vec![
                CommentTree {
                    comment: comment(2, Some(1)),
                    replies: vec![CommentTree::leaf(comment(4, Some(2)))],
                },
                CommentTree::leaf(comment(3, Some(1))),
            ],
        };

        let encoded: serde_json::Value =
            serde_json::from_slice(&tree.to_json_vec().unwrap()).unwrap();
        assert_eq!(encoded, serde_json::to_value(&tree).unwrap());

        let list = vec![tree.clone(), CommentTree::leaf(comment(5, None))];
        let encoded: serde_json::Value =
            serde_json::from_slice(&CommentTree::list_to_json_vec(&list).unwrap()).unwrap();
        assert_eq!(encoded, serde_json::to_value(&list).unwrap());

        assert_eq!(CommentTree::list_to_json_vec(&[]).unwrap(), b"[]");
    }

    fn chain(depth: i64) -> CommentTree {
        let mut tree = CommentTree::leaf(comment(depth, Some(depth - 1)));
        for id in (1..depth).rev() {
            let parent_id = if id == 1 { None } else { Some(id - 1) };
            tree = CommentTree {
                comment: comment(id, parent_id),
                replies: vec![tree],
            };
        }
        tree
    }

    #[test]
    fn very_deep_chain_encodes_and_drops_on_a_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let tree = chain(50_000);
                let json = tree.to_json_vec().unwrap();
                drop(tree);
                json
            })
            .unwrap();

        let json = handle.join().unwrap();
        let text = String::from_utf8(json).unwrap();
        assert!(text.starts_with("{"));
        assert!(text.ends_with("]}"));
        assert_eq!(text.matches("\"replies\":[").count(), 50_000);
        assert_eq!(text.matches("\"replies\":[]").count(), 1);
    }

    #[test]
    fn user_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "ada");
    }
}
