//! Comment tree materialization.
//!
//! Walks the reply relation breadth-first with an explicit queue, one reply
//! query per comment, then assembles the nested tree bottom-up from the
//! recorded walk. Neither phase recurses, so reply depth does not bound the
//! call stack, and a reply chain that loops back is reported as
//! [`AppError::CycleDetected`] instead of walking forever.

use crate::db::StoreTx;
use crate::error::{AppError, Result};
use crate::metrics::COMMENT_TREE_NODES;
use crate::models::{Comment, CommentTree};
use std::collections::{HashMap, HashSet, VecDeque};

/// Resolve every descendant of `root` through `tx` and return the tree.
///
/// Read-only. The caller owns the transaction, so all reply queries observe
/// whatever isolation it was opened with.
pub async fn build_tree(tx: &mut dyn StoreTx, root: Comment) -> Result<CommentTree> {
    let root_id = root.id;

    let mut visited: HashSet<i64> = HashSet::from([root_id]);
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut walk: Vec<Comment> = Vec::new();
    let mut queue: VecDeque<Comment> = VecDeque::from([root]);

    while let Some(comment) = queue.pop_front() {
        let replies = tx.find_replies(comment.id).await?;
        let mut reply_ids = Vec::with_capacity(replies.len());
        for reply in replies {
            // Each comment has one parent, so reaching an id twice means the
            // chain loops back on itself.
            if !visited.insert(reply.id) {
                tracing::error!(
                    root_id,
                    comment_id = reply.id,
                    "cycle detected while building comment tree"
                );
                return Err(AppError::CycleDetected(reply.id));
            }
            reply_ids.push(reply.id);
            queue.push_back(reply);
        }
        children.insert(comment.id, reply_ids);
        walk.push(comment);
    }

    let node_count = walk.len();

    // Breadth-first order puts every reply after its parent, so building in
    // reverse finishes children first.
    let mut built: HashMap<i64, CommentTree> = HashMap::with_capacity(node_count);
    while let Some(comment) = walk.pop() {
        let replies = children
            .remove(&comment.id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| built.remove(&id))
            .collect();
        built.insert(comment.id, CommentTree { comment, replies });
    }

    let tree = built
        .remove(&root_id)
        .ok_or_else(|| AppError::Internal(format!("comment tree {} lost its root", root_id)))?;

    COMMENT_TREE_NODES.observe(node_count as f64);
    tracing::debug!(root_id, node_count, "comment tree built");

    Ok(tree)
}
