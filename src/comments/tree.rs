//! Pure flat-to-tree transform for comment threads.
//!
//! Input is the creation-time-ordered flat list the store returns; output is
//! the nested reply structure the API serves. No I/O, no hidden state.

use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// One row of the flat listing, author fields already joined in.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub like_count: i64,
    pub created_at: String,
    pub updated_at: String,
    pub author: CommentAuthor,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: String,
    pub content: String,
    pub like_count: i64,
    pub created_at: String,
    pub updated_at: String,
    pub user: CommentAuthor,
    pub replies: Vec<CommentNode>,
}

/// Nesting cap for the rendered tree. A reply chain can be arbitrarily long
/// through the public API; past this depth replies surface as siblings at
/// the deepest level so the output never nests without bound.
const MAX_DEPTH: usize = 64;

/// Build the nested reply tree from a flat, parent-linked list.
///
/// Relative input order is preserved at every level, so a creation-time-
/// ordered input yields creation-time-ordered threads. A comment whose
/// declared parent is absent from the input (its parent was soft-deleted and
/// filtered out of the listing) is promoted to root level rather than
/// dropped. O(n) time and space, and no recursion, so input shape cannot
/// exhaust the stack.
pub fn build_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let index: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        match record.parent_id.as_deref().and_then(|p| index.get(p)) {
            // A row naming itself as parent is corrupt input; treat as root
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    // Depth-capped placement. Each stack entry is (node, depth, parent):
    // a node at the cap hands its children to its own parent, so an
    // over-deep chain flattens into siblings instead of nesting further.
    // `order` is a traversal pre-order, used below to assemble bottom-up.
    let mut nested: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut stack: Vec<(usize, usize, usize)> = roots.iter().map(|&r| (r, 0, r)).collect();

    while let Some((i, depth, parent)) = stack.pop() {
        order.push(i);
        for &c in &children[i] {
            if depth < MAX_DEPTH {
                nested[i].push(c);
                stack.push((c, depth + 1, i));
            } else {
                nested[parent].push(c);
                stack.push((c, depth, parent));
            }
        }
    }

    // Children precede their parent in reversed pre-order, so every node's
    // replies are complete by the time it is built.
    let mut built: Vec<Option<CommentNode>> = vec![None; records.len()];
    for &i in order.iter().rev() {
        let r = &records[i];
        let replies = nested[i].iter().filter_map(|&c| built[c].take()).collect();
        built[i] = Some(CommentNode {
            id: r.id.clone(),
            content: r.content.clone(),
            like_count: r.like_count,
            created_at: r.created_at.clone(),
            updated_at: r.updated_at.clone(),
            user: r.author.clone(),
            replies,
        });
    }

    roots.into_iter().filter_map(|i| built[i].take()).collect()
}
