//! Section hierarchy derived from dotted identifiers.
//!
//! Nothing here is stored: parent/child relationships come purely from the
//! numeric structure of identifiers. Two views are provided:
//! - [`group_by_prefix`]: flat grouping under the first two components, used
//!   when presenting search hits.
//! - [`SectionTree`]: a nested outline of a whole book, used for display.

use crate::section::{Book, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Components kept in a hierarchy key.
pub const GROUP_DEPTH: usize = 2;

/// Group identifiers under their 2-level prefix.
///
/// Each identifier is listed under its first two components (or under itself
/// when it has fewer). Every exact 2-component identifier is a key even when
/// nothing else shares its prefix. Lists are deduplicated and naturally sorted.
pub fn group_by_prefix<'a>(
    ids: impl IntoIterator<Item = &'a SectionId>,
) -> BTreeMap<SectionId, Vec<SectionId>> {
    let ids: Vec<&SectionId> = ids.into_iter().collect();
    let mut groups: BTreeMap<SectionId, Vec<SectionId>> = BTreeMap::new();

    for id in &ids {
        groups.entry(id.truncate(GROUP_DEPTH)).or_default().push((*id).clone());
    }

    for id in &ids {
        if id.len() == GROUP_DEPTH {
            groups.entry((*id).clone()).or_default();
        }
    }

    for members in groups.values_mut() {
        members.sort();
        members.dedup();
    }

    groups
}

/// A node in a book outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    pub id: SectionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(id: SectionId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            children: Vec::new(),
        }
    }

    /// Recursively count all nodes in this subtree (including self).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|n| n.node_count()).sum::<usize>()
    }

    /// Format the subtree as indented lines.
    pub fn format_tree(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut result = format!("{}{} {}\n", prefix, self.id, self.title);
        for child in &self.children {
            result.push_str(&child.format_tree(indent + 1));
        }
        result
    }

    fn insert(&mut self, path: &[SectionId], node: OutlineNode) {
        match path.split_first() {
            None => self.children.push(node),
            Some((next, rest)) => match self.children.iter_mut().find(|c| &c.id == next) {
                Some(child) => child.insert(rest, node),
                None => self.children.push(node),
            },
        }
    }
}

/// Nested outline of one book.
///
/// A section hangs under the longest proper prefix of its identifier that is
/// itself a section of the book; sections without one are roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionTree {
    pub name: String,
    pub nodes: Vec<OutlineNode>,
}

impl SectionTree {
    pub fn from_book(book: &Book) -> Self {
        let mut nodes: Vec<OutlineNode> = Vec::new();

        // Natural order guarantees every parent is placed before its children.
        for (id, section) in &book.sections {
            let path = ancestors_in(book, id);
            let node = OutlineNode::new(id.clone(), &section.title);

            match path.split_first() {
                None => nodes.push(node),
                Some((root, rest)) => match nodes.iter_mut().find(|n| &n.id == root) {
                    Some(root) => root.insert(rest, node),
                    None => nodes.push(node),
                },
            }
        }

        Self {
            name: book.name.clone(),
            nodes,
        }
    }

    /// Get total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(|n| n.node_count()).sum()
    }

    /// Get maximum depth of the tree.
    pub fn max_depth(&self) -> usize {
        fn depth(node: &OutlineNode) -> usize {
            1 + node.children.iter().map(depth).max().unwrap_or(0)
        }

        self.nodes.iter().map(depth).max().unwrap_or(0)
    }

    /// Format the entire tree for display.
    pub fn format(&self) -> String {
        let mut result = format!("Book: {} ({} sections)\n", self.name, self.node_count());
        result.push_str(&"─".repeat(50));
        result.push('\n');

        for node in &self.nodes {
            result.push_str(&node.format_tree(0));
        }

        result
    }
}

/// Ancestors of `id` that are sections of `book`, outermost first.
fn ancestors_in(book: &Book, id: &SectionId) -> Vec<SectionId> {
    let mut ancestors = Vec::new();
    let mut current = id.parent();
    while let Some(parent) = current {
        current = parent.parent();
        if book.sections.contains_key(&parent) {
            ancestors.push(parent);
        }
    }
    ancestors.reverse();
    ancestors
}
