//! Reference tree model.
//!
//! A deliberately naive mirror of the tree semantics: plain maps, no
//! batching, no codec, recomputed-from-scratch search. Property tests
//! drive the full pipeline and this model with the same operations and
//! require the store to agree with it.

use std::collections::HashMap;

/// Naive reference implementation of the mirrored tree.
#[derive(Debug, Default, Clone)]
pub struct TreeModel {
    names: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, String>,
    roots: Vec<String>,
}

impl TreeModel {
    /// An empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is live.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the model is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Mount a node, optionally under a live parent. Returns `false`
    /// (and changes nothing) when the id is taken or the parent missing.
    pub fn mount(&mut self, id: &str, name: &str, parent: Option<&str>) -> bool {
        if self.contains(id) {
            return false;
        }
        match parent {
            Some(parent) => {
                if !self.contains(parent) {
                    return false;
                }
                self.parents.insert(id.to_string(), parent.to_string());
                self.children.entry(parent.to_string()).or_default().push(id.to_string());
            },
            None => self.roots.push(id.to_string()),
        }
        self.names.insert(id.to_string(), name.to_string());
        self.children.entry(id.to_string()).or_default();
        true
    }

    /// Remove a subtree. Returns the removal order, deepest first, empty
    /// when the id is not live.
    pub fn unmount(&mut self, id: &str) -> Vec<String> {
        if !self.contains(id) {
            return Vec::new();
        }
        let order = self.subtree_post_order(id);
        for node in &order {
            self.names.remove(node);
            self.children.remove(node);
            self.parents.remove(node);
            if let Some(pos) = self.roots.iter().position(|r| r == node) {
                self.roots.remove(pos);
            }
        }
        for siblings in self.children.values_mut() {
            siblings.retain(|child| child != id);
        }
        order
    }

    /// Children of a live node, in mount order.
    #[must_use]
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Parent of a live node.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Display name of a live node.
    #[must_use]
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Roots in mount order.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// All live ids in document order (depth-first over roots).
    #[must_use]
    pub fn document_order(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.names.len());
        let mut stack: Vec<String> = self.roots.iter().rev().cloned().collect();
        while let Some(id) = stack.pop() {
            out.push(id.clone());
            for child in self.children_of(&id).iter().rev() {
                stack.push(child.clone());
            }
        }
        out
    }

    /// Case-insensitive name search, results in document order.
    #[must_use]
    pub fn search(&self, needle: &str) -> Vec<String> {
        let needle = needle.to_lowercase();
        self.document_order()
            .into_iter()
            .filter(|id| {
                self.names.get(id).is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn subtree_post_order(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        for child in self.children_of(id) {
            out.extend(self.subtree_post_order(child));
        }
        out.push(id.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn mount_and_unmount_maintain_the_tree() {
        let mut model = TreeModel::new();
        assert!(model.mount("r", "Root", None));
        assert!(model.mount("a", "Alpha", Some("r")));
        assert!(model.mount("a1", "AlphaOne", Some("a")));
        assert!(!model.mount("a", "Alpha", None));
        assert!(!model.mount("x", "X", Some("ghost")));

        assert_eq!(model.roots(), &["r".to_string()]);
        assert_eq!(model.parent_of("a1"), Some("a"));
        assert_eq!(model.document_order(), vec!["r", "a", "a1"]);

        let order = model.unmount("a");
        assert_eq!(order, vec!["a1", "a"]);
        assert_eq!(model.len(), 1);
        assert!(model.children_of("r").is_empty());
    }

    #[test]
    fn search_is_a_document_order_filter() {
        let mut model = TreeModel::new();
        model.mount("r", "Root", None);
        model.mount("b", "beta", Some("r"));
        model.mount("a", "Alphabet", Some("r"));
        assert_eq!(model.search("AL"), vec!["a"]);
        assert_eq!(model.search("t"), vec!["r", "b", "a"]);
        assert!(model.search("zzz").is_empty());
    }
}
