//! The mirrored component tree and its UI state.
//!
//! The store is the consumer-side authority for everything the inspector
//! UI renders: the latest record per live node, the root list, the parent
//! index, selection, hover, collapse flags, and the active search. It is a
//! pure state machine in the same mold as the bridge: mutators take plain
//! data, return [`Command`]s for a driver to execute against the producer,
//! and fan out [`Notice`]s to local subscribers.
//!
//! Tree-shape events (`mount`/`update`/`unmount`) come from the producer
//! and are authoritative; the store never invents or edits records, it
//! only mirrors them and layers UI-only state on top.

use std::collections::HashMap;

use periscope_codec::merge_inspection;
use periscope_proto::errors::ProtocolError;
use periscope_proto::message::events;
use periscope_proto::node::{Children, NodeId, NodeRecord, NodeType, Section};
use periscope_proto::path::{Path, PathSeg};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::command::{Command, Notice};
use crate::error::StoreError;
use crate::navigation::{Destination, Direction, resolve_destination};

/// One mirrored node: the latest merged record plus UI-only state.
#[derive(Debug, Clone)]
pub struct Node {
    /// Latest merged record from the producer.
    pub record: NodeRecord,
    /// Persisted collapse flag, owned by the UI.
    pub collapsed: bool,
    /// Updates applied since mount.
    pub renders: u64,
}

/// Handle for removing a store subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type NoticeHandler = Box<dyn FnMut(&Notice)>;

/// Consumer-side mirror of the producer's component tree.
pub struct Store {
    nodes: HashMap<NodeId, Node>,
    parents: HashMap<NodeId, NodeId>,
    roots: Vec<NodeId>,
    selected: Option<NodeId>,
    selected_bottom: bool,
    hovered: Option<NodeId>,
    search_text: String,
    search_roots: Option<Vec<NodeId>>,
    subscribers: Vec<(SubscriberId, NoticeHandler)>,
    next_subscriber: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            parents: HashMap::new(),
            roots: Vec::new(),
            selected: None,
            selected_bottom: false,
            hovered: None,
            search_text: String::new(),
            search_roots: None,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions

    /// Register a change-notification handler.
    pub fn subscribe(&mut self, handler: impl FnMut(&Notice) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler; unknown ids are a no-op.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    fn notify(&mut self, notice: &Notice) {
        for (_, handler) in &mut self.subscribers {
            handler(notice);
        }
    }

    // ------------------------------------------------------------------
    // Tree events

    /// Dispatch a hydrated tree event by name.
    ///
    /// Returns `Ok(true)` when the event was a tree event, `Ok(false)` for
    /// event names the store does not own (the driver routes those
    /// elsewhere).
    ///
    /// # Errors
    /// Propagates malformed payloads and tree-shape violations.
    pub fn apply_event(&mut self, evt: &str, data: &JsonValue) -> Result<bool, StoreError> {
        match evt {
            events::MOUNT => self.mount(NodeRecord::from_event_value(data)?)?,
            events::UPDATE => self.update(NodeRecord::from_event_value(data)?)?,
            events::UNMOUNT => {
                let id: String = serde_json::from_value(data.clone())
                    .map_err(ProtocolError::MalformedRecord)?;
                self.unmount(&NodeId::new(id))?;
            },
            events::ROOT => {
                let id: String = serde_json::from_value(data.clone())
                    .map_err(ProtocolError::MalformedRecord)?;
                self.root(NodeId::new(id));
            },
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Add a newly mounted node.
    ///
    /// Children named by the record leave the root list; the node itself
    /// becomes a root unless an earlier mount already claimed it as a
    /// child.
    ///
    /// # Errors
    /// Rejects ids that are already live.
    pub fn mount(&mut self, record: NodeRecord) -> Result<(), StoreError> {
        let id = record.id.clone();
        if self.nodes.contains_key(&id) {
            warn!(%id, "duplicate mount");
            return Err(StoreError::DoubleMount { id });
        }
        let mut roots_changed = false;
        for child in record.children.ids() {
            self.parents.insert(child.clone(), id.clone());
            if let Some(pos) = self.roots.iter().position(|r| r == child) {
                self.roots.remove(pos);
                roots_changed = true;
            }
        }
        self.nodes.insert(id.clone(), Node { record, collapsed: false, renders: 0 });
        if !self.parents.contains_key(&id) {
            self.roots.push(id.clone());
            roots_changed = true;
        }
        self.refresh_search();
        self.notify(&Notice::Node(id));
        if roots_changed {
            self.notify(&Notice::Roots);
        }
        Ok(())
    }

    /// Merge an update into a live node.
    ///
    /// Snapshot fields replace shallowly when present; the children slot
    /// always replaces, and the parent index follows it.
    ///
    /// # Errors
    /// Rejects updates for nodes that are not live.
    pub fn update(&mut self, record: NodeRecord) -> Result<(), StoreError> {
        let id = record.id.clone();
        let Some(node) = self.nodes.get_mut(&id) else {
            warn!(%id, "update for unknown node");
            return Err(StoreError::UnknownNode { id, operation: "update" });
        };
        let old_children: Vec<NodeId> = node.record.children.ids().to_vec();
        merge_record(&mut node.record, record);
        node.renders += 1;
        let new_children: Vec<NodeId> = node.record.children.ids().to_vec();

        let mut roots_changed = false;
        for child in &old_children {
            if !new_children.contains(child) && self.parents.get(child) == Some(&id) {
                self.parents.remove(child);
            }
        }
        for child in &new_children {
            if !old_children.contains(child) {
                self.parents.insert(child.clone(), id.clone());
                if let Some(pos) = self.roots.iter().position(|r| r == child) {
                    self.roots.remove(pos);
                    roots_changed = true;
                }
            }
        }
        self.refresh_search();
        self.notify(&Notice::Node(id));
        if roots_changed {
            self.notify(&Notice::Roots);
        }
        Ok(())
    }

    /// Remove a node.
    ///
    /// Hover on the node clears; the selection is deliberately left in
    /// place — it renders as nothing and clears on the next interaction,
    /// which avoids selection jumps during large teardowns.
    ///
    /// # Errors
    /// Rejects ids that are not live.
    pub fn unmount(&mut self, id: &NodeId) -> Result<(), StoreError> {
        let Some(node) = self.nodes.remove(id) else {
            warn!(%id, "unmount for unknown node");
            return Err(StoreError::UnknownNode { id: id.clone(), operation: "unmount" });
        };
        self.parents.remove(id);
        let mut roots_changed = false;
        if let Some(pos) = self.roots.iter().position(|r| r == id) {
            self.roots.remove(pos);
            roots_changed = true;
        }
        for child in node.record.children.ids() {
            if self.parents.get(child) == Some(id) {
                self.parents.remove(child);
            }
        }
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
            self.notify(&Notice::Hover);
        }
        self.refresh_search();
        self.notify(&Notice::Node(id.clone()));
        if roots_changed {
            self.notify(&Notice::Roots);
        }
        Ok(())
    }

    /// Register an explicitly announced root.
    pub fn root(&mut self, id: NodeId) {
        if !self.parents.contains_key(&id) && !self.roots.contains(&id) {
            self.roots.push(id);
            self.notify(&Notice::Roots);
        }
    }

    // ------------------------------------------------------------------
    // Selection and hover

    /// Select a node (or deselect with `None`), announcing the selection
    /// and highlighting the node on the producer side.
    pub fn select(&mut self, id: Option<NodeId>, bottom: bool) -> Vec<Command> {
        self.select_with(id, bottom, true)
    }

    /// Select with explicit control over the producer-side highlight.
    ///
    /// A `bottom` request only sticks on expanded containers; anything
    /// else normalizes to the top edge.
    pub fn select_with(
        &mut self,
        id: Option<NodeId>,
        bottom: bool,
        highlight: bool,
    ) -> Vec<Command> {
        let bottom = match &id {
            Some(id) => bottom && self.has_children(id) && !self.is_collapsed(id),
            None => false,
        };
        self.selected = id.clone();
        self.selected_bottom = bottom;
        self.notify(&Notice::Selection);

        let mut commands = vec![Command::Select { id: id.clone() }];
        if highlight {
            commands.push(match id {
                Some(id) => Command::Highlight { id },
                None => Command::HideHighlight,
            });
        }
        commands
    }

    /// Change the hovered node, highlighting it on the producer side.
    pub fn hover(&mut self, id: Option<NodeId>) -> Vec<Command> {
        if self.hovered == id {
            return Vec::new();
        }
        self.hovered = id.clone();
        self.notify(&Notice::Hover);
        vec![match id {
            Some(id) => Command::Highlight { id },
            None => Command::HideHighlight,
        }]
    }

    /// Flip a node's persisted collapse flag.
    ///
    /// # Errors
    /// Rejects ids that are not live.
    pub fn toggle_collapse(&mut self, id: &NodeId) -> Result<(), StoreError> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Err(StoreError::UnknownNode { id: id.clone(), operation: "collapse" });
        };
        node.collapsed = !node.collapsed;
        let now_collapsed = node.collapsed;
        // A bottom-edge selection cannot survive its container collapsing.
        if now_collapsed && self.selected.as_ref() == Some(id) && self.selected_bottom {
            self.selected_bottom = false;
            self.notify(&Notice::Selection);
        }
        self.notify(&Notice::Node(id.clone()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation

    /// Apply an arrow key to the selection.
    ///
    /// Wrapper nodes are transparent: descent enters their children,
    /// sibling moves look through them, and parent moves skip over them.
    /// During an active search, matched nodes navigate the flat result
    /// list instead of the tree. There is no wraparound at either end.
    pub fn navigate(&mut self, direction: Direction) -> Vec<Command> {
        let Some(selected) = self.selected.clone() else {
            return self.enter_visible_list(direction);
        };
        if !self.nodes.contains_key(&selected) {
            // Stale selection after an unmount: drop it and start over.
            self.selected = None;
            self.selected_bottom = false;
            self.notify(&Notice::Selection);
            return self.enter_visible_list(direction);
        }

        let bottom = self.selected_bottom;
        let collapsed = self.is_collapsed(&selected);
        let has_children = self.has_children(&selected);
        match resolve_destination(direction, bottom, collapsed, has_children) {
            Destination::Collapse => {
                if let Some(node) = self.nodes.get_mut(&selected) {
                    node.collapsed = true;
                }
                self.notify(&Notice::Node(selected));
                Vec::new()
            },
            Destination::Uncollapse => {
                if let Some(node) = self.nodes.get_mut(&selected) {
                    node.collapsed = false;
                }
                self.notify(&Notice::Node(selected));
                Vec::new()
            },
            Destination::Top => self.select(Some(selected), false),
            Destination::Bottom => self.select(Some(selected), true),
            Destination::Stay => Vec::new(),
            dest => match self.resolve_target(&selected, dest) {
                Some((id, bottom)) => self.select(Some(id), bottom),
                None => Vec::new(),
            },
        }
    }

    /// With nothing selected, an arrow key enters the visible list at the
    /// matching end.
    fn enter_visible_list(&mut self, direction: Direction) -> Vec<Command> {
        let list: Vec<NodeId> = match &self.search_roots {
            Some(matches) => matches.clone(),
            None => self.roots.clone(),
        };
        let from_end = matches!(direction, Direction::Up | Direction::Left);
        let target = if from_end { list.last() } else { list.first() };
        match target.and_then(|id| self.first_visible(id, from_end)) {
            Some(id) => self.select(Some(id), false),
            None => Vec::new(),
        }
    }

    fn resolve_target(&self, from: &NodeId, dest: Destination) -> Option<(NodeId, bool)> {
        match dest {
            Destination::FirstChild => self.enter_child(from, false).map(|id| (id, false)),
            Destination::LastChild => {
                self.enter_child(from, true).map(|id| self.arrive_from_below(id))
            },
            Destination::NextSibling => {
                if let Some(matches) = self.search_scope(from) {
                    let pos = matches.iter().position(|m| m == from)?;
                    return matches.get(pos + 1).cloned().map(|id| (id, false));
                }
                match self.sibling_after(from) {
                    Some(id) => Some((id, false)),
                    // Past the last child: land on the enclosing bottom edge.
                    None => self.effective_parent(from).map(|p| (p, true)),
                }
            },
            Destination::PrevSibling => {
                if let Some(matches) = self.search_scope(from) {
                    let pos = matches.iter().position(|m| m == from)?;
                    return pos
                        .checked_sub(1)
                        .and_then(|prev| matches.get(prev))
                        .cloned()
                        .map(|id| (id, false));
                }
                match self.sibling_before(from) {
                    Some(id) => Some(self.arrive_from_below(id)),
                    None => self.effective_parent(from).map(|p| (p, false)),
                }
            },
            Destination::Parent => {
                if self.search_scope(from).is_some() {
                    return None;
                }
                self.effective_parent(from).map(|p| (p, false))
            },
            Destination::ParentBottom => {
                if self.search_scope(from).is_some() {
                    return None;
                }
                self.effective_parent(from).map(|p| (p, true))
            },
            _ => None,
        }
    }

    /// Arriving at a node by moving up lands on its bottom edge when it is
    /// an expanded container, so upward motion walks subtrees in reverse
    /// visual order.
    fn arrive_from_below(&self, id: NodeId) -> (NodeId, bool) {
        let bottom = self.has_children(&id) && !self.is_collapsed(&id);
        (id, bottom)
    }

    /// The flat search result list, when active and containing `id`.
    fn search_scope(&self, id: &NodeId) -> Option<&[NodeId]> {
        let matches = self.search_roots.as_deref()?;
        matches.contains(id).then_some(matches)
    }

    /// First (or last) non-wrapper node visible under `parent`.
    fn enter_child(&self, parent: &NodeId, last: bool) -> Option<NodeId> {
        let ids = self.nodes.get(parent)?.record.children.ids();
        if last {
            for child in ids.iter().rev() {
                if let Some(found) = self.first_visible(child, last) {
                    return Some(found);
                }
            }
        } else {
            for child in ids {
                if let Some(found) = self.first_visible(child, last) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn first_visible(&self, id: &NodeId, last: bool) -> Option<NodeId> {
        if self.is_wrapper(id) {
            self.enter_child(id, last)
        } else if self.nodes.contains_key(id) {
            Some(id.clone())
        } else {
            None
        }
    }

    /// Nearest non-wrapper ancestor.
    fn effective_parent(&self, id: &NodeId) -> Option<NodeId> {
        let mut cursor = self.parents.get(id)?;
        while self.is_wrapper(cursor) {
            cursor = self.parents.get(cursor)?;
        }
        Some(cursor.clone())
    }

    /// Next visible node after `id` at its level, looking through wrapper
    /// boundaries when a wrapper's children run out.
    fn sibling_after(&self, id: &NodeId) -> Option<NodeId> {
        let mut cursor = id.clone();
        loop {
            let siblings: Vec<NodeId> = match self.parents.get(&cursor) {
                Some(parent) => self.nodes.get(parent)?.record.children.ids().to_vec(),
                None => self.roots.clone(),
            };
            let pos = siblings.iter().position(|s| *s == cursor)?;
            for candidate in &siblings[pos + 1..] {
                if let Some(found) = self.first_visible(candidate, false) {
                    return Some(found);
                }
            }
            match self.parents.get(&cursor) {
                Some(parent) if self.is_wrapper(parent) => cursor = parent.clone(),
                _ => return None,
            }
        }
    }

    fn sibling_before(&self, id: &NodeId) -> Option<NodeId> {
        let mut cursor = id.clone();
        loop {
            let siblings: Vec<NodeId> = match self.parents.get(&cursor) {
                Some(parent) => self.nodes.get(parent)?.record.children.ids().to_vec(),
                None => self.roots.clone(),
            };
            let pos = siblings.iter().position(|s| *s == cursor)?;
            for candidate in siblings[..pos].iter().rev() {
                if let Some(found) = self.first_visible(candidate, true) {
                    return Some(found);
                }
            }
            match self.parents.get(&cursor) {
                Some(parent) if self.is_wrapper(parent) => cursor = parent.clone(),
                _ => return None,
            }
        }
    }

    // ------------------------------------------------------------------
    // Search

    /// Change the live search needle.
    ///
    /// A needle that extends the previous one narrows the existing result
    /// list; any other change rescans the whole tree in document order.
    /// Clearing the needle drops the results and re-expands the ancestors
    /// of the current selection so it stays visible.
    pub fn change_search(&mut self, text: &str) {
        if text.is_empty() {
            if self.search_text.is_empty() && self.search_roots.is_none() {
                return;
            }
            self.search_text.clear();
            self.search_roots = None;
            self.reveal_selection();
            self.notify(&Notice::Search);
            return;
        }
        let needle = text.to_lowercase();
        let narrowing =
            !self.search_text.is_empty() && needle.starts_with(&self.search_text.to_lowercase());
        let matches = match (&self.search_roots, narrowing) {
            (Some(previous), true) => previous
                .iter()
                .filter(|id| self.node_matches(id, &needle))
                .cloned()
                .collect(),
            _ => self.scan_matches(&needle),
        };
        self.search_text = text.to_string();
        self.search_roots = Some(matches);
        self.notify(&Notice::Search);
    }

    /// Keep the result list current across tree events. Matching is not
    /// incremental here; membership can change anywhere in the tree.
    fn refresh_search(&mut self) {
        if self.search_roots.is_none() {
            return;
        }
        let needle = self.search_text.to_lowercase();
        let matches = self.scan_matches(&needle);
        if self.search_roots.as_deref() != Some(matches.as_slice()) {
            self.search_roots = Some(matches);
            self.notify(&Notice::Search);
        }
    }

    /// Depth-first scan over all roots, in document order.
    fn scan_matches(&self, needle: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().cloned().collect();
        while let Some(id) = stack.pop() {
            if self.node_matches(&id, needle) {
                out.push(id.clone());
            }
            if let Some(node) = self.nodes.get(&id) {
                for child in node.record.children.ids().iter().rev() {
                    stack.push(child.clone());
                }
            }
        }
        out
    }

    fn node_matches(&self, id: &NodeId, needle: &str) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if let Some(name) = &node.record.name {
            if name.to_lowercase().contains(needle) {
                return true;
            }
        }
        if let Some(text) = &node.record.text {
            if text.to_lowercase().contains(needle) {
                return true;
            }
        }
        if let Children::Text(text) = &node.record.children {
            if text.to_lowercase().contains(needle) {
                return true;
            }
        }
        false
    }

    fn reveal_selection(&mut self) {
        let Some(selected) = self.selected.clone() else {
            return;
        };
        let mut changed = Vec::new();
        let mut cursor = selected;
        while let Some(parent) = self.parents.get(&cursor).cloned() {
            if let Some(node) = self.nodes.get_mut(&parent) {
                if node.collapsed {
                    node.collapsed = false;
                    changed.push(parent.clone());
                }
            }
            cursor = parent;
        }
        for id in changed {
            self.notify(&Notice::Node(id));
        }
    }

    // ------------------------------------------------------------------
    // Snapshots

    /// Build the re-inspection request for a path inside one snapshot
    /// section of a node. The producer resolves the path against its raw
    /// cached value, so the section name becomes the leading segment.
    pub fn inspect(&self, id: NodeId, section: Section, path: Path) -> Command {
        let mut full = vec![PathSeg::key(section.as_str())];
        full.extend(path);
        Command::Inspect { id, path: full }
    }

    /// Merge a re-inspection reply into the stored snapshot.
    ///
    /// `path` is relative to the section; `value` is the already-hydrated
    /// reply payload.
    ///
    /// # Errors
    /// Rejects unknown nodes and unresolvable paths.
    pub fn apply_inspection(
        &mut self,
        id: &NodeId,
        section: Section,
        path: &[PathSeg],
        value: JsonValue,
    ) -> Result<(), StoreError> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Err(StoreError::UnknownNode { id: id.clone(), operation: "inspect" });
        };
        let slot = match section {
            Section::Props => &mut node.record.props,
            Section::State => &mut node.record.state,
            Section::Context => &mut node.record.context,
        };
        let root = slot.get_or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
        merge_inspection(root, path, value, &[])?;
        self.notify(&Notice::Node(id.clone()));
        Ok(())
    }

    /// Build the write command for a path inside one snapshot section.
    /// The authoritative new snapshot arrives later as an update.
    pub fn set_value(&self, id: NodeId, section: Section, path: Path, value: JsonValue) -> Command {
        match section {
            Section::Props => Command::SetProp { id, path, value },
            Section::State => Command::SetState { id, path, value },
            Section::Context => Command::SetContext { id, path, value },
        }
    }

    // ------------------------------------------------------------------
    // Accessors

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Current roots, in mount order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Parent of a node, if indexed.
    #[must_use]
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// Current selection and whether its bottom edge is selected.
    #[must_use]
    pub fn selected(&self) -> Option<(&NodeId, bool)> {
        self.selected.as_ref().map(|id| (id, self.selected_bottom))
    }

    /// Currently hovered node.
    #[must_use]
    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Active search needle, empty when search is off.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Search results in document order, `None` when search is off.
    #[must_use]
    pub fn search_results(&self) -> Option<&[NodeId]> {
        self.search_roots.as_deref()
    }

    /// Whether search is currently forcing this node collapsed, or its own
    /// flag is set.
    #[must_use]
    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if let Some(matches) = &self.search_roots {
            if matches.contains(id) && !node.record.children.ids().is_empty() {
                return true;
            }
        }
        node.collapsed
    }

    /// Whether a node has structural children.
    #[must_use]
    pub fn has_children(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| !n.record.children.ids().is_empty())
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn is_wrapper(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.record.node_type == NodeType::Wrapper)
    }
}

/// Shallow field-wise merge of an update into the live record. Snapshot
/// fields replace only when present; the children slot always replaces.
fn merge_record(existing: &mut NodeRecord, incoming: NodeRecord) {
    existing.node_type = incoming.node_type;
    if incoming.name.is_some() {
        existing.name = incoming.name;
    }
    if incoming.props.is_some() {
        existing.props = incoming.props;
    }
    if incoming.state.is_some() {
        existing.state = incoming.state;
    }
    if incoming.context.is_some() {
        existing.context = incoming.context;
    }
    existing.children = incoming.children;
    if incoming.text.is_some() {
        existing.text = incoming.text;
    }
}
