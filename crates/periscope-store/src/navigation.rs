//! Keyboard navigation resolution.
//!
//! Split in two layers. [`resolve_destination`] is a total pure function
//! from the selection's local situation (edge, collapse, children) to an
//! abstract destination; the store then grounds that destination in the
//! actual tree (sibling lookup, wrapper skipping, search scoping). Keeping
//! the first layer pure makes the whole arrow-key truth table testable
//! without building trees.

/// An arrow-key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Down arrow: next visible row.
    Down,
    /// Up arrow: previous visible row.
    Up,
    /// Left arrow: collapse or retreat to the parent.
    Left,
    /// Right arrow: expand or advance into the subtree.
    Right,
}

/// Abstract movement target, before tree lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// First structural child of the selection.
    FirstChild,
    /// Last structural child of the selection.
    LastChild,
    /// Next sibling; falls back to the parent's bottom edge.
    NextSibling,
    /// Previous sibling; falls back to the parent's top edge.
    PrevSibling,
    /// The parent, top edge.
    Parent,
    /// The parent, bottom edge.
    ParentBottom,
    /// This node's own top edge.
    Top,
    /// This node's own bottom edge.
    Bottom,
    /// Collapse the selection in place.
    Collapse,
    /// Expand the selection in place.
    Uncollapse,
    /// No movement.
    Stay,
}

/// Resolve an arrow key against the selection's local situation.
///
/// `bottom` is whether the closing edge of an expanded container is
/// selected; `collapsed` is the effective collapse state (forced collapse
/// during search included); `has_children` means structural children.
pub fn resolve_destination(
    direction: Direction,
    bottom: bool,
    collapsed: bool,
    has_children: bool,
) -> Destination {
    match direction {
        Direction::Down => {
            if bottom || collapsed || !has_children {
                Destination::NextSibling
            } else {
                Destination::FirstChild
            }
        },
        Direction::Up => {
            if !bottom || collapsed || !has_children {
                Destination::PrevSibling
            } else {
                Destination::LastChild
            }
        },
        Direction::Left => {
            if !collapsed && has_children {
                if bottom { Destination::Top } else { Destination::Collapse }
            } else {
                Destination::Parent
            }
        },
        Direction::Right => {
            if !has_children {
                // Leaves have nothing to the right.
                Destination::Stay
            } else if collapsed {
                Destination::Uncollapse
            } else if bottom {
                Destination::NextSibling
            } else {
                Destination::FirstChild
            }
        },
    }
}
