//! Model-based property tests.
//!
//! Random operation sequences drive the full pipeline (producer bridge,
//! wall, consumer bridge, store) and the naive [`TreeModel`] oracle; the
//! mirrored store must agree with the oracle on every structural fact.

#![allow(clippy::unwrap_used)]

use periscope_harness::{TreeModel, World};
use periscope_proto::node::{Children, NodeId, NodeRecord, NodeType};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["Alpha", "AlphaList", "Alphabet", "Beta", "Button", "Label"];

#[derive(Debug, Clone)]
enum Op {
    Mount { slot: u8, parent: Option<u8>, name: u8 },
    Unmount { slot: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..10, prop::option::of(0u8..10), 0u8..6)
            .prop_map(|(slot, parent, name)| Op::Mount { slot, parent, name }),
        1 => (0u8..10).prop_map(|slot| Op::Unmount { slot }),
    ]
}

fn slot_id(slot: u8) -> String {
    format!("n{slot}")
}

fn record_for(model: &TreeModel, id: &str) -> NodeRecord {
    let children = model.children_of(id);
    let children = if children.is_empty() {
        Children::None
    } else {
        Children::Ids(children.iter().map(|c| NodeId::new(c.clone())).collect())
    };
    NodeRecord {
        name: model.name_of(id).map(str::to_string),
        children,
        ..NodeRecord::new(id, NodeType::Composite)
    }
}

/// Apply one abstract operation to both worlds. Invalid operations
/// (duplicate ids, dead targets) are skipped in both, so the two sides
/// always see the same effective sequence.
fn apply(world: &mut World, model: &mut TreeModel, op: &Op) {
    match op {
        Op::Mount { slot, parent, name } => {
            let id = slot_id(*slot);
            let parent = parent.map(slot_id).filter(|p| model.contains(p) && *p != id);
            if !model.mount(&id, NAMES[usize::from(*name)], parent.as_deref()) {
                return;
            }
            world.mount(&record_for(model, &id));
            if let Some(parent) = parent {
                world.update(&record_for(model, &parent));
            }
        },
        Op::Unmount { slot } => {
            let id = slot_id(*slot);
            let parent = model.parent_of(&id).map(str::to_string);
            let removed = model.unmount(&id);
            if removed.is_empty() {
                return;
            }
            for node in &removed {
                world.unmount(&NodeId::new(node.clone()));
            }
            if let Some(parent) = parent {
                if model.contains(&parent) {
                    world.update(&record_for(model, &parent));
                }
            }
        },
    }
}

fn build(ops: &[Op]) -> (World, TreeModel) {
    let mut world = World::new();
    let mut model = TreeModel::new();
    for op in ops {
        apply(&mut world, &mut model, op);
    }
    world.settle().unwrap();
    (world, model)
}

fn ids(nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|n| n.as_str().to_string()).collect()
}

proptest! {
    /// The mirrored tree agrees with the oracle on liveness, roots,
    /// children, names, and the parent index.
    #[test]
    fn prop_mirror_agrees_with_the_reference(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let (world, model) = build(&ops);

        prop_assert!(world.errors().is_empty());
        let store = world.store();
        prop_assert_eq!(store.len(), model.len());
        prop_assert_eq!(ids(store.roots()), model.roots().to_vec());

        for id in model.document_order() {
            let node_id = NodeId::new(id.clone());
            let node = store.node(&node_id);
            prop_assert!(node.is_some(), "store is missing {}", id);
            let node = node.unwrap();
            prop_assert_eq!(ids(node.record.children.ids()), model.children_of(&id).to_vec());
            prop_assert_eq!(node.record.name.as_deref(), model.name_of(&id));
            let parent = store.parent_of(&node_id).map(|p| p.as_str().to_string());
            prop_assert_eq!(parent, model.parent_of(&id).map(str::to_string));
        }
    }

    /// Typing one character at a time (the incremental narrowing path)
    /// ends in the same result list as a fresh scan for the full needle.
    #[test]
    fn prop_incremental_search_matches_a_fresh_scan(
        ops in prop::collection::vec(op_strategy(), 1..16),
        needle in "[a-l]{1,4}",
    ) {
        let (world, model) = build(&ops);

        for end in 1..=needle.len() {
            world.store_mut().change_search(&needle[..end]);
        }
        let results = world.store().search_results().map(ids);

        prop_assert_eq!(results, Some(model.search(&needle)));
    }
}
