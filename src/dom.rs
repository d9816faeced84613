use super::html::{is_void_tag, parse_fragment};
use super::*;

mod attrs_classes_style;
mod connectivity_traversal;
mod core_nodes_identity;
mod dump;
mod form_controls;
mod tree_mutation;

pub(crate) use form_controls::{is_date_input, is_dropdown_select, normalize_date_input_value};

/// One structural or attribute change, as delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attributes {
        target: NodeId,
        name: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. } | Self::Attributes { target, .. } => *target,
        }
    }
}

/// A batched subtree change feed.
///
/// Records accumulate while observation is on and are handed out in one batch
/// per `take_records` call, oldest first.
pub trait ChangeFeed {
    fn observe(&mut self);
    fn disconnect(&mut self);
    fn take_records(&mut self) -> Vec<MutationRecord>;
}

impl ChangeFeed for Dom {
    fn observe(&mut self) {
        self.observing = true;
    }

    fn disconnect(&mut self) {
        self.observing = false;
        self.mutation_queue.clear();
    }

    fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutation_queue)
    }
}

impl Dom {
    pub(crate) fn record_mutation(&mut self, record: MutationRecord) {
        if self.observing {
            self.mutation_queue.push(record);
        }
    }
}
