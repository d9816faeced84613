//! Custom date and select pickers layered over native form controls.
//!
//! The native `<input type="date">` / `<select>` element stays the single
//! source of truth. Each eligible element is wrapped in a synthetic widget
//! (trigger button plus popup) that reads from and writes back to it, and a
//! discovery manager keeps widgets in step with the document as nodes are
//! inserted or removed.
//!
//! Everything runs against a deterministic in-memory page ([`Page`]) so the
//! behaviour can be driven and asserted from plain Rust tests.

use std::collections::{HashMap, HashSet};

mod calendar;
mod config;
mod coordinator;
mod dom;
mod dom_utils;
mod enhancer;
mod events;
mod geometry;
mod html;
mod layout;
mod page;
mod selector;
mod sync_bridge;
mod widget;

pub use calendar::{
    DayCell, format_iso_date, month_grid, month_title, parse_iso_date, trigger_label,
    weekday_labels,
};
pub use config::{EnhancerConfig, PositioningConfig};
pub use dom::{ChangeFeed, MutationRecord};
pub use enhancer::Enhancer;
pub use events::{NativeEvent, NativeEventKind};
pub use geometry::{
    Direction, Placement, PlacementRules, PortalPosition, Rect, Size, Viewport, compute_placement,
};
pub use layout::Layout;
pub use page::{Key, Page};
pub use widget::PickerKind;

use dom::{is_date_input, is_dropdown_select};
use dom_utils::*;
use selector::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    #[error("invalid config: {0}")]
    Config(String),
}

/// Stable identity of a node in a [`Page`].
///
/// Ids are arena indexes and are never reused, so an id keeps naming the same
/// node even after that node is detached from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
    value: String,
    disabled: bool,
    readonly: bool,
}

#[derive(Debug, Clone)]
struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, Vec<NodeId>>,
    active_element: Option<NodeId>,
    observing: bool,
    mutation_queue: Vec<MutationRecord>,
}

#[cfg(test)]
mod tests;
