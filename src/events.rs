use std::fmt;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeEventKind {
    Input,
    Change,
}

impl NativeEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "input" => Some(Self::Input),
            "change" => Some(Self::Change),
            _ => None,
        }
    }
}

impl fmt::Display for NativeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification fired on a native control. `value` is the control's value
/// at dispatch time, so listeners always see the freshly written value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEvent {
    pub target: NodeId,
    pub kind: NativeEventKind,
    pub value: String,
}

type Listener = Box<dyn FnMut(&NativeEvent)>;

#[derive(Default)]
pub(crate) struct ListenerStore {
    listeners: Vec<(NodeId, NativeEventKind, Listener)>,
    log: Vec<NativeEvent>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, target: NodeId, kind: NativeEventKind, listener: Listener) {
        self.listeners.push((target, kind, listener));
    }

    pub(crate) fn dispatch(&mut self, event: NativeEvent) {
        tracing::trace!(target_node = event.target.index(), kind = %event.kind, "dispatch");
        for (target, kind, listener) in &mut self.listeners {
            if *target == event.target && *kind == event.kind {
                listener(&event);
            }
        }
        self.log.push(event);
    }

    pub(crate) fn log(&self) -> &[NativeEvent] {
        &self.log
    }

    pub(crate) fn take_log(&mut self) -> Vec<NativeEvent> {
        std::mem::take(&mut self.log)
    }
}

impl fmt::Debug for ListenerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerStore")
            .field("listeners", &self.listeners.len())
            .field("log", &self.log)
            .finish()
    }
}
