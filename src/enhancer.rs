//! Discovery and lifecycle: finds eligible native controls, wraps them,
//! follows the document as it changes, and tears widgets down when their
//! native element leaves.

use chrono::NaiveDate;

use super::coordinator::OpenStateCoordinator;
use super::page::{Host, Key};
use super::sync_bridge;
use super::widget::{ENHANCED_MARKER, PopupAction, Widget, WidgetState};
use super::*;

/// Owns every widget on a page plus the open-state slot.
///
/// Widgets are keyed by the native element's [`NodeId`]. Ids are never
/// reused, and entries are dropped as soon as the native element is found
/// disconnected, so the registry cannot keep a removed control alive.
#[derive(Debug)]
pub struct Enhancer {
    config: EnhancerConfig,
    registry: HashMap<NodeId, Widget>,
    /// Wrapper, trigger and popup of every widget, mapped to its native id.
    parts: HashMap<NodeId, NodeId>,
    coordinator: OpenStateCoordinator,
    /// Set while the enhancer itself is writing to the document.
    processing: bool,
}

impl Enhancer {
    pub fn new(config: EnhancerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: HashMap::new(),
            parts: HashMap::new(),
            coordinator: OpenStateCoordinator::default(),
            processing: false,
        })
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn widget_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_enhanced(&self, native: NodeId) -> bool {
        self.registry.contains_key(&native)
    }

    pub fn kind_of(&self, native: NodeId) -> Option<PickerKind> {
        self.registry.get(&native).map(Widget::kind)
    }

    /// Native element of the widget whose popup is open, if any.
    pub fn open_widget(&self) -> Option<NodeId> {
        self.coordinator.current()
    }

    pub(crate) fn widget(&self, native: NodeId) -> Option<&Widget> {
        self.registry.get(&native)
    }

    /// Runs `task` as one enhancer task: mutation records produced by its own
    /// writes are discarded when the outermost task ends.
    fn with_self_writes<R>(
        &mut self,
        host: &mut Host,
        task: impl FnOnce(&mut Self, &mut Host) -> Result<R>,
    ) -> Result<R> {
        let nested = std::mem::replace(&mut self.processing, true);
        let result = task(self, host);
        if !nested {
            self.processing = false;
            let discarded = host.dom.take_records();
            if !discarded.is_empty() {
                tracing::trace!(count = discarded.len(), "discarded self-generated records");
            }
        }
        result
    }

    /// Enhances every eligible control at or below `root` and refreshes the
    /// ones already enhanced. Returns the natives that got a new widget.
    pub(crate) fn scan(&mut self, host: &mut Host, root: NodeId) -> Result<Vec<NodeId>> {
        self.with_self_writes(host, |this, host| this.scan_subtree(host, root))
    }

    fn scan_subtree(&mut self, host: &mut Host, root: NodeId) -> Result<Vec<NodeId>> {
        if root == host.dom.root() {
            self.sweep_disconnected(host);
        }

        let candidates = host
            .dom
            .inclusive_elements(root)
            .into_iter()
            .filter(|node| self.is_eligible(&host.dom, *node))
            .collect::<Vec<_>>();

        let mut created = Vec::new();
        for native in &candidates {
            if self.enhance(host, *native)? {
                created.push(*native);
            }
        }
        tracing::debug!(
            root = root.index(),
            found = candidates.len(),
            created = created.len(),
            "scan finished"
        );
        Ok(created)
    }

    fn is_eligible(&self, dom: &Dom, node: NodeId) -> bool {
        PickerKind::of(dom, node).is_some()
            && !dom.has_attr(node, &self.config.opt_out_attribute)
            && !dom.class_contains(node, &self.config.opt_out_class)
            && dom.is_connected(node)
            && self.foreign_owner(dom, node).is_none()
    }

    /// Another widget that `node` sits inside of, if any. A native element
    /// inside its own wrapper does not count.
    fn foreign_owner(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        let mut cursor = dom.parent(node);
        while let Some(current) = cursor {
            if let Some(owner) = self.parts.get(&current) {
                if *owner != node {
                    return Some(*owner);
                }
            }
            cursor = dom.parent(current);
        }
        None
    }

    /// Native element owning the synthetic part that contains `node`.
    fn owner_of(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(owner) = self.parts.get(&current) {
                return Some(*owner);
            }
            cursor = dom.parent(current);
        }
        None
    }

    fn in_portal(&self, dom: &Dom, native: NodeId) -> Result<bool> {
        for selector in &self.config.portal_selectors {
            if dom.closest(native, selector)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Creates the widget for `native`, or refreshes the existing one.
    /// Returns `true` only when a widget was created.
    pub(crate) fn enhance(&mut self, host: &mut Host, native: NodeId) -> Result<bool> {
        if let Some(widget) = self.registry.get_mut(&native) {
            widget.rebuild(host, &self.config)?;
            return Ok(false);
        }
        let Some(kind) = PickerKind::of(&host.dom, native) else {
            return Ok(false);
        };
        if host.dom.has_attr(native, ENHANCED_MARKER) {
            tracing::trace!(native = native.index(), "stale marker without a widget");
        }

        let use_portal = self.in_portal(&host.dom, native)?;
        let widget = Widget::create(host, native, kind, use_portal, &self.config)?;
        host.dom.set_attr(native, ENHANCED_MARKER, kind.as_str())?;
        for part in widget.parts() {
            self.parts.insert(part, native);
        }
        self.registry.insert(native, widget);
        tracing::debug!(
            native = native.index(),
            kind = kind.as_str(),
            portal = use_portal,
            "enhanced"
        );
        Ok(true)
    }

    /// Tears the widget of `native` down. Unknown ids are ignored.
    pub(crate) fn destroy(&mut self, host: &mut Host, native: NodeId) -> bool {
        if self.coordinator.is_open(native) {
            self.coordinator
                .close_open(host, &mut self.registry, &self.config);
        }
        let Some(widget) = self.registry.remove(&native) else {
            return false;
        };
        for part in widget.parts() {
            self.parts.remove(&part);
        }
        widget.teardown(host);
        tracing::debug!(native = native.index(), "destroyed");
        true
    }

    fn destroy_within(&mut self, host: &mut Host, removed: NodeId) {
        let mut doomed = self
            .registry
            .keys()
            .copied()
            .filter(|native| {
                host.dom.is_inclusive_descendant_of(*native, removed)
                    && !host.dom.is_connected(*native)
            })
            .collect::<Vec<_>>();
        doomed.sort();
        for native in doomed {
            self.destroy(host, native);
        }
    }

    fn sweep_disconnected(&mut self, host: &mut Host) {
        let mut stale = self
            .registry
            .keys()
            .copied()
            .filter(|native| !host.dom.is_connected(*native))
            .collect::<Vec<_>>();
        stale.sort();
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "sweeping disconnected widgets");
        }
        for native in stale {
            self.destroy(host, native);
        }
    }

    fn is_synthetic_root(&self, node: NodeId) -> bool {
        self.registry
            .values()
            .any(|widget| widget.wrapper == node || widget.popup == node)
    }

    /// The enhanced select that is `node` or contains it.
    fn enhanced_select_at(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.kind_of(current) == Some(PickerKind::Select) {
                return Some(current);
            }
            cursor = dom.parent(current);
        }
        None
    }

    /// Reacts to one batch of document changes.
    pub(crate) fn process_mutations(
        &mut self,
        host: &mut Host,
        records: Vec<MutationRecord>,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        if self.processing {
            tracing::trace!(count = records.len(), "batch arrived during own writes");
            return Ok(());
        }
        tracing::debug!(records = records.len(), "processing mutation batch");

        self.with_self_writes(host, |this, host| {
            let mut rebuild = Vec::new();
            let mut resync = Vec::new();

            for record in &records {
                match record {
                    MutationRecord::ChildList {
                        target,
                        added,
                        removed,
                    } => {
                        for node in removed {
                            if host.dom.is_connected(*node) {
                                tracing::trace!(node = node.index(), "removed node is connected again");
                                continue;
                            }
                            this.destroy_within(host, *node);
                        }
                        for node in added {
                            if this.is_synthetic_root(*node) || !host.dom.is_connected(*node) {
                                continue;
                            }
                            this.scan_subtree(host, *node)?;
                        }
                        if let Some(select) = this.enhanced_select_at(&host.dom, *target) {
                            push_unique(&mut rebuild, select);
                        }
                    }
                    MutationRecord::Attributes { target, name } => {
                        if let Some(select) = this.enhanced_select_at(&host.dom, *target) {
                            tracing::trace!(select = select.index(), attr = %name, "option set touched");
                            push_unique(&mut rebuild, select);
                        } else if this.kind_of(*target) == Some(PickerKind::Date) {
                            push_unique(&mut resync, *target);
                        }
                    }
                }
            }

            for native in rebuild.into_iter().chain(resync) {
                if let Some(widget) = this.registry.get_mut(&native) {
                    widget.rebuild(host, &this.config)?;
                }
            }
            Ok(())
        })
    }

    pub(crate) fn open(&mut self, host: &mut Host, native: NodeId) -> Result<bool> {
        self.with_self_writes(host, |this, host| {
            this.coordinator
                .open(host, &mut this.registry, native, &this.config)
        })
    }

    pub(crate) fn close(&mut self, host: &mut Host) -> Result<Option<NodeId>> {
        self.with_self_writes(host, |this, host| {
            Ok(this
                .coordinator
                .close_open(host, &mut this.registry, &this.config))
        })
    }

    /// Pointer-down anywhere outside the open widget closes it.
    pub(crate) fn handle_pointer_down(&mut self, host: &mut Host, target: NodeId) -> Result<()> {
        let Some(open) = self.coordinator.current() else {
            return Ok(());
        };
        let inside = self
            .registry
            .get(&open)
            .is_some_and(|widget| widget.contains(&host.dom, target));
        if inside {
            return Ok(());
        }
        self.close(host).map(|_| ())
    }

    pub(crate) fn handle_click(&mut self, host: &mut Host, target: NodeId) -> Result<()> {
        self.with_self_writes(host, |this, host| {
            let Some(native) = this.owner_of(&host.dom, target) else {
                return Ok(());
            };
            let Some(widget) = this.registry.get(&native) else {
                return Ok(());
            };
            if host.dom.is_inclusive_descendant_of(target, widget.trigger) {
                this.coordinator
                    .toggle(host, &mut this.registry, native, &this.config)?;
                return Ok(());
            }
            let action = widget.popup_action(&host.dom, target)?;
            if let Some(action) = action {
                this.apply_action(host, native, action)?;
            }
            Ok(())
        })
    }

    pub(crate) fn handle_key(&mut self, host: &mut Host, target: NodeId, key: Key) -> Result<()> {
        self.with_self_writes(host, |this, host| {
            if key == Key::Escape {
                if let Some(native) =
                    this.coordinator
                        .close_open(host, &mut this.registry, &this.config)
                {
                    this.focus_trigger(host, native);
                }
                return Ok(());
            }

            let Some(native) = this.owner_of(&host.dom, target) else {
                return Ok(());
            };
            let Some(widget) = this.registry.get(&native) else {
                return Ok(());
            };
            let on_trigger = host.dom.is_inclusive_descendant_of(target, widget.trigger);
            let kind = widget.kind();

            match key {
                Key::Tab => {
                    if this.coordinator.is_open(native) {
                        this.coordinator
                            .close_open(host, &mut this.registry, &this.config);
                    }
                }
                Key::Enter | Key::Space if on_trigger => {
                    this.coordinator
                        .toggle(host, &mut this.registry, native, &this.config)?;
                }
                Key::Enter | Key::Space => {
                    let action = widget.popup_action(&host.dom, target)?;
                    if let Some(action) = action {
                        this.apply_action(host, native, action)?;
                    }
                }
                Key::ArrowDown | Key::ArrowUp if kind == PickerKind::Select => {
                    this.move_option_focus(host, native, key == Key::ArrowDown)?;
                }
                _ => {}
            }
            Ok(())
        })
    }

    fn move_option_focus(&mut self, host: &mut Host, native: NodeId, forward: bool) -> Result<()> {
        let was_open = self.coordinator.is_open(native);
        if !was_open
            && !self
                .coordinator
                .open(host, &mut self.registry, native, &self.config)?
        {
            return Ok(());
        }
        let Some(Widget {
            state: WidgetState::Select(state),
            ..
        }) = self.registry.get(&native)
        else {
            return Ok(());
        };

        let next = if was_open {
            let current = host
                .dom
                .active_element()
                .and_then(|node| state.row_index(node));
            state.step_focus(&host.dom, current, forward)
        } else {
            state.initial_focus(&host.dom, native)
        };
        if let Some(row) = next.and_then(|index| state.row(index)) {
            host.dom.set_active_element(Some(row));
        }
        Ok(())
    }

    fn apply_action(&mut self, host: &mut Host, native: NodeId, action: PopupAction) -> Result<()> {
        tracing::trace!(native = native.index(), ?action, "popup action");
        match action {
            PopupAction::ShiftMonth(delta) => {
                if let Some(widget) = self.registry.get_mut(&native) {
                    widget.shift_month(host, delta, &self.config)?;
                }
                Ok(())
            }
            PopupAction::PickDate(date) => self.commit_date(host, native, Some(date)),
            PopupAction::Clear => self.commit_date(host, native, None),
            PopupAction::Today => {
                let today = host.today;
                let allowed = matches!(
                    self.registry.get(&native).map(|widget| &widget.state),
                    Some(WidgetState::Date(state)) if state.allows(today)
                );
                if !allowed {
                    tracing::trace!(native = native.index(), "today is out of bounds");
                    return Ok(());
                }
                self.commit_date(host, native, Some(today))
            }
            PopupAction::PickOption(index) => {
                sync_bridge::select_index(host, native, index)?;
                self.finish_pick(host, native)
            }
        }
    }

    fn commit_date(&mut self, host: &mut Host, native: NodeId, date: Option<NaiveDate>) -> Result<()> {
        sync_bridge::write_date(host, native, date)?;
        self.finish_pick(host, native)
    }

    /// Re-reads the native control, closes the popup and returns focus to the
    /// trigger.
    fn finish_pick(&mut self, host: &mut Host, native: NodeId) -> Result<()> {
        if let Some(widget) = self.registry.get_mut(&native) {
            widget.sync(host, &self.config)?;
        }
        self.coordinator
            .close_open(host, &mut self.registry, &self.config);
        self.focus_trigger(host, native);
        Ok(())
    }

    fn focus_trigger(&self, host: &mut Host, native: NodeId) {
        if let Some(widget) = self.registry.get(&native) {
            host.dom.set_active_element(Some(widget.trigger));
        }
    }

    pub(crate) fn handle_resize(&mut self, host: &mut Host) -> Result<()> {
        let Some(native) = self.coordinator.current() else {
            return Ok(());
        };
        match self.kind_of(native) {
            Some(PickerKind::Date) => self.close(host).map(|_| ()),
            Some(PickerKind::Select) => self.reposition(host, native),
            None => Ok(()),
        }
    }

    pub(crate) fn handle_scroll(&mut self, host: &mut Host) -> Result<()> {
        let Some(native) = self.coordinator.current() else {
            return Ok(());
        };
        if self.registry.get(&native).is_some_and(|widget| widget.use_portal) {
            self.reposition(host, native)?;
        }
        Ok(())
    }

    /// First frame after opening: place the popup again with its measured
    /// size.
    pub(crate) fn handle_frame(&mut self, host: &mut Host, native: NodeId) -> Result<()> {
        if !self.coordinator.is_open(native) {
            return Ok(());
        }
        self.reposition(host, native)
    }

    fn reposition(&mut self, host: &mut Host, native: NodeId) -> Result<()> {
        self.with_self_writes(host, |this, host| {
            if let Some(widget) = this.registry.get(&native) {
                widget.position(host, &this.config, true)?;
            }
            Ok(())
        })
    }

    /// A `change` fired on a native control from outside the widget.
    pub(crate) fn handle_native_change(&mut self, host: &mut Host, native: NodeId) -> Result<()> {
        self.with_self_writes(host, |this, host| {
            if let Some(widget) = this.registry.get_mut(&native) {
                widget.sync(host, &this.config)?;
            }
            Ok(())
        })
    }
}

fn push_unique(list: &mut Vec<NodeId>, node: NodeId) {
    if !list.contains(&node) {
        list.push(node);
    }
}
