//! The synthetic widget: wrapper, trigger and popup around one native
//! control.

use chrono::NaiveDate;

use super::page::Host;
use super::*;

mod date_picker;
mod select_picker;

pub(crate) use date_picker::DateState;
pub(crate) use select_picker::SelectState;

pub(crate) const ENHANCED_MARKER: &str = "data-fe-enhanced";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerKind {
    Date,
    Select,
}

impl PickerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Select => "select",
        }
    }

    pub(crate) fn of(dom: &Dom, node: NodeId) -> Option<Self> {
        if is_date_input(dom, node) {
            Some(Self::Date)
        } else if is_dropdown_select(dom, node) {
            Some(Self::Select)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum WidgetState {
    Date(DateState),
    Select(SelectState),
}

#[derive(Debug, Clone)]
pub(crate) struct Widget {
    pub(crate) native: NodeId,
    pub(crate) wrapper: NodeId,
    pub(crate) trigger: NodeId,
    pub(crate) popup: NodeId,
    pub(crate) use_portal: bool,
    pub(crate) state: WidgetState,
}

/// What a click inside a popup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PopupAction {
    ShiftMonth(i32),
    PickDate(NaiveDate),
    Today,
    Clear,
    PickOption(usize),
}

impl Widget {
    /// Builds the wrapper in place of `native`, moves `native` into it and
    /// renders the trigger and popup.
    pub(crate) fn create(
        host: &mut Host,
        native: NodeId,
        kind: PickerKind,
        use_portal: bool,
        config: &EnhancerConfig,
    ) -> Result<Self> {
        let parent = host
            .dom
            .parent(native)
            .ok_or_else(|| Error::Dom("cannot enhance a detached control".into()))?;

        let wrapper = host.dom.create_detached_element("div");
        host.dom.set_attr(wrapper, "class", &format!("fe-{}", kind.as_str()))?;
        host.dom.set_attr(wrapper, "data-fe-wrapper", kind.as_str())?;
        host.dom.insert_before(parent, wrapper, native)?;
        host.dom.append_child(wrapper, native)?;
        host.dom.class_add(native, "fe-native")?;

        let trigger = append_part(&mut host.dom, wrapper, "button", "fe-trigger", None)?;
        host.dom.set_attr(trigger, "type", "button")?;
        host.dom.set_attr(trigger, "aria-expanded", "false")?;
        let popup_role = match kind {
            PickerKind::Date => "dialog",
            PickerKind::Select => "listbox",
        };
        host.dom.set_attr(trigger, "aria-haspopup", popup_role)?;

        let popup = host.dom.create_detached_element("div");
        host.dom.set_attr(
            popup,
            "class",
            &format!("fe-popup fe-{}-popup", kind.as_str()),
        )?;
        host.dom.set_attr(popup, "data-fe-popup", kind.as_str())?;
        host.dom.set_attr(popup, "role", popup_role)?;
        host.dom.set_bool_attr(popup, "hidden", true)?;
        if use_portal {
            host.dom.class_add(popup, "fe-portal")?;
            host.dom.style_set(popup, "position", "fixed")?;
            let body = host.dom.ensure_body();
            host.dom.append_child(body, popup)?;
        } else {
            host.dom.append_child(wrapper, popup)?;
        }

        let state = match kind {
            PickerKind::Date => WidgetState::Date(DateState::build(host, native, popup, config)?),
            PickerKind::Select => WidgetState::Select(SelectState::build(host, native, popup)?),
        };

        let mut widget = Self {
            native,
            wrapper,
            trigger,
            popup,
            use_portal,
            state,
        };
        widget.sync(host, config)?;
        Ok(widget)
    }

    pub(crate) fn kind(&self) -> PickerKind {
        match self.state {
            WidgetState::Date(_) => PickerKind::Date,
            WidgetState::Select(_) => PickerKind::Select,
        }
    }

    pub(crate) fn parts(&self) -> [NodeId; 3] {
        [self.wrapper, self.trigger, self.popup]
    }

    pub(crate) fn is_interactive(&self, dom: &Dom) -> bool {
        !dom.disabled(self.native) && !dom.readonly(self.native)
    }

    /// Whether `node` belongs to the trigger or the popup.
    pub(crate) fn contains(&self, dom: &Dom, node: NodeId) -> bool {
        dom.is_inclusive_descendant_of(node, self.trigger)
            || dom.is_inclusive_descendant_of(node, self.popup)
    }

    /// Re-reads the native control: trigger label, disabled state and the
    /// selection marks inside the popup.
    pub(crate) fn sync(&mut self, host: &mut Host, config: &EnhancerConfig) -> Result<()> {
        let label = match &mut self.state {
            WidgetState::Date(state) => state.sync(host, self.native, config)?,
            WidgetState::Select(state) => state.sync(host, self.native)?,
        };
        host.dom.set_text_content(self.trigger, &label)?;
        let placeholder = label.is_empty() || self.shows_placeholder(host);
        host.dom
            .class_toggle_to(self.trigger, "is-placeholder", placeholder)?;

        let disabled = host.dom.disabled(self.native);
        let readonly = host.dom.readonly(self.native);
        host.dom.set_bool_attr(self.trigger, "disabled", disabled)?;
        if disabled {
            host.dom.set_attr(self.trigger, "aria-disabled", "true")?;
        } else {
            host.dom.remove_attr(self.trigger, "aria-disabled")?;
        }
        if readonly {
            host.dom.set_attr(self.trigger, "aria-readonly", "true")?;
        } else {
            host.dom.remove_attr(self.trigger, "aria-readonly")?;
        }
        host.dom.class_toggle_to(self.wrapper, "is-disabled", disabled)?;
        Ok(())
    }

    fn shows_placeholder(&self, host: &Host) -> bool {
        matches!(self.state, WidgetState::Date(_))
            && host
                .dom
                .value(self.native)
                .map(|value| value.is_empty())
                .unwrap_or(true)
    }

    /// Re-renders structure that depends on the native children, then syncs.
    pub(crate) fn rebuild(&mut self, host: &mut Host, config: &EnhancerConfig) -> Result<()> {
        if let WidgetState::Select(state) = &mut self.state {
            state.rebuild_rows(host, self.native, self.popup)?;
        }
        self.sync(host, config)
    }

    /// Applies or clears the open visuals. Slot bookkeeping belongs to the
    /// coordinator.
    pub(crate) fn set_open(
        &mut self,
        host: &mut Host,
        open: bool,
        config: &EnhancerConfig,
    ) -> Result<()> {
        host.dom
            .set_attr(self.trigger, "aria-expanded", if open { "true" } else { "false" })?;
        host.dom.class_toggle_to(self.wrapper, "is-open", open)?;
        host.dom.class_toggle_to(self.popup, "is-open", open)?;
        host.dom.set_bool_attr(self.popup, "hidden", !open)?;
        if !open {
            host.dom.class_remove(self.wrapper, "fe-open-up")?;
            host.dom.class_remove(self.popup, "fe-open-up")?;
            return Ok(());
        }

        match &mut self.state {
            WidgetState::Date(state) => state.reset_view(host, self.native, config)?,
            WidgetState::Select(state) => state.sync_marks(host, self.native)?,
        }
        Ok(())
    }

    pub(crate) fn shift_month(
        &mut self,
        host: &mut Host,
        delta: i32,
        config: &EnhancerConfig,
    ) -> Result<()> {
        if let WidgetState::Date(state) = &mut self.state {
            state.shift_view(host, self.native, delta, config)?;
        }
        Ok(())
    }

    pub(crate) fn popup_action(&self, dom: &Dom, target: NodeId) -> Result<Option<PopupAction>> {
        if !dom.is_inclusive_descendant_of(target, self.popup) {
            return Ok(None);
        }
        match &self.state {
            WidgetState::Date(state) => state.action_for(dom, self.popup, target),
            WidgetState::Select(state) => Ok(state.action_for(dom, target)),
        }
    }

    /// Places the popup next to the trigger. `measured` uses the popup's laid
    /// out size when the host has one; otherwise the size is estimated.
    pub(crate) fn position(
        &self,
        host: &mut Host,
        config: &EnhancerConfig,
        measured: bool,
    ) -> Result<Placement> {
        let rules = &config.positioning;
        let trigger = host
            .layout
            .first_rect(&[self.trigger, self.native, self.wrapper])
            .unwrap_or_else(|| Rect::new(0.0, 0.0, rules.min_width, 32.0));

        let measured_size = if measured {
            host.layout.measured_size(self.popup)
        } else {
            None
        };
        let popup = measured_size.unwrap_or_else(|| self.estimated_size(&host.dom, trigger, config));
        let preferred_width = match self.kind() {
            PickerKind::Date => rules.date_width,
            PickerKind::Select => trigger.width,
        };

        let placement = compute_placement(
            trigger,
            host.layout.viewport(),
            popup,
            PlacementRules {
                margin: rules.margin,
                gap: rules.gap,
                min_width: rules.min_width,
                preferred_width,
            },
            self.use_portal,
        );

        let up = placement.direction == Direction::Up;
        host.dom.class_toggle_to(self.wrapper, "fe-open-up", up)?;
        if let Some(portal) = placement.portal {
            host.dom.class_toggle_to(self.popup, "fe-open-up", up)?;
            host.dom.style_set(self.popup, "left", &format_px(portal.left))?;
            host.dom.style_set(self.popup, "top", &format_px(portal.top))?;
            host.dom.style_set(self.popup, "width", &format_px(portal.width))?;
        }
        tracing::trace!(
            native = self.native.index(),
            direction = ?placement.direction,
            measured = measured_size.is_some(),
            "positioned popup"
        );
        Ok(placement)
    }

    fn estimated_size(&self, dom: &Dom, trigger: Rect, config: &EnhancerConfig) -> Size {
        let rules = &config.positioning;
        match self.kind() {
            PickerKind::Date => Size {
                width: rules.date_width,
                height: rules.estimated_date_height,
            },
            PickerKind::Select => {
                let rows = dom.children(self.popup).len() as f64;
                Size {
                    width: trigger.width.max(rules.min_width),
                    height: (rows * rules.option_row_height).min(rules.max_list_height),
                }
            }
        }
    }

    /// Removes the nodes this widget owns outside the native element.
    /// Failures are logged and swallowed.
    pub(crate) fn teardown(&self, host: &mut Host) {
        if self.use_portal {
            if let Err(err) = host.dom.remove_node(self.popup) {
                tracing::warn!(native = self.native.index(), %err, "failed to remove portal popup");
            }
        }
        if host.dom.parent(self.native) != Some(self.wrapper) {
            if let Err(err) = host.dom.remove_node(self.wrapper) {
                tracing::warn!(native = self.native.index(), %err, "failed to remove wrapper");
            }
        }
        for result in [
            host.dom.remove_attr(self.native, ENHANCED_MARKER),
            host.dom.class_remove(self.native, "fe-native"),
        ] {
            if let Err(err) = result {
                tracing::warn!(native = self.native.index(), %err, "failed to restore native control");
            }
        }
    }
}

/// Appends a new `<tag class=...>` under `parent`, optionally with text.
pub(crate) fn append_part(
    dom: &mut Dom,
    parent: NodeId,
    tag: &str,
    class: &str,
    text: Option<&str>,
) -> Result<NodeId> {
    let node = dom.create_detached_element(tag);
    if !class.is_empty() {
        dom.set_attr(node, "class", class)?;
    }
    if let Some(text) = text {
        dom.set_text_content(node, text)?;
    }
    dom.append_child(parent, node)?;
    Ok(node)
}
