use super::*;

#[derive(Debug, Clone)]
pub(crate) struct SelectState {
    list: NodeId,
    /// One row per native option, in option order.
    rows: Vec<NodeId>,
}

impl SelectState {
    pub(crate) fn build(host: &mut Host, native: NodeId, popup: NodeId) -> Result<Self> {
        let mut state = Self {
            list: popup,
            rows: Vec::new(),
        };
        state.rebuild_rows(host, native, popup)?;
        Ok(state)
    }

    pub(crate) fn rebuild_rows(&mut self, host: &mut Host, native: NodeId, list: NodeId) -> Result<()> {
        let dom = &mut host.dom;
        let options = dom.select_options(native);
        dom.clear_children(list)?;
        self.list = list;
        self.rows.clear();

        let mut previous_group: Option<&str> = None;
        for (index, option) in options.iter().enumerate() {
            let group = option.group.as_deref();
            if group != previous_group {
                if let Some(label) = group {
                    let row = append_part(dom, list, "div", "fe-group-label", Some(label))?;
                    dom.set_attr(row, "role", "presentation")?;
                }
            }
            previous_group = group;

            let row = append_part(dom, list, "div", "fe-option", Some(&option.text))?;
            dom.set_attr(row, "role", "option")?;
            dom.set_attr(row, "data-index", &index.to_string())?;
            dom.set_attr(row, "data-value", &option.value)?;
            dom.set_attr(row, "tabindex", "-1")?;
            if option.disabled {
                dom.set_attr(row, "aria-disabled", "true")?;
                dom.class_add(row, "is-disabled")?;
            }
            self.rows.push(row);
        }
        tracing::trace!(native = native.index(), rows = self.rows.len(), "rebuilt option rows");
        Ok(())
    }

    /// Returns the trigger label: the selected option's text, or blank.
    pub(crate) fn sync(&mut self, host: &mut Host, native: NodeId) -> Result<String> {
        let options = host.dom.select_options(native);
        if options.len() != self.rows.len() {
            self.rebuild_rows(host, native, self.list)?;
        }
        self.sync_marks(host, native)?;
        Ok(host
            .dom
            .selected_index(native)
            .and_then(|index| options.get(index))
            .map(|option| option.text.clone())
            .unwrap_or_default())
    }

    pub(crate) fn sync_marks(&self, host: &mut Host, native: NodeId) -> Result<()> {
        let selected = host.dom.selected_index(native);
        for (index, row) in self.rows.iter().enumerate() {
            let on = selected == Some(index);
            host.dom.class_toggle_to(*row, "is-selected", on)?;
            host.dom
                .set_attr(*row, "aria-selected", if on { "true" } else { "false" })?;
        }
        Ok(())
    }

    pub(crate) fn action_for(&self, dom: &Dom, target: NodeId) -> Option<PopupAction> {
        let index = self
            .rows
            .iter()
            .position(|row| dom.is_inclusive_descendant_of(target, *row))?;
        self.is_enabled(dom, index)
            .then_some(PopupAction::PickOption(index))
    }

    pub(crate) fn row(&self, index: usize) -> Option<NodeId> {
        self.rows.get(index).copied()
    }

    pub(crate) fn row_index(&self, node: NodeId) -> Option<usize> {
        self.rows.iter().position(|row| *row == node)
    }

    fn is_enabled(&self, dom: &Dom, index: usize) -> bool {
        self.rows
            .get(index)
            .is_some_and(|row| !dom.has_attr(*row, "aria-disabled"))
    }

    fn enabled_indices(&self, dom: &Dom) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|index| self.is_enabled(dom, *index))
            .collect()
    }

    /// Row to focus right after opening from the keyboard: the selected
    /// option when enabled, else the first enabled one.
    pub(crate) fn initial_focus(&self, dom: &Dom, native: NodeId) -> Option<usize> {
        dom.selected_index(native)
            .filter(|index| self.is_enabled(dom, *index))
            .or_else(|| self.enabled_indices(dom).first().copied())
    }

    /// Next enabled row after (or before) `current`, wrapping around.
    pub(crate) fn step_focus(&self, dom: &Dom, current: Option<usize>, forward: bool) -> Option<usize> {
        let enabled = self.enabled_indices(dom);
        if enabled.is_empty() {
            return None;
        }
        let len = enabled.len();
        let next = match current.and_then(|index| enabled.iter().position(|e| *e == index)) {
            Some(pos) if forward => (pos + 1) % len,
            Some(pos) => (pos + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        Some(enabled[next])
    }
}
