use super::*;

/// An `<option>` as seen through its `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionEntry {
    pub(crate) node: NodeId,
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) group: Option<String>,
    pub(crate) disabled: bool,
}

impl Dom {
    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        if self.has_tag(node_id, "select") {
            return Ok(self
                .selected_index(node_id)
                .and_then(|index| self.select_options(node_id).into_iter().nth(index))
                .map(|option| option.value)
                .unwrap_or_default());
        }
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    /// Sets the control's current value without touching the `value`
    /// attribute, like assigning `element.value` from script.
    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.has_tag(node_id, "select") {
            let index = self
                .select_options(node_id)
                .iter()
                .position(|option| option.value == value);
            return self.set_selected_index(node_id, index);
        }

        let is_date = is_date_input(self, node_id);
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        element.value = if is_date {
            normalize_date_input_value(value)
        } else {
            value.to_string()
        };
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.readonly).unwrap_or(false)
    }

    pub(crate) fn select_options(&self, select_node: NodeId) -> Vec<OptionEntry> {
        let mut nodes = Vec::new();
        self.collect_select_options(select_node, &mut nodes);
        nodes
            .into_iter()
            .map(|node| {
                let group_node = self
                    .parent(node)
                    .filter(|parent| self.has_tag(*parent, "optgroup"));
                let group = group_node.map(|group| self.attr(group, "label").unwrap_or_default());
                let disabled =
                    self.disabled(node) || group_node.is_some_and(|group| self.disabled(group));
                let text = collapse_whitespace(&self.text_content(node));
                let value = self.attr(node, "value").unwrap_or_else(|| text.clone());
                OptionEntry {
                    node,
                    text,
                    value,
                    group,
                    disabled,
                }
            })
            .collect()
    }

    fn collect_select_options(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.has_tag(*child, "option") {
                out.push(*child);
            } else if self.has_tag(*child, "optgroup") {
                self.collect_select_options(*child, out);
            }
        }
    }

    /// Index of the selected option: the first one marked `selected`,
    /// otherwise the first enabled one.
    pub(crate) fn selected_index(&self, select_node: NodeId) -> Option<usize> {
        let options = self.select_options(select_node);
        options
            .iter()
            .position(|option| self.has_attr(option.node, "selected"))
            .or_else(|| options.iter().position(|option| !option.disabled))
    }

    pub(crate) fn set_selected_index(
        &mut self,
        select_node: NodeId,
        index: Option<usize>,
    ) -> Result<()> {
        if !self.has_tag(select_node, "select") {
            return Err(Error::Dom("selectedIndex target is not a select".into()));
        }
        let options = self.select_options(select_node);
        for (position, option) in options.iter().enumerate() {
            let selected = Some(position) == index;
            self.set_bool_attr(option.node, "selected", selected)?;
        }
        Ok(())
    }
}

impl Element {
    pub(crate) fn is_date_input(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("input")
            && self
                .attrs
                .get("type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("date"))
    }
}

pub(crate) fn is_date_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.element(node_id).is_some_and(Element::is_date_input)
}

/// Single-choice drop-down: no `multiple`, and no visible multi-row `size`.
pub(crate) fn is_dropdown_select(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };
    if !element.tag_name.eq_ignore_ascii_case("select") || element.attrs.contains_key("multiple") {
        return false;
    }
    element
        .attrs
        .get("size")
        .and_then(|size| size.trim().parse::<u32>().ok())
        .is_none_or(|size| size <= 1)
}

/// A date input's value is either a valid `YYYY-MM-DD` string or empty.
pub(crate) fn normalize_date_input_value(value: &str) -> String {
    if parse_iso_date(value).is_some() {
        value.to_string()
    } else {
        String::new()
    }
}
