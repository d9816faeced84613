use super::*;

impl Dom {
    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|e| e.attrs.get(name).cloned())
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.attrs.contains_key(&name.to_ascii_lowercase()))
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let old_id = if lowered == "id" {
            self.attr(node_id, "id")
        } else {
            None
        };
        {
            let element = self
                .element_mut(node_id)
                .ok_or_else(|| Error::Dom("setAttribute target is not an element".into()))?;
            if element.attrs.get(&lowered).map(String::as_str) == Some(value) {
                return Ok(());
            }
            element.attrs.insert(lowered.clone(), value.to_string());
            match lowered.as_str() {
                "value" if element.is_date_input() => {
                    element.value = normalize_date_input_value(value);
                }
                "value" => element.value = value.to_string(),
                "disabled" => element.disabled = true,
                "readonly" => element.readonly = true,
                _ => {}
            }
        }

        if lowered == "id" {
            if let Some(old_id) = old_id {
                self.unindex_id(&old_id, node_id);
            }
            self.index_id(value, node_id);
        }
        self.record_mutation(MutationRecord::Attributes {
            target: node_id,
            name: lowered,
        });
        Ok(())
    }

    pub(crate) fn remove_attr(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let removed = {
            let element = self
                .element_mut(node_id)
                .ok_or_else(|| Error::Dom("removeAttribute target is not an element".into()))?;
            let removed = element.attrs.remove(&lowered);
            if removed.is_some() {
                match lowered.as_str() {
                    "value" => element.value.clear(),
                    "disabled" => element.disabled = false,
                    "readonly" => element.readonly = false,
                    _ => {}
                }
            }
            removed
        };

        let Some(old_value) = removed else {
            return Ok(());
        };
        if lowered == "id" {
            self.unindex_id(&old_value, node_id);
        }
        self.record_mutation(MutationRecord::Attributes {
            target: node_id,
            name: lowered,
        });
        Ok(())
    }

    /// Sets or removes a boolean attribute such as `hidden` or `disabled`.
    pub(crate) fn set_bool_attr(&mut self, node_id: NodeId, name: &str, on: bool) -> Result<()> {
        if on {
            self.set_attr(node_id, name, "")
        } else {
            self.remove_attr(node_id, name)
        }
    }

    fn unindex_id(&mut self, id: &str, node_id: NodeId) {
        let Some(nodes) = self.id_index.get_mut(id) else {
            return;
        };
        nodes.retain(|candidate| *candidate != node_id);
        if nodes.is_empty() {
            self.id_index.remove(id);
        }
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("classList target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if classes.iter().any(|name| name == class_name) {
            return Ok(());
        }
        classes.push(class_name.to_string());
        self.write_class_tokens(node_id, &classes)
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("classList target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        let before = classes.len();
        classes.retain(|name| name != class_name);
        if classes.len() == before {
            return Ok(());
        }
        self.write_class_tokens(node_id, &classes)
    }

    pub(crate) fn class_toggle_to(
        &mut self,
        node_id: NodeId,
        class_name: &str,
        on: bool,
    ) -> Result<()> {
        if on {
            self.class_add(node_id, class_name)
        } else {
            self.class_remove(node_id, class_name)
        }
    }

    fn write_class_tokens(&mut self, node_id: NodeId, classes: &[String]) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("classList target is not an element".into()))?;
        set_class_attr(element, classes);
        self.record_mutation(MutationRecord::Attributes {
            target: node_id,
            name: "class".to_string(),
        });
        Ok(())
    }

    pub(crate) fn style_get(&self, node_id: NodeId, name: &str) -> String {
        let decls = parse_style_declarations(self.attr(node_id, "style").as_deref());
        decls
            .into_iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::Dom("style target is not an element".into()));
        }
        let mut decls = parse_style_declarations(self.attr(node_id, "style").as_deref());
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            self.remove_attr(node_id, "style")
        } else {
            self.set_attr(node_id, "style", &serialize_style_declarations(&decls))
        }
    }
}
