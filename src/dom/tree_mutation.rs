use super::*;

impl Dom {
    fn can_have_children(&self, node_id: NodeId) -> bool {
        matches!(
            self.nodes.get(node_id.0).map(|n| &n.node_type),
            Some(NodeType::Document | NodeType::Element(_))
        )
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId, op: &str) -> Result<()> {
        if !self.can_have_children(parent) {
            return Err(Error::Dom(format!("{op} target cannot have children")));
        }
        if child == self.root || child == parent {
            return Err(Error::Dom(format!("invalid {op} node")));
        }
        if !self.is_valid_node(child) {
            return Err(Error::Dom(format!("{op} node is invalid")));
        }

        // Prevent cycles: parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(Error::Dom(format!("{op} would create a cycle")));
            }
            cursor = self.parent(node);
        }
        Ok(())
    }

    fn detach_from_parent(&mut self, child: NodeId) {
        let Some(old_parent) = self.parent(child) else {
            return;
        };
        self.nodes[old_parent.0].children.retain(|id| *id != child);
        self.nodes[child.0].parent = None;
        self.record_mutation(MutationRecord::ChildList {
            target: old_parent,
            added: Vec::new(),
            removed: vec![child],
        });
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertion(parent, child, "appendChild")?;
        self.detach_from_parent(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.rebuild_id_index();
        self.record_mutation(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<()> {
        self.check_insertion(parent, child, "insertBefore")?;
        if self.parent(reference) != Some(parent) {
            return Err(Error::Dom(
                "insertBefore reference is not a direct child".into(),
            ));
        }
        if child == reference {
            return Ok(());
        }

        self.detach_from_parent(child);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == reference)
            .ok_or_else(|| Error::Dom("insertBefore reference disappeared".into()))?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        self.rebuild_id_index();
        self.record_mutation(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(Error::Dom("removeChild target is not a direct child".into()));
        }
        self.detach_from_parent(child);
        self.rebuild_id_index();
        Ok(())
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::Dom("cannot remove document root".into()));
        }
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        self.remove_child(parent, node)
    }

    pub(crate) fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        if !self.can_have_children(node_id) {
            return Err(Error::Dom("clear target cannot have children".into()));
        }
        let removed = std::mem::take(&mut self.nodes[node_id.0].children);
        if removed.is_empty() {
            return Ok(());
        }
        for child in &removed {
            self.nodes[child.0].parent = None;
        }
        self.rebuild_id_index();
        self.record_mutation(MutationRecord::ChildList {
            target: node_id,
            added: Vec::new(),
            removed,
        });
        Ok(())
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::Dom("textContent target is not an element".into()));
        }
        if self.text_content(node_id) == value && self.children(node_id).len() <= 1 {
            return Ok(());
        }
        self.clear_children(node_id)?;
        if !value.is_empty() {
            let text = self.create_detached_node(NodeType::Text(value.to_string()));
            self.append_child(node_id, text)?;
        }
        Ok(())
    }

    /// Parses `html` and appends the resulting nodes to `parent`, recording
    /// one child-list mutation per top-level node.
    pub(crate) fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
        let fragment = parse_fragment(html)?;
        let mut inserted = Vec::new();
        for child in fragment.children(fragment.root).to_vec() {
            let node = self.import_subtree(&fragment, child)?;
            self.append_child(parent, node)?;
            inserted.push(node);
        }
        Ok(inserted)
    }

    pub(crate) fn set_inner_html(&mut self, node_id: NodeId, html: &str) -> Result<Vec<NodeId>> {
        if self.element(node_id).is_none() {
            return Err(Error::Dom("innerHTML target is not an element".into()));
        }
        self.clear_children(node_id)?;
        self.append_html(node_id, html)
    }

    fn import_subtree(&mut self, source: &Dom, source_node: NodeId) -> Result<NodeId> {
        stacker::maybe_grow(64 * 1024, 2 * 1024 * 1024, || {
            let node_type = match &source.nodes[source_node.0].node_type {
                NodeType::Document => {
                    return Err(Error::Dom("cannot import a document node".into()));
                }
                other => other.clone(),
            };
            let node = self.create_detached_node(node_type);
            for child in source.children(source_node).to_vec() {
                let imported = self.import_subtree(source, child)?;
                self.nodes[imported.0].parent = Some(node);
                self.nodes[node.0].children.push(imported);
            }
            Ok(node)
        })
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut next: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id").filter(|id| !id.is_empty()) {
                    next.entry(id.clone()).or_default().push(node);
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }
}
