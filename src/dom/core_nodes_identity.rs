use super::*;

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            active_element: None,
            observing: false,
            mutation_queue: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    /// Creates an element as the last child of `parent` without recording a
    /// mutation. Used while building parsed fixtures.
    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let element = Element::from_attrs(tag_name, attrs);
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self.attr(id, "id") {
            self.index_id(&id_attr, id);
        }
        id
    }

    pub(crate) fn create_detached_element(&mut self, tag_name: &str) -> NodeId {
        let element = Element::from_attrs(tag_name.to_ascii_lowercase(), HashMap::new());
        self.create_node(None, NodeType::Element(element))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn create_detached_node(&mut self, node_type: NodeType) -> NodeId {
        self.create_node(None, node_type)
    }

    pub(crate) fn is_valid_node(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn has_tag(&self, node_id: NodeId, tag: &str) -> bool {
        self.tag_name(node_id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn is_inclusive_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        node_id == ancestor || self.is_descendant_of(node_id, ancestor)
    }

    pub(crate) fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub(crate) fn set_active_element(&mut self, node: Option<NodeId>) {
        self.active_element = node;
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).and_then(|ids| ids.first().copied())
    }

    pub(crate) fn by_id_all(&self, id: &str) -> Vec<NodeId> {
        self.id_index.get(id).cloned().unwrap_or_default()
    }

    pub(crate) fn index_id(&mut self, id: &str, node_id: NodeId) {
        if id.is_empty() {
            return;
        }
        self.id_index
            .entry(id.to_string())
            .or_default()
            .push(node_id);
    }

    pub(crate) fn body(&self) -> Option<NodeId> {
        let mut elements = Vec::new();
        self.collect_elements_dfs(self.root, &mut elements);
        elements.into_iter().find(|node| self.has_tag(*node, "body"))
    }

    /// Returns `<body>`, creating one under the document when the fixture
    /// had none.
    pub(crate) fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body() {
            return body;
        }
        self.create_element(self.root, "body".to_string(), HashMap::new())
    }
}

impl Element {
    pub(crate) fn from_attrs(tag_name: String, attrs: HashMap<String, String>) -> Self {
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let mut element = Self {
            tag_name,
            attrs,
            value: String::new(),
            disabled,
            readonly,
        };
        // Date inputs sanitize their initial value like a browser does on load.
        let value = element.attrs.get("value").cloned().unwrap_or_default();
        element.value = if element.is_date_input() {
            normalize_date_input_value(&value)
        } else {
            value
        };
        element
    }
}
