use super::*;

impl Dom {
    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(64 * 1024, 2 * 1024 * 1024, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => self
                    .children(node_id)
                    .iter()
                    .map(|child| self.dump_node(*child))
                    .collect(),
                NodeType::Text(text) => escape_html_text_for_serialization(text),
                NodeType::Element(element) => {
                    let mut out = String::new();
                    out.push('<');
                    out.push_str(&element.tag_name);
                    let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                    attrs.sort_by(|(left, _), (right, _)| left.cmp(right));
                    for (k, v) in attrs {
                        out.push(' ');
                        out.push_str(k);
                        out.push_str("=\"");
                        out.push_str(&escape_html_attr_for_serialization(v));
                        out.push('"');
                    }
                    out.push('>');
                    if is_void_tag(&element.tag_name) {
                        return out;
                    }
                    for child in self.children(node_id) {
                        out.push_str(&self.dump_node(*child));
                    }
                    out.push_str("</");
                    out.push_str(&element.tag_name);
                    out.push('>');
                    out
                }
            }
        })
    }
}
