use super::*;

/// Host-supplied geometry: the viewport and whatever bounding boxes the test
/// or embedding has measured. Unmeasured triggers are placed with a default
/// box at the top-left of the viewport.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    viewport: Viewport,
    rects: HashMap<NodeId, Rect>,
}

impl Layout {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }

    pub fn clear_rect(&mut self, node: NodeId) {
        self.rects.remove(&node);
    }

    pub fn rect_of(&self, node: NodeId) -> Option<Rect> {
        self.rects.get(&node).copied()
    }

    /// Box of the first node in `candidates` that has one.
    pub(crate) fn first_rect(&self, candidates: &[NodeId]) -> Option<Rect> {
        candidates.iter().find_map(|node| self.rect_of(*node))
    }

    pub(crate) fn measured_size(&self, node: NodeId) -> Option<Size> {
        self.rect_of(node)
            .filter(|rect| rect.width > 0.0 || rect.height > 0.0)
            .map(|rect| Size {
                width: rect.width,
                height: rect.height,
            })
    }
}
