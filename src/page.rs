use std::str::FromStr;

use chrono::NaiveDate;

use super::events::ListenerStore;
use super::html::parse_html;
use super::*;

/// Everything the enhancer runs against: the document, its geometry, event
/// listeners, pending animation frames and the calendar clock.
#[derive(Debug)]
pub(crate) struct Host {
    pub(crate) dom: Dom,
    pub(crate) layout: Layout,
    pub(crate) listeners: ListenerStore,
    pub(crate) frames: Vec<NodeId>,
    pub(crate) today: NaiveDate,
}

impl Host {
    pub(crate) fn request_frame(&mut self, native: NodeId) {
        if !self.frames.contains(&native) {
            self.frames.push(native);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Space,
    Escape,
    Tab,
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "ArrowUp" | "Up" => Ok(Self::ArrowUp),
            "ArrowDown" | "Down" => Ok(Self::ArrowDown),
            "Enter" => Ok(Self::Enter),
            " " | "Space" | "Spacebar" => Ok(Self::Space),
            "Escape" | "Esc" => Ok(Self::Escape),
            "Tab" => Ok(Self::Tab),
            other => Err(Error::Dom(format!("unsupported key: {other}"))),
        }
    }
}

/// A deterministic in-memory page with form enhancement attached.
///
/// Host-side changes (`append_html`, `remove`, `set_attribute`, ...) are
/// delivered to the enhancer as one mutation batch at the end of each call,
/// the same way a browser delivers observer records after a task.
///
/// ```
/// use form_enhancer::Page;
///
/// let mut page = Page::from_html(
///     r#"<select id="color"><option>Red</option><option>Blue</option></select>"#,
/// )?;
/// page.enhance()?;
/// page.click(".fe-trigger")?;
/// page.click(".fe-option[data-index='1']")?;
/// page.assert_value("#color", "Blue")?;
/// assert_eq!(page.trigger_text("#color")?, "Blue");
/// # Ok::<(), form_enhancer::Error>(())
/// ```
#[derive(Debug)]
pub struct Page {
    host: Host,
    enhancer: Enhancer,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, EnhancerConfig::default())
    }

    pub fn with_config(html: &str, config: EnhancerConfig) -> Result<Self> {
        let enhancer = Enhancer::new(config)?;
        let dom = parse_html(html)?;
        Ok(Self {
            host: Host {
                dom,
                layout: Layout::default(),
                listeners: ListenerStore::default(),
                frames: Vec::new(),
                today: chrono::Local::now().date_naive(),
            },
            enhancer,
        })
    }

    /// Enhances everything eligible in the document and, unless disabled in
    /// the config, starts following document changes.
    pub fn enhance(&mut self) -> Result<Vec<NodeId>> {
        if self.enhancer.config().observe_mutations {
            self.host.dom.observe();
        }
        self.refresh_document()
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.host.today = today;
    }

    pub fn today(&self) -> NaiveDate {
        self.host.today
    }

    // Re-scan API.

    /// Re-scans every element matching `selector` (and its subtree).
    pub fn refresh(&mut self, selector: &str) -> Result<Vec<NodeId>> {
        let roots = self.host.dom.query_selector_all(selector)?;
        if roots.is_empty() {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        let mut created = Vec::new();
        for root in roots {
            created.extend(self.refresh_node(root)?);
        }
        Ok(created)
    }

    pub fn refresh_node(&mut self, root: NodeId) -> Result<Vec<NodeId>> {
        if !self.host.dom.is_valid_node(root) {
            return Err(Error::Dom(format!("unknown node {}", root.index())));
        }
        self.flush_mutations()?;
        self.enhancer.scan(&mut self.host, root)
    }

    pub fn refresh_document(&mut self) -> Result<Vec<NodeId>> {
        let root = self.host.dom.root();
        self.refresh_node(root)
    }

    /// Delivers queued mutation records to the enhancer as one batch.
    pub fn flush_mutations(&mut self) -> Result<()> {
        let records = self.host.dom.take_records();
        self.enhancer.process_mutations(&mut self.host, records)
    }

    // User interaction.

    /// Pointer-down followed by click, like a real mouse click. Disabled
    /// controls only receive the pointer-down.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub fn click_node(&mut self, target: NodeId) -> Result<()> {
        self.enhancer.handle_pointer_down(&mut self.host, target)?;
        if !self.host.dom.disabled(target) {
            self.enhancer.handle_click(&mut self.host, target)?;
        }
        self.flush_mutations()
    }

    pub fn pointer_down(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.enhancer.handle_pointer_down(&mut self.host, target)?;
        self.flush_mutations()
    }

    /// Focuses the element matching `selector` and presses `key` on it.
    pub fn key_down(&mut self, selector: &str, key: Key) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.dom.set_active_element(Some(target));
        self.enhancer.handle_key(&mut self.host, target, key)?;
        self.flush_mutations()
    }

    /// Presses `key` on whatever has focus (the document when nothing does).
    pub fn press(&mut self, key: Key) -> Result<()> {
        let target = self
            .host
            .dom
            .active_element()
            .unwrap_or_else(|| self.host.dom.root());
        self.enhancer.handle_key(&mut self.host, target, key)?;
        self.flush_mutations()
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.dom.set_active_element(Some(target));
        Ok(())
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.host.dom.active_element()
    }

    pub fn scroll(&mut self) -> Result<()> {
        self.enhancer.handle_scroll(&mut self.host)?;
        self.flush_mutations()
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        self.host.layout.set_viewport(viewport);
        self.enhancer.handle_resize(&mut self.host)?;
        self.flush_mutations()
    }

    /// Runs pending animation frame callbacks. Returns how many ran.
    pub fn run_animation_frame(&mut self) -> Result<usize> {
        let frames = std::mem::take(&mut self.host.frames);
        for native in &frames {
            self.enhancer.handle_frame(&mut self.host, *native)?;
        }
        self.flush_mutations()?;
        Ok(frames.len())
    }

    // Layout.

    pub fn layout(&self) -> &Layout {
        &self.host.layout
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.host.layout.set_viewport(viewport);
    }

    pub fn set_rect(&mut self, selector: &str, rect: Rect) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.layout.set_rect(target, rect);
        Ok(())
    }

    pub fn set_node_rect(&mut self, node: NodeId, rect: Rect) {
        self.host.layout.set_rect(node, rect);
    }

    // Host-side document changes.

    pub fn append_html(&mut self, selector: &str, html: &str) -> Result<Vec<NodeId>> {
        let parent = self.select_one(selector)?;
        let inserted = self.host.dom.append_html(parent, html)?;
        self.flush_mutations()?;
        Ok(inserted)
    }

    pub fn set_inner_html(&mut self, selector: &str, html: &str) -> Result<Vec<NodeId>> {
        let target = self.select_one(selector)?;
        let inserted = self.host.dom.set_inner_html(target, html)?;
        self.flush_mutations()?;
        Ok(inserted)
    }

    pub fn remove(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.remove_node(target)
    }

    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        self.host.dom.remove_node(node)?;
        self.flush_mutations()
    }

    /// Moves `node` to the end of `new_parent` in a single task.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
        self.host.dom.append_child(new_parent, node)?;
        self.flush_mutations()
    }

    pub fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.dom.set_attr(target, name, value)?;
        self.flush_mutations()
    }

    pub fn remove_attribute(&mut self, selector: &str, name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.dom.remove_attr(target, name)?;
        self.flush_mutations()
    }

    /// Assigns the control's value from script: no events fire.
    pub fn set_value(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.dom.set_value(target, value)?;
        self.flush_mutations()
    }

    /// Fires `change` on a native control, as a script would after writing
    /// its value.
    pub fn dispatch_change(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let value = self.host.dom.value(target)?;
        self.host.listeners.dispatch(NativeEvent {
            target,
            kind: NativeEventKind::Change,
            value,
        });
        self.enhancer.handle_native_change(&mut self.host, target)?;
        self.flush_mutations()
    }

    // Listeners.

    pub fn add_listener<F>(&mut self, selector: &str, kind: NativeEventKind, listener: F) -> Result<()>
    where
        F: FnMut(&NativeEvent) + 'static,
    {
        let target = self.select_one(selector)?;
        self.host.listeners.add(target, kind, Box::new(listener));
        Ok(())
    }

    /// Every native event dispatched so far, oldest first.
    pub fn event_log(&self) -> &[NativeEvent] {
        self.host.listeners.log()
    }

    pub fn take_event_log(&mut self) -> Vec<NativeEvent> {
        self.host.listeners.take_log()
    }

    // Queries.

    pub fn node(&self, selector: &str) -> Result<NodeId> {
        self.select_one(selector)
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.host.dom.query_selector_all(selector)
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.host.dom.value(target)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.host.dom.text_content(node)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.host.dom.attr(node, name)
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.host.dom.class_contains(node, class_name)
    }

    pub fn style(&self, node: NodeId, name: &str) -> String {
        self.host.dom.style_get(node, name)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.host.dom.parent(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.host.dom.is_connected(node)
    }

    pub fn widget_count(&self) -> usize {
        self.enhancer.widget_count()
    }

    pub fn is_enhanced(&self, selector: &str) -> Result<bool> {
        let native = self.select_one(selector)?;
        Ok(self.enhancer.is_enhanced(native))
    }

    pub fn is_open(&self, selector: &str) -> Result<bool> {
        let native = self.select_one(selector)?;
        Ok(self.enhancer.open_widget() == Some(native))
    }

    pub fn open_widget(&self) -> Option<NodeId> {
        self.enhancer.open_widget()
    }

    pub fn trigger_of(&self, selector: &str) -> Result<NodeId> {
        Ok(self.widget_for(selector)?.trigger)
    }

    pub fn popup_of(&self, selector: &str) -> Result<NodeId> {
        Ok(self.widget_for(selector)?.popup)
    }

    pub fn wrapper_of(&self, selector: &str) -> Result<NodeId> {
        Ok(self.widget_for(selector)?.wrapper)
    }

    pub fn trigger_text(&self, selector: &str) -> Result<String> {
        let trigger = self.trigger_of(selector)?;
        Ok(self.host.dom.text_content(trigger))
    }

    /// Opens the widget of the native control matching `selector`, as a
    /// script would. Returns whether it is open afterwards.
    pub fn open(&mut self, selector: &str) -> Result<bool> {
        let native = self.select_one(selector)?;
        let opened = self.enhancer.open(&mut self.host, native)?;
        self.flush_mutations()?;
        Ok(opened)
    }

    pub fn close(&mut self) -> Result<()> {
        self.enhancer.close(&mut self.host)?;
        self.flush_mutations()
    }

    // Assertions.

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: Option<&str>) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.attr(target, name);
        if actual.as_deref() != expected {
            return Err(Error::AssertionFailed {
                selector: format!("{selector}[{name}]"),
                expected: format!("{expected:?}"),
                actual: format!("{actual:?}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.host
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn widget_for(&self, selector: &str) -> Result<&widget::Widget> {
        let native = self.select_one(selector)?;
        self.enhancer.widget(native).ok_or_else(|| Error::TypeMismatch {
            selector: selector.to_string(),
            expected: "enhanced control".into(),
            actual: self.host.dom.tag_name(native).unwrap_or("node").to_string(),
        })
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.host.dom.dump_node(node_id), 200)
    }
}
