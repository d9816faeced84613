use super::page::Host;
use super::widget::Widget;
use super::*;

/// Owns the single "currently open" slot. Opening a widget always closes the
/// previous one first, so at most one popup is visible at a time.
#[derive(Debug, Default)]
pub(crate) struct OpenStateCoordinator {
    open: Option<NodeId>,
}

impl OpenStateCoordinator {
    pub(crate) fn current(&self) -> Option<NodeId> {
        self.open
    }

    pub(crate) fn is_open(&self, native: NodeId) -> bool {
        self.open == Some(native)
    }

    /// Opens the widget of `native`. Returns `false` when the control is
    /// disabled, read-only or not enhanced.
    pub(crate) fn open(
        &mut self,
        host: &mut Host,
        registry: &mut HashMap<NodeId, Widget>,
        native: NodeId,
        config: &EnhancerConfig,
    ) -> Result<bool> {
        let interactive = registry
            .get(&native)
            .is_some_and(|widget| widget.is_interactive(&host.dom));
        if !interactive {
            tracing::trace!(native = native.index(), "open ignored");
            return Ok(false);
        }
        if self.is_open(native) {
            return Ok(true);
        }
        self.close_open(host, registry, config);

        let Some(widget) = registry.get_mut(&native) else {
            return Ok(false);
        };
        widget.set_open(host, true, config)?;
        widget.position(host, config, false)?;
        host.request_frame(native);
        self.open = Some(native);
        tracing::debug!(native = native.index(), kind = widget.kind().as_str(), "opened");
        Ok(true)
    }

    /// Closes whatever is open. Safe to call with nothing open or after the
    /// open widget was destroyed.
    pub(crate) fn close_open(
        &mut self,
        host: &mut Host,
        registry: &mut HashMap<NodeId, Widget>,
        config: &EnhancerConfig,
    ) -> Option<NodeId> {
        let native = self.open.take()?;
        if let Some(widget) = registry.get_mut(&native) {
            if let Err(err) = widget.set_open(host, false, config) {
                tracing::warn!(native = native.index(), %err, "failed to clear open state");
            }
        }
        tracing::debug!(native = native.index(), "closed");
        Some(native)
    }

    pub(crate) fn toggle(
        &mut self,
        host: &mut Host,
        registry: &mut HashMap<NodeId, Widget>,
        native: NodeId,
        config: &EnhancerConfig,
    ) -> Result<bool> {
        if self.is_open(native) {
            self.close_open(host, registry, config);
            return Ok(false);
        }
        self.open(host, registry, native, config)
    }
}
