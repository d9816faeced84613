//! The only code path that writes a native control on behalf of a widget.
//!
//! Writes land on the native element first; `input` and then `change` are
//! dispatched afterwards, so listeners read the new value.

use chrono::NaiveDate;

use super::events::{NativeEvent, NativeEventKind};
use super::page::Host;
use super::*;

pub(crate) fn read_date(host: &Host, native: NodeId) -> Option<NaiveDate> {
    host.dom
        .value(native)
        .ok()
        .and_then(|value| parse_iso_date(&value))
}

/// Writes `date` (or clears the input) and notifies. Returns whether the
/// value actually changed; an unchanged value dispatches nothing.
pub(crate) fn write_date(host: &mut Host, native: NodeId, date: Option<NaiveDate>) -> Result<bool> {
    let next = date.map(format_iso_date).unwrap_or_default();
    if host.dom.value(native)? == next {
        return Ok(false);
    }
    host.dom.set_value(native, &next)?;
    notify_changed(host, native)?;
    Ok(true)
}

/// Selects option `index` and notifies. Returns whether the selection moved.
pub(crate) fn select_index(host: &mut Host, native: NodeId, index: usize) -> Result<bool> {
    if host.dom.selected_index(native) == Some(index) {
        return Ok(false);
    }
    host.dom.set_selected_index(native, Some(index))?;
    notify_changed(host, native)?;
    Ok(true)
}

fn notify_changed(host: &mut Host, native: NodeId) -> Result<()> {
    for kind in [NativeEventKind::Input, NativeEventKind::Change] {
        let value = host.dom.value(native)?;
        host.listeners.dispatch(NativeEvent {
            target: native,
            kind,
            value,
        });
    }
    Ok(())
}
