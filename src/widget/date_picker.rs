use chrono::{Datelike, NaiveDate};

use super::super::calendar::{first_of_month, shift_month, within_bounds};
use super::super::sync_bridge::read_date;
use super::*;

#[derive(Debug, Clone)]
pub(crate) struct DateState {
    /// First day of the month on screen. Independent of the value.
    pub(crate) view_month: NaiveDate,
    pub(crate) min: Option<NaiveDate>,
    pub(crate) max: Option<NaiveDate>,
    title: NodeId,
    grid: NodeId,
    today_button: NodeId,
}

impl DateState {
    pub(crate) fn build(
        host: &mut Host,
        native: NodeId,
        popup: NodeId,
        config: &EnhancerConfig,
    ) -> Result<Self> {
        let dom = &mut host.dom;
        let header = append_part(dom, popup, "div", "fe-header", None)?;
        let prev = append_part(dom, header, "button", "fe-nav fe-prev", Some("\u{2039}"))?;
        dom.set_attr(prev, "type", "button")?;
        dom.set_attr(prev, "aria-label", "Previous month")?;
        let title = append_part(dom, header, "div", "fe-title", None)?;
        dom.set_attr(title, "aria-live", "polite")?;
        let next = append_part(dom, header, "button", "fe-nav fe-next", Some("\u{203a}"))?;
        dom.set_attr(next, "type", "button")?;
        dom.set_attr(next, "aria-label", "Next month")?;

        let weekdays = append_part(dom, popup, "div", "fe-weekdays", None)?;
        for label in weekday_labels(config.locale()) {
            append_part(dom, weekdays, "span", "fe-weekday", Some(&label))?;
        }

        let grid = append_part(dom, popup, "div", "fe-grid", None)?;
        dom.set_attr(grid, "role", "grid")?;

        let footer = append_part(dom, popup, "div", "fe-footer", None)?;
        let clear = append_part(dom, footer, "button", "fe-clear", Some("Clear"))?;
        dom.set_attr(clear, "type", "button")?;
        let today_button = append_part(dom, footer, "button", "fe-today", Some("Today"))?;
        dom.set_attr(today_button, "type", "button")?;

        let mut state = Self {
            view_month: first_of_month(host.today),
            min: None,
            max: None,
            title,
            grid,
            today_button,
        };
        state.reset_view(host, native, config)?;
        Ok(state)
    }

    pub(crate) fn allows(&self, date: NaiveDate) -> bool {
        within_bounds(date, self.min, self.max)
    }

    fn refresh_bounds(&mut self, host: &Host, native: NodeId) {
        let bound = |name: &str| {
            host.dom
                .attr(native, name)
                .and_then(|value| parse_iso_date(value.trim()))
        };
        self.min = bound("min");
        self.max = bound("max");
    }

    /// Returns the trigger label.
    pub(crate) fn sync(
        &mut self,
        host: &mut Host,
        native: NodeId,
        config: &EnhancerConfig,
    ) -> Result<String> {
        self.refresh_bounds(host, native);
        self.render(host, native, config)?;
        Ok(match read_date(host, native) {
            Some(date) => trigger_label(date, config.locale()),
            None => config.date_placeholder.clone(),
        })
    }

    /// Moves the view to the value's month, or today's when empty.
    pub(crate) fn reset_view(
        &mut self,
        host: &mut Host,
        native: NodeId,
        config: &EnhancerConfig,
    ) -> Result<()> {
        let anchor = read_date(host, native).unwrap_or(host.today);
        self.view_month = first_of_month(anchor);
        self.refresh_bounds(host, native);
        self.render(host, native, config)
    }

    pub(crate) fn shift_view(
        &mut self,
        host: &mut Host,
        native: NodeId,
        delta: i32,
        config: &EnhancerConfig,
    ) -> Result<()> {
        self.view_month = shift_month(self.view_month, delta);
        self.render(host, native, config)
    }

    fn render(&self, host: &mut Host, native: NodeId, config: &EnhancerConfig) -> Result<()> {
        let selected = read_date(host, native);
        let today = host.today;
        let dom = &mut host.dom;
        dom.set_text_content(self.title, &month_title(self.view_month, config.locale()))?;

        dom.clear_children(self.grid)?;
        for cell in month_grid(self.view_month, today, selected, self.min, self.max) {
            let mut class = String::from("fe-day");
            for (on, name) in [
                (cell.outside_month, " is-outside"),
                (cell.today, " is-today"),
                (cell.selected, " is-selected"),
            ] {
                if on {
                    class.push_str(name);
                }
            }
            let day = cell.date.day().to_string();
            let button = append_part(dom, self.grid, "button", &class, Some(&day))?;
            dom.set_attr(button, "type", "button")?;
            dom.set_attr(button, "data-date", &format_iso_date(cell.date))?;
            if cell.selected {
                dom.set_attr(button, "aria-selected", "true")?;
            }
            if cell.disabled {
                dom.set_bool_attr(button, "disabled", true)?;
            }
        }

        let today_allowed = self.allows(today);
        dom.class_toggle_to(self.today_button, "is-disabled", !today_allowed)?;
        if today_allowed {
            dom.remove_attr(self.today_button, "aria-disabled")?;
        } else {
            dom.set_attr(self.today_button, "aria-disabled", "true")?;
        }
        Ok(())
    }

    pub(crate) fn action_for(
        &self,
        dom: &Dom,
        popup: NodeId,
        target: NodeId,
    ) -> Result<Option<PopupAction>> {
        let hit = |selector: &str| -> Result<Option<NodeId>> {
            Ok(dom
                .closest(target, selector)?
                .filter(|found| dom.is_inclusive_descendant_of(*found, popup)))
        };

        if let Some(day) = hit(".fe-day")? {
            if dom.has_attr(day, "disabled") {
                return Ok(None);
            }
            return Ok(dom
                .attr(day, "data-date")
                .and_then(|value| parse_iso_date(&value))
                .map(PopupAction::PickDate));
        }
        if hit(".fe-prev")?.is_some() {
            return Ok(Some(PopupAction::ShiftMonth(-1)));
        }
        if hit(".fe-next")?.is_some() {
            return Ok(Some(PopupAction::ShiftMonth(1)));
        }
        if hit(".fe-clear")?.is_some() {
            return Ok(Some(PopupAction::Clear));
        }
        if hit(".fe-today")?.is_some() {
            return Ok(Some(PopupAction::Today));
        }
        Ok(None)
    }
}
