use super::*;

use chrono::NaiveDate;

mod lifecycle;
mod open_state;
mod positioning;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Parses `html`, pins the clock to 2024-03-15 and enhances the document.
fn enhanced_page(html: &str) -> Result<Page> {
    let mut page = Page::from_html(html)?;
    page.set_today(ymd(2024, 3, 15));
    page.enhance()?;
    Ok(page)
}

fn event_summary(page: &Page) -> Vec<(NativeEventKind, String)> {
    page.event_log()
        .iter()
        .map(|event| (event.kind, event.value.clone()))
        .collect()
}

#[test]
fn enhance_wraps_native_controls_and_keeps_them_authoritative() -> Result<()> {
    let html = r#"
        <form id='homework'>
          <input id='due' type='date' value='2024-01-05'>
          <select id='subject'>
            <option value='math'>Math</option>
            <option value='art' selected>Art</option>
          </select>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.set_today(ymd(2024, 3, 15));
    let created = page.enhance()?;
    assert_eq!(created.len(), 2);
    assert_eq!(page.widget_count(), 2);

    let due = page.node("#due")?;
    let wrapper = page.wrapper_of("#due")?;
    assert_eq!(page.parent(due), Some(wrapper));
    assert_eq!(page.parent(wrapper), Some(page.node("#homework")?));
    assert!(page.has_class(wrapper, "fe-date"));
    page.assert_attr("#due", "data-fe-enhanced", Some("date"))?;
    page.assert_attr("#subject", "data-fe-enhanced", Some("select"))?;

    assert_eq!(page.trigger_text("#due")?, "Jan 5, 2024");
    assert_eq!(page.trigger_text("#subject")?, "Art");
    page.assert_value("#due", "2024-01-05")?;
    page.assert_value("#subject", "art")?;
    Ok(())
}

#[test]
fn trigger_reflects_open_state_through_aria_expanded() -> Result<()> {
    let mut page = enhanced_page("<input id='due' type='date'>")?;
    let trigger = page.trigger_of("#due")?;
    let popup = page.popup_of("#due")?;
    assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("false"));
    assert!(page.attr(popup, "hidden").is_some());

    page.click(".fe-trigger")?;
    assert!(page.is_open("#due")?);
    assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("true"));
    assert!(page.attr(popup, "hidden").is_none());
    assert!(page.has_class(page.wrapper_of("#due")?, "is-open"));

    page.click(".fe-trigger")?;
    assert!(!page.is_open("#due")?);
    assert_eq!(page.attr(trigger, "aria-expanded").as_deref(), Some("false"));
    Ok(())
}

#[test]
fn assertion_errors_carry_a_dom_snippet() -> Result<()> {
    let page = enhanced_page("<select id='s'><option>Only</option></select>")?;
    match page.assert_value("#s", "Other") {
        Err(Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        }) => {
            assert_eq!(expected, "Other");
            assert_eq!(actual, "Only");
            assert!(dom_snippet.starts_with("<select"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        page.trigger_text("#missing"),
        Err(Error::SelectorNotFound(_))
    ));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_parsing_the_page() {
    let config = EnhancerConfig {
        portal_selectors: vec!["div ~ p".to_string()],
        ..EnhancerConfig::default()
    };
    assert!(matches!(
        Page::with_config("<p></p>", config),
        Err(Error::Config(_))
    ));
}
