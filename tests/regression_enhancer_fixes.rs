use form_enhancer::{EnhancerConfig, Error, Layout, NativeEventKind, Page, Rect, Result};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn enhanced_page(html: &str) -> Result<Page> {
    init_tracing();
    let mut page = Page::from_html(html)?;
    page.set_today(chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default());
    page.enhance()?;
    Ok(page)
}

#[test]
fn invalid_initial_date_value_is_sanitized_to_empty() -> Result<()> {
    let page = enhanced_page("<input id='d' type='date' value='2024-02-30'>")?;
    page.assert_value("#d", "")?;
    assert_eq!(page.trigger_text("#d")?, "Select date");
    Ok(())
}

#[test]
fn stale_marker_without_a_widget_is_enhanced_again() -> Result<()> {
    let page = enhanced_page("<select id='s' data-fe-enhanced='select'><option>One</option></select>")?;
    assert!(page.is_enhanced("#s")?);
    assert_eq!(page.query_all(".fe-trigger")?.len(), 1);
    Ok(())
}

#[test]
fn controls_inserted_into_a_popup_are_left_native() -> Result<()> {
    let mut page = enhanced_page("<select id='outer'><option>x</option></select>")?;
    page.append_html(
        ".fe-select-popup",
        "<select id='inner'><option>y</option></select>",
    )?;
    assert!(!page.is_enhanced("#inner")?);
    assert_eq!(page.widget_count(), 1);
    Ok(())
}

#[test]
fn enhancer_writes_never_feed_back_into_discovery() -> Result<()> {
    let mut page = enhanced_page(
        "<div id='app'><select id='s'><option>A</option><option>B</option></select><input id='d' type='date'></div>",
    )?;
    let wrappers = page.query_all("[data-fe-wrapper]")?;
    for _ in 0..3 {
        page.click(".fe-select .fe-trigger")?;
        page.click(".fe-option[data-index='1']")?;
        page.click(".fe-date .fe-trigger")?;
        page.click(".fe-next")?;
        page.press(form_enhancer::Key::Escape)?;
        page.refresh_document()?;
    }
    page.flush_mutations()?;
    assert_eq!(page.query_all("[data-fe-wrapper]")?, wrappers);
    assert_eq!(page.widget_count(), 2);
    assert_eq!(page.query_all(".fe-popup")?.len(), 2);
    Ok(())
}

#[test]
fn configured_margin_keeps_portal_popups_off_the_edge() -> Result<()> {
    init_tracing();
    let config = EnhancerConfig::from_toml_str(
        r#"
        portal_selectors = [".grid"]

        [positioning]
        margin = 12.0
        "#,
    )?;
    let mut page = Page::with_config(
        "<div class='grid'><select id='s'><option>x</option></select></div>",
        config,
    )?;
    page.enhance()?;
    page.set_rect(".fe-trigger", Rect::new(0.0, 0.0, 200.0, 30.0))?;
    page.open("#s")?;

    let popup = page.popup_of("#s")?;
    assert_eq!(page.style(popup, "left"), "12px");
    assert_eq!(page.style(popup, "width"), "200px");
    Ok(())
}

#[test]
fn unknown_config_keys_are_reported() {
    match EnhancerConfig::from_toml_str("colour = 'blue'") {
        Err(Error::Config(message)) => assert!(message.contains("colour"), "{message}"),
        other => panic!("expected a config error, got: {other:?}"),
    }
}

#[test]
fn listener_sees_the_new_value_on_both_events() -> Result<()> {
    let mut page = enhanced_page("<select id='s'><option>A</option><option>B</option></select>")?;
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    for kind in [NativeEventKind::Input, NativeEventKind::Change] {
        let sink = seen.clone();
        page.add_listener("#s", kind, move |event| {
            sink.borrow_mut().push(format!("{}:{}", event.kind, event.value));
        })?;
    }
    page.open("#s")?;
    page.click(".fe-option[data-index='1']")?;
    assert_eq!(*seen.borrow(), vec!["input:B".to_string(), "change:B".to_string()]);
    Ok(())
}

#[test]
fn dump_shows_the_wrapper_around_the_native_control() -> Result<()> {
    let mut page = enhanced_page("<div id='app'><select id='s'><option>A</option><option>B</option></select></div>")?;
    page.assert_exists("[data-fe-wrapper='select'] > #s")?;
    let dump = page.dump_dom("#app")?;
    assert!(dump.starts_with("<div id=\"app\"><div class=\"fe-select\""), "{dump}");
    assert!(dump.contains("data-fe-enhanced=\"select\""), "{dump}");

    page.open("#s")?;
    page.click(".fe-option[data-index='1']")?;
    assert_eq!(page.take_event_log().len(), 2);
    assert!(page.event_log().is_empty());
    Ok(())
}

#[test]
fn trigger_without_a_box_uses_the_default_one() -> Result<()> {
    let mut page = enhanced_page("<div class='portal-view'><select id='s'><option>x</option></select></div>")?;
    let trigger = page.trigger_of("#s")?;
    page.set_node_rect(trigger, Rect::new(300.0, 300.0, 200.0, 30.0));
    page.open("#s")?;
    let popup = page.popup_of("#s")?;
    assert_eq!(page.style(popup, "left"), "300px");
    assert_eq!(page.style(popup, "top"), "334px");
    page.close()?;

    let mut bare = enhanced_page("<div class='portal-view'><select id='t'><option>y</option></select></div>")?;
    bare.open("#t")?;
    let popup = bare.popup_of("#t")?;
    assert_eq!(bare.style(popup, "left"), "8px");
    assert_eq!(bare.style(popup, "top"), "36px");
    Ok(())
}

#[test]
fn layout_boxes_can_be_cleared() -> Result<()> {
    let page = enhanced_page("<p id='x'></p>")?;
    let node = page.node("#x")?;
    let mut layout = Layout::default();
    layout.set_rect(node, Rect::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(layout.rect_of(node).map(|rect| rect.bottom()), Some(6.0));
    layout.clear_rect(node);
    assert_eq!(layout.rect_of(node), None);
    Ok(())
}
