use super::*;

const APP_HTML: &str = r#"
    <body>
      <div id='app'>
        <div id='row-1'><select id='first'><option>A</option><option>B</option></select></div>
        <input id='due' type='date'>
      </div>
      <div id='other'></div>
    </body>
    "#;

fn wrappers(page: &Page) -> Result<Vec<NodeId>> {
    page.query_all("[data-fe-wrapper]")
}

#[test]
fn rescanning_is_idempotent() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let before = wrappers(&page)?;
    assert_eq!(before.len(), 2);

    assert!(page.refresh_document()?.is_empty());
    assert!(page.refresh("#app")?.is_empty());
    assert!(page.refresh("#first")?.is_empty());
    assert_eq!(wrappers(&page)?, before);
    assert_eq!(page.widget_count(), 2);
    assert_eq!(page.query_all(".fe-trigger")?.len(), 2);
    Ok(())
}

#[test]
fn opted_out_and_ineligible_controls_stay_native() -> Result<()> {
    let html = r#"
        <input id='a' type='date' data-native>
        <select id='b' class='native-control'><option>x</option></select>
        <select id='c' multiple><option>x</option></select>
        <select id='d' size='4'><option>x</option></select>
        <input id='e' type='text'>
        <select id='f' size='1'><option>x</option></select>
        <input id='g' type='DATE'>
        "#;
    let page = enhanced_page(html)?;
    for selector in ["#a", "#b", "#c", "#d", "#e"] {
        assert!(!page.is_enhanced(selector)?, "{selector} should stay native");
    }
    assert!(page.is_enhanced("#f")?);
    assert!(page.is_enhanced("#g")?);
    assert_eq!(page.widget_count(), 2);
    Ok(())
}

#[test]
fn custom_opt_out_markers_come_from_config() -> Result<()> {
    let config = EnhancerConfig::from_toml_str(
        r#"
        opt_out_attribute = "data-plain"
        opt_out_class = "plain"
        "#,
    )?;
    let mut page = Page::with_config(
        "<select id='x' data-plain></select><select id='y' class='plain'></select><select id='z' data-native></select>",
        config,
    )?;
    page.enhance()?;
    assert!(!page.is_enhanced("#x")?);
    assert!(!page.is_enhanced("#y")?);
    assert!(page.is_enhanced("#z")?);
    Ok(())
}

#[test]
fn inserted_controls_are_enhanced_by_the_observer() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let first_wrapper = page.wrapper_of("#first")?;

    page.append_html(
        "#app",
        "<div id='row-2'><select id='second'><option>C</option></select></div>",
    )?;
    assert!(page.is_enhanced("#second")?);
    assert_eq!(page.widget_count(), 3);
    assert_eq!(page.wrapper_of("#first")?, first_wrapper);
    assert_eq!(page.trigger_text("#second")?, "C");
    Ok(())
}

#[test]
fn explicit_rescan_enhances_exactly_the_new_control() -> Result<()> {
    let config = EnhancerConfig {
        observe_mutations: false,
        ..EnhancerConfig::default()
    };
    let mut page = Page::with_config(APP_HTML, config)?;
    page.enhance()?;
    let first_wrapper = page.wrapper_of("#first")?;

    page.append_html("#app", "<select id='late'><option>L</option></select>")?;
    assert!(!page.is_enhanced("#late")?);

    let created = page.refresh("#app")?;
    assert_eq!(created, vec![page.node("#late")?]);
    assert_eq!(page.widget_count(), 3);
    assert_eq!(page.wrapper_of("#first")?, first_wrapper);
    assert_eq!(wrappers(&page)?.len(), 3);
    Ok(())
}

#[test]
fn removing_an_ancestor_destroys_the_widget() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let first = page.node("#first")?;
    let wrapper = page.wrapper_of("#first")?;

    page.remove("#row-1")?;
    assert_eq!(page.widget_count(), 1);
    assert!(!page.enhancer().is_enhanced(first));
    assert_eq!(page.attr(first, "data-fe-enhanced"), None);
    assert!(!page.has_class(first, "fe-native"));
    // The wrapper left together with the native element.
    assert_eq!(page.parent(first), Some(wrapper));
    assert!(!page.is_connected(wrapper));
    Ok(())
}

#[test]
fn removing_only_the_native_element_removes_its_wrapper() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let wrapper = page.wrapper_of("#due")?;
    page.remove("#due")?;
    assert!(!page.is_connected(wrapper));
    assert_eq!(wrappers(&page)?.len(), 1);
    assert_eq!(page.widget_count(), 1);
    Ok(())
}

#[test]
fn portal_popups_live_under_body_and_leave_with_their_widget() -> Result<()> {
    let html = r#"
        <body>
          <div class='portal-view' id='table'>
            <select id='status'><option>Open</option><option>Done</option></select>
          </div>
          <div data-portal-view id='grid'><input id='when' type='date'></div>
          <select id='inline'><option>x</option></select>
        </body>
        "#;
    let mut page = enhanced_page(html)?;
    let body = page.node("body")?;

    let status_popup = page.popup_of("#status")?;
    assert_eq!(page.parent(status_popup), Some(body));
    assert!(page.has_class(status_popup, "fe-portal"));
    assert_eq!(page.parent(page.popup_of("#when")?), Some(body));
    assert_eq!(
        page.parent(page.popup_of("#inline")?),
        Some(page.wrapper_of("#inline")?)
    );

    page.remove("#table")?;
    assert!(!page.is_connected(status_popup));
    assert_eq!(page.widget_count(), 2);
    Ok(())
}

#[test]
fn portal_popup_gets_a_body_when_the_fixture_has_none() -> Result<()> {
    let page = enhanced_page(
        "<div class='portal-view'><select id='s'><option>x</option></select></div>",
    )?;
    let popup = page.popup_of("#s")?;
    let body = page.node("body")?;
    assert_eq!(page.parent(popup), Some(body));
    Ok(())
}

#[test]
fn moving_a_wrapper_keeps_its_widget() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let wrapper = page.wrapper_of("#first")?;
    let other = page.node("#other")?;

    page.move_node(wrapper, other)?;
    assert!(page.is_enhanced("#first")?);
    assert_eq!(page.widget_count(), 2);
    assert_eq!(page.parent(wrapper), Some(other));
    assert_eq!(wrappers(&page)?.len(), 2);
    Ok(())
}

#[test]
fn replacing_markup_swaps_widgets() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    let old = page.node("#first")?;

    page.set_inner_html("#row-1", "<select id='first'><option>New</option></select>")?;
    let new = page.node("#first")?;
    assert_ne!(old, new);
    assert!(!page.enhancer().is_enhanced(old));
    assert!(page.enhancer().is_enhanced(new));
    assert_eq!(page.widget_count(), 2);
    assert_eq!(page.trigger_text("#first")?, "New");
    Ok(())
}

#[test]
fn document_rescan_sweeps_widgets_removed_without_records() -> Result<()> {
    let config = EnhancerConfig {
        observe_mutations: false,
        ..EnhancerConfig::default()
    };
    let mut page = Page::with_config(APP_HTML, config)?;
    page.enhance()?;
    let first = page.node("#first")?;

    page.remove("#row-1")?;
    assert!(page.enhancer().is_enhanced(first));

    page.refresh_document()?;
    assert!(!page.enhancer().is_enhanced(first));
    assert_eq!(page.widget_count(), 1);
    Ok(())
}

#[test]
fn destroying_the_open_widget_clears_the_open_slot() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    page.click(".fe-select .fe-trigger")?;
    assert!(page.is_open("#first")?);

    page.remove("#row-1")?;
    assert_eq!(page.open_widget(), None);
    page.close()?;
    Ok(())
}

#[test]
fn refresh_of_unknown_selector_is_an_error() -> Result<()> {
    let mut page = enhanced_page(APP_HTML)?;
    assert!(matches!(
        page.refresh("#nope"),
        Err(Error::SelectorNotFound(_))
    ));
    Ok(())
}
