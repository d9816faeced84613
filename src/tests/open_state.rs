use super::*;

const FORM_HTML: &str = r#"
    <form>
      <input id='start' type='date' value='2024-04-01'>
      <select id='size'><option>S</option><option>M</option><option>L</option></select>
      <select id='tone'><option>Warm</option><option>Cool</option></select>
    </form>
    <p id='outside'>outside</p>
    "#;

fn open_popups(page: &Page) -> Result<usize> {
    Ok(page.query_all(".fe-popup.is-open")?.len())
}

#[test]
fn opening_a_second_widget_closes_the_first() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;

    page.click_node(page.trigger_of("#size")?)?;
    assert!(page.is_open("#size")?);

    page.click_node(page.trigger_of("#start")?)?;
    assert!(page.is_open("#start")?);
    assert!(!page.is_open("#size")?);
    assert_eq!(open_popups(&page)?, 1);
    let size_trigger = page.trigger_of("#size")?;
    assert_eq!(page.attr(size_trigger, "aria-expanded").as_deref(), Some("false"));

    assert!(page.open("#tone")?);
    assert_eq!(page.open_widget(), Some(page.node("#tone")?));
    assert_eq!(open_popups(&page)?, 1);
    Ok(())
}

#[test]
fn pointer_down_outside_closes_but_inside_does_not() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    page.click_node(page.trigger_of("#start")?)?;

    page.click(".fe-next")?;
    assert!(page.is_open("#start")?);
    page.pointer_down(".fe-title")?;
    assert!(page.is_open("#start")?);

    page.pointer_down("#outside")?;
    assert!(!page.is_open("#start")?);
    assert_eq!(page.open_widget(), None);
    page.assert_value("#start", "2024-04-01")?;
    Ok(())
}

#[test]
fn escape_closes_from_anywhere_and_focuses_the_trigger() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    page.open("#tone")?;
    page.focus("#outside")?;

    page.press(Key::Escape)?;
    assert_eq!(page.open_widget(), None);
    assert_eq!(page.active_element(), Some(page.trigger_of("#tone")?));

    // Nothing open: focus stays put.
    page.focus("#outside")?;
    page.press(Key::Escape)?;
    assert_eq!(page.active_element(), Some(page.node("#outside")?));
    Ok(())
}

#[test]
fn resize_closes_a_date_popup_but_keeps_a_select_open() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;

    page.open("#start")?;
    page.resize(Viewport {
        width: 640.0,
        height: 480.0,
    })?;
    assert_eq!(page.open_widget(), None);

    page.open("#size")?;
    page.resize(Viewport {
        width: 1280.0,
        height: 720.0,
    })?;
    assert!(page.is_open("#size")?);
    Ok(())
}

#[test]
fn closing_is_idempotent() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    page.close()?;
    page.open("#size")?;
    page.close()?;
    page.close()?;
    assert_eq!(page.open_widget(), None);
    assert_eq!(open_popups(&page)?, 0);
    let popup = page.popup_of("#size")?;
    assert!(page.attr(popup, "hidden").is_some());
    Ok(())
}

#[test]
fn reopening_the_open_widget_is_a_no_op() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    assert!(page.open("#size")?);
    assert_eq!(page.run_animation_frame()?, 1);
    assert!(page.open("#size")?);
    assert_eq!(page.run_animation_frame()?, 0);
    assert!(page.is_open("#size")?);
    Ok(())
}

#[test]
fn removing_the_open_widget_empties_the_slot() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    page.open("#tone")?;
    page.remove("#tone")?;
    assert_eq!(page.open_widget(), None);
    assert_eq!(page.widget_count(), 2);

    assert!(page.open("#size")?);
    assert_eq!(open_popups(&page)?, 1);
    Ok(())
}

#[test]
fn open_requests_for_plain_elements_are_ignored() -> Result<()> {
    let mut page = enhanced_page(FORM_HTML)?;
    assert!(!page.open("#outside")?);
    assert_eq!(page.open_widget(), None);
    Ok(())
}
