use super::*;

const PORTAL_HTML: &str = r#"
    <body>
      <div class='portal-view'>
        <select id='status'>
          <option>Open</option>
          <option>Blocked</option>
          <option>Done</option>
        </select>
      </div>
    </body>
    "#;

fn small_viewport() -> Viewport {
    Viewport {
        width: 800.0,
        height: 600.0,
    }
}

#[test]
fn date_popup_near_the_bottom_opens_upward() -> Result<()> {
    let mut page = enhanced_page("<input id='d' type='date'>")?;
    page.set_viewport(small_viewport());
    page.set_rect(".fe-trigger", Rect::new(10.0, 560.0, 200.0, 30.0))?;

    page.open("#d")?;
    let wrapper = page.wrapper_of("#d")?;
    assert!(page.has_class(wrapper, "fe-open-up"));
    // Inline popups are placed by the stylesheet.
    assert_eq!(page.style(page.popup_of("#d")?, "top"), "");

    page.close()?;
    assert!(!page.has_class(wrapper, "fe-open-up"));
    Ok(())
}

#[test]
fn date_popup_with_room_below_opens_downward() -> Result<()> {
    let mut page = enhanced_page("<input id='d' type='date'>")?;
    page.set_viewport(small_viewport());
    page.set_rect(".fe-trigger", Rect::new(10.0, 40.0, 200.0, 30.0))?;

    page.open("#d")?;
    assert!(!page.has_class(page.wrapper_of("#d")?, "fe-open-up"));
    Ok(())
}

#[test]
fn portal_popup_gets_inline_coordinates() -> Result<()> {
    let mut page = enhanced_page(PORTAL_HTML)?;
    page.set_rect(".fe-trigger", Rect::new(100.0, 100.0, 150.0, 30.0))?;

    page.open("#status")?;
    let popup = page.popup_of("#status")?;
    assert_eq!(page.style(popup, "position"), "fixed");
    assert_eq!(page.style(popup, "left"), "100px");
    assert_eq!(page.style(popup, "top"), "134px");
    // Narrow triggers still get the minimum list width.
    assert_eq!(page.style(popup, "width"), "160px");
    Ok(())
}

#[test]
fn measured_height_on_the_next_frame_can_flip_the_popup() -> Result<()> {
    let mut page = enhanced_page(PORTAL_HTML)?;
    page.set_viewport(small_viewport());
    page.set_rect(".fe-trigger", Rect::new(100.0, 300.0, 150.0, 30.0))?;

    page.open("#status")?;
    let popup = page.popup_of("#status")?;
    assert_eq!(page.style(popup, "top"), "334px");
    assert!(!page.has_class(popup, "fe-open-up"));

    page.set_node_rect(popup, Rect::new(100.0, 334.0, 160.0, 400.0));
    assert_eq!(page.run_animation_frame()?, 1);
    assert!(page.has_class(popup, "fe-open-up"));
    assert!(page.has_class(page.wrapper_of("#status")?, "fe-open-up"));
    assert_eq!(page.style(popup, "top"), "8px");
    assert_eq!(page.run_animation_frame()?, 0);
    Ok(())
}

#[test]
fn frame_after_close_leaves_the_popup_alone() -> Result<()> {
    let mut page = enhanced_page(PORTAL_HTML)?;
    page.set_rect(".fe-trigger", Rect::new(100.0, 100.0, 150.0, 30.0))?;
    page.open("#status")?;
    page.close()?;

    let popup = page.popup_of("#status")?;
    page.set_node_rect(popup, Rect::new(0.0, 0.0, 160.0, 700.0));
    assert_eq!(page.run_animation_frame()?, 1);
    assert_eq!(page.style(popup, "top"), "134px");
    Ok(())
}

#[test]
fn scrolling_follows_the_trigger_in_portal_mode() -> Result<()> {
    let mut page = enhanced_page(PORTAL_HTML)?;
    let trigger = page.trigger_of("#status")?;
    page.set_node_rect(trigger, Rect::new(100.0, 100.0, 150.0, 30.0));
    page.open("#status")?;

    page.set_node_rect(trigger, Rect::new(100.0, 50.0, 150.0, 30.0));
    page.scroll()?;
    let popup = page.popup_of("#status")?;
    assert_eq!(page.style(popup, "top"), "84px");
    assert!(page.is_open("#status")?);
    Ok(())
}

#[test]
fn resize_repositions_an_open_portal_select() -> Result<()> {
    let mut page = enhanced_page(PORTAL_HTML)?;
    page.set_rect(".fe-trigger", Rect::new(900.0, 100.0, 150.0, 30.0))?;
    page.open("#status")?;
    let popup = page.popup_of("#status")?;
    assert_eq!(page.style(popup, "left"), "856px");

    page.resize(small_viewport())?;
    assert_eq!(page.style(popup, "left"), "632px");
    Ok(())
}
