//! Popup placement math. Everything here is pure and works in viewport
//! coordinates.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Down,
    Up,
}

/// Inline box for a popup rendered under `<body>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalPosition {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub direction: Direction,
    /// Present only when the placement was computed in portal mode.
    pub portal: Option<PortalPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    pub margin: f64,
    pub gap: f64,
    pub min_width: f64,
    pub preferred_width: f64,
}

/// Chooses whether the popup opens below or above its trigger, and in portal
/// mode where exactly it sits.
///
/// The popup opens upward only when it does not fit below (keeping `margin`
/// free) and there is strictly more room above than below.
pub fn compute_placement(
    trigger: Rect,
    viewport: Viewport,
    popup: Size,
    rules: PlacementRules,
    portal: bool,
) -> Placement {
    let space_below = viewport.height - trigger.bottom();
    let space_above = trigger.top;
    let direction = if space_below < popup.height + rules.margin && space_above > space_below {
        Direction::Up
    } else {
        Direction::Down
    };

    if !portal {
        return Placement {
            direction,
            portal: None,
        };
    }

    let width = clamp_low(
        trigger.width.max(rules.preferred_width),
        rules.min_width,
        viewport.width - 2.0 * rules.margin,
    );
    let left = clamp_low(
        trigger.left,
        rules.margin,
        viewport.width - width - rules.margin,
    );
    let top = match direction {
        Direction::Down => trigger.bottom() + rules.gap,
        Direction::Up => trigger.top - rules.gap - popup.height,
    };
    let top = clamp_low(
        top,
        rules.margin,
        viewport.height - popup.height - rules.margin,
    );

    Placement {
        direction,
        portal: Some(PortalPosition { left, top, width }),
    }
}

// `f64::clamp` panics when `min > max`; here the lower bound wins instead.
fn clamp_low(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}
