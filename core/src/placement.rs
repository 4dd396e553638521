#[derive(Clone, Copy, Debug, PartialEq)]
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

/// Visible width in client coordinates plus the document scroll offset.
/// Only the top edge and the width constrain placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementConfig {
    pub gap: f64,
    pub margin: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            gap: 10.0,
            margin: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

/// Overlay position in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub side: Side,
}

/// Places the overlay above `anchor`, flipping below when there is no room
/// above, and keeps it horizontally inside the viewport margins.
pub fn place_overlay(
    anchor: Rect,
    overlay_width: f64,
    overlay_height: f64,
    viewport: Viewport,
    config: PlacementConfig,
) -> Placement {
    let mut top = anchor.top - overlay_height - config.gap;
    let mut side = Side::Above;
    if top < config.margin {
        top = anchor.bottom() + config.gap;
        side = Side::Below;
    }

    let mut left = anchor.left;
    let max_right = viewport.width - config.margin;
    if left + overlay_width > max_right {
        left = max_right - overlay_width;
    }
    left = left.max(config.margin);

    Placement {
        top: top + viewport.scroll_y,
        left: left + viewport.scroll_x,
        side,
    }
}
