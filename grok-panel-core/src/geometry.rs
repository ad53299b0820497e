use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A screen rectangle.
///
/// The origin is whichever corner the platform measures from (bottom-left on
/// AppKit, top-left on GDK). Centering is symmetric, so the math here does
/// not care which.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn from_size(size: Size) -> Self {
        Rect {
            origin: Point::default(),
            size,
        }
    }

    /// Rectangle of `size` centered inside `area`.
    ///
    /// Positions are rounded down to whole points so the panel never lands on
    /// a half pixel. A panel larger than the area overflows evenly on both
    /// sides.
    pub fn centered_in(size: Size, area: &Rect) -> Self {
        let x = area.origin.x + ((area.size.width - size.width) / 2.0).floor();
        let y = area.origin.y + ((area.size.height - size.height) / 2.0).floor();
        Rect {
            origin: Point { x, y },
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_default_panel_on_full_hd_screen() {
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let frame = Rect::centered_in(Size::new(800.0, 600.0), &screen);
        assert_eq!(frame, Rect::new(560.0, 240.0, 800.0, 600.0));
    }

    #[test]
    fn centering_respects_work_area_inset() {
        // Dock at the bottom (bottom-left origin) and a 25pt menu bar on top.
        let work_area = Rect::new(0.0, 70.0, 1920.0, 985.0);
        let frame = Rect::centered_in(Size::new(800.0, 600.0), &work_area);
        assert_eq!(frame.origin, Point { x: 560.0, y: 262.0 });
        assert_eq!(frame.size, Size::new(800.0, 600.0));
    }

    #[test]
    fn centering_on_secondary_screen_offsets_by_origin() {
        let screen = Rect::new(-1440.0, 0.0, 1440.0, 900.0);
        let frame = Rect::centered_in(Size::new(800.0, 600.0), &screen);
        assert_eq!(frame.origin, Point { x: -1120.0, y: 150.0 });
    }

    #[test]
    fn oversized_panel_overflows_evenly() {
        let screen = Rect::new(0.0, 0.0, 600.0, 400.0);
        let frame = Rect::centered_in(Size::new(800.0, 600.0), &screen);
        assert_eq!(frame.origin, Point { x: -100.0, y: -100.0 });
        assert_eq!(frame.origin.x + frame.size.width / 2.0, 300.0);
        assert_eq!(frame.origin.y + frame.size.height / 2.0, 200.0);
    }

    #[test]
    fn drawable_size() {
        assert!(Size::new(800.0, 600.0).is_drawable());
        assert!(!Size::new(0.0, 600.0).is_drawable());
        assert!(!Size::new(800.0, f64::NAN).is_drawable());
        assert!(!Size::new(-1.0, 10.0).is_drawable());
    }
}
