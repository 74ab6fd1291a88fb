//! Rendering collaborator for the built-in animations.
//!
//! How opacity, offset or scale actually reach the screen is up to the host
//! toolkit. [`VisualState`] is an in-memory surface for headless runs.

use std::cell::RefCell;
use std::rc::Rc;

/// Visual properties a built-in animation can drive.
pub trait Surface {
    /// Width and height used to compute off-screen offsets.
    fn size(&self) -> (f32, f32);
    fn set_opacity(&mut self, opacity: f32);
    fn set_offset(&mut self, x: f32, y: f32);
    fn set_scale(&mut self, x: f32, y: f32);
    fn set_sort_order(&mut self, order: i32);
    fn set_visible(&mut self, visible: bool);
}

pub type SharedSurface = Rc<RefCell<dyn Surface>>;

/// Headless surface that records the last applied values.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    pub offset: (f32, f32),
    pub scale: (f32, f32),
    pub sort_order: i32,
    pub visible: bool,
}

impl VisualState {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            opacity: 0.0,
            offset: (0.0, 0.0),
            scale: (1.0, 1.0),
            sort_order: 0,
            visible: false,
        }
    }

    /// Wrap in the shared handle the built-in animations expect.
    pub fn shared(width: f32, height: f32) -> Rc<RefCell<VisualState>> {
        Rc::new(RefCell::new(Self::new(width, height)))
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl Surface for VisualState {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = (x, y);
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = (x, y);
    }

    fn set_sort_order(&mut self, order: i32) {
        self.sort_order = order;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
