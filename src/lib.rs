pub mod altitude;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod router;
pub mod scene;
pub mod surface;
pub mod tooltip;
pub mod tree;
pub mod widgets;

pub mod prelude {
    pub use crate::compositor::CompositeStats;
    pub use crate::config::{GuiConfig, TooltipConfig};
    pub use crate::error::{Result, WidgetError};
    pub use crate::geometry::{Color, Rect};
    pub use crate::scene::{AnchorHandle, HeadlessScene, SceneAnchor, SceneCommand, SceneObject};
    pub use crate::surface::{PixelSurface, ResizeMode, SoftwareSurface};
    pub use crate::tooltip::{TooltipChange, TooltipSink, TooltipTracker};
    pub use crate::tree::{Altitude, Capture, Tree, WidgetId, WidgetNode};
    pub use crate::widgets::{
        from_fn, Event, EventResponse, Holder, Key, KeyEvent, KeyKind, MouseButton, Notification,
        PointerEvent, PointerKind,
    };
}
