mod event;
mod holder;

pub use event::{
    Event, EventResponse, Key, KeyEvent, KeyKind, MouseButton, Notification, PointerEvent,
    PointerKind,
};
pub use holder::{from_fn, FnHolder, Holder};
