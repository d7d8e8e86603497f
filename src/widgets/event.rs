use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    None,
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Pressed,
    Released,
    Moved,
}

/// Pointer event. Coordinates are relative to the receiving widget's
/// rectangle once the event has been routed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: i32, y: i32, button: MouseButton) -> Self {
        Self { kind, x, y, button }
    }

    pub fn press(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(PointerKind::Pressed, x, y, button)
    }

    pub fn release(x: i32, y: i32, button: MouseButton) -> Self {
        Self::new(PointerKind::Released, x, y, button)
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self::new(PointerKind::Moved, x, y, MouseButton::None)
    }

    /// Same event with coordinates shifted by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == PointerKind::Pressed
    }

    pub fn is_release(&self) -> bool {
        self.kind == PointerKind::Released
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Pressed,
    Released,
}

/// Keys delivered to the focused widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Function key `F1`..`F12`.
    Function(u8),
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Shift,
    Ctrl,
    Alt,
    Menu,
    /// The system ("window") key.
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub key: Key,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            kind: KeyKind::Pressed,
            key,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            kind: KeyKind::Released,
            key,
        }
    }
}

/// Events travelling down the tree, from a top-level widget to its
/// descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The widget is being destroyed; its holder must let go of it.
    Delete,
    /// Frame tick, carrying the duration of the previous frame.
    Draw { frame: Duration },
    Pointer(PointerEvent),
    Keyboard(KeyEvent),
    /// The widget's rectangle size changed (already applied).
    Resize { width: u32, height: u32 },
}

impl Event {
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&KeyEvent> {
        match self {
            Event::Keyboard(key) => Some(key),
            _ => None,
        }
    }
}

/// Whether a holder consumed a pointer or keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl EventResponse {
    pub fn is_handled(self) -> bool {
        self == EventResponse::Handled
    }
}

impl From<bool> for EventResponse {
    fn from(handled: bool) -> Self {
        if handled {
            EventResponse::Handled
        } else {
            EventResponse::Ignored
        }
    }
}

/// Notifications a child sends up to its parent's holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The child was clicked.
    Clicked,
    /// The child's value changed.
    Changed,
    /// The child's value was validated.
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_translated_keeps_kind_and_button() {
        let ev = PointerEvent::press(3, 4, MouseButton::Right).translated(-3, 6);
        assert_eq!(ev, PointerEvent::new(PointerKind::Pressed, 0, 10, MouseButton::Right));
        assert!(ev.is_press());
        assert!(!ev.is_release());
    }

    #[test]
    fn test_event_accessors() {
        let ev = Event::Pointer(PointerEvent::moved(1, 2));
        assert_eq!(ev.pointer().map(|p| (p.x, p.y)), Some((1, 2)));
        assert!(ev.key().is_none());

        let ev = Event::Keyboard(KeyEvent::pressed(Key::Char('a')));
        assert_eq!(ev.key().map(|k| k.key), Some(Key::Char('a')));
        assert!(Event::Delete.pointer().is_none());
    }

    #[test]
    fn test_response_from_bool() {
        assert!(EventResponse::from(true).is_handled());
        assert_eq!(EventResponse::from(false), EventResponse::Ignored);
    }
}
