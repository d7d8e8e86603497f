//! Event routing.
//!
//! Events travel down from a top-level widget (fed by the scene) to the
//! widget they concern, notifications travel up from a child to its
//! parent's holder.
//!
//! Pointer events follow the capture chain when one exists: the press that
//! started a gesture decides who gets every event until the release,
//! wherever the pointer goes. Without capture the first child whose
//! rectangle contains the pointer gets the event. Keyboard events follow the
//! focus chain down to the deepest focused widget.

use crate::error::{violation, Result, WidgetError};
use crate::geometry::Rect;
use crate::surface::PixelSurface;
use crate::tree::{Capture, NodeFlags, Tree, WidgetId};
use crate::widgets::{Event, EventResponse, KeyEvent, Notification, PointerEvent, PointerKind};

impl<S: PixelSurface> Tree<S> {
    /// Deliver an event to a widget and route it down its subtree.
    ///
    /// Pointer coordinates are relative to the widget's rectangle (for a
    /// top-level widget: to its drawing buffer). The response tells whether
    /// a pointer or keyboard event was consumed; unknown widgets and other
    /// event kinds answer [`EventResponse::Ignored`].
    pub fn dispatch(&mut self, id: WidgetId, event: &Event) -> EventResponse {
        let Some(node) = self.node(id) else {
            log::debug!("event {:?} for unknown widget {:?} dropped", event, id);
            return EventResponse::Ignored;
        };
        let root = node.is_root();
        let deleting = node.flags.contains(NodeFlags::DELETING);

        match event {
            Event::Delete => {
                if self
                    .with_holder(id, |holder, tree| holder.on_down(tree, id, event))
                    .is_none()
                {
                    // Deleted from inside its own callback.
                    self.late_deletes.push(id);
                }
                self.destroy(id);
                EventResponse::Ignored
            }
            Event::Draw { .. } => {
                self.draw_subtree(id, event);
                if root {
                    self.composite_root(id);
                }
                EventResponse::Ignored
            }
            Event::Resize { .. } => {
                self.call_down(id, event);
                EventResponse::Ignored
            }
            _ if deleting => EventResponse::Ignored,
            Event::Pointer(pointer) => {
                if root && pointer.is_press() {
                    self.raise(id);
                }
                self.route_pointer(id, *pointer)
            }
            Event::Keyboard(key) => self.route_key(id, *key),
        }
    }

    /// Send a notification from `id` to its parent's holder.
    ///
    /// Top-level widgets have no parent: nothing happens. The parent may
    /// delete `id` in response, so this should come last in a callback.
    pub fn throw_event(&mut self, id: WidgetId, notification: Notification) -> Result<()> {
        self.index_of(id)?;
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };
        self.index_of(parent)?;
        let Some(slot) = self.slot_of(parent, id) else {
            return Err(violation(WidgetError::Detached(id)));
        };

        if self
            .with_holder(parent, |holder, tree| {
                holder.on_up(tree, parent, slot, notification)
            })
            .is_none()
        {
            log::warn!(
                "{:?} from {:?} dropped: {:?} is already handling an event",
                notification,
                id,
                parent
            );
        }
        Ok(())
    }

    /// Drop every capture below a top-level widget without routing an
    /// event, for hosts that lose the pointer before its release.
    pub fn release_capture(&mut self, id: WidgetId) -> Result<()> {
        self.index_of(id)?;
        for widget in self.subtree(id) {
            if let Some(node) = self.node_mut(widget) {
                node.capture = Capture::None;
            }
        }
        Ok(())
    }

    /// Call the holder's `on_down`.
    fn call_down(&mut self, id: WidgetId, event: &Event) -> EventResponse {
        match self.with_holder(id, |holder, tree| holder.on_down(tree, id, event)) {
            Some(response) => response,
            None => {
                if self.contains(id) {
                    log::warn!("{:?} for {:?} dropped: widget is already handling an event", event, id);
                }
                EventResponse::Ignored
            }
        }
    }

    /// Draw ticks reach every holder of the subtree, parents first.
    fn draw_subtree(&mut self, id: WidgetId, event: &Event) {
        self.call_down(id, event);
        for child in self.children(id) {
            self.draw_subtree(child, event);
        }
    }

    fn route_key(&mut self, id: WidgetId, key: KeyEvent) -> EventResponse {
        match self.focus(id).and_then(|slot| self.child(id, slot)) {
            Some(child) => self.route_key(child, key),
            None => self.call_down(id, &Event::Keyboard(key)),
        }
    }

    fn route_pointer(&mut self, id: WidgetId, pointer: PointerEvent) -> EventResponse {
        let Some(node) = self.node(id) else {
            return EventResponse::Ignored;
        };
        let rect = node.rect;
        let capture = node.capture;
        let (x, y) = (pointer.x + rect.x, pointer.y + rect.y);

        if pointer.kind == PointerKind::Moved && rect.contains(x, y) {
            self.notify_hover(id, rect);
        }

        match capture {
            Capture::SelfNode => {
                let response = self.call_down(id, &Event::Pointer(pointer));
                if pointer.is_release() {
                    self.set_capture(id, Capture::None);
                }
                return response;
            }
            Capture::Child(slot) => {
                if let Some((child, child_rect)) = self.child_with_rect(id, slot) {
                    let local = pointer.translated(rect.x - child_rect.x, rect.y - child_rect.y);
                    let response = self.route_pointer(child, local);
                    if pointer.is_release() {
                        self.set_capture(id, Capture::None);
                    }
                    return response;
                }
                log::warn!("{:?} lost its captured child {}", id, slot);
                self.set_capture(id, Capture::None);
            }
            Capture::None => {}
        }

        let hit = self.node(id).and_then(|node| {
            node.children.iter().enumerate().find_map(|(slot, child)| {
                let child = (*child)?;
                let child_rect = self.rect(child)?;
                child_rect.contains(x, y).then_some((slot, child, child_rect))
            })
        });

        if let Some((slot, child, child_rect)) = hit {
            let local = pointer.translated(rect.x - child_rect.x, rect.y - child_rect.y);
            let response = self.route_pointer(child, local);
            if pointer.is_press() {
                if let Some(node) = self.node_mut(id) {
                    // The press may have deleted or unset the child.
                    if node.children.get(slot) == Some(&Some(child)) {
                        node.capture = Capture::Child(slot);
                        node.focus = Some(slot);
                    }
                }
                return response;
            }
            if response.is_handled() {
                return response;
            }
        }

        let response = self.call_down(id, &Event::Pointer(pointer));
        if pointer.is_press() && hit.is_none() {
            if let Some(node) = self.node_mut(id) {
                node.capture = Capture::SelfNode;
                node.focus = None;
            }
        }
        response
    }

    fn child_with_rect(&self, id: WidgetId, slot: usize) -> Option<(WidgetId, Rect)> {
        let child = self.child(id, slot)?;
        Some((child, self.rect(child)?))
    }

    fn set_capture(&mut self, id: WidgetId, capture: Capture) {
        if let Some(node) = self.node_mut(id) {
            node.capture = capture;
        }
    }

    /// Report a hover to the tooltip sink, with the widget's rectangle in
    /// screen coordinates.
    fn notify_hover(&mut self, id: WidgetId, rect: Rect) {
        let Some(text) = self.tooltip(id).map(str::to_owned) else {
            return;
        };
        let (dx, dy) = self
            .root_of(id)
            .and_then(|root| self.node(root))
            .map_or((0, 0), |root| root.origin());
        if let Some(sink) = self.tooltip.as_mut() {
            sink.notify(&text, rect.offset(dx, dy), id);
        }
    }

    /// A press on a floating top-level widget brings it to the top.
    fn raise(&mut self, id: WidgetId) {
        let changes = self.altitudes.raise(id);
        if !changes.is_empty() {
            log::debug!("{:?} raised over {} floating widgets", id, changes.len() - 1);
            self.apply_altitude_changes(&changes);
        }
    }
}
