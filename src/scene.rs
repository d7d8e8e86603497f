//! The boundary between top-level widgets and the host's 2D scene.
//!
//! A top-level widget attaches its drawing surface to a [`SceneAnchor`],
//! which positions, layers and displays it, and feeds input, resize, draw
//! and deletion events back into [`Tree::dispatch`].
//!
//! [`HeadlessScene`] is an in-memory anchor: it records what a display
//! backend would be asked to do, and drives frames itself with
//! [`HeadlessScene::tick`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::geometry::Color;
use crate::surface::PixelSurface;
use crate::tree::{Tree, WidgetId};
use crate::widgets::Event;

/// Identifies a top-level widget's object inside the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(u64);

impl AnchorHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

pub trait SceneAnchor<S: PixelSurface> {
    /// Start displaying `buffer` for top-level widget `root`.
    fn attach(&mut self, root: WidgetId, buffer: &S) -> AnchorHandle;

    /// Screen position of the object's top-left corner.
    fn set_position(&mut self, handle: AnchorHandle, x: i32, y: i32);

    /// Paint depth; higher is painted later (on top).
    fn set_altitude(&mut self, handle: AnchorHandle, depth: u32);

    fn set_visible(&mut self, handle: AnchorHandle, visible: bool);

    /// Global color tone, reached after `duration` (used for fades).
    fn set_tint(&mut self, handle: AnchorHandle, color: Color, duration: Duration);

    /// The buffer was reallocated or resized.
    fn relink(&mut self, handle: AnchorHandle, buffer: &S);

    /// The buffer content changed and must be shown again.
    fn request_redraw(&mut self, handle: AnchorHandle, buffer: &S);

    /// Stop displaying the object. The deletion is asynchronous: the
    /// anchor delivers [`Event::Delete`] to the root on a later tick.
    fn detach(&mut self, handle: AnchorHandle);
}

/// Commands recorded by a [`HeadlessScene`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    Attach { handle: AnchorHandle, root: WidgetId },
    SetPosition { handle: AnchorHandle, x: i32, y: i32 },
    SetAltitude { handle: AnchorHandle, depth: u32 },
    SetVisible { handle: AnchorHandle, visible: bool },
    SetTint { handle: AnchorHandle, color: Color, duration: Duration },
    Relink { handle: AnchorHandle, width: u32, height: u32 },
    Redraw(AnchorHandle),
    Detach(AnchorHandle),
}

/// State of one attached object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    pub root: WidgetId,
    pub position: (i32, i32),
    pub depth: u32,
    pub visible: bool,
    pub tint: Color,
    pub size: (u32, u32),
    pub redraws: u64,
}

#[derive(Debug, Default)]
struct SceneState {
    next_handle: u64,
    objects: HashMap<AnchorHandle, SceneObject>,
    commands: Vec<SceneCommand>,
    /// Roots detached but not yet told, in detach order.
    pending_deletions: Vec<(AnchorHandle, WidgetId)>,
}

impl SceneState {
    fn record(&mut self, command: SceneCommand) {
        self.commands.push(command);
    }
}

/// Display-less [`SceneAnchor`].
///
/// Clones share the same scene, so a host can keep one clone and give
/// another to the [`Tree`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    state: Rc<RefCell<SceneState>>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, handle: AnchorHandle) -> Option<SceneObject> {
        self.state.borrow().objects.get(&handle).cloned()
    }

    pub fn object_for(&self, root: WidgetId) -> Option<SceneObject> {
        self.state
            .borrow()
            .objects
            .values()
            .find(|o| o.root == root)
            .cloned()
    }

    /// Number of attached objects, including detached ones whose deletion
    /// hasn't been delivered yet.
    pub fn len(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drain_commands(&self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    /// Visible roots from bottom to top. Equal depths keep attach order.
    pub fn paint_order(&self) -> Vec<WidgetId> {
        let state = self.state.borrow();
        let mut visible: Vec<(u32, u64, WidgetId)> = state
            .objects
            .iter()
            .filter(|(_, o)| o.visible)
            .map(|(h, o)| (o.depth, h.raw(), o.root))
            .collect();
        visible.sort_unstable_by_key(|&(depth, handle, _)| (depth, handle));
        visible.into_iter().map(|(_, _, root)| root).collect()
    }

    /// Run one frame: deliver pending deletions, then a draw tick to every
    /// attached root.
    pub fn tick<S: PixelSurface>(&self, tree: &mut Tree<S>, frame: Duration) {
        let deletions = std::mem::take(&mut self.state.borrow_mut().pending_deletions);
        for (handle, root) in deletions {
            tree.dispatch(root, &Event::Delete);
            self.state.borrow_mut().objects.remove(&handle);
        }

        let mut roots: Vec<(u64, WidgetId)> = self
            .state
            .borrow()
            .objects
            .iter()
            .map(|(h, o)| (h.raw(), o.root))
            .collect();
        roots.sort_unstable_by_key(|&(handle, _)| handle);
        for (_, root) in roots {
            tree.dispatch(root, &Event::Draw { frame });
        }
    }

    fn with_object(&self, handle: AnchorHandle, f: impl FnOnce(&mut SceneObject)) {
        match self.state.borrow_mut().objects.get_mut(&handle) {
            Some(object) => f(object),
            None => log::warn!("scene: unknown anchor {:?}", handle),
        }
    }
}

impl<S: PixelSurface> SceneAnchor<S> for HeadlessScene {
    fn attach(&mut self, root: WidgetId, buffer: &S) -> AnchorHandle {
        let mut state = self.state.borrow_mut();
        let handle = AnchorHandle::new(state.next_handle);
        state.next_handle += 1;
        state.objects.insert(
            handle,
            SceneObject {
                root,
                position: (0, 0),
                depth: 0,
                visible: true,
                tint: Color::WHITE,
                size: buffer.size(),
                redraws: 0,
            },
        );
        state.record(SceneCommand::Attach { handle, root });
        handle
    }

    fn set_position(&mut self, handle: AnchorHandle, x: i32, y: i32) {
        self.with_object(handle, |o| o.position = (x, y));
        self.state
            .borrow_mut()
            .record(SceneCommand::SetPosition { handle, x, y });
    }

    fn set_altitude(&mut self, handle: AnchorHandle, depth: u32) {
        self.with_object(handle, |o| o.depth = depth);
        self.state
            .borrow_mut()
            .record(SceneCommand::SetAltitude { handle, depth });
    }

    fn set_visible(&mut self, handle: AnchorHandle, visible: bool) {
        self.with_object(handle, |o| o.visible = visible);
        self.state
            .borrow_mut()
            .record(SceneCommand::SetVisible { handle, visible });
    }

    fn set_tint(&mut self, handle: AnchorHandle, color: Color, duration: Duration) {
        // No animation here: the target tone applies at once.
        self.with_object(handle, |o| o.tint = color);
        self.state.borrow_mut().record(SceneCommand::SetTint {
            handle,
            color,
            duration,
        });
    }

    fn relink(&mut self, handle: AnchorHandle, buffer: &S) {
        let (width, height) = buffer.size();
        self.with_object(handle, |o| o.size = (width, height));
        self.state.borrow_mut().record(SceneCommand::Relink {
            handle,
            width,
            height,
        });
    }

    fn request_redraw(&mut self, handle: AnchorHandle, _buffer: &S) {
        self.with_object(handle, |o| o.redraws += 1);
        self.state.borrow_mut().record(SceneCommand::Redraw(handle));
    }

    fn detach(&mut self, handle: AnchorHandle) {
        let mut state = self.state.borrow_mut();
        let root = state.objects.get_mut(&handle).map(|o| {
            o.visible = false;
            o.root
        });
        match root {
            Some(root) => {
                if !state.pending_deletions.iter().any(|(h, _)| *h == handle) {
                    state.pending_deletions.push((handle, root));
                }
            }
            None => log::warn!("scene: detach of unknown anchor {:?}", handle),
        }
        state.record(SceneCommand::Detach(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SoftwareSurface;

    fn root(n: u32) -> WidgetId {
        WidgetId::from_raw_parts(n, 0)
    }

    #[test]
    fn test_attach_tracks_object() {
        let mut scene = HeadlessScene::new();
        let buffer = SoftwareSurface::new(7, 3, true);

        let handle = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(1), &buffer);

        let object = scene.object(handle).unwrap();
        assert_eq!(object.root, root(1));
        assert_eq!(object.size, (7, 3));
        assert!(object.visible);
        assert_eq!(
            scene.drain_commands(),
            vec![SceneCommand::Attach { handle, root: root(1) }]
        );
        assert!(scene.drain_commands().is_empty());
    }

    #[test]
    fn test_paint_order_follows_depth() {
        let mut scene = HeadlessScene::new();
        let buffer = SoftwareSurface::new(1, 1, true);
        let a = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(1), &buffer);
        let b = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(2), &buffer);
        let c = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(3), &buffer);

        SceneAnchor::<SoftwareSurface>::set_altitude(&mut scene, a, 30);
        SceneAnchor::<SoftwareSurface>::set_altitude(&mut scene, b, 10);
        SceneAnchor::<SoftwareSurface>::set_altitude(&mut scene, c, 20);
        SceneAnchor::<SoftwareSurface>::set_visible(&mut scene, c, false);

        assert_eq!(scene.paint_order(), vec![root(2), root(1)]);
    }

    #[test]
    fn test_equal_depths_keep_attach_order() {
        let mut scene = HeadlessScene::new();
        let buffer = SoftwareSurface::new(1, 1, true);
        for n in [9, 2, 5] {
            let handle = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(n), &buffer);
            SceneAnchor::<SoftwareSurface>::set_altitude(&mut scene, handle, 3);
        }

        assert_eq!(scene.paint_order(), vec![root(9), root(2), root(5)]);
    }

    #[test]
    fn test_detach_queues_single_deletion() {
        let mut scene = HeadlessScene::new();
        let buffer = SoftwareSurface::new(1, 1, true);
        let handle = SceneAnchor::<SoftwareSurface>::attach(&mut scene, root(4), &buffer);

        SceneAnchor::<SoftwareSurface>::detach(&mut scene, handle);
        SceneAnchor::<SoftwareSurface>::detach(&mut scene, handle);

        assert_eq!(scene.state.borrow().pending_deletions.len(), 1);
        assert!(!scene.object(handle).unwrap().visible);
    }
}
