//! Save/restore compositing.
//!
//! Every non-root widget with pixels is composited straight into its
//! top-level widget's drawing buffer. Before a leaf is blitted the pixels
//! under it are snapshotted into its save buffer; when the leaf changes
//! again the snapshot is put back first and the new content blitted on top.
//! This handles overlapping and semi-transparent widgets without repainting
//! what lies under them.
//!
//! The pass runs once per draw tick, from the root:
//!
//! - a widget whose parent was repainted snapshots again and is blitted,
//!   and so are all its descendants;
//! - otherwise a dirty widget restores its background and is blitted, and
//!   its descendants are treated as repainted;
//! - anything else is left alone, which makes a second pass with no change
//!   in between free.

use crate::error::{violation, Result, WidgetError};
use crate::surface::PixelSurface;
use crate::tree::{NodeFlags, Surfaces, Tree, WidgetId};

/// Buffer operations performed by the compositor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompositeStats {
    /// Backgrounds copied into save buffers.
    pub snapshots: u64,
    /// Backgrounds copied back from save buffers.
    pub restores: u64,
    /// Drawing buffers blitted into a root buffer.
    pub blits: u64,
    /// Root buffers handed to the scene for presentation.
    pub redraw_requests: u64,
}

impl CompositeStats {
    /// Total buffer copies.
    pub fn copies(&self) -> u64 {
        self.snapshots + self.restores + self.blits
    }
}

impl<S: PixelSurface> Tree<S> {
    /// Flag a widget's drawing buffer as changed. Nothing is copied until
    /// the next draw tick reaches its root.
    pub fn mark_dirty(&mut self, id: WidgetId) -> Result<()> {
        self.index_of(id)?;
        match self.node_mut(id) {
            Some(node) if node.is_container() => Err(violation(WidgetError::NoSurface(id))),
            Some(node) => {
                node.flags.insert(NodeFlags::DIRTY);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> CompositeStats {
        self.stats
    }

    /// Read and reset the counters.
    pub fn take_stats(&mut self) -> CompositeStats {
        std::mem::take(&mut self.stats)
    }

    /// Composite the subtree of a top-level widget and ask the scene to
    /// present its buffer when anything changed.
    pub(crate) fn composite_root(&mut self, root: WidgetId) {
        let Some(node) = self.node(root) else {
            return;
        };
        let Some(handle) = node.anchor else {
            return;
        };
        let flags = node.flags;
        let children: Vec<WidgetId> = node.children.iter().flatten().copied().collect();
        let repainted = flags.contains(NodeFlags::DIRTY);

        self.with_root_target(root, |tree, target| {
            let mut changed = false;
            for child in children {
                changed |= tree.composite(child, repainted, target);
            }
            if changed || flags.intersects(NodeFlags::DIRTY | NodeFlags::PRESENT) {
                tree.anchor.request_redraw(handle, target);
                tree.stats.redraw_requests += 1;
            }
        });

        if let Some(node) = self.node_mut(root) {
            node.flags.remove(NodeFlags::DIRTY | NodeFlags::PRESENT);
        }
    }

    /// Returns whether anything was copied into `target` for this subtree.
    fn composite(&mut self, id: WidgetId, parent_repainted: bool, target: &mut S) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };

        let rect = node.rect;
        let repaint = parent_repainted || node.flags.contains(NodeFlags::DIRTY);
        let mut copies = CompositeStats::default();

        if repaint {
            let saved = node.last_composited;
            if let Surfaces::Leaf { save, draw } = &mut node.surfaces {
                match saved {
                    Some(previous) if !parent_repainted => {
                        target.copy_rect(save, save.bounds(), previous.x, previous.y);
                        copies.restores += 1;
                    }
                    _ => {
                        save.copy_rect(target, rect, 0, 0);
                        copies.snapshots += 1;
                    }
                }
                target.blit(draw, draw.bounds(), rect.x, rect.y);
                copies.blits += 1;
                node.last_composited = Some(rect);
            }
        }
        node.flags.remove(NodeFlags::DIRTY);
        let children: Vec<WidgetId> = node.children.iter().flatten().copied().collect();

        self.stats.snapshots += copies.snapshots;
        self.stats.restores += copies.restores;
        self.stats.blits += copies.blits;

        let mut changed = repaint;
        for child in children {
            changed |= self.composite(child, repaint, target);
        }
        changed
    }

    /// Put back the pixels a leaf covered when it was last composited.
    ///
    /// The leaf then counts as never composited: it snapshots again the
    /// next time it is dirty.
    pub(crate) fn restore_background(&mut self, id: WidgetId) {
        let Some(previous) = self.node(id).and_then(|n| n.last_composited) else {
            return;
        };
        let root = self.root_of(id);

        let restored = root
            .and_then(|root| {
                self.with_root_target(root, |tree, target| match &tree.node(id)?.surfaces {
                    Surfaces::Leaf { save, .. } => {
                        target.copy_rect(save, save.bounds(), previous.x, previous.y);
                        Some(())
                    }
                    _ => None,
                })
            })
            .flatten()
            .is_some();

        if let Some(node) = self.node_mut(id) {
            node.last_composited = None;
        }
        if restored {
            self.stats.restores += 1;
            if let Some(root) = root.and_then(|root| self.node_mut(root)) {
                root.flags.insert(NodeFlags::PRESENT);
            }
        }
    }

    /// Restore the backgrounds of a whole subtree, last composited first.
    pub(crate) fn restore_subtree(&mut self, id: WidgetId) {
        for node in self.subtree(id).into_iter().rev() {
            self.restore_background(node);
        }
    }

    /// Run `f` with the drawing buffer of top-level widget `root` taken out
    /// of its node, so descendants' buffers can be copied into it.
    fn with_root_target<R>(
        &mut self,
        root: WidgetId,
        f: impl FnOnce(&mut Self, &mut S) -> R,
    ) -> Option<R> {
        let node = self.node_mut(root)?;
        let mut target = match std::mem::replace(&mut node.surfaces, Surfaces::Container) {
            Surfaces::Root { draw } => draw,
            other => {
                node.surfaces = other;
                return None;
            }
        };

        let result = f(self, &mut target);

        if let Some(node) = self.node_mut(root) {
            node.surfaces = Surfaces::Root { draw: target };
        }
        Some(result)
    }
}
