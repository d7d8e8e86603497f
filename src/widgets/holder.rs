use crate::surface::PixelSurface;
use crate::tree::{Tree, WidgetId};
use crate::widgets::{Event, EventResponse, Notification};

/// The external object a widget node stands for (a button, a dialog...).
///
/// The tree stores the holder next to the node and hands it back the tree
/// on every callback, so a holder can paint its drawing surface, mark
/// itself dirty, or rearrange its children from inside a callback. While a
/// callback runs the holder is taken out of its node: events routed to the
/// same node from inside its own callback are ignored.
///
/// Sending a notification upwards with [`Tree::throw_event`] should be the
/// last thing a callback does, since the parent may delete the sender.
pub trait Holder<S: PixelSurface> {
    /// Event received from the parent (or from the scene, for a top-level
    /// widget).
    fn on_down(&mut self, tree: &mut Tree<S>, id: WidgetId, event: &Event) -> EventResponse;

    /// Notification received from child number `child`.
    fn on_up(&mut self, tree: &mut Tree<S>, id: WidgetId, child: usize, notification: Notification) {
        let _ = (tree, id, child, notification);
    }
}

/// Holder built from a closure; it ignores upward notifications.
pub struct FnHolder<F>(F);

impl<S, F> Holder<S> for FnHolder<F>
where
    S: PixelSurface,
    F: FnMut(&mut Tree<S>, WidgetId, &Event) -> EventResponse,
{
    fn on_down(&mut self, tree: &mut Tree<S>, id: WidgetId, event: &Event) -> EventResponse {
        (self.0)(tree, id, event)
    }
}

/// Box a closure as a holder.
///
/// ```ignore
/// let id = tree.create(Some(parent), from_fn(|_tree, _id, _event| EventResponse::Ignored), None, true)?;
/// ```
pub fn from_fn<S, F>(f: F) -> Box<dyn Holder<S>>
where
    S: PixelSurface + 'static,
    F: FnMut(&mut Tree<S>, WidgetId, &Event) -> EventResponse + 'static,
{
    Box::new(FnHolder(f))
}
