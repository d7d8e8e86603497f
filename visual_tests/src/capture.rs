use std::time::Duration;

use image::RgbaImage;
use plaster::prelude::*;

use crate::recipe::{Recipe, Step};
use crate::{Result, VisualTestError};

const FRAME: Duration = Duration::from_millis(16);

/// Run a recipe through the widget tree and capture the root buffer after
/// the last frame.
pub fn capture_composited(recipe: &Recipe) -> Result<RgbaImage> {
    let scene = HeadlessScene::new();
    let mut tree = Tree::<SoftwareSurface>::new(GuiConfig::default(), scene.clone());
    let (width, height) = recipe.size;

    let root = tree.create(None, idle(), None, false)?;
    tree.set_top_level(root, Altitude::Explicit(0), Rect::from_size(width, height))?;
    paint(&mut tree, root, recipe.background)?;

    let mut ids = Vec::with_capacity(recipe.layers.len());
    let mut slots = Vec::with_capacity(recipe.layers.len());
    for (index, layer) in recipe.layers.iter().enumerate() {
        let parent = match layer.parent {
            None => root,
            Some(p) if p < index => ids[p],
            Some(p) => {
                return Err(VisualTestError::Recipe(format!(
                    "layer {} of '{}' names later layer {} as parent",
                    index, recipe.name, p
                )))
            }
        };
        let id = tree.create(Some(parent), idle(), None, false)?;
        let slot = recipe.children_of(layer.parent).iter().position(|&i| i == index);
        ids.push(id);
        slots.push((parent, slot.unwrap_or_default()));
    }

    tree.set_child_count(root, recipe.children_of(None).len())?;
    for (index, &id) in ids.iter().enumerate() {
        tree.set_child_count(id, recipe.children_of(Some(index)).len())?;
    }
    for (index, layer) in recipe.layers.iter().enumerate() {
        let (parent, slot) = slots[index];
        tree.set_child(parent, slot, Some(ids[index]))?;
        tree.set_child_rect(parent, slot, layer.rect)?;
        paint(&mut tree, ids[index], layer.color)?;
    }
    scene.tick(&mut tree, FRAME);

    for step in &recipe.steps {
        match *step {
            Step::Paint { layer, color } => paint(&mut tree, layer_id(&ids, layer)?, color)?,
            Step::Move { layer, rect } => {
                layer_id(&ids, layer)?;
                let (parent, slot) = slots[layer];
                tree.set_child_rect(parent, slot, rect)?;
            }
            Step::Remove { layer } => tree.delete(layer_id(&ids, layer)?)?,
            Step::Frame => scene.tick(&mut tree, FRAME),
        }
    }
    scene.tick(&mut tree, FRAME);

    let stats = tree.stats();
    log::debug!(
        "'{}': {} snapshots, {} restores, {} blits",
        recipe.name,
        stats.snapshots,
        stats.restores,
        stats.blits
    );

    tree.drawing_surface(root)
        .map(|surface| surface.image().clone())
        .ok_or_else(|| VisualTestError::Recipe(format!("root of '{}' vanished", recipe.name)))
}

fn idle() -> Box<dyn Holder<SoftwareSurface>> {
    from_fn(|_, _, _| EventResponse::Ignored)
}

fn paint(tree: &mut Tree<SoftwareSurface>, id: WidgetId, color: Color) -> Result<()> {
    if let Some(surface) = tree.drawing_surface_mut(id) {
        surface.clear(color);
    }
    tree.mark_dirty(id)?;
    Ok(())
}

fn layer_id(ids: &[WidgetId], layer: usize) -> Result<WidgetId> {
    ids.get(layer)
        .copied()
        .ok_or_else(|| VisualTestError::Recipe(format!("no layer {}", layer)))
}
