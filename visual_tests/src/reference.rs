use image::RgbaImage;
use plaster::prelude::{Color, PixelSurface, Rect, SoftwareSurface};

use crate::recipe::{Recipe, Step};

struct LayerState {
    rect: Rect,
    color: Color,
    removed: bool,
}

/// Repaint the final state of a recipe from scratch, back to front.
pub fn render_reference(recipe: &Recipe) -> RgbaImage {
    let (width, height) = recipe.size;
    let bounds = Rect::from_size(width, height);

    let mut layers: Vec<LayerState> = Vec::with_capacity(recipe.layers.len());
    for layer in &recipe.layers {
        let parent = layer.parent.map_or(bounds, |p| layers[p].rect);
        layers.push(LayerState {
            rect: fit(layer.rect, parent),
            color: layer.color,
            removed: false,
        });
    }

    for step in &recipe.steps {
        match *step {
            Step::Paint { layer, color } => layers[layer].color = color,
            Step::Move { layer, rect } => {
                let parent = recipe.layers[layer].parent.map_or(bounds, |p| layers[p].rect);
                layers[layer].rect = fit(rect, parent);
            }
            Step::Remove { layer } => layers[layer].removed = true,
            Step::Frame => {}
        }
    }

    let mut target = SoftwareSurface::new(width, height, true);
    target.clear(recipe.background);
    draw_children(recipe, &layers, None, &mut target);
    target.image().clone()
}

fn draw_children(
    recipe: &Recipe,
    layers: &[LayerState],
    parent: Option<usize>,
    target: &mut SoftwareSurface,
) {
    for index in recipe.children_of(parent) {
        let layer = &layers[index];
        if layer.removed {
            continue;
        }
        let mut surface = SoftwareSurface::new(layer.rect.width, layer.rect.height, true);
        surface.clear(layer.color);
        target.blit(&surface, surface.bounds(), layer.rect.x, layer.rect.y);
        draw_children(recipe, layers, Some(index), target);
    }
}

/// Child rectangle placement: relative to the parent, clipped to it, the
/// whole parent when nothing is left.
fn fit(rect: Rect, parent: Rect) -> Rect {
    let clipped = rect.offset(parent.x, parent.y).clip(&parent);
    if clipped.is_empty() {
        parent
    } else {
        clipped
    }
}
