use plaster::prelude::{Color, Rect};

/// A leaf widget of a recipe, painted a flat color.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Earlier layer this one is a child of; `None` for a child of the root.
    pub parent: Option<usize>,
    /// Rectangle relative to the parent.
    pub rect: Rect,
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Repaint a layer and mark it dirty.
    Paint { layer: usize, color: Color },
    /// Give a layer a new rectangle, relative to its parent.
    Move { layer: usize, rect: Rect },
    /// Delete a layer.
    Remove { layer: usize },
    /// Run a draw tick.
    Frame,
}

/// A root buffer, leaves drawn into it, and changes applied over frames.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub size: (u32, u32),
    pub background: Color,
    pub layers: Vec<Layer>,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn new(name: &str, width: u32, height: u32, background: Color) -> Self {
        Self {
            name: name.to_string(),
            size: (width, height),
            background,
            layers: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn layer(mut self, parent: Option<usize>, rect: Rect, color: Color) -> Self {
        self.layers.push(Layer {
            parent,
            rect,
            color,
        });
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Children of `parent` (`None` for the root), in slot order.
    pub(crate) fn children_of(&self, parent: Option<usize>) -> Vec<usize> {
        (0..self.layers.len())
            .filter(|&i| self.layers[i].parent == parent)
            .collect()
    }
}
