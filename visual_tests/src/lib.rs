//! Visual regression checks for the compositor.
//!
//! A [`Recipe`] is run twice: through the widget tree, which only copies
//! what changed frame after frame, and through a plain back-to-front
//! repaint of its final state. Both images must match.

mod capture;
mod compare;
mod recipe;
mod reference;

pub use capture::capture_composited;
pub use compare::{compare_images, generate_diff_image, CompareResult};
pub use recipe::{Layer, Recipe, Step};
pub use reference::render_reference;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualTestError {
    #[error("Widget tree rejected the recipe: {0}")]
    Widget(#[from] plaster::error::WidgetError),
    #[error("Invalid recipe: {0}")]
    Recipe(String),
    #[error("Failed to compare images: {0}")]
    Compare(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, VisualTestError>;

/// Configuration for a visual test
#[derive(Clone)]
pub struct VisualTestConfig {
    /// Similarity threshold (0.0 to 1.0, default 0.999)
    pub similarity_threshold: f64,
    /// Save captured, reference and diff images when the test fails
    pub save_on_failure: bool,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.999,
            save_on_failure: true,
        }
    }
}

/// Result of a visual test
pub struct VisualTestResult {
    /// Whether the test passed (similar enough, no differing pixel)
    pub passed: bool,
    /// The similarity score (0.0 to 1.0)
    pub similarity: f64,
    pub differing_pixels: u64,
    /// Path to the captured image (if saved on failure)
    pub captured_path: Option<PathBuf>,
    /// Path to diff image (if saved on failure)
    pub diff_path: Option<PathBuf>,
}

/// Get the path to the output directory for test artifacts
pub fn output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("output")
}

/// Get the path to a captured image
pub fn captured_path(name: &str) -> PathBuf {
    output_dir().join(format!("{}_captured.png", name))
}

/// Get the path to a reference image
pub fn reference_path(name: &str) -> PathBuf {
    output_dir().join(format!("{}_reference.png", name))
}

/// Get the path to a diff image
pub fn diff_path(name: &str) -> PathBuf {
    output_dir().join(format!("{}_diff.png", name))
}

/// Run a visual regression test
pub fn run_visual_test(recipe: &Recipe, config: &VisualTestConfig) -> Result<VisualTestResult> {
    let captured = capture_composited(recipe)?;
    let reference = render_reference(recipe);

    let compare_result = compare_images(&reference, &captured)?;
    let passed = compare_result.similarity >= config.similarity_threshold
        && compare_result.differing_pixels == 0;

    let (captured_file, diff_file) = if !passed && config.save_on_failure {
        std::fs::create_dir_all(output_dir())?;
        let captured_file = captured_path(&recipe.name);
        let diff_file = diff_path(&recipe.name);
        captured.save(&captured_file)?;
        reference.save(reference_path(&recipe.name))?;
        generate_diff_image(&reference, &captured).save(&diff_file)?;
        (Some(captured_file), Some(diff_file))
    } else {
        (None, None)
    };

    Ok(VisualTestResult {
        passed,
        similarity: compare_result.similarity,
        differing_pixels: compare_result.differing_pixels,
        captured_path: captured_file,
        diff_path: diff_file,
    })
}
