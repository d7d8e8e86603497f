use plaster::prelude::{Color, Rect};
use visual_tests::{run_visual_test, Recipe, Step, VisualTestConfig};

const BACKDROP: Color = Color::rgb(0x20, 0x24, 0x30);

/// Helper macro to generate visual test functions
macro_rules! visual_test {
    ($name:ident, $recipe:expr) => {
        #[test]
        fn $name() {
            let _ = env_logger::builder().is_test(true).try_init();
            let recipe: Recipe = $recipe;

            let result = run_visual_test(&recipe, &VisualTestConfig::default())
                .expect("Visual test failed to run");

            assert!(
                result.passed,
                "Compositing differs from a full repaint for '{}': similarity {:.4}%, {} pixels off\n\
                 Captured:  {}\n\
                 Diff:      {}",
                recipe.name,
                result.similarity * 100.0,
                result.differing_pixels,
                result
                    .captured_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                result
                    .diff_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            );
        }
    };
}

fn nested_translucent() -> Recipe {
    Recipe::new("nested_translucent", 96, 96, BACKDROP)
        .layer(None, Rect::new(8, 8, 64, 64), Color::rgba(0xE0, 0x40, 0x40, 0x80))
        .layer(Some(0), Rect::new(8, 8, 24, 24), Color::rgba(0x40, 0x40, 0xE0, 0xA0))
        .step(Step::Paint {
            layer: 0,
            color: Color::rgba(0x40, 0xE0, 0x40, 0x60),
        })
        .step(Step::Frame)
        .step(Step::Paint {
            layer: 1,
            color: Color::rgba(0xFF, 0xFF, 0xFF, 0x30),
        })
        .step(Step::Frame)
        .step(Step::Paint {
            layer: 0,
            color: Color::rgba(0x40, 0xE0, 0xE0, 0xC0),
        })
}

fn moving_leaf() -> Recipe {
    Recipe::new("moving_leaf", 120, 60, BACKDROP)
        .layer(None, Rect::new(0, 0, 20, 20), Color::rgba(0xF0, 0xA0, 0x20, 0xC0))
        .layer(None, Rect::new(0, 40, 120, 20), Color::rgb(0x30, 0x30, 0x30))
        .step(Step::Move {
            layer: 0,
            rect: Rect::new(30, 5, 20, 20),
        })
        .step(Step::Frame)
        .step(Step::Move {
            layer: 0,
            rect: Rect::new(45, 10, 30, 20),
        })
        .step(Step::Paint {
            layer: 0,
            color: Color::rgba(0x20, 0xA0, 0xF0, 0x90),
        })
        .step(Step::Frame)
        .step(Step::Move {
            layer: 0,
            rect: Rect::new(110, 10, 30, 20),
        })
        // A resize clears the drawing buffer.
        .step(Step::Paint {
            layer: 0,
            color: Color::rgba(0x20, 0xA0, 0xF0, 0x90),
        })
}

fn removed_leaf() -> Recipe {
    Recipe::new("removed_leaf", 64, 64, BACKDROP)
        .layer(None, Rect::new(4, 4, 28, 28), Color::rgba(0xFF, 0x00, 0x80, 0xB0))
        .layer(None, Rect::new(36, 36, 24, 24), Color::rgb(0x00, 0x80, 0x40))
        .layer(Some(0), Rect::new(4, 4, 8, 8), Color::WHITE)
        .step(Step::Frame)
        .step(Step::Remove { layer: 0 })
        .step(Step::Paint {
            layer: 1,
            color: Color::rgba(0x80, 0x80, 0x00, 0x80),
        })
}

visual_test!(test_nested_translucent, nested_translucent());
visual_test!(test_moving_leaf, moving_leaf());
visual_test!(test_removed_leaf, removed_leaf());
