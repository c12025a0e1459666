//! CLI command implementations.
//!
//! - `hatch` - Hatch a scene file to SVG or JSON
//! - `outline` - Write only the silhouette of a scene
//! - `demo` - Hatch the built-in five-shape scene
//! - `patterns` / `modes` - List presets and hatch modes

pub mod hatch;
pub mod render;
pub mod scene;

pub use hatch::{DemoArgs, HatchArgs, OutlineArgs, cmd_demo, cmd_hatch, cmd_outline};

use hatchery::{HatchMode, HatchPattern};

/// List hatch presets in style-tag order.
pub fn cmd_patterns() {
    println!("Available patterns:");
    for (i, pattern) in HatchPattern::presets().iter().enumerate() {
        let angles: Vec<String> = pattern.angles.iter().map(|a| format!("{}°", a)).collect();
        println!(
            "  {:>2}  {:<12} angles {:<20} spacing {}",
            i,
            pattern.name,
            angles.join(" "),
            pattern.spacing
        );
    }
    println!();
    println!("Style tags pick pattern (tag mod {}).", HatchPattern::presets().len());
}

/// List hatch modes.
pub fn cmd_modes() {
    println!("Hatch modes:");
    for mode in HatchMode::ALL {
        let marker = if mode == HatchMode::default() { " (default)" } else { "" };
        println!("  {:<12} {}{}", mode.name(), mode.description(), marker);
    }
}
