use std::path::Path;

use crate::compositor::graph::NodeKind;
use crate::foundation::error::RenderqResult;
use crate::host::scene::{FileFormat, Scene};

/// Remove every compositor node. Safe on an already empty graph.
pub fn clear_compositor(scene: &mut Scene) -> usize {
    scene.node_tree.clear()
}

/// Replace the compositor graph with one that writes optical flow from the vector pass.
///
/// The vector pass packs backward motion in R,G and forward motion in B,A. Each requested
/// direction gets its own two-channel image `{dir}/{fwd|bwd}_flow_{tag}####.exr`.
pub fn output_vector_field(
    scene: &mut Scene,
    forward: bool,
    backward: bool,
    dir: &Path,
    tag: &str,
) -> RenderqResult<()> {
    scene.render.use_compositing = true;
    scene.use_nodes = true;
    scene.view_layer.use_pass_vector = true;

    let tree = &mut scene.node_tree;
    tree.clear();

    let render_layers = tree.new_node(NodeKind::RenderLayers);
    let separate = tree.new_node(NodeKind::SeparateRgba);
    tree.link(render_layers, "Vector", separate, "Image")?;

    let mut wire = |src: [&str; 2], prefix: &str| -> RenderqResult<()> {
        let combine = tree.new_node(NodeKind::CombineRgba);
        tree.link(separate, src[0], combine, "R")?;
        tree.link(separate, src[1], combine, "G")?;
        let out = tree.new_node(NodeKind::OutputFile {
            base_path: dir.to_path_buf(),
            slot_path: format!("{prefix}_flow_{tag}"),
            format: FileFormat::OpenExr,
        });
        tree.link(combine, "Image", out, "Image")
    };

    if forward {
        wire(["B", "A"], "fwd")?;
    }
    if backward {
        wire(["R", "G"], "bwd")?;
    }
    Ok(())
}

/// Replace the compositor graph with one that writes normalised, inverted depth:
/// `1 - depth / max_distance`, so near is bright and `max_distance` maps to 0.
pub fn output_depth(scene: &mut Scene, max_distance: f32, dir: &Path) -> RenderqResult<()> {
    scene.render.use_compositing = true;
    scene.use_nodes = true;
    scene.view_layer.use_pass_z = true;

    let tree = &mut scene.node_tree;
    tree.clear();

    let render_layers = tree.new_node(NodeKind::RenderLayers);
    let map = tree.new_node(NodeKind::MapRange {
        from_min: 0.0,
        from_max: max_distance,
        to_min: 0.0,
        to_max: 1.0,
        clamp: false,
    });
    tree.link(render_layers, "Depth", map, "Value")?;

    let invert = tree.new_node(NodeKind::Invert);
    tree.link(map, "Value", invert, "Color")?;

    let out = tree.new_node(NodeKind::OutputFile {
        base_path: dir.to_path_buf(),
        slot_path: "depth_".to_string(),
        format: FileFormat::OpenExr,
    });
    tree.link(invert, "Color", out, "Image")
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/config.rs"]
mod tests;
