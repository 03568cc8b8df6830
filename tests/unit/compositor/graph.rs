use super::*;

fn sample() -> RenderLayerSample {
    RenderLayerSample {
        image: [0.2, 0.4, 0.6, 1.0],
        depth: 3.0,
        vector: [1.0, 2.0, 3.0, 4.0],
    }
}

fn exr_out(tree: &mut NodeTree, slot: &str) -> NodeId {
    tree.new_node(NodeKind::OutputFile {
        base_path: PathBuf::from("out"),
        slot_path: slot.to_string(),
        format: FileFormat::OpenExr,
    })
}

#[test]
fn link_validates_sockets() {
    let mut tree = NodeTree::new();
    let rl = tree.new_node(NodeKind::RenderLayers);
    let sep = tree.new_node(NodeKind::SeparateRgba);
    assert!(tree.link(rl, "Vector", sep, "Image").is_ok());
    assert!(tree.link(rl, "Normal", sep, "Image").is_err());
    assert!(tree.link(rl, "Depth", sep, "R").is_err());
    assert!(tree.link(rl, "Depth", NodeId(99), "Image").is_err());
}

#[test]
fn relinking_an_input_replaces_the_old_link() {
    let mut tree = NodeTree::new();
    let rl = tree.new_node(NodeKind::RenderLayers);
    let out = exr_out(&mut tree, "x_");
    tree.link(rl, "Image", out, "Image").unwrap();
    tree.link(rl, "Vector", out, "Image").unwrap();
    assert_eq!(tree.links().len(), 1);
    let outputs = tree.evaluate(&sample()).unwrap();
    assert_eq!(outputs[0].value, [1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn remove_node_drops_its_links_and_ids_are_not_reused() {
    let mut tree = NodeTree::new();
    let rl = tree.new_node(NodeKind::RenderLayers);
    let out = exr_out(&mut tree, "x_");
    tree.link(rl, "Image", out, "Image").unwrap();
    assert!(tree.remove_node(rl));
    assert!(!tree.remove_node(rl));
    assert!(tree.links().is_empty());
    let again = tree.new_node(NodeKind::RenderLayers);
    assert_ne!(again, rl);
}

#[test]
fn clear_is_idempotent() {
    let mut tree = NodeTree::new();
    tree.new_node(NodeKind::RenderLayers);
    tree.new_node(NodeKind::Invert);
    assert_eq!(tree.clear(), 2);
    assert_eq!(tree.clear(), 0);
    assert!(tree.is_empty());
}

#[test]
fn split_and_recombine_swaps_vector_channels() {
    let mut tree = NodeTree::new();
    let rl = tree.new_node(NodeKind::RenderLayers);
    let sep = tree.new_node(NodeKind::SeparateRgba);
    let comb = tree.new_node(NodeKind::CombineRgba);
    let out = exr_out(&mut tree, "fwd_flow_");
    tree.link(rl, "Vector", sep, "Image").unwrap();
    tree.link(sep, "B", comb, "R").unwrap();
    tree.link(sep, "A", comb, "G").unwrap();
    tree.link(comb, "Image", out, "Image").unwrap();

    let outputs = tree.evaluate(&sample()).unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].value, [3.0, 4.0, 0.0, 1.0]);
}

#[test]
fn map_range_then_invert_normalises_depth() {
    let mut tree = NodeTree::new();
    let rl = tree.new_node(NodeKind::RenderLayers);
    let map = tree.new_node(NodeKind::MapRange {
        from_min: 0.0,
        from_max: 6.0,
        to_min: 0.0,
        to_max: 1.0,
        clamp: false,
    });
    let inv = tree.new_node(NodeKind::Invert);
    let out = exr_out(&mut tree, "depth_");
    tree.link(rl, "Depth", map, "Value").unwrap();
    tree.link(map, "Value", inv, "Color").unwrap();
    tree.link(inv, "Color", out, "Image").unwrap();

    let outputs = tree.evaluate(&sample()).unwrap();
    assert_eq!(outputs[0].value, [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn unlinked_output_falls_back_to_defaults() {
    let mut tree = NodeTree::new();
    let comb = tree.new_node(NodeKind::CombineRgba);
    let out = exr_out(&mut tree, "x_");
    tree.link(comb, "Image", out, "Image").unwrap();
    let outputs = tree.evaluate(&sample()).unwrap();
    assert_eq!(outputs[0].value, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn output_paths_pad_frame_numbers() {
    let p = output_file_path(
        Path::new("base/depth"),
        "depth_",
        FileFormat::OpenExr,
        FrameIndex(7),
    );
    assert_eq!(p, PathBuf::from("base/depth/depth_0007.exr"));
}
