use std::path::{Path, PathBuf};

use crate::foundation::{
    core::FrameIndex,
    error::{RenderqError, RenderqResult},
};
use crate::host::scene::FileFormat;

/// Stable node handle within one [`NodeTree`]. Ids are never reused after removal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

/// Compositor node types and their parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Render-layer passes of the frame being rendered.
    RenderLayers,
    /// Split a colour into four scalar sockets.
    SeparateRgba,
    /// Join four scalar sockets into a colour.
    CombineRgba,
    /// Linear remap of a scalar from one range to another.
    MapRange {
        /// Input range start.
        from_min: f32,
        /// Input range end.
        from_max: f32,
        /// Output range start.
        to_min: f32,
        /// Output range end.
        to_max: f32,
        /// Clamp the result to the output range.
        clamp: bool,
    },
    /// `1 - c` on the colour channels; alpha passes through.
    Invert,
    /// Writes its `Image` input to `{base_path}/{slot_path}####.{ext}`.
    OutputFile {
        /// Output directory.
        base_path: PathBuf,
        /// Filename prefix before the frame number.
        slot_path: String,
        /// Image format of the written file.
        format: FileFormat,
    },
}

impl NodeKind {
    /// Node type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RenderLayers => "RenderLayers",
            Self::SeparateRgba => "SeparateRgba",
            Self::CombineRgba => "CombineRgba",
            Self::MapRange { .. } => "MapRange",
            Self::Invert => "Invert",
            Self::OutputFile { .. } => "OutputFile",
        }
    }

    /// Input socket names.
    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            Self::RenderLayers => &[],
            Self::SeparateRgba => &["Image"],
            Self::CombineRgba => &["R", "G", "B", "A"],
            Self::MapRange { .. } => &["Value"],
            Self::Invert => &["Color"],
            Self::OutputFile { .. } => &["Image"],
        }
    }

    /// Output socket names.
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            Self::RenderLayers => &["Image", "Alpha", "Depth", "Vector"],
            Self::SeparateRgba => &["R", "G", "B", "A"],
            Self::CombineRgba => &["Image"],
            Self::MapRange { .. } => &["Value"],
            Self::Invert => &["Color"],
            Self::OutputFile { .. } => &[],
        }
    }

    fn default_input(&self, socket: &str) -> Rgba {
        match (self, socket) {
            (Self::CombineRgba, "A") => splat(1.0),
            (Self::CombineRgba, _) => splat(0.0),
            (Self::MapRange { .. }, _) => splat(1.0),
            (Self::Invert, _) => [1.0, 1.0, 1.0, 1.0],
            _ => [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// A node placed in a [`NodeTree`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// Handle of the node in its tree.
    pub id: NodeId,
    /// Node type and parameters.
    pub kind: NodeKind,
}

/// Directed edge from an output socket to an input socket.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    /// Source node.
    pub from_node: NodeId,
    /// Output socket on the source node.
    pub from_socket: String,
    /// Destination node.
    pub to_node: NodeId,
    /// Input socket on the destination node.
    pub to_socket: String,
}

/// Per-pixel socket value. Scalars travel as `[v, v, v, 1]`.
pub type Rgba = [f32; 4];

fn splat(v: f32) -> Rgba {
    [v, v, v, 1.0]
}

/// Render-layer passes fed into [`NodeTree::evaluate`].
///
/// `vector` follows the host's motion-vector layout: `[bwd.x, bwd.y, fwd.x, fwd.y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderLayerSample {
    /// Combined colour pass.
    pub image: Rgba,
    /// Z pass: distance from the camera.
    pub depth: f32,
    /// Motion-vector pass.
    pub vector: Rgba,
}

/// Value resolved at one file-output node.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeOutput {
    /// The file-output node.
    pub node: NodeId,
    /// Output directory of the node.
    pub base_path: PathBuf,
    /// Filename prefix of the node.
    pub slot_path: String,
    /// Image format of the node.
    pub format: FileFormat,
    /// Value reaching the node's `Image` input.
    pub value: Rgba,
}

impl CompositeOutput {
    /// `{base_path}/{slot_path}{frame:04}.{ext}`
    pub fn file_path(&self, frame: FrameIndex) -> PathBuf {
        output_file_path(&self.base_path, &self.slot_path, self.format, frame)
    }
}

/// File written by a file-output node for `frame`: `{base_path}/{slot_path}{frame:04}.{ext}`.
pub fn output_file_path(
    base_path: &Path,
    slot_path: &str,
    format: FileFormat,
    frame: FrameIndex,
) -> PathBuf {
    base_path.join(format!("{slot_path}{:04}.{}", frame.0, format.extension()))
}

/// The scene's compositing node graph.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeTree {
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_id: u32,
}

impl NodeTree {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every link in the graph.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Add a node and return its fresh id.
    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node { id, kind });
        id
    }

    /// Remove a node and every link touching it. Returns `false` if the node did not exist.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.links.retain(|l| l.from_node != id && l.to_node != id);
        self.nodes.len() != before
    }

    /// Remove every node. Returns how many nodes were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.nodes.len();
        self.nodes.clear();
        self.links.clear();
        removed
    }

    /// Connect an output socket to an input socket, replacing any link already feeding that
    /// input.
    pub fn link(
        &mut self,
        from_node: NodeId,
        from_socket: &str,
        to_node: NodeId,
        to_socket: &str,
    ) -> RenderqResult<()> {
        let from = self.require(from_node)?;
        if !from.kind.outputs().contains(&from_socket) {
            return Err(RenderqError::compositor(format!(
                "{} has no output socket '{from_socket}'",
                from.kind.name()
            )));
        }
        let to = self.require(to_node)?;
        if !to.kind.inputs().contains(&to_socket) {
            return Err(RenderqError::compositor(format!(
                "{} has no input socket '{to_socket}'",
                to.kind.name()
            )));
        }

        self.links
            .retain(|l| !(l.to_node == to_node && l.to_socket == to_socket));
        self.links.push(Link {
            from_node,
            from_socket: from_socket.to_string(),
            to_node,
            to_socket: to_socket.to_string(),
        });
        Ok(())
    }

    /// File-output nodes in creation order.
    pub fn file_outputs(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::OutputFile { .. }))
    }

    /// Resolve the value reaching every file-output node for one render-layer sample.
    pub fn evaluate(&self, sample: &RenderLayerSample) -> RenderqResult<Vec<CompositeOutput>> {
        let mut out = Vec::new();
        for node in self.file_outputs() {
            let NodeKind::OutputFile {
                base_path,
                slot_path,
                format,
            } = &node.kind
            else {
                continue;
            };
            let value = self.eval_input(node, "Image", sample, 0)?;
            out.push(CompositeOutput {
                node: node.id,
                base_path: base_path.clone(),
                slot_path: slot_path.clone(),
                format: *format,
                value,
            });
        }
        Ok(out)
    }

    fn require(&self, id: NodeId) -> RenderqResult<&Node> {
        self.node(id)
            .ok_or_else(|| RenderqError::compositor(format!("node {} does not exist", id.0)))
    }

    fn eval_input(
        &self,
        node: &Node,
        socket: &str,
        sample: &RenderLayerSample,
        depth: usize,
    ) -> RenderqResult<Rgba> {
        let link = self
            .links
            .iter()
            .find(|l| l.to_node == node.id && l.to_socket == socket);
        match link {
            Some(l) => {
                let src = self.require(l.from_node)?;
                self.eval_output(src, &l.from_socket, sample, depth + 1)
            }
            None => Ok(node.kind.default_input(socket)),
        }
    }

    fn eval_output(
        &self,
        node: &Node,
        socket: &str,
        sample: &RenderLayerSample,
        depth: usize,
    ) -> RenderqResult<Rgba> {
        if depth > self.nodes.len() {
            return Err(RenderqError::compositor("cycle in compositor graph"));
        }

        match &node.kind {
            NodeKind::RenderLayers => match socket {
                "Image" => Ok(sample.image),
                "Alpha" => Ok(splat(sample.image[3])),
                "Depth" => Ok(splat(sample.depth)),
                "Vector" => Ok(sample.vector),
                _ => Err(RenderqError::compositor(format!(
                    "RenderLayers has no output socket '{socket}'"
                ))),
            },
            NodeKind::SeparateRgba => {
                let c = self.eval_input(node, "Image", sample, depth)?;
                let channel = match socket {
                    "R" => 0,
                    "G" => 1,
                    "B" => 2,
                    "A" => 3,
                    _ => {
                        return Err(RenderqError::compositor(format!(
                            "SeparateRgba has no output socket '{socket}'"
                        )));
                    }
                };
                Ok(splat(c[channel]))
            }
            NodeKind::CombineRgba => {
                let r = self.eval_input(node, "R", sample, depth)?;
                let g = self.eval_input(node, "G", sample, depth)?;
                let b = self.eval_input(node, "B", sample, depth)?;
                let a = self.eval_input(node, "A", sample, depth)?;
                Ok([r[0], g[0], b[0], a[0]])
            }
            NodeKind::MapRange {
                from_min,
                from_max,
                to_min,
                to_max,
                clamp,
            } => {
                let v = self.eval_input(node, "Value", sample, depth)?[0];
                let span = from_max - from_min;
                let t = if span == 0.0 {
                    0.0
                } else {
                    (v - from_min) / span
                };
                let mut mapped = to_min + t * (to_max - to_min);
                if *clamp {
                    mapped = mapped.clamp(to_min.min(*to_max), to_min.max(*to_max));
                }
                Ok(splat(mapped))
            }
            NodeKind::Invert => {
                let c = self.eval_input(node, "Color", sample, depth)?;
                Ok([1.0 - c[0], 1.0 - c[1], 1.0 - c[2], c[3]])
            }
            NodeKind::OutputFile { .. } => Err(RenderqError::compositor(
                "OutputFile nodes have no output sockets",
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/graph.rs"]
mod tests;
