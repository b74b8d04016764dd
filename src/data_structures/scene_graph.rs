//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: nodes live in one `Vec` and are addressed through
//! [`NodeId`] handles, so mutation points (the binding table) can be kept
//! outside the graph without re-traversal. A node is either a grouping node
//! or a drawable (mesh + material reference). Topology is frozen after
//! construction; later changes only touch transforms, colours and visibility.
//!
//! Transform semantics follow local/world [`Instance`] pairs: a node's world
//! transform is its parent's world transform composed with its own local one,
//! propagated root to leaf.

use log::warn;

use crate::data_structures::{
    instance::Instance,
    material::Material,
    mesh::MeshData,
};

/// Stable handle to a node. Valid for the lifetime of its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Stable handle to a material. Valid for the lifetime of its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

#[derive(Debug)]
pub enum NodeKind {
    Group,
    Drawable {
        mesh: MeshData,
        material: MaterialId,
        casts_shadow: bool,
    },
}

#[derive(Debug)]
pub struct Node {
    pub name: &'static str,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Instance,
    visible: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_drawable(&self) -> bool {
        matches!(self.kind, NodeKind::Drawable { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local(&self) -> &Instance {
        &self.local
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    materials: Vec<Material>,
    root: NodeId,
    transforms_dirty: bool,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = Node {
            name: "root",
            parent: None,
            children: Vec::new(),
            local: Instance::new(),
            visible: true,
            kind: NodeKind::Group,
        };
        Self {
            nodes: vec![root],
            materials: Vec::new(),
            root: NodeId(0),
            transforms_dirty: true,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, mat)| (MaterialId(idx), mat))
    }

    pub fn materials_mut(&mut self) -> impl Iterator<Item = (MaterialId, &mut Material)> {
        self.materials
            .iter_mut()
            .enumerate()
            .map(|(idx, mat)| (MaterialId(idx), mat))
    }

    pub fn add_group(&mut self, parent: NodeId, name: &'static str, local: Instance) -> NodeId {
        self.add_node(parent, name, local, NodeKind::Group)
    }

    pub fn add_drawable(
        &mut self,
        parent: NodeId,
        name: &'static str,
        local: Instance,
        mesh: MeshData,
        material: MaterialId,
        casts_shadow: bool,
    ) -> NodeId {
        self.add_node(
            parent,
            name,
            local,
            NodeKind::Drawable {
                mesh,
                material,
                casts_shadow,
            },
        )
    }

    fn add_node(
        &mut self,
        parent: NodeId,
        name: &'static str,
        local: Instance,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            parent: Some(parent),
            children: Vec::new(),
            local,
            visible: true,
            kind,
        });
        self.nodes[parent.0].children.push(id);
        self.transforms_dirty = true;
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn local(&self, id: NodeId) -> &Instance {
        &self.nodes[id.0].local
    }

    pub fn set_local(&mut self, id: NodeId, local: Instance) {
        if self.nodes[id.0].local != local {
            self.nodes[id.0].local = local;
            self.transforms_dirty = true;
        }
    }

    /// Set a node's local scale, keeping position and rotation.
    pub fn set_local_scale(&mut self, id: NodeId, scale: cgmath::Vector3<f32>) {
        if self.nodes[id.0].local.scale != scale {
            self.nodes[id.0].local.scale = scale;
            self.transforms_dirty = true;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.0].visible = visible;
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes[id.0].visible
    }

    /// Effective visibility: a node shows only when it and all ancestors are visible.
    pub fn is_shown(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Compose world transforms root to leaf.
    ///
    /// Nodes are appended parent-first, so a single forward pass suffices.
    /// The returned vec is indexed by `NodeId`.
    pub fn world_transforms(&self) -> Vec<Instance> {
        let mut worlds: Vec<Instance> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let world = match node.parent {
                Some(parent) => {
                    if parent.0 >= worlds.len() {
                        // Cannot happen through the public API; recover with the local transform.
                        warn!("node {} precedes its parent in the arena", node.name);
                        node.local.clone()
                    } else {
                        &worlds[parent.0] * &node.local
                    }
                }
                None => node.local.clone(),
            };
            worlds.push(world);
        }
        worlds
    }

    /// Consume the transforms-dirty flag; the GPU mirror calls this once per frame.
    pub fn take_transforms_dirty(&mut self) -> bool {
        std::mem::take(&mut self.transforms_dirty)
    }

    pub fn drawables(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_drawable())
            .map(|(idx, node)| (NodeId(idx), node))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::data_structures::primitives::box_mesh;
    use cgmath::Vector3;

    fn graph_with_drawable() -> (SceneGraph, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let mat = graph.add_material(Material::lit("m", Color::new(1, 2, 3), 0.5, 0.5));
        let group = graph.add_group(
            graph.root(),
            "assembly",
            Instance::at(Vector3::new(1.0, 2.0, 3.0)),
        );
        let drawable = graph.add_drawable(
            group,
            "part",
            Instance::at(Vector3::new(0.5, 0.0, 0.0)),
            box_mesh("part", 1.0, 1.0, 1.0),
            mat,
            true,
        );
        (graph, group, drawable)
    }

    #[test]
    fn world_transform_composes_through_parents() {
        let (graph, _, drawable) = graph_with_drawable();
        let worlds = graph.world_transforms();
        assert_eq!(worlds[drawable.0].position, Vector3::new(1.5, 2.0, 3.0));
    }

    #[test]
    fn hiding_a_group_hides_its_children() {
        let (mut graph, group, drawable) = graph_with_drawable();
        assert!(graph.is_shown(drawable));
        graph.set_visible(group, false);
        assert!(!graph.is_shown(drawable));
        // the node's own flag is untouched, so showing the group restores it
        assert!(graph.is_visible(drawable));
        graph.set_visible(group, true);
        assert!(graph.is_shown(drawable));
    }

    #[test]
    fn transform_edits_flag_dirty_exactly_when_changed() {
        let (mut graph, group, _) = graph_with_drawable();
        graph.take_transforms_dirty();
        graph.set_local_scale(group, Vector3::new(1.0, 1.0, 1.0));
        assert!(!graph.take_transforms_dirty());
        graph.set_local_scale(group, Vector3::new(1.0, 1.3, 1.3));
        assert!(graph.take_transforms_dirty());
    }

    #[test]
    fn topology_is_append_only() {
        let (graph, _, _) = graph_with_drawable();
        // root + group + drawable
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.drawables().count(), 1);
    }
}
