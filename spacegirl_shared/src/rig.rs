//! Character rig.
//!
//! A rig is a fixed tree of rigid parts. The tree shape is decided once at
//! build time and never changes afterwards; only node transforms mutate.
//!
//! Nodes live in a flat arena addressed by [`NodeId`], with parent/child links
//! stored as ids. Animation code holds typed [`LimbHandles`] resolved when the
//! rig is built, so per-frame updates never search by name.

use std::collections::HashMap;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::math::{Transform, Vec3};

pub const LEFT_ARM: &str = "leftArm";
pub const RIGHT_ARM: &str = "rightArm";
pub const LEFT_LEG: &str = "leftLeg";
pub const RIGHT_LEG: &str = "rightLeg";

/// Index of a node inside its rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Renderable primitive attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Capsule {
        radius: f32,
        length: f32,
        cap_segments: u32,
        radial_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        /// Swept angle in radians; `TAU` for a closed ring.
        arc: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
}

/// Standard PBR-ish surface description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// sRGB color, `0xRRGGBB`.
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    pub const fn color(color: u32) -> Self {
        Self {
            color,
            emissive: 0x000000,
            emissive_intensity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
        }
    }

    pub const fn glowing(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub const fn finish(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }
}

/// Shape + material pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub shape: Primitive,
    pub material: Material,
}

/// One node of the rig tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RigNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl RigNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Typed handles for the four animated limbs. Any of them may be absent on an
/// incomplete rig variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimbHandles {
    pub left_arm: Option<NodeId>,
    pub right_arm: Option<NodeId>,
    pub left_leg: Option<NodeId>,
    pub right_leg: Option<NodeId>,
}

/// All four limbs, present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullLimbs {
    pub left_arm: NodeId,
    pub right_arm: NodeId,
    pub left_leg: NodeId,
    pub right_leg: NodeId,
}

impl LimbHandles {
    /// Returns the limbs only when every one of them exists.
    pub fn complete(&self) -> Option<FullLimbs> {
        Some(FullLimbs {
            left_arm: self.left_arm?,
            right_arm: self.right_arm?,
            left_leg: self.left_leg?,
            right_leg: self.right_leg?,
        })
    }

    /// Names of limbs missing from the rig.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.left_arm, LEFT_ARM),
            (self.right_arm, RIGHT_ARM),
            (self.left_leg, LEFT_LEG),
            (self.right_leg, RIGHT_LEG),
        ]
        .into_iter()
        .filter_map(|(h, name)| h.is_none().then_some(name))
        .collect()
    }
}

/// Builds a rig node by node.
pub struct RigBuilder {
    nodes: Vec<RigNode>,
    names: HashMap<String, NodeId>,
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RigBuilder {
    /// Starts a rig with an unnamed root group at the identity transform.
    pub fn new() -> Self {
        Self {
            nodes: vec![RigNode {
                name: None,
                transform: Transform::IDENTITY,
                mesh: None,
                parent: None,
                children: Vec::new(),
            }],
            names: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
        transform: Transform,
        mesh: Option<Mesh>,
    ) -> anyhow::Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            bail!("parent node {parent:?} does not exist");
        }
        let id = NodeId(self.nodes.len());
        if let Some(name) = name {
            if self.names.contains_key(name) {
                bail!("duplicate rig node name {name:?}");
            }
            self.names.insert(name.to_string(), id);
        }
        self.nodes.push(RigNode {
            name: name.map(str::to_string),
            transform,
            mesh,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Adds a named, mesh-less group.
    pub fn group(
        &mut self,
        parent: NodeId,
        name: &str,
        transform: Transform,
    ) -> anyhow::Result<NodeId> {
        self.push(parent, Some(name), transform, None)
    }

    /// Adds an unnamed mesh.
    pub fn mesh(
        &mut self,
        parent: NodeId,
        transform: Transform,
        shape: Primitive,
        material: Material,
    ) -> anyhow::Result<NodeId> {
        self.push(parent, None, transform, Some(Mesh { shape, material }))
    }

    pub fn build(self) -> CharacterRig {
        let find = |name: &str| self.names.get(name).copied();
        let limbs = LimbHandles {
            left_arm: find(LEFT_ARM),
            right_arm: find(RIGHT_ARM),
            left_leg: find(LEFT_LEG),
            right_leg: find(RIGHT_LEG),
        };
        CharacterRig {
            nodes: self.nodes,
            names: self.names,
            limbs,
        }
    }
}

/// A built character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRig {
    nodes: Vec<RigNode>,
    names: HashMap<String, NodeId>,
    limbs: LimbHandles,
}

impl CharacterRig {
    /// The default space girl silhouette.
    pub fn space_girl() -> anyhow::Result<Self> {
        space_girl_builder()
            .context("build space girl rig")
            .map(RigBuilder::build)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn limbs(&self) -> LimbHandles {
        self.limbs
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a named node; `None` is a normal outcome.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&RigNode> {
        self.nodes.get(id.0)
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id.0).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id.0).map(|n| &mut n.transform)
    }

    pub fn root_transform(&self) -> &Transform {
        &self.nodes[0].transform
    }

    pub fn root_transform_mut(&mut self) -> &mut Transform {
        &mut self.nodes[0].transform
    }

    /// Position of a node's origin in rig-parent (world) space.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        let mut node = self.nodes.get(id.0)?;
        let mut p = node.transform.position;
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.0];
            p = node.transform.transform_point(p);
        }
        Some(p)
    }

    /// Node ids in depth-first, parent-before-child order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }
}

const SUIT: u32 = 0xa8d8ff;
const SKIN: u32 = 0xf7d9ff;
const LILAC: u32 = 0xc695ff;
const EYE: u32 = 0x3a2a4f;

fn sphere(radius: f32, segments: u32) -> Primitive {
    Primitive::Sphere {
        radius,
        width_segments: segments,
        height_segments: segments,
    }
}

fn ring(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Primitive {
    Primitive::Torus {
        radius,
        tube,
        radial_segments,
        tubular_segments,
        arc: std::f32::consts::TAU,
    }
}

fn cylinder(radius: f32, height: f32) -> Primitive {
    Primitive::Cylinder {
        radius_top: radius,
        radius_bottom: radius,
        height,
        radial_segments: 12,
    }
}

/// Returns the builder for the default rig so variants can be derived in tests
/// or by remote-peer renderers.
pub fn space_girl_builder() -> anyhow::Result<RigBuilder> {
    let mut b = RigBuilder::new();
    let root = b.root();

    b.mesh(
        root,
        Transform::at(0.0, 0.5, 0.0),
        Primitive::Capsule {
            radius: 0.25,
            length: 0.6,
            cap_segments: 8,
            radial_segments: 16,
        },
        Material::color(SUIT),
    )?;
    b.mesh(root, Transform::at(0.0, 1.2, 0.0), sphere(0.28, 32), Material::color(SKIN))?;
    b.mesh(
        root,
        Transform::at(0.0, 1.12, 0.26),
        Primitive::Torus {
            radius: 0.05,
            tube: 0.01,
            radial_segments: 8,
            tubular_segments: 16,
            arc: std::f32::consts::PI,
        },
        Material::color(0xaa66cc),
    )?;
    for x in [-0.09, 0.09] {
        b.mesh(
            root,
            Transform::at(x, 1.22, 0.26),
            sphere(0.035, 16),
            Material::color(EYE).glowing(0x2b1f40, 0.3),
        )?;
    }
    for x in [-0.25, 0.25] {
        b.mesh(root, Transform::at(x, 1.25, -0.05), sphere(0.18, 24), Material::color(LILAC))?;
    }
    b.mesh(
        root,
        Transform::at(0.0, 1.18, 0.0),
        ring(0.3, 0.06, 16, 64),
        Material::color(0x9ed0ff).finish(0.1, 0.3),
    )?;

    for (name, x) in [(LEFT_ARM, -0.35), (RIGHT_ARM, 0.35)] {
        let arm = b.group(root, name, Transform::at(x, 0.75, 0.0))?;
        b.mesh(arm, Transform::IDENTITY, cylinder(0.06, 0.35), Material::color(SUIT))?;
        b.mesh(arm, Transform::at(0.0, -0.22, 0.0), sphere(0.08, 16), Material::color(0xcfeaff))?;
    }

    for (name, x) in [(LEFT_LEG, -0.14), (RIGHT_LEG, 0.14)] {
        let leg = b.group(root, name, Transform::at(x, 0.15, 0.0))?;
        b.mesh(leg, Transform::IDENTITY, cylinder(0.08, 0.4), Material::color(SUIT))?;
        b.mesh(
            leg,
            Transform::at(0.0, -0.25, 0.0),
            Primitive::Capsule {
                radius: 0.09,
                length: 0.18,
                cap_segments: 8,
                radial_segments: 12,
            },
            Material::color(0x9ecbff),
        )?;
    }

    b.mesh(
        root,
        Transform::at(0.0, 0.55, 0.0),
        ring(0.22, 0.03, 12, 48),
        Material::color(0x7fa6d1),
    )?;

    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_girl_has_all_limbs() {
        let rig = CharacterRig::space_girl().unwrap();
        let limbs = rig.limbs().complete().expect("all limbs");
        assert_eq!(rig.find(LEFT_ARM), Some(limbs.left_arm));
        assert_eq!(rig.find(RIGHT_LEG), Some(limbs.right_leg));
        assert!(rig.limbs().missing().is_empty());
        // Root, 9 body meshes, 4 limb groups, 2 meshes per limb.
        assert_eq!(rig.len(), 1 + 9 + 4 + 8);
    }

    #[test]
    fn find_unknown_name_is_none() {
        let rig = CharacterRig::space_girl().unwrap();
        assert_eq!(rig.find("tail"), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut b = RigBuilder::new();
        let root = b.root();
        b.group(root, LEFT_ARM, Transform::IDENTITY).unwrap();
        assert!(b.group(root, LEFT_ARM, Transform::IDENTITY).is_err());
    }

    #[test]
    fn partial_rig_reports_missing_limbs() {
        let mut b = RigBuilder::new();
        let root = b.root();
        b.group(root, LEFT_ARM, Transform::IDENTITY).unwrap();
        b.group(root, RIGHT_ARM, Transform::IDENTITY).unwrap();
        let rig = b.build();
        assert!(rig.limbs().complete().is_none());
        assert_eq!(rig.limbs().missing(), vec![LEFT_LEG, RIGHT_LEG]);
    }

    #[test]
    fn world_position_follows_root() {
        let mut rig = CharacterRig::space_girl().unwrap();
        let arm = rig.find(LEFT_ARM).unwrap();
        rig.root_transform_mut().position = Vec3::new(1.0, 0.0, 2.0);
        let p = rig.world_position(arm).unwrap();
        assert!(p.distance(Vec3::new(0.65, 0.75, 2.0)) < 1e-6);
    }

    #[test]
    fn depth_first_visits_parents_first() {
        let rig = CharacterRig::space_girl().unwrap();
        let order = rig.depth_first();
        assert_eq!(order.len(), rig.len());
        assert_eq!(order[0], rig.root());
        let arm = rig.find(LEFT_ARM).unwrap();
        let arm_pos = order.iter().position(|id| *id == arm).unwrap();
        for child in rig.node(arm).unwrap().children() {
            assert!(order.iter().position(|id| id == child).unwrap() > arm_pos);
        }
    }
}
