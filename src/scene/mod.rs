//! Retained scene graph.
//!
//! A [`Scene`] is an arena of [`Node`]s addressed by [`NodeId`]. Nodes carry
//! a local [`Transform`] relative to their parent plus a [`NodeKind`]
//! payload (mesh, light, camera or plain group). Meshes, materials, textures
//! and cubemaps live in registries on the scene and are referenced by
//! handle, so many nodes can share one asteroid model or one ship material.
//!
//! Nodes are never removed; hiding a subtree is done with
//! [`Scene::set_visible`].

/// Surface descriptions.
pub mod material;
/// Mesh data and procedural primitives.
pub mod mesh;
/// CPU-side image data.
pub mod texture;

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

pub use material::{Blending, Material, Shading, Side};
pub use mesh::{MeshData, Vertex};
pub use texture::{CubemapData, TextureData};

/// Index of a node inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle into the scene's mesh registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(u32);

/// Handle into the scene's material registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

/// Handle into the scene's texture registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

/// Handle into the scene's cubemap registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubemapHandle(u32);

macro_rules! handle_index {
    ($($ty:ty),*) => {$(
        impl $ty {
            /// Registry slot.
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}
handle_index!(MeshHandle, MaterialHandle, TextureHandle, CubemapHandle);

// Registries the GPU mirror walks slot by slot.
macro_rules! handle_from_index {
    ($($ty:ty),*) => {$(
        impl $ty {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    )*};
}
handle_from_index!(MeshHandle, TextureHandle, CubemapHandle);

/// Local transform. Rotation is Euler XYZ in radians so individual axes can
/// be animated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Euler angles (XYZ order).
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at `position` with identity rotation and unit scale.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local matrix: translate · rotate · scale.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.quat(),
            self.position,
        )
    }
}

/// Light source variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction.
    Ambient,
    /// Parallel rays travelling from the node toward `target`.
    Directional {
        /// World-space aim point.
        target: Vec3,
    },
    /// Omni light with linear falloff to zero at `range` (0 = infinite).
    Point {
        /// Cutoff distance.
        range: f32,
    },
    /// Cone light aimed at `target`.
    Spot {
        /// World-space aim point.
        target: Vec3,
        /// Cutoff distance (0 = infinite).
        range: f32,
        /// Cone half-angle in radians.
        angle: f32,
        /// Fraction of the cone that fades out at the edge.
        penumbra: f32,
    },
}

/// A light attached to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Variant-specific parameters.
    pub kind: LightKind,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Scalar multiplier.
    pub intensity: f32,
}

impl Light {
    /// Light of `kind` with color `0xRRGGBB` and the given intensity.
    #[must_use]
    pub fn new(kind: LightKind, hex: u32, intensity: f32) -> Self {
        Self {
            kind,
            color: crate::util::rgb(hex),
            intensity,
        }
    }
}

/// Widest field of view the projection accepts, in degrees.
pub const MAX_FOV: f32 = 179.0;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees (clamped to [`MAX_FOV`] when
    /// projecting).
    pub fov: f32,
    /// Width / height.
    pub aspect: f32,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
}

impl PerspectiveCamera {
    /// Projection matrix with a [0, 1] depth range.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.clamp(1.0, MAX_FOV).to_radians(),
            self.aspect.max(1e-4),
            self.near,
            self.far,
        )
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform-only node.
    Group,
    /// Renderable mesh.
    Mesh {
        /// Geometry.
        mesh: MeshHandle,
        /// Surface.
        material: MaterialHandle,
    },
    /// Light source.
    Light(Light),
    /// Viewpoint.
    Camera(PerspectiveCamera),
}

/// A scene-graph node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Debug name.
    pub name: String,
    /// Local transform.
    pub transform: Transform,
    /// Whether this node and its subtree are drawn.
    pub visible: bool,
    /// Parent node, `None` for roots.
    pub parent: Option<NodeId>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
    /// Payload.
    pub kind: NodeKind,
}

/// Exponential-squared fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Fog color.
    pub color: [f32; 3],
    /// Density; the fog factor is `1 - exp(-(density * depth)²)`.
    pub density: f32,
}

/// Registered 2D texture plus a revision counter bumped on replacement.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    /// Image data.
    pub data: Arc<TextureData>,
    /// Incremented every time `data` is swapped.
    pub revision: u32,
    /// Repeat instead of clamping outside `[0, 1]`.
    pub repeat: bool,
}

/// The scene graph and its resource registries.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    meshes: Vec<Arc<MeshData>>,
    materials: Vec<Material>,
    textures: Vec<TextureSlot>,
    cubemaps: Vec<Arc<CubemapData>>,
    /// Optional scene fog.
    pub fog: Option<Fog>,
    /// Clear color.
    pub background: [f32; 3],
}

impl Scene {
    /// An empty scene with a black background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes ────────────────────────────────────────────────────────────

    /// Insert a node under `parent` (or as a root).
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        transform: Transform,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.to_owned(),
            transform,
            visible: true,
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    /// Insert a transform-only node.
    pub fn add_group(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        transform: Transform,
    ) -> NodeId {
        self.add(parent, name, transform, NodeKind::Group)
    }

    /// Insert a mesh node.
    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        transform: Transform,
        mesh: MeshHandle,
        material: MaterialHandle,
    ) -> NodeId {
        self.add(parent, name, transform, NodeKind::Mesh { mesh, material })
    }

    /// Insert a light node.
    pub fn add_light(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        position: Vec3,
        light: Light,
    ) -> NodeId {
        self.add(
            parent,
            name,
            Transform::at(position),
            NodeKind::Light(light),
        )
    }

    /// Insert a camera node.
    pub fn add_camera(
        &mut self,
        name: &str,
        position: Vec3,
        camera: PerspectiveCamera,
    ) -> NodeId {
        self.add(
            None,
            name,
            Transform::at(position),
            NodeKind::Camera(camera),
        )
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Local transform of a node.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> &Transform {
        &self.nodes[id.index()].transform
    }

    /// Mutable local transform of a node.
    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.index()].transform
    }

    /// Show or hide a node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.index()].visible = visible;
    }

    /// Iterate all nodes with their ids.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Light payload of a node, if it is a light.
    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Camera payload of a node, if it is a camera.
    #[must_use]
    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match &self.nodes[id.index()].kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera payload of a node, if it is a camera.
    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Material handle of a mesh node.
    #[must_use]
    pub fn material_of(&self, id: NodeId) -> Option<MaterialHandle> {
        match self.nodes[id.index()].kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Whether the node and every ancestor are visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &self.nodes[n.index()];
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// World matrix: parent chain composed root-first.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.index()];
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// World-space position of a node.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// Rotate a node so it faces `target` (world space).
    ///
    /// Cameras look down their local -Z; every other node points +Z at the
    /// target.
    pub fn look_at(&mut self, id: NodeId, target: Vec3) {
        let eye = self.world_position(id);
        let forward = target - eye;
        if forward.length_squared() < 1e-12 {
            return;
        }
        let is_camera = matches!(self.nodes[id.index()].kind, NodeKind::Camera(_));
        let world_rot = if is_camera {
            Quat::from_mat4(&Mat4::look_at_rh(eye, target, Vec3::Y).inverse())
        } else {
            Quat::from_mat4(&Mat4::look_at_rh(eye, eye - forward, Vec3::Y).inverse())
        };
        let local_rot = match self.nodes[id.index()].parent {
            Some(parent) => {
                let (_, parent_rot, _) =
                    self.world_matrix(parent).to_scale_rotation_translation();
                parent_rot.inverse() * world_rot
            }
            None => world_rot,
        };
        let (x, y, z) = local_rot.normalize().to_euler(EulerRot::XYZ);
        self.nodes[id.index()].transform.rotation = Vec3::new(x, y, z);
    }

    /// View matrix of a camera node.
    #[must_use]
    pub fn view_matrix(&self, camera: NodeId) -> Mat4 {
        self.world_matrix(camera).inverse()
    }

    /// Set the aspect ratio of every camera in the scene.
    pub fn set_aspect(&mut self, aspect: f32) {
        for node in &mut self.nodes {
            if let NodeKind::Camera(camera) = &mut node.kind {
                camera.aspect = aspect;
            }
        }
    }

    // ── Registries ───────────────────────────────────────────────────────

    /// Register mesh data.
    pub fn add_mesh_data(&mut self, mesh: Arc<MeshData>) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle((self.meshes.len() - 1) as u32)
    }

    /// Mesh data by handle.
    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> &Arc<MeshData> {
        &self.meshes[handle.index()]
    }

    /// Number of registered meshes.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Register a material.
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle((self.materials.len() - 1) as u32)
    }

    /// Material by handle.
    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.index()]
    }

    /// Mutable material by handle.
    pub fn material_mut(&mut self, handle: MaterialHandle) -> &mut Material {
        &mut self.materials[handle.index()]
    }

    /// All materials in registration order.
    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Register a texture.
    pub fn add_texture(
        &mut self,
        data: Arc<TextureData>,
        repeat: bool,
    ) -> TextureHandle {
        self.textures.push(TextureSlot {
            data,
            revision: 0,
            repeat,
        });
        TextureHandle((self.textures.len() - 1) as u32)
    }

    /// Swap the image behind a handle; GPU copies are refreshed lazily.
    pub fn replace_texture(&mut self, handle: TextureHandle, data: Arc<TextureData>) {
        let slot = &mut self.textures[handle.index()];
        slot.data = data;
        slot.revision = slot.revision.wrapping_add(1);
    }

    /// Texture slot by handle.
    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> &TextureSlot {
        &self.textures[handle.index()]
    }

    /// Number of registered textures.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Register a cubemap.
    pub fn add_cubemap(&mut self, data: Arc<CubemapData>) -> CubemapHandle {
        self.cubemaps.push(data);
        CubemapHandle((self.cubemaps.len() - 1) as u32)
    }

    /// Cubemap by handle.
    #[must_use]
    pub fn cubemap(&self, handle: CubemapHandle) -> &Arc<CubemapData> {
        &self.cubemaps[handle.index()]
    }

    /// Number of registered cubemaps.
    #[must_use]
    pub fn cubemap_count(&self) -> usize {
        self.cubemaps.len()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut scene = Scene::new();
        let parent = scene.add_group(
            None,
            "parent",
            Transform {
                position: Vec3::new(6.0, -15.0, -42.0),
                rotation: Vec3::ZERO,
                scale: Vec3::splat(2.0),
            },
        );
        let child =
            scene.add_group(Some(parent), "child", Transform::at(Vec3::new(0.0, 0.0, 4.0)));
        assert!(approx(scene.world_position(child), Vec3::new(6.0, -15.0, -34.0)));
        assert_eq!(scene.node(parent).children, vec![child]);
    }

    #[test]
    fn euler_xyz_rotates_about_x_first_axis() {
        let t = Transform {
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            ..Transform::default()
        };
        let y = t.matrix().transform_vector3(Vec3::Y);
        assert!(approx(y, Vec3::Z));
    }

    #[test]
    fn camera_look_at_points_negative_z_at_target() {
        let mut scene = Scene::new();
        let cam = scene.add_camera(
            "cam",
            Vec3::new(15.0, -10.0, -40.0),
            PerspectiveCamera {
                fov: 75.0,
                aspect: 1.0,
                near: 1.0,
                far: 1100.0,
            },
        );
        let target = Vec3::new(-33.0, -35.0, -60.0);
        scene.look_at(cam, target);
        let forward = scene.world_matrix(cam).transform_vector3(Vec3::NEG_Z);
        let expected = (target - Vec3::new(15.0, -10.0, -40.0)).normalize();
        assert!(approx(forward.normalize(), expected));
    }

    #[test]
    fn object_look_at_points_positive_z_at_target() {
        let mut scene = Scene::new();
        let node = scene.add_group(None, "n", Transform::at(Vec3::new(1.0, 2.0, 3.0)));
        scene.look_at(node, Vec3::new(1.0, 2.0, -10.0));
        let forward = scene.world_matrix(node).transform_vector3(Vec3::Z);
        assert!(approx(forward.normalize(), Vec3::NEG_Z));
    }

    #[test]
    fn hidden_parent_hides_subtree() {
        let mut scene = Scene::new();
        let parent = scene.add_group(None, "p", Transform::default());
        let child = scene.add_group(Some(parent), "c", Transform::default());
        assert!(scene.is_visible(child));
        scene.set_visible(parent, false);
        assert!(!scene.is_visible(child));
    }

    #[test]
    fn replacing_texture_bumps_revision() {
        let mut scene = Scene::new();
        let tex = scene.add_texture(Arc::new(TextureData::placeholder()), true);
        assert_eq!(scene.texture(tex).revision, 0);
        scene.replace_texture(tex, Arc::new(TextureData::white()));
        assert_eq!(scene.texture(tex).revision, 1);
        assert_eq!(scene.texture(tex).data.rgba, vec![255; 4]);
    }

    #[test]
    fn extreme_fov_is_clamped() {
        let cam = PerspectiveCamera {
            fov: 200.0,
            aspect: 1.5,
            near: 1.0,
            far: 1100.0,
        };
        assert!(cam.projection().is_finite());
    }
}
