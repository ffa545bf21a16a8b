//! Per-frame camera and fog data as the shaders see it.

use glam::{Mat4, Vec2, Vec3};

use crate::scene::{NodeId, Scene};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform holding the camera matrices and the scene fog.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// World → view matrix (view-space normals for rim lighting).
    pub view: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Camera forward direction.
    pub forward: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Fog color.
    pub fog_color: [f32; 3],
    /// Exp2 fog density (0 disables fog).
    pub fog_density: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Identity camera without fog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.6,
            forward: [0.0, 0.0, -1.0],
            fovy: 75.0,
            fog_color: [0.0; 3],
            fog_density: 0.0,
        }
    }

    /// Fill from a camera node of `scene`, including the scene fog.
    ///
    /// Non-camera nodes leave the projection untouched.
    pub fn update_from_scene(&mut self, scene: &Scene, camera: NodeId) {
        let world = scene.world_matrix(camera);
        let view = world.inverse();
        if let Some(cam) = scene.camera(camera) {
            self.view_proj = (cam.projection() * view).to_cols_array_2d();
            self.aspect = cam.aspect;
            self.fovy = cam.fov;
        }
        self.view = view.to_cols_array_2d();
        self.position = world.w_axis.truncate().to_array();
        self.forward = world
            .transform_vector3(Vec3::NEG_Z)
            .normalize_or(Vec3::NEG_Z)
            .to_array();
        match scene.fog {
            Some(fog) => {
                self.fog_color = fog.color;
                self.fog_density = fog.density;
            }
            None => {
                self.fog_color = [0.0; 3];
                self.fog_density = 0.0;
            }
        }
    }
}

/// Map a world point to pixel coordinates (origin top-left) for a viewport
/// of `size` pixels, as seen through `camera`.
#[must_use]
pub fn project(scene: &Scene, camera: NodeId, world: Vec3, size: Vec2) -> Vec2 {
    let Some(cam) = scene.camera(camera) else {
        return Vec2::ZERO;
    };
    let ndc = (cam.projection() * scene.view_matrix(camera)).project_point3(world);
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * size.x,
        (-ndc.y * 0.5 + 0.5) * size.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Fog, PerspectiveCamera};

    fn scene_with_camera() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let cam = scene.add_camera(
            "cam",
            Vec3::new(0.0, 0.0, 5.0),
            PerspectiveCamera {
                fov: 75.0,
                aspect: 2.0,
                near: 1.0,
                far: 1100.0,
            },
        );
        (scene, cam)
    }

    #[test]
    fn point_ahead_projects_to_viewport_centre() {
        let (scene, cam) = scene_with_camera();
        let p = project(&scene, cam, Vec3::ZERO, Vec2::new(800.0, 400.0));
        assert!((p - Vec2::new(400.0, 200.0)).length() < 1e-3);
    }

    #[test]
    fn screen_y_grows_downward() {
        let (scene, cam) = scene_with_camera();
        let size = Vec2::new(800.0, 400.0);
        let up = project(&scene, cam, Vec3::new(0.0, 1.0, 0.0), size);
        let right = project(&scene, cam, Vec3::new(1.0, 0.0, 0.0), size);
        assert!(up.y < 200.0);
        assert!(right.x > 400.0);
    }

    #[test]
    fn uniform_carries_fog_and_position() {
        let (mut scene, cam) = scene_with_camera();
        scene.fog = Some(Fog {
            color: [0.0; 3],
            density: 0.15,
        });
        let mut u = CameraUniform::new();
        u.update_from_scene(&scene, cam);
        assert_eq!(u.position, [0.0, 0.0, 5.0]);
        assert_eq!(u.fog_density, 0.15);
        assert_eq!(u.aspect, 2.0);
        assert!((Vec3::from(u.forward) - Vec3::NEG_Z).length() < 1e-5);
    }
}
