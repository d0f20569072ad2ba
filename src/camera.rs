//! Fixed scene camera and pointer picking on the ground plane.

use glam::{Mat4, Vec2, Vec3};

use crate::params::CameraParams;

/// Perspective camera looking at the grid from a fixed position
pub struct CameraSystem {
    params: CameraParams,
    aspect: f32,
}

impl CameraSystem {
    /// Create camera for a viewport of `width` x `height` pixels
    pub fn new(params: CameraParams, width: u32, height: u32) -> Self {
        let mut camera = Self {
            params,
            aspect: 1.0,
        };
        camera.update_size(width, height);
        camera
    }

    /// Follow a window resize
    pub fn update_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.params.position)
    }

    /// Create view-projection matrix for rendering
    pub fn view_proj(&self) -> Mat4 {
        let eye = self.eye();
        let target = Vec3::from_array(self.params.target);

        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.params.fov_degrees.to_radians(),
            self.aspect,
            self.params.near_plane_m,
            self.params.far_plane_m,
        );

        proj * view
    }

    /// World-space ray through a cursor position (pixels, origin top-left)
    ///
    /// # Returns
    /// Tuple of (origin on the near plane, unit direction), or `None` for an
    /// empty viewport
    pub fn cursor_ray(&self, cursor: Vec2, viewport: (u32, u32)) -> Option<(Vec3, Vec3)> {
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return None;
        }

        let ndc_x = 2.0 * cursor.x / width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor.y / height as f32;

        // Depth range is 0..1 for the wgpu projection
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        let direction = (far - near).try_normalize()?;
        Some((near, direction))
    }

    /// Ground point (y = 0) under the cursor, if the ray hits it
    pub fn pick_ground(&self, cursor: Vec2, viewport: (u32, u32)) -> Option<Vec3> {
        let (origin, direction) = self.cursor_ray(cursor, viewport)?;
        intersect_ground(origin, direction)
    }
}

/// Intersection of a ray with the plane y = 0, in front of the origin only
pub fn intersect_ground(origin: Vec3, direction: Vec3) -> Option<Vec3> {
    if direction.y.abs() < 1e-6 {
        return None;
    }
    let t = -origin.y / direction.y;
    if t < 0.0 {
        return None;
    }
    let hit = origin + direction * t;
    Some(Vec3::new(hit.x, 0.0, hit.z))
}
