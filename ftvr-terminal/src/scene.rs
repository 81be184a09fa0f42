/// Demo scene shown inside the fish tank
use nalgebra::{Matrix4, Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Axis-aligned cube of edge `size` centered on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        // (normal, u, v) per face, with u x v == normal
        let faces = [
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
        ];

        let mut triangles = Vec::with_capacity(12);
        for (normal, u, v) in faces {
            let corner = |su: f32, sv: f32| Vertex {
                position: Point3::from((normal + u * su + v * sv) * half),
                normal,
            };
            let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
            triangles.push(Triangle {
                vertices: [quad[0], quad[1], quad[2]],
            });
            triangles.push(Triangle {
                vertices: [quad[0], quad[2], quad[3]],
            });
        }

        Self { triangles }
    }
}

/// Slowly tumbling object placed at the screen plane
#[derive(Debug, Clone)]
pub struct Scene {
    pub mesh: Mesh,
    pub center: Point3<f32>,
    pub yaw: f32,
    pub pitch: f32,
}

impl Scene {
    /// Cube sitting on the screen plane, half in front of it
    pub fn fish_tank(screen_distance: f32, screen_height: f32) -> Self {
        Self {
            mesh: Mesh::cube(screen_height * 0.4),
            center: Point3::new(0.0, 0.0, screen_distance),
            yaw: 0.4,
            pitch: 0.3,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.yaw += 0.5 * dt;
        self.pitch += 0.3 * dt;
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.center.coords)
            * Matrix4::new_rotation(Vector3::new(0.0, self.yaw, 0.0))
            * Matrix4::new_rotation(Vector3::new(self.pitch, 0.0, 0.0))
    }
}
