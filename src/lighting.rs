//! Material presets and the light types fed to the Phong shaders.

use cgmath::{Deg, Vector3};

/// Reflectance of a surface plus its specular exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Material {
    const fn new(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3], shininess: f32) -> Self {
        Material {
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }
}

pub const EMERALD: Material = Material::new(
    [0.02150, 0.17450, 0.02150],
    [0.07568, 0.61424, 0.07568],
    [0.63300, 0.72781, 0.63300],
    128.0 * 0.6,
);
pub const JADE: Material = Material::new(
    [0.13500, 0.22250, 0.15750],
    [0.54000, 0.89000, 0.63000],
    [0.31622, 0.31622, 0.31622],
    128.0 * 0.1,
);
pub const OBSIDIAN: Material = Material::new(
    [0.05375, 0.05000, 0.06625],
    [0.18275, 0.17000, 0.22525],
    [0.33274, 0.32863, 0.34643],
    128.0 * 0.3,
);
pub const PEARL: Material = Material::new(
    [0.25000, 0.20725, 0.20725],
    [1.00000, 0.82900, 0.82900],
    [0.29665, 0.29665, 0.29665],
    128.0 * 0.088,
);
pub const RUBY: Material = Material::new(
    [0.17450, 0.01175, 0.01175],
    [0.61424, 0.04136, 0.04136],
    [0.72781, 0.62696, 0.62696],
    128.0 * 0.6,
);
pub const GOLD: Material = Material::new(
    [0.24725, 0.19950, 0.07450],
    [0.75164, 0.60648, 0.22648],
    [0.62828, 0.55580, 0.36606],
    128.0 * 0.4,
);
pub const CYAN_PLASTIC: Material = Material::new(
    [0.00000, 0.10000, 0.06000],
    [0.00000, 0.50980, 0.50980],
    [0.50196, 0.50196, 0.50196],
    128.0 * 0.25,
);
pub const BRONZE: Material = Material::new(
    [0.21250, 0.12750, 0.05400],
    [0.71400, 0.42840, 0.18144],
    [0.39355, 0.27191, 0.16672],
    128.0 * 0.2,
);

pub const PRESETS: [(&str, Material); 8] = [
    ("emerald", EMERALD),
    ("jade", JADE),
    ("obsidian", OBSIDIAN),
    ("pearl", PEARL),
    ("ruby", RUBY),
    ("gold", GOLD),
    ("cyan_plastic", CYAN_PLASTIC),
    ("bronze", BRONZE),
];

pub fn preset(name: &str) -> Option<Material> {
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == name)
        .map(|(_, material)| *material)
}

/// Cube placements used by the material and light map scenes.
pub const MATERIAL_CUBES: [(Material, [f32; 3]); 10] = [
    (CYAN_PLASTIC, [0.0, 0.0, 0.0]),
    (EMERALD, [2.0, 5.0, -15.0]),
    (RUBY, [-1.5, -2.2, -2.5]),
    (EMERALD, [-3.8, -2.0, -12.3]),
    (PEARL, [2.4, -0.4, -3.5]),
    (PEARL, [-1.7, 3.0, -7.5]),
    (OBSIDIAN, [1.3, -2.0, -2.5]),
    (GOLD, [1.5, 2.0, -2.5]),
    (JADE, [1.5, 0.2, -1.5]),
    (BRONZE, [-1.3, 1.0, -1.5]),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for Light {
    fn default() -> Self {
        Light {
            position: Vector3::new(1.2, 1.0, 2.0),
            ambient: [0.1; 3],
            diffuse: [1.0; 3],
            specular: [1.0; 3],
        }
    }
}

impl Light {
    /// Moves the light along its figure-eight path at time `t` seconds.
    pub fn orbit(&mut self, t: f32) {
        let (x, y) = orbit_offset(t);
        self.position.x = x;
        self.position.y = y;
    }
}

pub fn orbit_offset(t: f32) -> (f32, f32) {
    (1.0 + t.sin() * 2.0, (t / 2.0).sin())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for DirectionalLight {
    fn default() -> Self {
        DirectionalLight {
            direction: [-0.2, -1.0, -0.3],
            ambient: [0.1; 3],
            diffuse: [1.0; 3],
            specular: [1.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointLight {
    pub light: Light,
    pub attenuation: Attenuation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub inner_cutoff: Deg<f32>,
    pub outer_cutoff: Deg<f32>,
}

impl Default for SpotLight {
    fn default() -> Self {
        SpotLight {
            position: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            ambient: [0.0; 3],
            diffuse: [1.0; 3],
            specular: [1.0; 3],
            inner_cutoff: Deg(12.5),
            outer_cutoff: Deg(17.5),
        }
    }
}

impl SpotLight {
    /// Cosines of the cone angles, as compared against in the fragment shader.
    pub fn cutoff_cosines(&self) -> (f32, f32) {
        (
            cgmath::Angle::cos(self.inner_cutoff),
            cgmath::Angle::cos(self.outer_cutoff),
        )
    }

    /// Re-aims the light from the camera, flashlight style.
    pub fn attach_to(&mut self, position: Vector3<f32>, direction: Vector3<f32>) {
        self.position = position;
        self.direction = direction;
    }
}
