/// Handle to a material stored in a [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

impl MaterialId {
    /// Index into the owning library.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Surface shading description. Colors are linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Blinn-Phong lit surface.
    Phong {
        /// Diffuse albedo.
        color: [f32; 3],
        /// Specular reflectance (grey).
        specular: f32,
        /// Specular exponent.
        shininess: f32,
    },
    /// Unlit flat color.
    Basic {
        /// Output color.
        color: [f32; 3],
    },
}

impl Material {
    /// Unlit black, used to blank out meshes in the bloom pass.
    pub const BLACK: Self = Self::Basic {
        color: [0.0, 0.0, 0.0],
    };

    /// Base color.
    #[must_use]
    pub fn color(&self) -> [f32; 3] {
        match *self {
            Self::Phong { color, .. } | Self::Basic { color } => color,
        }
    }

    /// Packed `(lit, specular, shininess, 0)` for the instance buffer.
    #[must_use]
    pub fn shading_params(&self) -> [f32; 4] {
        match *self {
            Self::Phong {
                specular,
                shininess,
                ..
            } => [1.0, specular, shininess, 0.0],
            Self::Basic { .. } => [0.0; 4],
        }
    }
}

/// Append-only material arena.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its handle.
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    /// Look up a material.
    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Mutable lookup, e.g. to recolor in place.
    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.index())
    }

    /// Number of stored materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Convert a packed `0xRRGGBB` sRGB color to linear RGB.
#[must_use]
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.040_45 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_map_exactly() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let white = srgb_hex_to_linear(0xffffff);
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn srgb_mid_grey_is_darker_in_linear() {
        let [r, g, b] = srgb_hex_to_linear(0x808080);
        assert!((r - 0.2158).abs() < 1e-3);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn library_hands_out_sequential_handles() {
        let mut lib = MaterialLibrary::new();
        let a = lib.add(Material::BLACK);
        let b = lib.add(Material::Phong {
            color: [1.0, 0.0, 0.0],
            specular: 0.1,
            shininess: 30.0,
        });
        assert_ne!(a, b);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get(b).map(Material::color), Some([1.0, 0.0, 0.0]));
        assert_eq!(lib.get(a).map(Material::shading_params), Some([0.0; 4]));
    }
}
