//! Surface materials with in-place mutable colours.
//!
//! Materials are plain CPU state; the viewer mirrors each one into a uniform
//! buffer and re-uploads it whenever [`Material::set_color`] flags it dirty.
//! Only the body and interior-glow materials are ever recoloured; the rest
//! are fixed at build time.

use crate::config::Color;

/// Which render pipeline a material is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Opaque, lit, shadow-receiving.
    Lit,
    /// Alpha-blended, lit.
    Glass,
    /// Unlit, renders the colour as-is.
    Emissive,
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: &'static str,
    pub kind: MaterialKind,
    color: Color,
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
    dirty: bool,
}

impl Material {
    pub fn lit(name: &'static str, color: Color, metallic: f32, roughness: f32) -> Self {
        Self {
            name,
            kind: MaterialKind::Lit,
            color,
            metallic,
            roughness,
            opacity: 1.0,
            dirty: false,
        }
    }

    pub fn glass(name: &'static str, color: Color, opacity: f32) -> Self {
        Self {
            name,
            kind: MaterialKind::Glass,
            color,
            metallic: 0.3,
            roughness: 0.05,
            opacity,
            dirty: false,
        }
    }

    pub fn emissive(name: &'static str, color: Color, opacity: f32) -> Self {
        Self {
            name,
            kind: MaterialKind::Emissive,
            color,
            metallic: 0.0,
            roughness: 1.0,
            opacity,
            dirty: false,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Recolour in place. A no-op (and no re-upload) when the colour is unchanged.
    pub fn set_color(&mut self, color: Color) {
        if self.color != color {
            self.color = color;
            self.dirty = true;
        }
    }

    /// Consume the dirty flag; the GPU mirror calls this once per frame.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            color: self.color.to_linear_rgba(self.opacity),
            metallic: self.metallic,
            roughness: self.roughness,
            _padding: [0.0; 2],
        }
    }
}

/// GPU-side material parameters, padded to 16-byte uniform alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recolouring_flags_dirty_once() {
        let mut mat = Material::lit("body", Color::new(0x2b, 0x2b, 0x2b), 0.6, 0.35);
        assert!(!mat.take_dirty());
        mat.set_color(Color::new(0xff, 0x00, 0x00));
        assert!(mat.take_dirty());
        assert!(!mat.take_dirty());
    }

    #[test]
    fn setting_the_same_colour_is_a_no_op() {
        let mut mat = Material::emissive("glow", Color::new(0xff, 0x1a, 0x1a), 0.7);
        mat.set_color(Color::new(0xff, 0x1a, 0x1a));
        assert!(!mat.take_dirty());
    }
}
