//! Materials shared between scene nodes.
//!
//! A [`Material`] maps uniform names to values plus a few fixed-function
//! switches (face culling, depth writes, blending). Materials are shared by
//! reference through a [`MaterialHandle`]: many nodes and debug-panel bindings
//! may hold the same material, and it lives as long as its longest holder.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use anyhow::{Context, bail};

/// Shared-ownership handle to a [`Material`].
pub type MaterialHandle = Rc<RefCell<Material>>;

/// RGB colour stored the way it is written in CSS: sRGB-encoded, `0..1` per channel.
///
/// Everything handed to the GPU goes through [`Color::to_linear`] first, since
/// the surface format is sRGB and encodes on write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` colour string.
    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            bail!("expected a colour of the form #rrggbb, got {hex:?}");
        }
        let channel = |range: std::ops::Range<usize>| -> anyhow::Result<f32> {
            let value = u8::from_str_radix(&digits[range], 16)
                .with_context(|| format!("invalid hex digits in colour {hex:?}"))?;
            Ok(f32::from(value) / 255.0)
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }

    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn to_linear(&self) -> Color {
        let decode = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Color::new(decode(self.r), decode(self.g), decode(self.b))
    }

    /// Linear RGBA with full alpha, as uploaded in uniforms.
    pub fn to_array(&self) -> [f32; 4] {
        let linear = self.to_linear();
        [linear.r, linear.g, linear.b, 1.0]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        let c = c.to_linear();
        wgpu::Color {
            r: f64::from(c.r),
            g: f64::from(c.g),
            b: f64::from(c.b),
            a: 1.0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A single uniform value. Textures are referenced by asset key and resolved
/// by whoever renders the material.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Color(Color),
    Texture(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Double,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub uniforms: BTreeMap<String, UniformValue>,
    pub side: Side,
    pub depth_write: bool,
    pub blending: Blending,
    /// Normal blending only mixes with what is behind when set. Additive
    /// blending always does.
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            uniforms: BTreeMap::new(),
            side: Side::Front,
            depth_write: true,
            blending: Blending::Normal,
            transparent: false,
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the material in a shared handle.
    pub fn shared(self) -> MaterialHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn with(mut self, name: &str, value: UniformValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut UniformValue> {
        self.uniforms.get_mut(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(UniformValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vec2(&self, name: &str) -> Option<[f32; 2]> {
        match self.get(name) {
            Some(UniformValue::Vec2(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        match self.get(name) {
            Some(UniformValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(UniformValue::Texture(key)) => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn clear_uniforms(&mut self) {
        self.uniforms.clear();
    }

    /// Back to front-face culling, depth writes and normal blending.
    pub fn reset_state(&mut self) {
        self.side = Side::Front;
        self.depth_write = true;
        self.blending = Blending::Normal;
    }
}
