/// Straight (non-premultiplied) RGB color.
///
/// Shapes are always opaque: alpha is fixed at 1.0 when the color is
/// uploaded to a pipeline's uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Color used when the caller does not provide one.
    pub const DEFAULT: Color = Color::new(1.0, 0.5, 0.2);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Returns the RGBA array uploaded to the GPU (alpha forced to 1.0).
    #[inline]
    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_upload_forces_opaque_alpha() {
        assert_eq!(Color::new(1.0, 0.0, 0.0).to_rgba(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn default_is_the_fixed_constant() {
        assert_eq!(Color::default(), Color::DEFAULT);
    }
}
