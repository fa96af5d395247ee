use std::ops;

/// Linear radiance. Each channel is `0.0` (black) to `1.0` (full brightness) for reflectances,
/// but emitted light and accumulated sums can go well above `1.0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}
/// Channels are clamped below this before scaling by 256, so full white maps to 255.
const CHANNEL_MAX: f64 = 0.999;
impl Color {
    pub const BLACK: Self = Self::new(0., 0., 0.);
    pub const WHITE: Self = Self::new(1., 1., 1.);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Averages a sum of `samples` radiance samples, gamma corrects it (gamma 2) and
    /// quantizes it to an opaque RGBA8 pixel.
    pub fn to_rgba8(self, samples: u32) -> [u8; 4] {
        let scale = 1. / f64::from(samples);
        let quantize = |channel: f64| {
            // NaN from a negative channel becomes 0 through `max`
            let gamma = (channel * scale).sqrt().max(0.).min(CHANNEL_MAX);
            (256. * gamma).floor().min(255.) as u8
        };
        [quantize(self.r), quantize(self.g), quantize(self.b), 255]
    }
}

impl From<[f64; 3]> for Color {
    fn from(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}
impl Default for Color {
    /// Returns black, the empty sum
    fn default() -> Self {
        Self::BLACK
    }
}

impl ops::Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}
impl ops::AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}
impl ops::Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}
impl ops::Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
impl ops::Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Self::Output {
        rhs * self
    }
}
