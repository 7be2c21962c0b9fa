//! Error diffusion kernel definition.

/// An error diffusion kernel.
///
/// Each entry is `(dx, dy, weight)`: a neighbor offset relative to the
/// current pixel and the numerator of the share of error it receives.
/// `dy` is never negative, so rows already scanned are never touched.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries for error diffusion.
    pub entries: &'static [(i32, i32, u8)],

    /// Each neighbor receives `error * weight / divisor`.
    pub divisor: u8,
}

/// Floyd-Steinberg dithering kernel.
///
/// Distributes error to 4 neighbors with 100% total propagation (16/16).
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};

impl Kernel {
    /// Sum of all weights divided by the divisor.
    pub fn propagation(&self) -> f64 {
        let total: u32 = self.entries.iter().map(|&(_, _, w)| u32::from(w)).sum();
        f64::from(total) / f64::from(self.divisor)
    }

    /// Add the kernel's shares of `error` to the in-bounds neighbors of
    /// `(x, y)` in a row-major `width x height` buffer.
    ///
    /// Returns the amount actually delivered; anything short of `error`
    /// fell off the image edge.
    pub fn diffuse(
        &self,
        buffer: &mut [f64],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        error: f64,
    ) -> f64 {
        let mut delivered = 0.0;
        for &(dx, dy, weight) in self.entries {
            let nx = x as i64 + i64::from(dx);
            let ny = y as i64 + i64::from(dy);
            if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let share = error * f64::from(weight) / f64::from(self.divisor);
            buffer[ny as usize * width + nx as usize] += share;
            delivered += share;
        }
        delivered
    }
}
