//! Midpoint-centred contrast remapping.

/// Midpoint the contrast factor scales around.
pub const CONTRAST_MIDPOINT: f64 = 128.0;

/// Scale every sample around 128 by `factor`, clamping to `[0, 255]`.
///
/// `factor = 1.0` leaves the buffer unchanged, values above 1.0 push samples
/// away from the midpoint and values below pull them towards it.
pub fn apply_contrast(luminance: &mut [f64], factor: f64) {
    for v in luminance.iter_mut() {
        let adjusted = (*v - CONTRAST_MIDPOINT) * factor + CONTRAST_MIDPOINT;
        *v = adjusted.clamp(0.0, 255.0);
    }
}
