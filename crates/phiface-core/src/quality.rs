//! Image quality statistics: brightness, contrast, and sharpness.
//!
//! These feed the skin-quality score and the advisory warning list. The
//! sharpness convention is deliberate: the RMS Laplacian response is taken
//! over interior pixels only (the 1-pixel border has no 4-neighborhood) but
//! normalized by the **total** pixel count. Downstream score bounds were
//! fixed against that slight under-normalization, so it must not be
//! "corrected".

use image::RgbImage;
use ndarray::Array2;

use crate::types::QualityMetrics;

/// Rec. 601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Luminance of one RGB pixel, [0, 255].
pub(crate) fn luminance(pixel: &image::Rgb<u8>) -> f32 {
    let [r, g, b] = pixel.0;
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Compute quality metrics for a decoded image.
///
/// An empty image yields all-zero metrics rather than an error; quality
/// problems are never fatal anywhere in the pipeline.
pub fn measure(image: &RgbImage) -> QualityMetrics {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return QualityMetrics::default();
    }

    let luminance = luminance_field(image);
    let total = (w as usize * h as usize) as f64;

    let mut sum = 0.0f64;
    for &v in luminance.iter() {
        sum += v as f64;
    }
    let mean = sum / total;

    let mut var_sum = 0.0f64;
    for &v in luminance.iter() {
        let d = v as f64 - mean;
        var_sum += d * d;
    }
    let contrast = (var_sum / total).sqrt();

    QualityMetrics {
        brightness: mean as f32,
        contrast: contrast as f32,
        sharpness: laplacian_rms(&luminance, total),
    }
}

/// Per-pixel luminance as a (height, width) field.
fn luminance_field(image: &RgbImage) -> Array2<f32> {
    let (w, h) = image.dimensions();
    let mut field = Array2::<f32>::zeros((h as usize, w as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        field[[y as usize, x as usize]] = luminance(pixel);
    }
    field
}

/// RMS response of the 4-connected Laplacian [[0,1,0],[1,-4,1],[0,1,0]] over
/// interior pixels, normalized by the total pixel count.
fn laplacian_rms(luminance: &Array2<f32>, total: f64) -> f32 {
    let (h, w) = luminance.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }

    let mut sum_sq = 0.0f64;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let response = luminance[[y - 1, x]]
                + luminance[[y + 1, x]]
                + luminance[[y, x - 1]]
                + luminance[[y, x + 1]]
                - 4.0 * luminance[[y, x]];
            sum_sq += (response as f64) * (response as f64);
        }
    }

    (sum_sq / total).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gray_image(w: u32, h: u32, v: u8) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([v, v, v]))
    }

    #[test]
    fn test_empty_image_is_all_zero() {
        let metrics = measure(&RgbImage::new(0, 0));
        assert_eq!(metrics, QualityMetrics::default());
    }

    #[test]
    fn test_flat_image_has_zero_sharpness_and_contrast() {
        let metrics = measure(&gray_image(32, 24, 120));
        // Gray luminance equals the channel value since the luma weights sum to 1
        assert!((metrics.brightness - 120.0).abs() < 1e-3);
        assert!(metrics.contrast < 1e-3);
        assert_eq!(metrics.sharpness, 0.0);
    }

    #[test]
    fn test_two_tone_contrast() {
        // Left half 0, right half 200: mean 100, population std dev 100
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([0, 0, 0])
            } else {
                Rgb([200, 200, 200])
            }
        });
        let metrics = measure(&img);
        assert!((metrics.brightness - 100.0).abs() < 1e-3);
        assert!((metrics.contrast - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_bump_sharpness() {
        // 3x3 gray 100 with center 110: the only interior pixel responds
        // 4*100 - 4*110 = -40; RMS over all 9 pixels = sqrt(1600/9) = 40/3
        let mut img = gray_image(3, 3, 100);
        img.put_pixel(1, 1, Rgb([110, 110, 110]));
        let metrics = measure(&img);
        assert!((metrics.sharpness - 40.0 / 3.0).abs() < 0.05);
    }

    #[test]
    fn test_narrow_image_has_zero_sharpness() {
        // No interior pixels when either dimension is below 3
        let metrics = measure(&gray_image(2, 50, 77));
        assert_eq!(metrics.sharpness, 0.0);
    }

    #[test]
    fn test_linear_gradient_has_zero_sharpness() {
        // A linear ramp has zero second derivative everywhere
        let img = RgbImage::from_fn(40, 40, |x, y| {
            let v = (x + y) as u8;
            Rgb([v, v, v])
        });
        let metrics = measure(&img);
        assert!(metrics.sharpness < 1e-3);
    }
}
