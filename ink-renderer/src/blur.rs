//! Shadow blur.
//!
//! A Gaussian of standard deviation `sigma` is approximated by three
//! successive box blurs. Pixels outside the buffer count as transparent.
//! Pixmap data is premultiplied, so channels are blurred independently.

use tiny_skia::Pixmap;

const PASSES: usize = 3;

/// Box radius whose three-fold repetition matches a Gaussian of `sigma`.
///
/// Three boxes of width `2r + 1` have a combined variance of
/// `((2r + 1)^2 - 1) / 4`.
#[must_use]
pub fn box_radius(sigma: f32) -> usize {
    if sigma <= 0.0 || !sigma.is_finite() {
        return 0;
    }
    let r = ((4.0 * sigma * sigma + 1.0).sqrt() - 1.0) / 2.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        r.round() as usize
    }
}

/// Blur `pixmap` in place with a Gaussian-like kernel of `sigma`.
pub fn blur(pixmap: &mut Pixmap, sigma: f32) {
    let radius = box_radius(sigma);
    if radius == 0 {
        return;
    }
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let data = pixmap.data_mut();
    let mut scratch = vec![0u8; data.len()];

    for _ in 0..PASSES {
        box_pass(data, &mut scratch, width, height, radius, Axis::Horizontal);
        box_pass(&scratch, data, width, height, radius, Axis::Vertical);
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One sliding-window box pass from `src` into `dst` along `axis`.
fn box_pass(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize, axis: Axis) {
    let (lines, len, pixel_stride, line_stride) = match axis {
        Axis::Horizontal => (height, width, 4, width * 4),
        Axis::Vertical => (width, height, width * 4, 4),
    };
    let window = u32::try_from(2 * radius + 1).unwrap_or(u32::MAX);

    for line in 0..lines {
        let base = line * line_stride;
        for channel in 0..4 {
            let at = |i: usize| base + i * pixel_stride + channel;

            // Sum of the window centred on index 0: only [0, radius] is inside.
            let mut sum: u32 = (0..=radius.min(len - 1)).map(|i| u32::from(src[at(i)])).sum();

            for i in 0..len {
                dst[at(i)] = u8::try_from((sum + window / 2) / window).unwrap_or(u8::MAX);

                let incoming = i + radius + 1;
                if incoming < len {
                    sum += u32::from(src[at(incoming)]);
                }
                if i >= radius {
                    sum -= u32::from(src[at(i - radius)]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    #[test]
    fn test_box_radius() {
        assert_eq!(box_radius(0.0), 0);
        assert_eq!(box_radius(-3.0), 0);
        assert_eq!(box_radius(15.0), 15);
        assert_eq!(box_radius(7.5), 7);
    }

    #[test]
    fn test_blur_spreads_and_conserves_roughly() {
        let mut pixmap = Pixmap::new(21, 21).expect("pixmap");
        let centre = (10 * 21 + 10) * 4;
        pixmap.data_mut()[centre..centre + 4].copy_from_slice(&[255, 255, 255, 255]);

        blur(&mut pixmap, 2.0);

        let data = pixmap.data();
        assert!(data[centre + 3] < 255);
        assert!(data[centre + 3] > 0);
        // A neighbour picked up some coverage.
        assert!(data[centre + 4 + 3] > 0);
        // Far corner stays empty.
        assert_eq!(data[3], 0);
    }

    #[test]
    fn test_uniform_interior_unchanged() {
        let mut pixmap = Pixmap::new(40, 40).expect("pixmap");
        pixmap.fill(Color::from_rgba8(100, 50, 25, 255));
        blur(&mut pixmap, 1.0);
        let mid = (20 * 40 + 20) * 4;
        assert_eq!(&pixmap.data()[mid..mid + 4], &[100, 50, 25, 255]);
    }

    #[test]
    fn test_zero_sigma_is_noop() {
        let mut pixmap = Pixmap::new(4, 4).expect("pixmap");
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));
        let before = pixmap.data().to_vec();
        blur(&mut pixmap, 0.0);
        assert_eq!(pixmap.data(), &before[..]);
    }
}
