//! Row-order conversion for RGBA8 framebuffer readbacks.

use fragshot_core::HarnessError;

/// Bytes per RGBA8 pixel.
pub const RGBA_CHANNELS: usize = 4;

/// Reverses the row order of a `width` x `height` RGBA8 buffer.
///
/// Row `i` of the result is row `height - 1 - i` of `rgba`. Applying it
/// twice gives back the input.
///
/// # Errors
///
/// Returns `HarnessError::Encode` if `rgba` is not exactly
/// `width * height * 4` bytes long.
pub fn flip_rows(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, HarnessError> {
    let stride = width as usize * RGBA_CHANNELS;
    let expected = stride * height as usize;
    if rgba.len() != expected {
        return Err(HarnessError::Encode(format!(
            "pixel buffer is {} bytes, expected {expected} for {width}x{height} RGBA",
            rgba.len()
        )));
    }
    if stride == 0 {
        return Ok(Vec::new());
    }

    Ok(rgba
        .chunks_exact(stride)
        .rev()
        .flatten()
        .copied()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Buffer whose pixel at row `y` has every channel set to `y`.
    fn rows_tagged_by_index(width: u32, height: u32) -> Vec<u8> {
        (0..height)
            .flat_map(|y| std::iter::repeat(y as u8).take(width as usize * RGBA_CHANNELS))
            .collect()
    }

    #[test]
    fn flip_reverses_row_order() {
        let flipped = flip_rows(&rows_tagged_by_index(2, 3), 2, 3).unwrap();
        let stride = 2 * RGBA_CHANNELS;
        assert!(flipped[..stride].iter().all(|&b| b == 2), "first row should be the last input row");
        assert!(flipped[stride..2 * stride].iter().all(|&b| b == 1));
        assert!(flipped[2 * stride..].iter().all(|&b| b == 0));
    }

    #[test]
    fn flip_keeps_pixels_within_a_row_in_order() {
        // One row of two distinct pixels stays as-is.
        let rgba = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(flip_rows(&rgba, 2, 1).unwrap(), rgba);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = flip_rows(&[0; 15], 2, 2).unwrap_err();
        assert!(matches!(err, HarnessError::Encode(_)), "got: {err}");
    }

    #[test]
    fn empty_image_flips_to_empty() {
        assert!(flip_rows(&[], 0, 5).unwrap().is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn image() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
            (1u32..16, 1u32..16).prop_flat_map(|(w, h)| {
                let len = w as usize * h as usize * RGBA_CHANNELS;
                (Just(w), Just(h), prop::collection::vec(any::<u8>(), len))
            })
        }

        proptest! {
            #[test]
            fn flip_twice_is_identity((w, h, rgba) in image()) {
                let once = flip_rows(&rgba, w, h).unwrap();
                prop_assert_eq!(flip_rows(&once, w, h).unwrap(), rgba);
            }

            #[test]
            fn row_i_comes_from_row_h_minus_one_minus_i((w, h, rgba) in image()) {
                let stride = w as usize * RGBA_CHANNELS;
                let flipped = flip_rows(&rgba, w, h).unwrap();
                for i in 0..h as usize {
                    let src = h as usize - 1 - i;
                    prop_assert_eq!(
                        &flipped[i * stride..(i + 1) * stride],
                        &rgba[src * stride..(src + 1) * stride]
                    );
                }
            }
        }
    }
}
