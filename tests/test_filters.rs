// Integration tests for the filter kernels through the public `apply` API.

use image_modifier::filters::{GrayscaleWeights, HsvAdjust, MAX_BLUR_RADIUS};
use image_modifier::{
    apply, apply_with, ExecutionPath, FilterError, FilterMode, FilterOptions, PixelBuffer,
};

/// Deterministic noise image (xorshift), so parity checks see every kind of
/// neighbourhood rather than smooth gradients only.
fn noise(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut state = seed.max(1);
    let data = (0..width * height * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    PixelBuffer::from_raw(width, height, data).unwrap()
}

// ===== Sequential / parallel parity =====

#[test]
fn parallel_matches_sequential_for_every_mode() {
    for (width, height, seed) in [(1, 1, 1), (1, 9, 2), (9, 1, 3), (64, 48, 4), (127, 33, 5)] {
        let input = noise(width, height, seed);
        for mode in FilterMode::ALL {
            let seq = apply(mode, ExecutionPath::Sequential, &input).unwrap();
            let par = apply(mode, ExecutionPath::Parallel, &input).unwrap();
            assert_eq!(
                seq.as_bytes(),
                par.as_bytes(),
                "{mode} differs on {width}x{height}"
            );
        }
    }
}

#[test]
fn parallel_matches_sequential_with_custom_options() {
    let input = noise(50, 40, 99);
    let options = FilterOptions {
        grayscale_weights: GrayscaleWeights::average(),
        blur_radius: MAX_BLUR_RADIUS,
        hsv: HsvAdjust {
            hue_shift: 75.0,
            saturation: 0.5,
            value: 1.4,
        },
        emboss_depth: 3,
    };
    for mode in FilterMode::ALL {
        let seq = apply_with(mode, ExecutionPath::Sequential, &input, &options).unwrap();
        let par = apply_with(mode, ExecutionPath::Parallel, &input, &options).unwrap();
        assert_eq!(seq, par, "{mode}");
    }
}

#[test]
fn parallel_matches_sequential_in_small_pool() {
    let input = noise(31, 200, 7);
    let pool = image_modifier::harness::build_pool(3).unwrap();
    for mode in FilterMode::ALL {
        let seq = apply(mode, ExecutionPath::Sequential, &input).unwrap();
        let par = pool
            .install(|| apply(mode, ExecutionPath::Parallel, &input))
            .unwrap();
        assert_eq!(seq, par, "{mode}");
    }
}

// ===== Greyscale =====

#[test]
fn greyscale_is_idempotent() {
    let input = noise(20, 20, 11);
    for path in [ExecutionPath::Sequential, ExecutionPath::Parallel] {
        let once = apply(FilterMode::Greyscale, path, &input).unwrap();
        let twice = apply(FilterMode::Greyscale, path, &once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn greyscale_white_2x2_unchanged() {
    let white = PixelBuffer::filled(2, 2, [255, 255, 255]);
    let out = apply(FilterMode::Greyscale, ExecutionPath::Sequential, &white).unwrap();
    assert_eq!(out, white);
}

#[test]
fn greyscale_replicates_luminance() {
    let input = noise(8, 8, 3);
    let out = apply(FilterMode::Greyscale, ExecutionPath::Parallel, &input).unwrap();
    for px in out.as_bytes().chunks_exact(3) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}

// ===== Blur =====

#[test]
fn blur_single_pixel() {
    let input = PixelBuffer::from_raw(1, 1, vec![12, 34, 56]).unwrap();
    for path in [ExecutionPath::Sequential, ExecutionPath::Parallel] {
        let out = apply(FilterMode::Blur, path, &input).unwrap();
        assert_eq!(out, input);
    }
}

#[test]
fn blur_smooths_noise() {
    let input = noise(40, 40, 21);
    let out = apply(FilterMode::Blur, ExecutionPath::Parallel, &input).unwrap();

    // Total variation along rows must drop.
    let variation = |buf: &PixelBuffer| -> u64 {
        buf.as_bytes()
            .windows(4)
            .map(|w| (w[0] as i32 - w[3] as i32).unsigned_abs() as u64)
            .sum()
    };
    assert!(variation(&out) < variation(&input) / 2);
}

// ===== Errors =====

#[test]
fn empty_buffer_is_invalid() {
    let empty = PixelBuffer::from_raw(5, 0, Vec::new()).unwrap();
    for mode in FilterMode::ALL {
        let err = apply(mode, ExecutionPath::Parallel, &empty).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBuffer(_)), "{mode}");
    }
}

#[test]
fn mismatched_raw_buffer_is_invalid() {
    let err = PixelBuffer::from_raw(4, 4, vec![0; 47]).unwrap_err();
    assert!(matches!(err, FilterError::InvalidBuffer(_)));
}

#[test]
fn unknown_mode_is_unsupported() {
    let err = "posterize".parse::<FilterMode>().unwrap_err();
    assert!(matches!(err, FilterError::UnsupportedMode(_)));
}

#[test]
fn out_of_range_options_rejected() {
    let input = noise(4, 4, 1);
    let options = FilterOptions {
        blur_radius: MAX_BLUR_RADIUS + 1,
        ..FilterOptions::default()
    };
    let err =
        apply_with(FilterMode::Blur, ExecutionPath::Sequential, &input, &options).unwrap_err();
    assert!(matches!(err, FilterError::InvalidOptions(_)));
}

// ===== HSV =====

#[test]
fn tiny_negative_hue_shift_keeps_colour() {
    let red = PixelBuffer::filled(1, 1, [255, 0, 0]);
    let options = FilterOptions {
        hsv: HsvAdjust {
            hue_shift: -1e-6,
            saturation: 1.0,
            value: 1.0,
        },
        ..FilterOptions::default()
    };
    for path in [ExecutionPath::Sequential, ExecutionPath::Parallel] {
        let out = apply_with(FilterMode::Hsv, path, &red, &options).unwrap();
        assert_eq!(out, red);
    }
}
