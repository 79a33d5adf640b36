//! 3×3 convolutions: Gaussian smoothing and Sobel gradients.
//!
//! Each convolution leaves a border it cannot compute. The blur skips a
//! 1-pixel margin; the gradient reads the blurred grid and so skips 2. The
//! skipped cells are written as zero and are never read as data downstream.

use crate::pixel_grid::{Grid, PixelGrid, COLS, PIXEL_MAX, ROWS};

/// Rows/columns at each image border left unset by [`gaussian_blur`].
pub const BLUR_MARGIN: usize = 1;
/// Rows/columns at each image border left unset by [`sobel`].
pub const GRADIENT_MARGIN: usize = BLUR_MARGIN + 1;

/// 3×3 Gaussian, weights 1-2-1 / 2-4-2 / 1-2-1 over 16.
pub const GAUSSIAN_KERNEL: [[f32; 3]; 3] = [
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];

/// Horizontal Sobel kernel: positive when values increase to the right.
pub const SOBEL_X: [[i16; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical Sobel kernel: positive when values increase towards the top row.
pub const SOBEL_Y: [[i16; 3]; 3] = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];

/// Smooth a raw frame with [`GAUSSIAN_KERNEL`].
pub fn gaussian_blur(input: &PixelGrid, output: &mut Grid<i16>) {
    output.fill(0);
    for row in BLUR_MARGIN..ROWS - BLUR_MARGIN {
        for col in BLUR_MARGIN..COLS - BLUR_MARGIN {
            let mut sum = 0.0f32;
            for (a, kernel_row) in GAUSSIAN_KERNEL.iter().enumerate() {
                for (b, &k) in kernel_row.iter().enumerate() {
                    sum += input[(row + a - 1, col + b - 1)] as f32 * k;
                }
            }
            output[(row, col)] = sum.clamp(0.0, PIXEL_MAX as f32) as i16;
        }
    }
}

/// Convolve the blurred grid with a gradient kernel.
///
/// The sum is accumulated wide and saturated to `0..=PIXEL_MAX`, so strong
/// edges clip instead of wrapping and negative responses read as zero.
pub fn sobel(input: &Grid<i16>, output: &mut Grid<i16>, kernel: &[[i16; 3]; 3]) {
    output.fill(0);
    for row in GRADIENT_MARGIN..ROWS - GRADIENT_MARGIN {
        for col in GRADIENT_MARGIN..COLS - GRADIENT_MARGIN {
            let mut sum = 0i32;
            for (a, kernel_row) in kernel.iter().enumerate() {
                for (b, &k) in kernel_row.iter().enumerate() {
                    sum += input[(row + a - 1, col + b - 1)] as i32 * k as i32;
                }
            }
            output[(row, col)] = sum.clamp(0, PIXEL_MAX as i32) as i16;
        }
    }
}
