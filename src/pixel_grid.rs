//! Fixed-size, image-shaped buffers for the 120 × 160 sensor.
//!
//! Every stage of the edge detector reads and writes a [`Grid`] of the same
//! shape. Grids are allocated once (see [`crate::pipeline::HorizonSensor`]) and
//! reused cycle after cycle, so a cycle never touches the allocator.
//!
//! Pixel values follow the sensor convention: 14 effective bits in a 16-bit
//! container, `0` brightest and `0x3FFF` darkest.

use std::ops::{Index, IndexMut};

use anyhow::{Context, Result};

/// Sensor rows.
pub const ROWS: usize = 120;
/// Sensor columns.
pub const COLS: usize = 160;
/// Total pixel count.
pub const NUM_PIXELS: usize = ROWS * COLS;
/// Largest value a 14-bit sample can hold.
pub const PIXEL_MAX: u16 = 0x3FFF;

/// A row-major `ROWS × COLS` buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Box<[T]>,
}

impl<T: Copy + Default> Grid<T> {
    /// A grid filled with `T::default()`.
    pub fn new() -> Self {
        Self::filled(T::default())
    }

    /// A grid with every cell set to `value`.
    pub fn filled(value: T) -> Self {
        Self {
            data: vec![value; NUM_PIXELS].into_boxed_slice(),
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut grid = Self::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                grid[(row, col)] = f(row, col);
            }
        }
        grid
    }

    /// Reset every cell to `value` without reallocating.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over `(row, col, value)` for every cell.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(idx, &v)| (idx / COLS, idx % COLS, v))
    }
}

impl<T: Copy + Default> Default for Grid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * COLS + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * COLS + col]
    }
}

/// One raw sensor frame.
pub type PixelGrid = Grid<u16>;

impl Grid<u16> {
    /// Build a frame from row-major samples (row 0 is the top of the image).
    ///
    /// Fails if the slice is not exactly `ROWS * COLS` long or if a sample
    /// exceeds the 14-bit range.
    pub fn from_raw(pixels: &[u16]) -> Result<Self> {
        anyhow::ensure!(
            pixels.len() == NUM_PIXELS,
            "Pixel data length ({}) does not match {}x{}={}",
            pixels.len(),
            COLS,
            ROWS,
            NUM_PIXELS
        );
        if let Some((idx, &v)) = pixels.iter().enumerate().find(|&(_, &v)| v > PIXEL_MAX) {
            anyhow::bail!(
                "Pixel at row {}, col {} is {:#x}, outside the 14-bit sensor range",
                idx / COLS,
                idx % COLS,
                v
            );
        }
        Ok(Self {
            data: pixels.to_vec().into_boxed_slice(),
        })
    }

    /// Decode a raw frame of little-endian `u16` samples, top row first.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        anyhow::ensure!(
            bytes.len() == NUM_PIXELS * 2,
            "Raw frame is {} bytes, expected {}",
            bytes.len(),
            NUM_PIXELS * 2
        );
        let pixels: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self::from_raw(&pixels)
    }

    /// Load a raw little-endian frame from disk.
    pub fn load_raw(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read raw frame: {}", path.display()))?;
        Self::from_le_bytes(&bytes)
            .with_context(|| format!("Malformed raw frame: {}", path.display()))
    }

    /// Return a copy with the row order reversed.
    ///
    /// Frames read back from an OpenGL framebuffer arrive bottom row first.
    pub fn flipped_vertically(&self) -> Self {
        Self::from_fn(|row, col| self[(ROWS - 1 - row, col)])
    }
}

#[cfg(feature = "image")]
impl Grid<u16> {
    /// Load an image file and convert it to a sensor frame.
    ///
    /// See [`PixelGrid::from_image`] for the conversion.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;
        Self::from_image(&img)
    }

    /// Convert an in-memory image to a sensor frame.
    ///
    /// Luminance is reduced to 14 bits and inverted, so the brightest image
    /// pixel becomes `0` as on the sensor. The image must be exactly
    /// `COLS × ROWS`.
    pub fn from_image(img: &image::DynamicImage) -> Result<Self> {
        use image::GenericImageView;

        let (width, height) = img.dimensions();
        anyhow::ensure!(
            width as usize == COLS && height as usize == ROWS,
            "Image is {}x{}, the sensor is {}x{}",
            width,
            height,
            COLS,
            ROWS
        );
        let luma = img.to_luma16();
        let pixels: Vec<u16> = luma
            .as_raw()
            .iter()
            .map(|&v| PIXEL_MAX - (v >> 2))
            .collect();
        Self::from_raw(&pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_row_major() {
        let grid = Grid::<u16>::from_fn(|row, col| (row * 1000 + col) as u16);
        assert_eq!(grid[(0, 0)], 0);
        assert_eq!(grid[(2, 7)], 2007);
        assert_eq!(grid.as_slice()[2 * COLS + 7], 2007);
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = PixelGrid::from_raw(&[0u16; 10]).unwrap_err();
        assert!(err.to_string().contains("does not match"), "{}", err);
    }

    #[test]
    fn test_from_raw_rejects_out_of_range() {
        let mut pixels = vec![0u16; NUM_PIXELS];
        pixels[COLS + 3] = 0x4000;
        let err = PixelGrid::from_raw(&pixels).unwrap_err();
        assert!(err.to_string().contains("row 1, col 3"), "{}", err);
    }

    #[test]
    fn test_from_le_bytes() {
        let mut bytes = vec![0u8; NUM_PIXELS * 2];
        bytes[0] = 0x34;
        bytes[1] = 0x12;
        let grid = PixelGrid::from_le_bytes(&bytes).unwrap();
        assert_eq!(grid[(0, 0)], 0x1234);
        assert_eq!(grid[(0, 1)], 0);
    }

    #[test]
    fn test_flip_vertically() {
        let grid = Grid::<u16>::from_fn(|row, _| row as u16);
        let flipped = grid.flipped_vertically();
        assert_eq!(flipped[(0, 5)], (ROWS - 1) as u16);
        assert_eq!(flipped[(ROWS - 1, 5)], 0);
    }
}
