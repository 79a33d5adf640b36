//! Double thresholding, single-pass hysteresis and edge-point extraction.

use crate::pixel_grid::{Grid, COLS, ROWS};
use crate::Vector2;

/// Value marking a weak (candidate) edge pixel after thresholding.
pub const WEAK: i16 = 25;
/// Value marking a strong (confirmed) edge pixel.
pub const STRONG: i16 = 255;

/// Threshold levels derived from the suppressed magnitude grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Largest magnitude present.
    pub max: i16,
    /// Pixels at or above this are strong.
    pub high: i16,
    /// Pixels at or above this (and below `high`) are weak.
    pub low: i16,
}

impl Thresholds {
    /// `high = max × high_ratio`, `low = high × low_ratio`, each truncated
    /// to the pixel type.
    pub fn from_max(max: i16, low_ratio: f32, high_ratio: f32) -> Self {
        let high = (max as f32 * high_ratio) as i16;
        let low = (high as f32 * low_ratio) as i16;
        Self { max, high, low }
    }
}

/// Classify every pixel as [`STRONG`], [`WEAK`] or zero.
///
/// Zero-magnitude pixels always stay zero, so an image without any
/// gradient yields an empty map rather than an all-strong one.
pub fn double_threshold(
    suppressed: &Grid<i16>,
    output: &mut Grid<i16>,
    low_ratio: f32,
    high_ratio: f32,
) -> Thresholds {
    let max = suppressed.as_slice().iter().copied().max().unwrap_or(0);
    let thresholds = Thresholds::from_max(max, low_ratio, high_ratio);

    for row in 0..ROWS {
        for col in 0..COLS {
            let v = suppressed[(row, col)];
            output[(row, col)] = if v <= 0 {
                0
            } else if v >= thresholds.high {
                STRONG
            } else if v >= thresholds.low {
                WEAK
            } else {
                0
            };
        }
    }
    thresholds
}

/// Promote weak pixels touching a strong pixel (8-connected); drop the rest.
///
/// Neighbours are read from `classified`, never from `output`, so this is a
/// single pass: a weak pixel two hops from the nearest strong pixel is
/// dropped even if the weak pixel between them is promoted.
pub fn hysteresis(classified: &Grid<i16>, output: &mut Grid<i16>) {
    output.fill(0);
    for row in 1..ROWS - 1 {
        for col in 1..COLS - 1 {
            output[(row, col)] = match classified[(row, col)] {
                STRONG => STRONG,
                WEAK if touches_strong(classified, row, col) => STRONG,
                _ => 0,
            };
        }
    }
}

fn touches_strong(grid: &Grid<i16>, row: usize, col: usize) -> bool {
    (row - 1..=row + 1)
        .flat_map(|r| (col - 1..=col + 1).map(move |c| (r, c)))
        .any(|(r, c)| (r, c) != (row, col) && grid[(r, c)] == STRONG)
}

/// Image-centred coordinates of a pixel centre: origin at the image centre,
/// +x right, +y up.
pub fn pixel_to_image(row: usize, col: usize) -> Vector2 {
    Vector2::new(
        col as f32 + 0.5 - COLS as f32 / 2.0,
        ROWS as f32 / 2.0 - (row as f32 + 0.5),
    )
}

/// Append the image-centred coordinates of every non-zero pixel to `points`,
/// scanning row by row. `points` is cleared first.
pub fn extract_edge_points(edges: &Grid<i16>, points: &mut Vec<Vector2>) {
    points.clear();
    points.extend(
        edges
            .iter_cells()
            .filter(|&(_, _, v)| v != 0)
            .map(|(row, col, _)| pixel_to_image(row, col)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_truncate() {
        let t = Thresholds::from_max(1000, 0.5, 0.8);
        assert_eq!(t.high, 800);
        assert_eq!(t.low, 400);
        let t = Thresholds::from_max(7, 0.5, 0.8);
        assert_eq!(t.high, 5);
        assert_eq!(t.low, 2);
    }

    #[test]
    fn test_double_threshold_classes() {
        let mut suppressed = Grid::<i16>::new();
        suppressed[(10, 10)] = 1000;
        suppressed[(10, 11)] = 800;
        suppressed[(10, 12)] = 500;
        suppressed[(10, 13)] = 399;
        let mut out = Grid::new();
        let t = double_threshold(&suppressed, &mut out, 0.5, 0.8);
        assert_eq!(t.max, 1000);
        assert_eq!(out[(10, 10)], STRONG);
        assert_eq!(out[(10, 11)], STRONG);
        assert_eq!(out[(10, 12)], WEAK);
        assert_eq!(out[(10, 13)], 0);
        assert_eq!(out[(50, 50)], 0);
    }

    #[test]
    fn test_double_threshold_empty_map_stays_empty() {
        let suppressed = Grid::<i16>::new();
        let mut out = Grid::filled(3);
        let t = double_threshold(&suppressed, &mut out, 0.5, 0.8);
        assert_eq!(t.max, 0);
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_double_threshold_is_idempotent_on_strong() {
        let suppressed = Grid::<i16>::from_fn(|row, col| ((row * 31 + col * 17) % 1200) as i16);
        let mut first = Grid::new();
        double_threshold(&suppressed, &mut first, 0.5, 0.8);
        let mut second = Grid::new();
        double_threshold(&first, &mut second, 0.5, 0.8);

        for (row, col, v) in first.iter_cells() {
            let again = second[(row, col)];
            match v {
                STRONG => assert_eq!(again, STRONG, "strong pixel ({row}, {col}) changed"),
                WEAK => assert!(again == 0 || again == STRONG),
                _ => assert_eq!(again, 0),
            }
        }
        // Re-applying to its own output is a fixed point from then on.
        let mut third = Grid::new();
        double_threshold(&second, &mut third, 0.5, 0.8);
        assert_eq!(second, third);
    }

    #[test]
    fn test_hysteresis_single_pass() {
        let mut classified = Grid::<i16>::new();
        classified[(20, 20)] = STRONG;
        classified[(20, 21)] = WEAK; // adjacent: promoted
        classified[(20, 22)] = WEAK; // two hops: dropped
        classified[(40, 40)] = WEAK; // isolated: dropped
        classified[(21, 19)] = WEAK; // diagonal: promoted

        let mut out = Grid::new();
        hysteresis(&classified, &mut out);
        assert_eq!(out[(20, 20)], STRONG);
        assert_eq!(out[(20, 21)], STRONG);
        assert_eq!(out[(20, 22)], 0);
        assert_eq!(out[(40, 40)], 0);
        assert_eq!(out[(21, 19)], STRONG);
    }

    #[test]
    fn test_pixel_to_image_is_centred() {
        let top_left = pixel_to_image(0, 0);
        assert_eq!(top_left, Vector2::new(-79.5, 59.5));
        let bottom_right = pixel_to_image(ROWS - 1, COLS - 1);
        assert_eq!(bottom_right, Vector2::new(79.5, -59.5));
        let centre = pixel_to_image(60, 80);
        assert_eq!(centre, Vector2::new(0.5, -0.5));
    }

    #[test]
    fn test_extract_all_zero_is_empty() {
        let edges = Grid::<i16>::new();
        let mut points = vec![Vector2::new(1.0, 1.0)];
        extract_edge_points(&edges, &mut points);
        assert!(points.is_empty());
    }

    #[test]
    fn test_extract_scans_row_major() {
        let mut edges = Grid::<i16>::new();
        edges[(5, 100)] = STRONG;
        edges[(3, 10)] = STRONG;
        let mut points = Vec::new();
        extract_edge_points(&edges, &mut points);
        assert_eq!(points, vec![pixel_to_image(3, 10), pixel_to_image(5, 100)]);
    }
}
