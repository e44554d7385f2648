use crate::config::{
    CONTAINER_INSET, GRID_GAP, MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH, SURFACE_ASPECT,
};

/// Near-square grid holding one surface per worker, filled row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub count: usize,
    pub cols: usize,
    pub rows: usize,
}

impl GridLayout {
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            return Self {
                count,
                cols: 0,
                rows: 0,
            };
        }
        let cols = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);
        Self { count, cols, rows }
    }

    /// `(row, col)` of surface `index`.
    pub fn cell(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.count {
            return None;
        }
        Some((index / self.cols, index % self.cols))
    }

    /// Pixel size of each surface inside a container of the given client
    /// size: the grid cell shrunk to 4:3, never below the minimum surface.
    pub fn surface_size(&self, container_width: f64, container_height: f64) -> (f64, f64) {
        if self.count == 0 {
            return (MIN_SURFACE_WIDTH, MIN_SURFACE_HEIGHT);
        }
        let cols = self.cols as f64;
        let rows = self.rows as f64;
        let available_width = container_width - CONTAINER_INSET - (cols - 1.0) * GRID_GAP;
        let available_height = container_height - CONTAINER_INSET - (rows - 1.0) * GRID_GAP;

        let mut width = available_width / cols;
        let mut height = available_height / rows;
        if height > 0.0 && width / height > SURFACE_ASPECT {
            width = height * SURFACE_ASPECT;
        } else {
            height = width / SURFACE_ASPECT;
        }
        (width.max(MIN_SURFACE_WIDTH), height.max(MIN_SURFACE_HEIGHT))
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
