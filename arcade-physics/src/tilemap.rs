// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Tilemap layers as seen by the physics core
//!
//! The tilemap subsystem owns tile data; physics only reads it through the
//! [`TileLayer`] trait. Each tile carries two sets of per-side flags:
//!
//! - `collide_*`: whether a body moving into that side is stopped. Setting
//!   only `collide_up` gives a one-way platform.
//! - `face_*`: whether that side is an exposed edge. An edge shared by two
//!   colliding tiles is interior and never separates, so bodies sliding
//!   along a floor made of many tiles do not snag on the seams.
//!
//! [`GridLayer`] keeps faces up to date whenever collision flags change.

use crate::math::{Rect, Vec2};

/// One grid cell of a tile layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    /// Tile index from the map data (`-1` for an empty cell)
    pub index: i32,
    /// Stops bodies moving down onto the top side
    pub collide_up: bool,
    /// Stops bodies moving up into the bottom side
    pub collide_down: bool,
    /// Stops bodies moving right into the left side
    pub collide_left: bool,
    /// Stops bodies moving left into the right side
    pub collide_right: bool,
    /// Top side is an exposed edge
    pub face_up: bool,
    /// Bottom side is an exposed edge
    pub face_down: bool,
    /// Left side is an exposed edge
    pub face_left: bool,
    /// Right side is an exposed edge
    pub face_right: bool,
}

impl Tile {
    /// An empty, non-colliding cell
    pub const fn empty() -> Self {
        Tile {
            index: -1,
            collide_up: false,
            collide_down: false,
            collide_left: false,
            collide_right: false,
            face_up: false,
            face_down: false,
            face_left: false,
            face_right: false,
        }
    }

    /// A tile colliding on every side, with every side exposed
    pub const fn solid(index: i32) -> Self {
        Tile {
            index,
            collide_up: true,
            collide_down: true,
            collide_left: true,
            collide_right: true,
            face_up: true,
            face_down: true,
            face_left: true,
            face_right: true,
        }
    }

    /// A one-way platform: only bodies landing from above are stopped
    pub const fn platform(index: i32) -> Self {
        Tile {
            index,
            collide_up: true,
            collide_down: false,
            collide_left: false,
            collide_right: false,
            face_up: true,
            face_down: false,
            face_left: false,
            face_right: false,
        }
    }

    /// True if any side collides
    pub fn collides(&self) -> bool {
        self.collide_up || self.collide_down || self.collide_left || self.collide_right
    }

    /// True if any side is an exposed edge
    pub fn has_interesting_face(&self) -> bool {
        self.face_up || self.face_down || self.face_left || self.face_right
    }
}

/// Inclusive range of cells, clamped to a layer's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// First column
    pub min_x: i32,
    /// First row
    pub min_y: i32,
    /// Last column (inclusive)
    pub max_x: i32,
    /// Last row (inclusive)
    pub max_y: i32,
}

impl CellRange {
    /// Iterate cells row by row, left to right
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let CellRange { min_x, min_y, max_x, max_y } = *self;
        (min_y..=max_y).flat_map(move |cy| (min_x..=max_x).map(move |cx| (cx, cy)))
    }
}

/// Read-only view of a tile layer
pub trait TileLayer {
    /// Tile at a cell, or `None` outside the grid
    fn tile_at(&self, cx: i32, cy: i32) -> Option<&Tile>;

    /// Grid size in cells `(columns, rows)`
    fn dimensions(&self) -> (u32, u32);

    /// Size of one cell in world units
    fn tile_size(&self) -> Vec2;

    /// World position of the grid's top-left corner
    fn origin(&self) -> Vec2;

    /// World-space rectangle of one cell
    fn cell_rect(&self, cx: i32, cy: i32) -> Rect {
        let size = self.tile_size();
        let origin = self.origin();
        Rect::new(
            origin.x + cx as f64 * size.x,
            origin.y + cy as f64 * size.y,
            size.x,
            size.y,
        )
    }

    /// World-space rectangle covered by the whole layer
    fn world_bounds(&self) -> Rect {
        let (columns, rows) = self.dimensions();
        let size = self.tile_size();
        let origin = self.origin();
        Rect::new(origin.x, origin.y, columns as f64 * size.x, rows as f64 * size.y)
    }

    /// Cells under a world-space rectangle, clamped to the grid
    ///
    /// Returns `None` when the rectangle lies entirely outside the layer.
    fn cells_under(&self, area: &Rect) -> Option<CellRange> {
        let (columns, rows) = self.dimensions();
        let size = self.tile_size();
        if columns == 0 || rows == 0 || !area.is_valid() || size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        if !self.world_bounds().overlaps_inclusive(area) {
            return None;
        }
        let origin = self.origin();
        let to_cell = |v: f64, o: f64, s: f64, max: u32| -> i32 {
            (((v - o) / s).floor() as i64).clamp(0, max as i64 - 1) as i32
        };
        Some(CellRange {
            min_x: to_cell(area.x, origin.x, size.x, columns),
            min_y: to_cell(area.y, origin.y, size.y, rows),
            max_x: to_cell(area.right(), origin.x, size.x, columns),
            max_y: to_cell(area.bottom(), origin.y, size.y, rows),
        })
    }
}

/// Dense rectangular tile layer
///
/// # Example
///
/// ```
/// use arcade_physics::tilemap::{GridLayer, TileLayer};
///
/// // A 4x3 map with a floor on the bottom row
/// let data = [
///     -1, -1, -1, -1,
///     -1, -1, -1, -1,
///      1,  1,  1,  1,
/// ];
/// let layer = GridLayer::from_indices(4, 3, 16.0, 16.0, &data, |index| index > 0);
///
/// let floor = layer.tile_at(1, 2).unwrap();
/// assert!(floor.collide_up && floor.face_up);
/// // Interior seams between floor tiles are not faces
/// assert!(!floor.face_left && !floor.face_right);
/// ```
#[derive(Debug, Clone)]
pub struct GridLayer {
    columns: u32,
    rows: u32,
    tile_size: Vec2,
    origin: Vec2,
    tiles: Vec<Tile>,
}

impl GridLayer {
    /// Create an empty layer
    ///
    /// # Panics
    ///
    /// Panics if the tile size is not positive and finite.
    pub fn new(columns: u32, rows: u32, tile_width: f64, tile_height: f64) -> Self {
        assert!(
            tile_width > 0.0 && tile_height > 0.0 && tile_width.is_finite() && tile_height.is_finite(),
            "Tile size must be positive and finite"
        );
        GridLayer {
            columns,
            rows,
            tile_size: Vec2::new(tile_width, tile_height),
            origin: Vec2::ZERO,
            tiles: vec![Tile::empty(); columns as usize * rows as usize],
        }
    }

    /// Build a layer from map indices, marking tiles solid where `collides(index)` holds
    ///
    /// # Panics
    ///
    /// Panics if `indices.len() != columns * rows`.
    pub fn from_indices(
        columns: u32,
        rows: u32,
        tile_width: f64,
        tile_height: f64,
        indices: &[i32],
        collides: impl Fn(i32) -> bool,
    ) -> Self {
        assert_eq!(
            indices.len(),
            columns as usize * rows as usize,
            "Index data does not match layer dimensions"
        );
        let mut layer = GridLayer::new(columns, rows, tile_width, tile_height);
        for (tile, &index) in layer.tiles.iter_mut().zip(indices) {
            *tile = if collides(index) {
                Tile::solid(index)
            } else {
                Tile { index, ..Tile::empty() }
            };
        }
        layer.recalculate_faces();
        layer
    }

    /// Move the layer's top-left corner
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    fn cell_index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as u32 >= self.columns || cy as u32 >= self.rows {
            return None;
        }
        Some(cy as usize * self.columns as usize + cx as usize)
    }

    /// Replace a tile and refresh faces around it
    ///
    /// Returns `false` if the cell is outside the grid.
    pub fn set_tile(&mut self, cx: i32, cy: i32, tile: Tile) -> bool {
        match self.cell_index(cx, cy) {
            Some(i) => {
                self.tiles[i] = tile;
                self.recalculate_faces_around(cx, cy);
                true
            }
            None => false,
        }
    }

    /// Set per-side collision on a cell and refresh faces around it
    pub fn set_collision(&mut self, cx: i32, cy: i32, up: bool, down: bool, left: bool, right: bool) -> bool {
        match self.cell_index(cx, cy) {
            Some(i) => {
                let tile = &mut self.tiles[i];
                tile.collide_up = up;
                tile.collide_down = down;
                tile.collide_left = left;
                tile.collide_right = right;
                self.recalculate_faces_around(cx, cy);
                true
            }
            None => false,
        }
    }

    /// Recompute every tile's faces
    pub fn recalculate_faces(&mut self) {
        for cy in 0..self.rows as i32 {
            for cx in 0..self.columns as i32 {
                self.calculate_faces_at(cx, cy);
            }
        }
    }

    fn recalculate_faces_around(&mut self, cx: i32, cy: i32) {
        for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            self.calculate_faces_at(cx + dx, cy + dy);
        }
    }

    fn calculate_faces_at(&mut self, cx: i32, cy: i32) {
        let Some(i) = self.cell_index(cx, cy) else {
            return;
        };
        let neighbour_collides = |x: i32, y: i32| self.tile_at(x, y).map_or(false, Tile::collides);
        let above = neighbour_collides(cx, cy - 1);
        let below = neighbour_collides(cx, cy + 1);
        let left = neighbour_collides(cx - 1, cy);
        let right = neighbour_collides(cx + 1, cy);

        let tile = &mut self.tiles[i];
        if tile.collides() {
            tile.face_up = !above;
            tile.face_down = !below;
            tile.face_left = !left;
            tile.face_right = !right;
        } else {
            tile.face_up = false;
            tile.face_down = false;
            tile.face_left = false;
            tile.face_right = false;
        }
    }
}

impl TileLayer for GridLayer {
    fn tile_at(&self, cx: i32, cy: i32) -> Option<&Tile> {
        self.cell_index(cx, cy).map(|i| &self.tiles[i])
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    fn origin(&self) -> Vec2 {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> GridLayer {
        let data = [
            -1, -1, -1, //
            -1, 1, -1, //
            1, 1, 1, //
        ];
        GridLayer::from_indices(3, 3, 10.0, 10.0, &data, |i| i > 0)
    }

    #[test]
    fn test_faces_skip_interior_edges() {
        let layer = layer();
        let top = layer.tile_at(1, 1).unwrap();
        assert!(top.face_up && top.face_left && top.face_right);
        assert!(!top.face_down);

        let floor_mid = layer.tile_at(1, 2).unwrap();
        assert!(!floor_mid.face_up, "covered by the tile above");
        assert!(!floor_mid.face_left && !floor_mid.face_right);
        assert!(floor_mid.face_down);
    }

    #[test]
    fn test_set_tile_refreshes_neighbours() {
        let mut layer = layer();
        assert!(layer.set_tile(1, 1, Tile::empty()));
        assert!(layer.tile_at(1, 2).unwrap().face_up);
        assert!(!layer.set_tile(5, 5, Tile::empty()));
    }

    #[test]
    fn test_cells_under_clamps_to_grid() {
        let layer = layer();
        let range = layer.cells_under(&Rect::new(-5.0, 15.0, 12.0, 100.0)).unwrap();
        assert_eq!(range, CellRange { min_x: 0, min_y: 1, max_x: 0, max_y: 2 });
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn test_cells_under_outside_layer() {
        let layer = layer();
        assert!(layer.cells_under(&Rect::new(100.0, 100.0, 5.0, 5.0)).is_none());
        assert!(layer.cells_under(&Rect::new(-20.0, 0.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn test_origin_offsets_cells() {
        let layer = layer().with_origin(Vec2::new(100.0, 0.0));
        assert_eq!(layer.cell_rect(1, 0), Rect::new(110.0, 0.0, 10.0, 10.0));
        let range = layer.cells_under(&Rect::new(112.0, 1.0, 2.0, 2.0)).unwrap();
        assert_eq!((range.min_x, range.max_x), (1, 1));
    }

    #[test]
    fn test_platform_tile() {
        let tile = Tile::platform(3);
        assert!(tile.collides());
        assert!(tile.collide_up && !tile.collide_down);
    }
}
