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
//! Body versus tile separation
//!
//! A tile only stops a body on a face that is both collidable and
//! *interesting* (not shared with a neighbouring colliding tile). That is
//! what keeps bodies from snagging on the internal seams of a flat floor,
//! and what lets a tile with only `collide_up` act as a one-way platform.

use super::info::rect_penetrates;
use crate::body::{Body, ContactState, Face};
use crate::math::Rect;
use crate::tilemap::Tile;

/// Default maximum tile penetration that will still be resolved
pub const TILE_BIAS: f64 = 16.0;

/// True if the body intersects the tile's cell and the tile collides at all
pub fn tile_overlaps(body: &Body, tile: &Tile, tile_rect: &Rect) -> bool {
    if !tile.collides() {
        return false;
    }
    match body.radius() {
        Some(r) => {
            let c = body.center();
            tile_rect.closest_point(c).distance(c) < r
        }
        None => body.bounds().intersects(tile_rect),
    }
}

/// Separate a body from one tile; returns true if the body was moved
///
/// The axis with the larger movement this step is tried first. When the
/// body moves diagonally into a tile with both a horizontal and a vertical
/// interesting face, the axis with the smaller edge distance goes first
/// instead.
pub fn separate_tile(body: &mut Body, tile: &Tile, tile_rect: &Rect, tile_bias: f64) -> bool {
    body.contact.advance(ContactState::Checked);
    if !tile_overlaps(body, tile, tile_rect) {
        return false;
    }

    let delta = body.delta();
    let (mut min_x, mut min_y) = (0.0, 1.0);
    if delta.x.abs() > delta.y.abs() {
        min_x = -1.0;
    } else if delta.x.abs() < delta.y.abs() {
        min_y = -1.0;
    }

    if delta.x != 0.0
        && delta.y != 0.0
        && (tile.face_left || tile.face_right)
        && (tile.face_up || tile.face_down)
    {
        min_x = (body.position.x - tile_rect.right()).abs().min((body.right() - tile_rect.x).abs());
        min_y = (body.position.y - tile_rect.bottom()).abs().min((body.bottom() - tile_rect.y).abs());
    }

    let x_first = min_x < min_y;
    let mut moved = if x_first {
        resolve_x(body, tile, tile_rect, tile_bias)
    } else {
        resolve_y(body, tile, tile_rect, tile_bias)
    };

    if tile_overlaps(body, tile, tile_rect) {
        moved |= if x_first {
            resolve_y(body, tile, tile_rect, tile_bias)
        } else {
            resolve_x(body, tile, tile_rect, tile_bias)
        };
    }

    if moved {
        body.contact.advance(ContactState::Separated);
    }
    moved
}

fn resolve_x(body: &mut Body, tile: &Tile, tile_rect: &Rect, bias: f64) -> bool {
    let ox = tile_overlap_x(body, tile, tile_rect, bias);
    if ox == 0.0 {
        return false;
    }
    body.blocked.set(if ox < 0.0 { Face::Left } else { Face::Right });
    body.position.x -= ox;
    body.velocity.x = bounce_off(body.velocity.x, body.bounce().x);
    true
}

fn resolve_y(body: &mut Body, tile: &Tile, tile_rect: &Rect, bias: f64) -> bool {
    let oy = tile_overlap_y(body, tile, tile_rect, bias);
    if oy == 0.0 {
        return false;
    }
    body.blocked.set(if oy < 0.0 { Face::Up } else { Face::Down });
    body.position.y -= oy;
    body.velocity.y = bounce_off(body.velocity.y, body.bounce().y);
    true
}

fn bounce_off(velocity: f64, bounce: f64) -> f64 {
    if bounce == 0.0 {
        0.0
    } else {
        -velocity * bounce
    }
}

/// Horizontal penetration into a tile, or zero if it should be ignored
///
/// Positive when the body moved right into the tile's left face.
pub fn tile_overlap_x(body: &Body, tile: &Tile, tile_rect: &Rect, bias: f64) -> f64 {
    let dx = body.delta().x;
    if dx < 0.0 && tile.collide_right && tile.face_right && body.check_collision.left {
        let ox = body.position.x - tile_rect.right();
        if ox < 0.0 && ox >= -bias {
            return ox;
        }
    } else if dx > 0.0 && tile.collide_left && tile.face_left && body.check_collision.right {
        let ox = body.right() - tile_rect.x;
        if ox > 0.0 && ox <= bias {
            return ox;
        }
    }
    0.0
}

/// Vertical penetration into a tile, or zero if it should be ignored
///
/// Positive when the body moved down onto the tile's top face.
pub fn tile_overlap_y(body: &Body, tile: &Tile, tile_rect: &Rect, bias: f64) -> f64 {
    let dy = body.delta().y;
    if dy < 0.0 && tile.collide_down && tile.face_down && body.check_collision.up {
        let oy = body.position.y - tile_rect.bottom();
        if oy < 0.0 && oy >= -bias {
            return oy;
        }
    } else if dy > 0.0 && tile.collide_up && tile.face_up && body.check_collision.down {
        let oy = body.bottom() - tile_rect.y;
        if oy > 0.0 && oy <= bias {
            return oy;
        }
    }
    0.0
}

/// Mark a body embedded if separation left it inside any of `tiles`
pub(crate) fn mark_if_embedded(body: &mut Body, tiles: &[(Tile, Rect)]) {
    let bounds = body.bounds();
    if tiles.iter().any(|(tile, rect)| tile.collides() && rect_penetrates(&bounds, rect)) {
        body.mark_embedded();
    }
}
