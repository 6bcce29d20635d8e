//! Web-Mercator conversion between geographic and screen coordinates.

use std::f64::consts::PI;

use egui::{Pos2, Rect};

use crate::LatLng;

pub const TILE_SIZE: f64 = 256.0;
/// Latitude at which the Web-Mercator world becomes square.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// A viewport centered on `center` at an integer `zoom` level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

impl Viewport {
    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powi(self.zoom as i32)
    }

    fn to_world(&self, at: LatLng) -> (f64, f64) {
        let world_size = self.world_size();
        let lat_rad = at
            .lat()
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let x = (at.lng() + 180.0) / 360.0 * world_size;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world_size;
        (x, y)
    }

    pub fn project(&self, at: LatLng, rect: Rect) -> Pos2 {
        let (cx, cy) = self.to_world(self.center);
        let (x, y) = self.to_world(at);
        let center = rect.center();
        Pos2::new(
            center.x + (x - cx) as f32,
            center.y + (y - cy) as f32,
        )
    }

    /// Inverse of [`Viewport::project`]. Positions beyond the world edge are
    /// clamped into the valid coordinate range.
    pub fn unproject(&self, pos: Pos2, rect: Rect) -> LatLng {
        let world_size = self.world_size();
        let (cx, cy) = self.to_world(self.center);
        let center = rect.center();
        let x = cx + (pos.x - center.x) as f64;
        let y = (cy + (pos.y - center.y) as f64).clamp(0.0, world_size);
        let lng = (x / world_size * 360.0 - 180.0).clamp(-180.0, 180.0);
        let lat = (PI * (1.0 - 2.0 * y / world_size)).sinh().atan().to_degrees();
        LatLng::new_unchecked(lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE), lng)
    }

    /// Metres covered by one screen pixel at the given latitude.
    pub fn metres_per_pixel(&self, lat: f64) -> f64 {
        const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;
        EARTH_CIRCUMFERENCE * lat.to_radians().cos() / self.world_size()
    }
}
