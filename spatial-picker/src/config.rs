use crate::LatLng;

pub const DEFAULT_CENTER: LatLng = LatLng::new_unchecked(51.505, -0.09);
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Display label shown above the map.
    pub name: String,
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    /// Height of the map region in points.
    pub map_height: f32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            name: "World".into(),
            initial_center: DEFAULT_CENTER,
            initial_zoom: DEFAULT_ZOOM,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "© OpenStreetMap contributors".into(),
            map_height: 200.0,
        }
    }
}
