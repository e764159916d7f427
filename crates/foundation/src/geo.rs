/// Geographic primitives in WGS84 degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        LngLat { lng, lat }
    }
}

/// West/south/east/north bounds, matching the WSEN array order used by the
/// space statistics endpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLatBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl LngLatBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        LngLatBounds {
            west,
            south,
            east,
            north,
        }
    }

    pub fn from_wsen(bbox: [f64; 4]) -> Self {
        LngLatBounds {
            west: bbox[0],
            south: bbox[1],
            east: bbox[2],
            north: bbox[3],
        }
    }

    pub fn to_wsen(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Inclusive on all edges.
    pub fn contains(&self, point: LngLat) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn south_west(&self) -> LngLat {
        LngLat::new(self.west, self.south)
    }

    pub fn north_east(&self) -> LngLat {
        LngLat::new(self.east, self.north)
    }
}

/// A map camera position: center plus zoom level.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

impl MapView {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        MapView { lat, lng, zoom }
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}
