/// A longitude/latitude rectangle in degrees.
///
/// Containment is half-open, `[west, east) x [south, north)`, except that
/// the edges at 180 degrees east and 90 degrees north are closed so the
/// whole-sky box holds every valid point. Sibling boxes produced by
/// [`split`](Self::split) therefore tile their parent without overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl BoundingBox {
    pub const WHOLE_SKY: Self = Self {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        let in_longitude = longitude >= self.west
            && (longitude < self.east || (self.east == 180.0 && longitude <= self.east));
        let in_latitude = latitude >= self.south
            && (latitude < self.north || (self.north == 90.0 && latitude <= self.north));
        in_longitude && in_latitude
    }

    pub fn mid_longitude(&self) -> f64 {
        0.5 * (self.west + self.east)
    }

    /// Latitude splitting the box into two bands of equal solid angle:
    /// `sin(mid) = (sin(south) + sin(north)) / 2`.
    pub fn mid_latitude(&self) -> f64 {
        let z_south = self.south.to_radians().sin();
        let z_north = self.north.to_radians().sin();
        (0.5 * (z_south + z_north)).asin().to_degrees()
    }

    /// Child index for a point: 0 = SW, 1 = SE, 2 = NW, 3 = NE. Points on a
    /// split line go east or north.
    pub fn quadrant(&self, longitude: f64, latitude: f64) -> usize {
        let east = longitude >= self.mid_longitude();
        let north = latitude >= self.mid_latitude();
        (north as usize) * 2 + east as usize
    }

    /// The four children, ordered as [`quadrant`](Self::quadrant) numbers them.
    pub fn split(&self) -> [BoundingBox; 4] {
        let lon = self.mid_longitude();
        let lat = self.mid_latitude();
        [
            Self::new(self.west, lon, self.south, lat),
            Self::new(lon, self.east, self.south, lat),
            Self::new(self.west, lon, lat, self.north),
            Self::new(lon, self.east, lat, self.north),
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::WHOLE_SKY
    }
}
