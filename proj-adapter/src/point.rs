/// A coordinate pair updated in place by [`fwd`](crate::fwd) and
/// [`inv`](crate::inv).
///
/// Geographic coordinates are (longitude, latitude) in degrees; projected
/// coordinates are (x, y) in the projection's linear units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// Laid out as three consecutive f64 so a slice can be handed to PROJ as
// strided x/y/z arrays.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
