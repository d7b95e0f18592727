//! Placement of longitude/latitude points on a Web Mercator tile grid.

use proj_adapter::{Projection, Transformation};

use crate::error::TransformError;

// Same sphere on both sides, so this is a pure conversion with the EPSG:3857
// formulas and needs neither proj.db nor grid files.
const LONGLAT_SPHERE: &str = "+proj=longlat +a=6378137 +b=6378137 +no_defs";
const MERCATOR_SPHERE: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +no_defs";

/// Tile bounds as (longitude, latitude) corners in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub sw: (f64, f64),
    pub ne: (f64, f64),
}

impl BBox {
    pub fn new(sw: (f64, f64), ne: (f64, f64)) -> Self {
        Self { sw, ne }
    }
}

#[derive(Debug)]
pub struct WebMercator {
    transformation: Transformation,
}

impl WebMercator {
    pub fn new() -> Result<Self, TransformError> {
        let longlat = Projection::new(LONGLAT_SPHERE)?;
        let mercator = Projection::new(MERCATOR_SPHERE)?;
        Ok(Self {
            transformation: Transformation::new(&longlat, &mercator)?,
        })
    }

    pub fn project(&self, lng: f64, lat: f64) -> Result<(f64, f64), TransformError> {
        let mut x = [lng];
        let mut y = [lat];
        self.transformation.transform(1, &mut x, &mut y, None)?;
        Ok((x[0], y[0]))
    }

    /// Projected south-west corner of `bbox`.
    pub fn tile_offset(&self, bbox: &BBox) -> Result<(f64, f64), TransformError> {
        self.project(bbox.sw.0, bbox.sw.1)
    }

    pub fn tile_scaling_factor(
        &self,
        bbox: &BBox,
        extent: u32,
    ) -> Result<(f64, f64), TransformError> {
        let (sw_x, sw_y) = self.project(bbox.sw.0, bbox.sw.1)?;
        let (ne_x, ne_y) = self.project(bbox.ne.0, bbox.ne.1)?;
        let extent = f64::from(extent);
        Ok((
            (sw_x - ne_x).abs() * extent,
            (sw_y - ne_y).abs() * extent,
        ))
    }

    /// Tile-local integer coordinates of a longitude/latitude point, with the
    /// y axis pointing down.
    pub fn tile_coord(
        &self,
        point: (f64, f64),
        extent: u32,
        scale: (f64, f64),
        offset: (f64, f64),
    ) -> Result<(i64, i64), TransformError> {
        let (x, y) = self.project(point.0, point.1)?;
        let extent_f = f64::from(extent);
        let tx = ((x - offset.0) / (scale.0 / extent_f) * extent_f).round() as i64;
        let ty = ((y - offset.1) / (scale.1 / extent_f) * extent_f).round() as i64;
        Ok((tx, flip(ty, i64::from(extent))))
    }
}

/// Flips a tile coordinate along its axis. A zero extent has no axis to flip
/// along and yields 0.
pub fn flip(v: i64, extent: i64) -> i64 {
    if extent == 0 {
        return 0;
    }
    if v == 0 {
        return extent;
    }
    (extent - v) % extent
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn flip_axis() {
        assert_eq!(flip(0, 4096), 4096);
        assert_eq!(flip(4096, 4096), 0);
        assert_eq!(flip(1024, 4096), 3072);
    }

    #[test]
    fn flip_with_zero_extent() {
        assert_eq!(flip(5, 0), 0);
        assert_eq!(flip(0, 0), 0);
    }

    #[test]
    fn web_mercator_is_debug() {
        let merc = WebMercator::new().unwrap();
        assert!(format!("{merc:?}").starts_with("WebMercator"));
    }

    #[test]
    fn projects_on_the_pseudo_mercator_sphere() {
        let merc = WebMercator::new().unwrap();
        let (x, y) = merc.project(10.0, 0.0).unwrap();
        assert_abs_diff_eq!(x, 1113194.9079327357, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);

        let (_, north) = merc.project(10.0, 45.0).unwrap();
        let (_, south) = merc.project(10.0, -45.0).unwrap();
        assert_abs_diff_eq!(north, -south, epsilon = 1e-6);
    }

    #[test]
    fn corners_land_on_tile_edges() {
        let merc = WebMercator::new().unwrap();
        let bbox = BBox::new((50.0, 10.0), (52.0, 12.0));
        let extent = 4096;
        let scale = merc.tile_scaling_factor(&bbox, extent).unwrap();
        let offset = merc.tile_offset(&bbox).unwrap();

        assert_eq!(
            merc.tile_coord((50.0, 10.0), extent, scale, offset).unwrap(),
            (0, 4096)
        );
        assert_eq!(
            merc.tile_coord((51.0, 10.0), extent, scale, offset).unwrap(),
            (2048, 4096)
        );
        assert_eq!(
            merc.tile_coord((52.0, 12.0), extent, scale, offset).unwrap(),
            (4096, 0)
        );
    }
}
