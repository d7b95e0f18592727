use proj_adapter::{Point3, Projection, ProjectionOptions, Transformation};

use crate::error::TransformError;

/// EPSG code type alias
pub type EpsgCode = u16;

/// WGS84 Geographic 2D (EPSG:4326)
pub const EPSG_WGS84_GEOGRAPHIC_2D: EpsgCode = 4326;

/// WGS84 Geographic 3D (EPSG:4979)
pub const EPSG_WGS84_GEOGRAPHIC_3D: EpsgCode = 4979;

/// WGS84 / Pseudo-Mercator (EPSG:3857)
pub const EPSG_WEB_MERCATOR: EpsgCode = 3857;

/// Moves coordinates from one definition to another, skipping the engine
/// entirely when both sides are the same.
#[derive(Debug)]
pub enum PointTransformer {
    Identity,
    Proj(Transformation),
}

impl PointTransformer {
    pub fn new(
        source: &str,
        target: &str,
        options: &ProjectionOptions,
    ) -> Result<Self, TransformError> {
        if source == target {
            log::debug!("{source:?} -> {target:?} is the identity");
            return Ok(Self::Identity);
        }

        let source = Projection::with_options(source, options)?;
        let target = Projection::with_options(target, options)?;
        Ok(Self::Proj(Transformation::with_options(
            &source, &target, options,
        )?))
    }

    pub fn new_epsg(
        input_epsg: EpsgCode,
        output_epsg: EpsgCode,
        options: &ProjectionOptions,
    ) -> Result<Self, TransformError> {
        let source = format!("EPSG:{input_epsg}");
        let target = format!("EPSG:{output_epsg}");
        Self::new(&source, &target, options)
    }

    pub fn transform_points_in_place(&self, points: &mut [Point3]) -> Result<(), TransformError> {
        match self {
            Self::Identity => Ok(()),
            Self::Proj(t) => t.transform_points(points).map_err(TransformError::from),
        }
    }

    /// Transforms parallel coordinate arrays of equal length in place.
    pub fn transform_in_place(
        &self,
        x: &mut [f64],
        y: &mut [f64],
        z: Option<&mut [f64]>,
    ) -> Result<(), TransformError> {
        match self {
            Self::Identity => Ok(()),
            Self::Proj(t) => {
                let count = x.len().min(y.len());
                let count = z.as_ref().map_or(count, |z| count.min(z.len()));
                t.transform(count, x, y, z).map_err(TransformError::from)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const EPSG_JGD2011_GEOGRAPHIC_3D: EpsgCode = 6697;

    #[test]
    fn identity_transform() {
        let transformer = PointTransformer::new_epsg(
            EPSG_WGS84_GEOGRAPHIC_3D,
            EPSG_WGS84_GEOGRAPHIC_3D,
            &ProjectionOptions::default(),
        )
        .unwrap();
        let mut points = vec![Point3::new(1.0, 2.0, 3.0)];
        transformer.transform_points_in_place(&mut points).unwrap();
        assert_eq!(points[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn jgd2011_geographic_to_jgd2011_geographic_is_noop() {
        let transformer = PointTransformer::new_epsg(
            EPSG_JGD2011_GEOGRAPHIC_3D,
            EPSG_JGD2011_GEOGRAPHIC_3D,
            &ProjectionOptions::default(),
        )
        .unwrap();
        let mut x = [140.0];
        let mut y = [36.0];
        let mut z = [10.0];
        transformer
            .transform_in_place(&mut x, &mut y, Some(&mut z))
            .unwrap();
        assert_eq!((x[0], y[0], z[0]), (140.0, 36.0, 10.0));
    }

    #[test]
    fn arrays_of_uneven_length_use_the_shortest() {
        let transformer = PointTransformer::new(
            "+proj=longlat +datum=WGS84 +no_defs",
            "+proj=utm +zone=32 +datum=WGS84 +no_defs",
            &ProjectionOptions::default(),
        )
        .unwrap();
        let mut x = [9.0, 9.0, 1.0];
        let mut y = [0.0, 0.0];
        transformer.transform_in_place(&mut x, &mut y, None).unwrap();
        assert_abs_diff_eq!(x[1], 500000.0, epsilon = 1e-6);
        assert_eq!(x[2], 1.0);
    }

    #[test]
    fn bad_definition_surfaces_engine_error() {
        let err = PointTransformer::new(
            "+proj=longlat +datum=WGS84",
            "+proj=no_such_projection",
            &ProjectionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Proj(_)));
    }
}
