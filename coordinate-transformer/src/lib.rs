mod convert;
mod error;
mod transformer;
mod utm;
mod web_mercator;

pub use convert::{
    deg_to_rad, project, rad_to_deg, transform2, transform2_list, transform3, transform3_list,
    unproject,
};
pub use error::TransformError;
pub use proj_adapter::{Point, Point3, Projection, ProjectionOptions};
pub use transformer::{
    EpsgCode, PointTransformer, EPSG_WEB_MERCATOR, EPSG_WGS84_GEOGRAPHIC_2D,
    EPSG_WGS84_GEOGRAPHIC_3D,
};
pub use utm::utm_zone;
pub use web_mercator::{flip, BBox, WebMercator};
