use proj_adapter::ProjError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error(transparent)]
    Proj(#[from] ProjError),

    #[error("latitude {lat} is outside the UTM grid (arctic or antarctic region)")]
    OutsideUtm { lat: f64 },

    #[error("longitude {lng} is not a finite number")]
    InvalidLongitude { lng: f64 },
}
