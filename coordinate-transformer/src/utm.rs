use crate::error::TransformError;

const LATITUDE_BANDS: &[u8; 21] = b"CDEFGHJKLMNPQRSTUVWXX";

/// UTM zone number and latitude band letter for a longitude/latitude pair in
/// degrees, including the Norway and Svalbard exceptions.
pub fn utm_zone(lng: f64, lat: f64) -> Result<(u8, char), TransformError> {
    // NaN fails the range check too.
    if !(-80.0..=84.0).contains(&lat) {
        return Err(TransformError::OutsideUtm { lat });
    }
    if !lng.is_finite() {
        return Err(TransformError::InvalidLongitude { lng });
    }

    let lng = if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    };

    // 180° belongs to zone 60, not a 61st zone.
    let mut zone = (1 + ((lng + 180.0) / 6.0) as u8).min(60);
    if lat > 72.0 && lng > 0.0 && lng < 42.0 {
        zone = if lng < 9.0 {
            31
        } else if lng < 21.0 {
            33
        } else if lng < 33.0 {
            35
        } else {
            37
        };
    }
    if lat > 56.0 && lat < 64.0 && lng > 3.0 && lng < 12.0 {
        zone = 32;
    }

    let band = LATITUDE_BANDS[((lat + 80.0) / 8.0) as usize] as char;
    Ok((zone, band))
}
