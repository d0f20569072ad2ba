//! Listener-relative gain computation (distance falloff + equal-power pan).
//!
//! The listener faces -Z with +X to its right and Y up.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use crate::params::SpatialParams;

/// Per-channel gains for one mono source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoGains {
    pub left: f32,
    pub right: f32,
}

/// Inverse distance model: unity inside `ref_distance_m`, then `ref / (ref + rolloff * (d - ref))`
pub fn distance_gain(distance_m: f32, params: &SpatialParams) -> f32 {
    let reference = params.ref_distance_m.max(f32::EPSILON);
    let d = distance_m.max(reference);
    reference / (reference + params.rolloff.max(0.0) * (d - reference))
}

/// Source azimuth in degrees, folded into [-90, 90] (positive = right)
pub fn azimuth_degrees(listener: Vec3, source: Vec3) -> f32 {
    let v = source - listener;
    if v.x == 0.0 && v.z == 0.0 {
        return 0.0;
    }

    let azimuth = v.x.atan2(-v.z).to_degrees();

    // Rear sources mirror onto the front hemisphere
    if azimuth > 90.0 {
        180.0 - azimuth
    } else if azimuth < -90.0 {
        -180.0 - azimuth
    } else {
        azimuth
    }
}

/// Equal-power pan gains for a folded azimuth
pub fn equal_power_pan(azimuth_deg: f32) -> StereoGains {
    let x = (azimuth_deg.clamp(-90.0, 90.0) + 90.0) / 180.0;
    StereoGains {
        left: (x * FRAC_PI_2).cos(),
        right: (x * FRAC_PI_2).sin(),
    }
}

/// Combined gains for a source heard from `listener`
pub fn spatialize(listener: Vec3, source: Vec3, params: &SpatialParams) -> StereoGains {
    let gain = distance_gain(listener.distance(source), params);
    let pan = equal_power_pan(azimuth_degrees(listener, source));
    StereoGains {
        left: pan.left * gain,
        right: pan.right * gain,
    }
}
