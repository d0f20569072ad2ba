//! Grid layout: point positions and ground helper lines.

use glam::Vec3;

use crate::params::GridParams;

/// One straight line of the ground helper
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HelperLine {
    pub start: Vec3,
    pub end: Vec3,
    /// True for the two lines through the origin
    pub center: bool,
}

/// Point positions on the ground plane, rows of constant z with x increasing
pub fn point_positions(params: &GridParams) -> Vec<Vec3> {
    let half = params.extent_m / 2.0;
    let step = params.extent_m / params.divisions as f32;

    (0..=params.divisions)
        .flat_map(|j| {
            (0..=params.divisions).map(move |i| {
                Vec3::new(-half + i as f32 * step, 0.0, -half + j as f32 * step)
            })
        })
        .collect()
}

/// Square helper grid over the same extent, one line pair per division
pub fn helper_lines(params: &GridParams) -> Vec<HelperLine> {
    let half = params.extent_m / 2.0;
    let divisions = params.helper_divisions;
    let step = params.extent_m / divisions as f32;

    let mut lines = Vec::with_capacity((divisions + 1) * 2);
    for k in 0..=divisions {
        let t = -half + k as f32 * step;
        // Odd division counts have no line through the origin
        let center = k * 2 == divisions;
        lines.push(HelperLine {
            start: Vec3::new(-half, 0.0, t),
            end: Vec3::new(half, 0.0, t),
            center,
        });
        lines.push(HelperLine {
            start: Vec3::new(t, 0.0, -half),
            end: Vec3::new(t, 0.0, half),
            center,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_five_by_five() {
        let positions = point_positions(&GridParams::default());
        assert_eq!(positions.len(), 25);

        assert_eq!(positions[0], Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(positions[1], Vec3::new(-0.25, 0.0, -0.5));
        assert_eq!(positions[5], Vec3::new(-0.5, 0.0, -0.25));
        assert_eq!(positions[12], Vec3::ZERO);
        assert_eq!(positions[24], Vec3::new(0.5, 0.0, 0.5));
        assert!(positions.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_helper_lines() {
        let lines = helper_lines(&GridParams::default());
        assert_eq!(lines.len(), 22);

        let centers: Vec<_> = lines.iter().filter(|l| l.center).collect();
        assert_eq!(centers.len(), 2);
        assert!(centers.iter().all(|l| l.start.lerp(l.end, 0.5) == Vec3::ZERO));
    }

    #[test]
    fn test_odd_helper_divisions_have_no_center() {
        let params = GridParams {
            helper_divisions: 3,
            ..GridParams::default()
        };
        assert!(helper_lines(&params).iter().all(|l| !l.center));
    }
}
