//! Arc segment geometry for directional shields
//!
//! A shield segment is a thick ring slice around a center point:
//! - radius: centerline distance from the shield center
//! - thickness: radial extent (inner = radius - thickness/2, outer = radius + thickness/2)
//! - theta_start, theta_end: angular extent, counter-clockwise from start to end

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{cartesian_to_polar, normalize_angle};

/// A thickened arc segment in polar space around some center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    /// Centerline radius
    pub radius: f32,
    /// Radial thickness (extends radius ± thickness/2)
    pub thickness: f32,
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl ArcSegment {
    pub fn new(radius: f32, thickness: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            radius,
            thickness,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    #[inline]
    pub fn inner_radius(&self) -> f32 {
        self.radius - self.thickness / 2.0
    }

    #[inline]
    pub fn outer_radius(&self) -> f32 {
        self.radius + self.thickness / 2.0
    }

    /// Angular span of the arc (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        let mut span = self.theta_end - self.theta_start;
        if span < 0.0 {
            span += std::f32::consts::TAU;
        }
        span
    }

    /// Check if an angle is within the arc's angular extent
    pub fn contains_angle(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.theta_start;
        let end = self.theta_end;

        if start <= end {
            theta >= start && theta <= end
        } else {
            // Wraparound case (e.g., start=170°, end=-170°)
            theta >= start || theta <= end
        }
    }

    /// Whether a circle of `probe_radius` at `offset` (relative to the arc
    /// center) touches the band's radial extent and lies inside its angular span
    pub fn touches(&self, offset: Vec2, probe_radius: f32) -> bool {
        let (r, theta) = cartesian_to_polar(offset);
        r + probe_radius >= self.inner_radius()
            && r - probe_radius <= self.outer_radius()
            && self.contains_angle(theta)
    }

    /// Shrink both ends of the arc by `gap / 2`. Arcs narrower than the gap
    /// collapse to their midpoint angle.
    pub fn shrunk(&self, gap: f32) -> Self {
        let span = self.angular_span();
        let trim = (gap / 2.0).min(span / 2.0);
        Self::new(
            self.radius,
            self.thickness,
            self.theta_start + trim,
            self.theta_start + span - trim,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar_to_cartesian;
    use std::f32::consts::PI;

    #[test]
    fn test_arc_contains_angle_no_wrap() {
        let arc = ArcSegment::new(100.0, 10.0, 0.0, PI / 2.0);
        assert!(arc.contains_angle(0.1));
        assert!(arc.contains_angle(PI / 4.0));
        assert!(!arc.contains_angle(PI));
        assert!(!arc.contains_angle(-PI / 4.0));
    }

    #[test]
    fn test_arc_contains_angle_wraparound() {
        // Arc from 170° to -170° (wraps around ±180°)
        let arc = ArcSegment::new(100.0, 10.0, 170.0_f32.to_radians(), -170.0_f32.to_radians());
        assert!(arc.contains_angle(PI));
        assert!(arc.contains_angle(-PI + 0.01));
        assert!(!arc.contains_angle(0.0));
    }

    #[test]
    fn test_touches_requires_radial_band() {
        let arc = ArcSegment::new(50.0, 10.0, 0.0, PI / 2.0);
        let probe_radius = 4.0;
        // Inside the band at 45°
        assert!(arc.touches(polar_to_cartesian(50.0, PI / 4.0), probe_radius));
        // Just grazing the outer edge (55 + 4)
        assert!(arc.touches(polar_to_cartesian(58.0, PI / 4.0), probe_radius));
        // Too far out
        assert!(!arc.touches(polar_to_cartesian(70.0, PI / 4.0), probe_radius));
        // Right radius, wrong angle
        assert!(!arc.touches(polar_to_cartesian(50.0, PI), probe_radius));
    }

    #[test]
    fn test_shrunk_trims_both_ends() {
        let arc = ArcSegment::new(50.0, 10.0, 0.0, PI / 2.0).shrunk(0.2);
        assert!((arc.theta_start - 0.1).abs() < 1e-5);
        assert!((arc.theta_end - (PI / 2.0 - 0.1)).abs() < 1e-5);
        assert!(!arc.contains_angle(0.05));
    }

    #[test]
    fn test_angular_span() {
        let arc = ArcSegment::new(100.0, 10.0, 0.0, PI / 2.0);
        assert!((arc.angular_span() - PI / 2.0).abs() < 0.001);

        // Wraparound case
        let arc2 = ArcSegment::new(100.0, 10.0, PI * 0.9, -PI * 0.9);
        assert!((arc2.angular_span() - 0.2 * PI).abs() < 0.001);
        assert!(arc2.contains_angle(PI - 0.05));
    }
}
