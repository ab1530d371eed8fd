//! Rotating directional deflector shield
//!
//! N equal segments around a center, separated by angular gaps, spinning at a
//! constant angular velocity. Probes that hit a segment are reflected across
//! the radial normal; the shielded body takes no damage.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arc::ArcSegment;
use super::geometry::{Circle, distance, normalize_or};
use crate::normalize_angle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeflectorShield {
    pub center: Vec2,
    /// Centerline radius of the ring
    pub radius: f32,
    /// Radial thickness of each segment
    pub thickness: f32,
    pub segment_count: u32,
    /// Angular gap carved out between neighbouring segments (radians)
    pub gap: f32,
    /// Radians per second, positive is counter-clockwise
    pub angular_velocity: f32,
    /// Current rotation offset (radians, normalized)
    pub rotation: f32,
}

/// Contact with one shield segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldContact {
    pub segment: u32,
    /// Unit radial normal pointing from the struck surface toward the probe
    pub normal: Vec2,
    pub point: Vec2,
}

impl DeflectorShield {
    pub fn new(center: Vec2, radius: f32, thickness: f32, segment_count: u32, gap: f32) -> Self {
        Self {
            center,
            radius,
            thickness,
            segment_count: segment_count.max(1),
            gap,
            angular_velocity: 0.0,
            rotation: 0.0,
        }
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Advance rotation by one timestep
    pub fn rotate(&mut self, dt: f32) {
        self.rotation = normalize_angle(self.rotation + self.angular_velocity * dt);
    }

    /// Segment `index` at the current rotation, already shrunk by the gap
    pub fn segment(&self, index: u32) -> ArcSegment {
        let span = TAU / self.segment_count as f32;
        let start = self.rotation + span * index as f32;
        ArcSegment::new(self.radius, self.thickness, start, start + span).shrunk(self.gap)
    }

    /// A single gapless segment covers the whole circle
    fn is_full_ring(&self) -> bool {
        self.segment_count == 1 && self.gap <= 0.0
    }

    /// Which segment (if any) a probe circle touches.
    ///
    /// The normal faces the probe: outward on the outer surface, inward when
    /// the probe is inside the centerline.
    pub fn contact(&self, probe: &Circle) -> Option<ShieldContact> {
        let offset = probe.center - self.center;
        let r = distance(probe.center, self.center);
        let segment = if self.is_full_ring() {
            let ring = self.segment(0);
            (r + probe.radius >= ring.inner_radius() && r - probe.radius <= ring.outer_radius())
                .then_some(0)
        } else {
            (0..self.segment_count).find(|&i| self.segment(i).touches(offset, probe.radius))
        }?;

        let outward = normalize_or(offset, Vec2::NEG_Y);
        let inside = r < self.radius;
        let (normal, surface_r) = if inside {
            (-outward, self.radius - self.thickness / 2.0)
        } else {
            (outward, self.radius + self.thickness / 2.0)
        };
        Some(ShieldContact {
            segment,
            normal,
            point: self.center + outward * surface_r,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar_to_cartesian;
    use std::f32::consts::PI;

    fn shield() -> DeflectorShield {
        // Four segments, 0.2 rad gaps, ring at r=60
        DeflectorShield::new(Vec2::new(100.0, 100.0), 60.0, 10.0, 4, 0.2)
    }

    #[test]
    fn test_probe_on_segment_is_deflected() {
        let s = shield();
        let pos = s.center + polar_to_cartesian(62.0, PI / 4.0);
        let contact = s.contact(&Circle::new(pos, 4.0)).expect("segment hit");
        assert_eq!(contact.segment, 0);
        let expected = polar_to_cartesian(1.0, PI / 4.0);
        assert!((contact.normal - expected).length() < 1e-4);
    }

    #[test]
    fn test_contact_from_inside_faces_center() {
        let s = shield();
        // Inner surface at r=55; a radius-4 circle at r=52 reaches it
        let pos = s.center + polar_to_cartesian(52.0, PI / 4.0);
        let contact = s.contact(&Circle::new(pos, 4.0)).expect("inner surface hit");
        assert_eq!(contact.segment, 0);
        let inward = -polar_to_cartesian(1.0, PI / 4.0);
        assert!((contact.normal - inward).length() < 1e-4);
        assert!(((contact.point - s.center).length() - 55.0).abs() < 1e-3);
    }

    #[test]
    fn test_probe_in_gap_falls_through() {
        let s = shield();
        // Exactly on the boundary between segment 0 and 1 (π/2), inside the gap
        let pos = s.center + polar_to_cartesian(60.0, PI / 2.0);
        assert!(s.contact(&Circle::new(pos, 4.0)).is_none());
    }

    #[test]
    fn test_probe_far_from_ring_misses() {
        let s = shield();
        let pos = s.center + polar_to_cartesian(20.0, PI / 4.0);
        assert!(s.contact(&Circle::new(pos, 4.0)).is_none());
    }

    #[test]
    fn test_rotation_moves_segments() {
        let mut s = shield().with_angular_velocity(PI / 2.0);
        let pos = s.center + polar_to_cartesian(60.0, PI / 2.0);
        assert!(s.contact(&Circle::new(pos, 4.0)).is_none());

        // Eighth of a turn: segment 0 now spans π/2
        s.rotate(0.5);
        assert!((s.rotation - PI / 4.0).abs() < 1e-5);
        let contact = s.contact(&Circle::new(pos, 4.0)).expect("segment rotated into place");
        assert_eq!(contact.segment, 0);
    }

    #[test]
    fn test_single_gapless_segment_is_full_ring() {
        let s = DeflectorShield::new(Vec2::ZERO, 30.0, 6.0, 1, 0.0);
        for i in 0..8 {
            let pos = polar_to_cartesian(30.0, i as f32 * PI / 4.0);
            assert!(s.contact(&Circle::new(pos, 2.0)).is_some());
        }
    }
}
