// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Binary point-record decoding.
//!
//! Each record is 24 bytes, little-endian: three f32 coordinates in
//! millimeters, a u16 intensity, 2 bytes of struct padding, and an 8-byte
//! timestamp reserved for the renderer. Positions are converted to meters
//! on decode.

use crate::render::Point3;

/// Size of one point record on the wire.
pub const POINT_STRIDE: usize = 24;

/// Wire positions are millimeters; the renderer works in meters.
pub const MM_TO_M: f32 = 0.001;

/// One decoded point record. The intensity channel is carried through for
/// renderers that want to remap it; the default presentation ignores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub position: Point3,
    /// Reflectivity channel, decoded for renderers that remap it to color.
    #[allow(dead_code)]
    pub intensity: u16,
}

/// Decode a payload of consecutive point records.
///
/// The record count is the payload length divided by [`POINT_STRIDE`]; a
/// truncated trailing record is discarded. An empty result is a valid
/// degenerate frame.
pub fn decode_points(payload: &[u8]) -> Vec<PointRecord> {
    let remainder = payload.len() % POINT_STRIDE;
    if remainder != 0 {
        log::debug!("discarding {remainder} trailing bytes of truncated point record");
    }

    let mut points = Vec::with_capacity(payload.len() / POINT_STRIDE);
    for record in payload.chunks_exact(POINT_STRIDE) {
        let x = f32_le(record, 0);
        let y = f32_le(record, 4);
        let z = f32_le(record, 8);
        let intensity = u16::from_le_bytes([record[12], record[13]]);
        // Bytes 14..16 are padding, 16..24 the reserved timestamp.
        points.push(PointRecord {
            position: Point3::new(x * MM_TO_M, y * MM_TO_M, z * MM_TO_M),
            intensity,
        });
    }
    points
}

fn f32_le(bytes: &[u8], offset: usize) -> f32 {
    let mut le = [0u8; 4];
    le.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(le)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x: f32, y: f32, z: f32, intensity: u16, timestamp: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(POINT_STRIDE);
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.extend_from_slice(&y.to_le_bytes());
        bytes.extend_from_slice(&z.to_le_bytes());
        bytes.extend_from_slice(&intensity.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&timestamp.to_le_bytes());
        bytes
    }

    #[test]
    fn test_decodes_fields_and_scales_to_meters() {
        let payload = record(1000.0, -2500.0, 0.0, 77, 123_456_789);
        let points = decode_points(&payload);
        assert_eq!(points.len(), 1);
        assert!((points[0].position.x - 1.0).abs() < 1e-6);
        assert!((points[0].position.y + 2.5).abs() < 1e-6);
        assert_eq!(points[0].position.z, 0.0);
        assert_eq!(points[0].intensity, 77);
    }

    #[test]
    fn test_truncated_tail_is_discarded() {
        let mut payload = Vec::new();
        for i in 0..3 {
            payload.extend_from_slice(&record(i as f32, 0.0, 0.0, i, 0));
        }
        payload.extend_from_slice(&[0xab; 5]);
        let points = decode_points(&payload);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_empty_payload_is_a_valid_frame() {
        assert!(decode_points(&[]).is_empty());
        // Shorter than one record: also zero points, no panic.
        assert!(decode_points(&[0u8; POINT_STRIDE - 1]).is_empty());
    }
}
