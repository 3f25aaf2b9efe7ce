// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Point-cloud stream ingestion.
//!
//! The lidar producer publishes a multipart byte stream: repeated sections
//! framed by a boundary marker, each carrying a small header block and a
//! binary payload of fixed-stride point records. This module splits the
//! stream back into sections, decodes the records, and feeds the decoded
//! frames to the UI over a channel.

pub mod decoder;
pub mod multipart;
pub mod points;

pub use decoder::PointCloudStream;
