// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted annotation config.
//!
//! This module defines the payload shape shared by save, load, and export:
//! the lane and trigger collections plus the video size the coordinates are
//! relative to. The consuming analysis backend reads the same shape.

use super::annotation::{Lane, Trigger};
use serde::{Deserialize, Serialize};

/// Natural pixel dimensions of the annotated video. Zero until the first
/// frame or metadata arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Complete annotation config for save/load round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub video_size: VideoSize,
}

/// Export document: the config plus a timestamp. For download, not for
/// round-tripping back into the editor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload<'a> {
    #[serde(flatten)]
    pub config: &'a ConfigPayload,
    pub exported_at: String,
}
