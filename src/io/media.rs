// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame image loading.
//!
//! The annotation backdrop is a still frame grabbed from the camera. This
//! module decodes it to RGBA pixels ready for an egui texture; the decoded
//! dimensions are the video's natural size.

use anyhow::Result;
use std::path::Path;

/// A decoded frame image: RGBA8 pixels plus natural dimensions.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an image file to RGBA8.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}
