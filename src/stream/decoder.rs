// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream reader thread and frame handoff.
//!
//! One [`PointCloudStream`] owns at most one in-flight stream: the reader
//! runs on a background thread, pushes every transport chunk through the
//! multipart splitter, decodes completed sections, and sends the resulting
//! frames over an mpsc channel. The UI thread polls with
//! [`PointCloudStream::poll_latest`], dropping all but the newest frame.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::render::DecodedFrame;
use crate::stream::multipart::{FrameSplitter, DEFAULT_BOUNDARY};
use crate::stream::points::decode_points;

/// Transport read size. Arbitrary; the splitter tolerates any chunking.
const READ_CHUNK: usize = 64 * 1024;

/// Handle to the (at most one) running point-cloud stream.
pub struct PointCloudStream {
    boundary: Vec<u8>,
    running: Arc<AtomicBool>,
    frames: Option<Receiver<DecodedFrame>>,
}

impl Default for PointCloudStream {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudStream {
    pub fn new() -> Self {
        Self::with_boundary(DEFAULT_BOUNDARY)
    }

    pub fn with_boundary(boundary: &[u8]) -> Self {
        Self {
            boundary: boundary.to_vec(),
            running: Arc::new(AtomicBool::new(false)),
            frames: None,
        }
    }

    /// Whether a reader thread is currently consuming a source.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start reading `source` on a background thread.
    ///
    /// Idempotent: returns `false` without spawning anything if a reader is
    /// already running. The reader stops on end-of-stream or a transport
    /// error; there is no explicit cancellation.
    pub fn start<R>(&mut self, source: R) -> bool
    where
        R: Read + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            log::warn!("point stream already running, ignoring start request");
            return false;
        }

        let (sender, receiver) = channel();
        self.frames = Some(receiver);

        let running = Arc::clone(&self.running);
        let boundary = self.boundary.clone();
        std::thread::spawn(move || {
            read_loop(source, &boundary, sender);
            running.store(false, Ordering::SeqCst);
        });
        true
    }

    /// Drain the frame channel and return only the newest frame, if any.
    /// Frames skipped here were already stale; rendering is last write wins.
    pub fn poll_latest(&mut self) -> Option<DecodedFrame> {
        let receiver = self.frames.as_ref()?;
        let mut latest = None;
        while let Ok(frame) = receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

fn read_loop<R: Read>(mut source: R, boundary: &[u8], sender: Sender<DecodedFrame>) {
    let mut splitter = FrameSplitter::new(boundary);
    let mut chunk = vec![0u8; READ_CHUNK];
    log::info!("point stream reader started");
    loop {
        match source.read(&mut chunk) {
            Ok(0) => {
                log::info!("point stream ended");
                return;
            }
            Ok(n) => {
                for payload in splitter.push(&chunk[..n]) {
                    let points = decode_points(&payload);
                    if points.is_empty() {
                        log::debug!("empty point frame");
                    }
                    let frame = DecodedFrame::from_positions(
                        points.iter().map(|p| p.position).collect(),
                    );
                    if sender.send(frame).is_err() {
                        // Receiver side gone; nothing left to feed.
                        return;
                    }
                }
            }
            Err(e) => {
                log::warn!("point stream read failed: {e}");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::points::POINT_STRIDE;
    use std::time::Duration;

    fn framed_payload(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        bytes.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        bytes
    }

    fn wait_until_stopped(stream: &PointCloudStream) {
        for _ in 0..200 {
            if !stream.is_running() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("reader thread did not stop");
    }

    #[test]
    fn test_decodes_frames_from_a_source() {
        let payload = vec![0u8; POINT_STRIDE * 2];
        let mut stream = PointCloudStream::new();
        assert!(stream.start(std::io::Cursor::new(framed_payload(&payload))));
        wait_until_stopped(&stream);
        let frame = stream.poll_latest().expect("one frame");
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        // A reader blocked forever on an empty pipe stays running.
        struct Pending;
        impl Read for Pending {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                std::thread::sleep(Duration::from_secs(3600));
                Ok(0)
            }
        }
        let mut stream = PointCloudStream::new();
        assert!(stream.start(Pending));
        assert!(stream.is_running());
        assert!(!stream.start(Pending));
    }

    #[test]
    fn test_poll_latest_keeps_only_newest() {
        let mut bytes = Vec::new();
        for i in 1..=3u8 {
            bytes.extend_from_slice(DEFAULT_BOUNDARY);
            bytes.extend_from_slice(b"h: v\r\n\r\n");
            bytes.extend_from_slice(&vec![i; POINT_STRIDE * i as usize]);
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut stream = PointCloudStream::new();
        assert!(stream.start(std::io::Cursor::new(bytes)));
        wait_until_stopped(&stream);
        let frame = stream.poll_latest().expect("newest frame");
        assert_eq!(frame.len(), 3);
        assert!(stream.poll_latest().is_none());
    }

    #[test]
    fn test_restart_after_end_of_stream() {
        let payload = vec![0u8; POINT_STRIDE];
        let mut stream = PointCloudStream::new();
        assert!(stream.start(std::io::Cursor::new(framed_payload(&payload))));
        wait_until_stopped(&stream);
        // A finished reader no longer blocks a new start.
        assert!(stream.start(std::io::Cursor::new(framed_payload(&payload))));
        wait_until_stopped(&stream);
        assert_eq!(stream.poll_latest().expect("frame").len(), 1);
    }
}
