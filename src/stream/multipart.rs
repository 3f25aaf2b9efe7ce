// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Multipart stream splitting.
//!
//! The producer frames each point-cloud payload as
//! `--frame\r\n<headers>\r\n\r\n<payload>\r\n` and the transport hands us
//! chunks cut at arbitrary positions, so a boundary marker or payload may
//! straddle two reads. The splitter accumulates bytes across pushes and
//! emits a payload only once both of its enclosing markers have arrived.

/// Default boundary marker; must match the producer byte for byte or the
/// splitter stalls in resync.
pub const DEFAULT_BOUNDARY: &[u8] = b"--frame\r\n";

/// Blank line separating a section's header block from its payload.
const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Incremental splitter for a boundary-framed multipart byte stream.
pub struct FrameSplitter {
    boundary: Vec<u8>,
    buffer: Vec<u8>,
    /// Once set, `buffer` always starts with a complete boundary marker.
    synced: bool,
}

impl FrameSplitter {
    pub fn new(boundary: &[u8]) -> Self {
        Self {
            boundary: boundary.to_vec(),
            buffer: Vec::new(),
            synced: false,
        }
    }

    /// Feed one transport chunk; returns the payload of every section the
    /// chunk completed, in stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        if !self.synced {
            match find(&self.buffer, &self.boundary) {
                Some(pos) => {
                    if pos > 0 {
                        log::debug!("resync: discarded {pos} bytes before first boundary");
                    }
                    self.buffer.drain(..pos);
                    self.synced = true;
                }
                None => {
                    // Keep a marker-length-1 tail in case the marker
                    // straddles this chunk and the next.
                    let keep = self.boundary.len() - 1;
                    if self.buffer.len() > keep {
                        let excess = self.buffer.len() - keep;
                        self.buffer.drain(..excess);
                    }
                    return Vec::new();
                }
            }
        }

        let mut payloads = Vec::new();
        loop {
            // A complete section needs the *next* marker to be present too.
            let start = self.boundary.len();
            let Some(rel) = find(&self.buffer[start..], &self.boundary) else {
                break;
            };
            let end = start + rel;
            match split_section(&self.buffer[start..end]) {
                Some(payload) => payloads.push(payload),
                None => log::warn!(
                    "dropped {}-byte section without header separator",
                    end - start
                ),
            }
            // The second marker becomes the first for the next iteration.
            self.buffer.drain(..end);
        }
        payloads
    }
}

/// Cut one framed section into its payload: everything after the blank-line
/// header separator, minus the trailing line break before the next boundary.
fn split_section(section: &[u8]) -> Option<Vec<u8>> {
    let sep = find(section, HEADER_SEPARATOR)?;
    let body = &section[sep + HEADER_SEPARATOR.len()..];
    let body = body.strip_suffix(b"\r\n").unwrap_or(body);
    Some(body.to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        bytes.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(b"\r\n");
        bytes
    }

    #[test]
    fn test_single_section_needs_trailing_boundary() {
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert!(splitter.push(&section(b"abc")).is_empty());
        // The next marker closes the section.
        let payloads = splitter.push(DEFAULT_BOUNDARY);
        assert_eq!(payloads, vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_boundary_split_across_chunks() {
        let mut bytes = section(b"abc");
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        // Cut in the middle of the closing marker.
        let cut = bytes.len() - 4;
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert!(splitter.push(&bytes[..cut]).is_empty());
        let payloads = splitter.push(&bytes[cut..]);
        assert_eq!(payloads, vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_resync_discards_preamble() {
        // An HTTP response preamble precedes the first marker.
        let mut bytes = b"HTTP/1.0 200 OK\r\nContent-Type: multipart/x-mixed-replace\r\n\r\n".to_vec();
        bytes.extend_from_slice(&section(b"xyz"));
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert_eq!(splitter.push(&bytes), vec![b"xyz".to_vec()]);
    }

    #[test]
    fn test_resync_survives_marker_straddling_garbage_chunks() {
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        // Long garbage run, then a marker cut across two pushes.
        assert!(splitter.push(&[0u8; 4096]).is_empty());
        assert!(splitter.push(b"--fr").is_empty());
        assert!(splitter.push(b"ame\r\nh: v\r\n\r\nok\r\n").is_empty());
        assert_eq!(splitter.push(DEFAULT_BOUNDARY), vec![b"ok".to_vec()]);
    }

    #[test]
    fn test_section_without_separator_is_dropped() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        bytes.extend_from_slice(b"no separator here");
        bytes.extend_from_slice(&section(b"good"));
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert_eq!(splitter.push(&bytes), vec![b"good".to_vec()]);
    }

    #[test]
    fn test_many_sections_in_one_chunk() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&section(b"one"));
        bytes.extend_from_slice(&section(b"two"));
        bytes.extend_from_slice(&section(b"three"));
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert_eq!(
            splitter.push(&bytes),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn test_binary_payload_preserved_verbatim() {
        // Payload bytes that look like line breaks must come through intact.
        let payload = b"\x00\x01\r\n\xff\xfe\r";
        let mut bytes = section(payload);
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        assert_eq!(splitter.push(&bytes), vec![payload.to_vec()]);
    }

    #[test]
    fn test_byte_at_a_time_feed() {
        let mut bytes = section(b"slow");
        bytes.extend_from_slice(DEFAULT_BOUNDARY);
        let mut splitter = FrameSplitter::new(DEFAULT_BOUNDARY);
        let mut payloads = Vec::new();
        for b in &bytes {
            payloads.extend(splitter.push(std::slice::from_ref(b)));
        }
        assert_eq!(payloads, vec![b"slow".to_vec()]);
    }
}
