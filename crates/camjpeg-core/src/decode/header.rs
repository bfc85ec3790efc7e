//! Marker-level check of a JPEG stream before it reaches the engine.
//!
//! The engine reads from a fixed in-memory source and pads a short stream
//! with a fake EOI, so a truncated header looks the same to it as a
//! tables-only stream. Both leave the header fields of a reused handle
//! untouched. Walking the marker segments up front tells the cases apart.

use std::fmt;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

/// Outcome of scanning a stream's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderStatus {
    /// Frame and scan headers are both present.
    Complete,
    /// The data ends before the first scan header.
    Suspended,
    /// EOI arrives before any frame header: the stream carries only tables.
    TablesOnly,
    /// The data does not follow JPEG marker syntax.
    NotJpeg,
}

impl fmt::Display for HeaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HeaderStatus::Complete => "header complete",
            HeaderStatus::Suspended => "stream ends inside the header",
            HeaderStatus::TablesOnly => "stream contains tables but no image",
            HeaderStatus::NotJpeg => "not a JPEG stream",
        };
        f.write_str(text)
    }
}

/// Returns true for SOF0..SOF15 (DHT, JPG and DAC share that range).
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

fn is_standalone(marker: u8) -> bool {
    marker == TEM || matches!(marker, 0xD0..=0xD7)
}

/// Find the next marker at or after `pos` and leave `pos` just past it.
///
/// Extraneous bytes between segments are skipped, as are fill bytes and
/// stuffed `FF 00` pairs; the engine only warns about them.
fn next_marker(data: &[u8], pos: &mut usize) -> Option<u8> {
    loop {
        while data.get(*pos)? != &MARKER_PREFIX {
            *pos += 1;
        }
        while data.get(*pos)? == &MARKER_PREFIX {
            *pos += 1;
        }
        let marker = data[*pos];
        *pos += 1;
        if marker != 0x00 {
            return Some(marker);
        }
    }
}

/// Walk the marker segments of `data` up to the first scan header.
pub(crate) fn scan_header(data: &[u8]) -> HeaderStatus {
    match data {
        [] | [MARKER_PREFIX] => return HeaderStatus::Suspended,
        [MARKER_PREFIX, SOI, ..] => {}
        _ => return HeaderStatus::NotJpeg,
    }

    let mut pos = 2;
    let mut seen_frame = false;

    loop {
        let Some(marker) = next_marker(data, &mut pos) else {
            return HeaderStatus::Suspended;
        };

        match marker {
            EOI => return HeaderStatus::TablesOnly,
            SOI => return HeaderStatus::NotJpeg,
            m if is_standalone(m) => continue,
            _ => {}
        }

        let Some(length) = data
            .get(pos..pos + 2)
            .map(|b| usize::from(u16::from_be_bytes([b[0], b[1]])))
        else {
            return HeaderStatus::Suspended;
        };
        if length < 2 {
            return HeaderStatus::NotJpeg;
        }
        if pos + length > data.len() {
            return HeaderStatus::Suspended;
        }

        if is_start_of_frame(marker) {
            seen_frame = true;
        } else if marker == SOS {
            return if seen_frame {
                HeaderStatus::Complete
            } else {
                HeaderStatus::NotJpeg
            };
        }
        pos += length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SOI, a DQT segment, then EOI.
    fn tables_only_stream() -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00];
        data.extend(std::iter::repeat(0x01).take(64));
        data.extend([0xFF, 0xD9]);
        data
    }

    /// SOI, SOF0 for a 1x1 grayscale frame, SOS, one byte of scan data, EOI.
    fn frame_stream() -> Vec<u8> {
        vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00, // SOF0
            0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, // SOS
            0x00, 0xFF, 0xD9,
        ]
    }

    #[test]
    fn test_complete_header() {
        assert_eq!(scan_header(&frame_stream()), HeaderStatus::Complete);
    }

    #[test]
    fn test_tables_only() {
        assert_eq!(scan_header(&tables_only_stream()), HeaderStatus::TablesOnly);
    }

    #[test]
    fn test_truncated_inside_segment() {
        let data = frame_stream();
        assert_eq!(scan_header(&data[..8]), HeaderStatus::Suspended);
    }

    #[test]
    fn test_truncated_before_scan() {
        let data = frame_stream();
        // Stop right after the SOF0 segment
        assert_eq!(scan_header(&data[..15]), HeaderStatus::Suspended);
    }

    #[test]
    fn test_empty_and_soi_only() {
        assert_eq!(scan_header(&[]), HeaderStatus::Suspended);
        assert_eq!(scan_header(&[0xFF]), HeaderStatus::Suspended);
        assert_eq!(scan_header(&[0xFF, 0xD8]), HeaderStatus::Suspended);
    }

    #[test]
    fn test_garbage() {
        assert_eq!(scan_header(&[0x00, 0x01, 0x02, 0x03]), HeaderStatus::NotJpeg);
        assert_eq!(scan_header(b"GIF89a"), HeaderStatus::NotJpeg);
    }

    #[test]
    fn test_scan_without_frame() {
        let data = [0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02];
        assert_eq!(scan_header(&data), HeaderStatus::NotJpeg);
    }

    #[test]
    fn test_fill_bytes_and_restart_markers() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF, 0xD0];
        data.extend_from_slice(&frame_stream()[2..]);
        assert_eq!(scan_header(&data), HeaderStatus::Complete);
    }

    #[test]
    fn test_extraneous_bytes_between_segments() {
        // Stray bytes after SOI and a stuffed FF 00 before the frame header
        let mut data = vec![0xFF, 0xD8, 0x00, 0x00, 0x12, 0xFF, 0x00];
        data.extend_from_slice(&frame_stream()[2..]);
        assert_eq!(scan_header(&data), HeaderStatus::Complete);
    }

    #[test]
    fn test_extraneous_bytes_until_end() {
        let data = [0xFF, 0xD8, 0x00, 0x00, 0x00];
        assert_eq!(scan_header(&data), HeaderStatus::Suspended);
    }

    #[test]
    fn test_bogus_segment_length() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01, 0x00];
        assert_eq!(scan_header(&data), HeaderStatus::NotJpeg);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            HeaderStatus::TablesOnly.to_string(),
            "stream contains tables but no image"
        );
    }
}
