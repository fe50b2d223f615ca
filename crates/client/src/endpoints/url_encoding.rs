//! Percent-encoding for job ids interpolated into URL paths.
//!
//! Search ids are usually `1700000000.42` style, but scheduler and real-time
//! jobs carry user and app names, so they are always encoded.
//!
//! ```
//! use search_client::endpoints::encode_path_segment;
//!
//! assert_eq!(encode_path_segment("1700000000.42"), "1700000000.42");
//! assert_eq!(encode_path_segment("admin/job"), "admin%2Fjob");
//! ```

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters that must be percent-encoded in a path segment.
pub const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'+')
    .add(b';')
    .add(b'[')
    .add(b']');

/// Percent-encode a string for use as one URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    percent_encode(segment.as_bytes(), PATH_SEGMENT_ENCODE_SET).to_string()
}
