//! Transaction identifier validation.
//!
//! The gateway identifies payments by GUIDs. Ids are checked locally so that a
//! malformed value never reaches the network.

use std::fmt::Display;

const SEGMENT_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

/// Returns true if `value` is a syntactically valid GUID.
///
/// The value is formatted to text first. It is valid only if every character is a
/// hexadecimal digit or a hyphen and the hyphen-separated groups have lengths
/// `8-4-4-4-12`. Case is not significant.
///
/// # Examples
///
/// ```
/// use braspag_rest::guid::is_valid_guid;
///
/// assert!(is_valid_guid("782a56e2-2dae-11e2-b3ee-080027d29772"));
/// assert!(!is_valid_guid(""));
/// assert!(!is_valid_guid("782a56e22dae-11e2-b3ee-080027d29772"));
/// ```
#[must_use]
pub fn is_valid_guid(value: impl Display) -> bool {
    let text = value.to_string();

    if !text.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return false;
    }

    let lengths: Vec<usize> = text.split('-').map(str::len).collect();
    lengths == SEGMENT_LENGTHS
}
