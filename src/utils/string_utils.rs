//! String utility functions

/// Trims trailing null characters from a byte buffer
pub fn trim_trailing_nulls(buffer: &mut Vec<u8>) {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
}
