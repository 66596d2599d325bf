/// `-- ` (MySQL requires whitespace after the dashes) or `#`.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        Some(b'#') => true,
        Some(b'-') => {
            bytes.get(idx + 1) == Some(&b'-')
                && bytes
                    .get(idx + 2)
                    .is_none_or(|b| b.is_ascii_whitespace())
        }
        _ => false,
    }
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}
