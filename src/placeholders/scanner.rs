#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scan a placeholder name starting at `start` (just after the colon).
pub(super) fn scan_identifier(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start).copied().is_some_and(is_ident_start) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && is_ident_continue(bytes[idx]) {
        idx += 1;
    }
    Some(idx)
}

/// Closing quote check that honours doubled-quote escapes. Returns the index to resume at and
/// whether the quoted section ended.
pub(super) fn close_quote(bytes: &[u8], idx: usize, quote: u8) -> (usize, bool) {
    if bytes[idx] != quote {
        return (idx, false);
    }
    if bytes.get(idx + 1) == Some(&quote) {
        (idx + 1, false)
    } else {
        (idx, true)
    }
}
