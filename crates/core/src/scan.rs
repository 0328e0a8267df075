//! Bounded, line-aware substring search.

/// Return the position of `needle` in the first line of `haystack`, looking
/// at no more than `max_len` bytes.
///
/// The scan stops at the first `\n` or at the bound, whichever comes first.
/// A candidate position is only tried when the whole needle fits before the
/// bound, so a match may end exactly at `max_len` but never past it.
pub fn line_find(haystack: &[u8], needle: &[u8], max_len: usize) -> Option<usize> {
    let bound = haystack.len().min(max_len);
    let mut pos = 0;
    while pos < bound && pos + needle.len() <= bound && haystack[pos] != b'\n' {
        if &haystack[pos..pos + needle.len()] == needle {
            return Some(pos);
        }
        pos += 1;
    }
    None
}

/// Iterate over the start offsets of every line that begins inside the first
/// `max_len` bytes of `buf`.
///
/// The first line always starts at `0` (even for an empty buffer, which then
/// yields nothing useful to [`line_find`]). A trailing `\n` at the window edge
/// does not produce a further line.
pub fn line_starts(buf: &[u8], max_len: usize) -> impl Iterator<Item = usize> + '_ {
    let bound = buf.len().min(max_len);
    std::iter::once(0).chain(
        buf[..bound]
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i + 1)
            .filter(move |start| *start < bound),
    )
}

/// Search every line reachable inside the window for `needle`.
///
/// Each per-line scan is still bounded by the overall window, so a line that
/// straddles `max_len` is only searched up to the edge.
pub fn window_find(buf: &[u8], needle: &[u8], max_len: usize) -> Option<usize> {
    let bound = buf.len().min(max_len);
    line_starts(buf, max_len)
        .find_map(|start| line_find(&buf[start..], needle, bound - start).map(|pos| start + pos))
}
