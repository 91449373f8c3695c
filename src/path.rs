//! Lexical path cleaning — resolves `.`/`..` segments, collapses `//`,
//! and preserves a significant trailing `/`. Ported from the classic
//! `path.Clean`-for-URLs algorithm shared by most radix-tree routers;
//! operates on raw bytes, no UTF-8 decoding.

use std::borrow::Cow;

/// Clean `p` into the lexically shortest equivalent path.
///
/// Returns a borrowed `Cow` when `p` is already clean — no allocation on
/// the common case of a well-formed incoming request path.
pub fn clean(p: &str) -> Cow<'_, str> {
    if p.is_empty() {
        return Cow::Borrowed("/");
    }
    if is_clean(p.as_bytes()) {
        return Cow::Borrowed(p);
    }

    let bytes = p.as_bytes();
    // A trailing `/.` also counts as a significant trailing slash: the
    // final `.` segment is eliminated but its slash is kept.
    let mut trailing_slash = bytes.len() > 1 && bytes[bytes.len() - 1] == b'/';

    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 1);
    out.push(b'/');

    // Indices, within `out`, of the start of each real segment pushed so
    // far — popped by `..` to erase the segment it cancels.
    let mut segment_starts: Vec<usize> = Vec::new();

    let mut i = if bytes[0] == b'/' { 1 } else { 0 };
    while i < bytes.len() {
        match bytes[i] {
            b'/' => {
                i += 1;
            }
            b'.' if i + 1 == bytes.len() => {
                // trailing standalone "." — eliminated, slash kept.
                trailing_slash = true;
                i += 1;
            }
            b'.' if is_dot_segment(bytes, i, 1) => {
                i += 1;
            }
            b'.' if is_dot_segment(bytes, i, 2) => {
                i += 2;
                if let Some(start) = segment_starts.pop() {
                    out.truncate(start);
                } else if out.len() > 1 {
                    out.truncate(1);
                }
            }
            _ => {
                if out.len() > 1 {
                    out.push(b'/');
                }
                segment_starts.push(out.len() - 1);
                while i < bytes.len() && bytes[i] != b'/' {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
        }
    }

    if out.is_empty() {
        out.push(b'/');
    }
    if trailing_slash && out.len() > 1 && out.last() != Some(&b'/') {
        out.push(b'/');
    }

    // SAFETY: every byte pushed came from the valid-UTF8 input `p` or is
    // the ASCII byte `/`; we never split a multi-byte sequence because we
    // only ever copy whole non-`/` runs or push a bare `/`.
    Cow::Owned(unsafe { String::from_utf8_unchecked(out) })
}

/// `bytes[at..]` starts with exactly `len` dots followed by `/` or end.
fn is_dot_segment(bytes: &[u8], at: usize, len: usize) -> bool {
    if at + len > bytes.len() {
        return false;
    }
    if !bytes[at..at + len].iter().all(|&b| b == b'.') {
        return false;
    }
    at + len == bytes.len() || bytes[at + len] == b'/'
}

/// Fast path: does `p` already satisfy the cleaned-path contract?
fn is_clean(bytes: &[u8]) -> bool {
    if bytes.is_empty() || bytes[0] != b'/' {
        return false;
    }
    if bytes.len() == 1 {
        return true;
    }

    let mut prev_slash = false;
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'/' => {
                if prev_slash {
                    return false;
                }
                prev_slash = true;
            }
            b'.' => {
                // Reject `.` or `..` segments: check segment boundaries.
                if prev_slash {
                    let seg_end = bytes[i..]
                        .iter()
                        .position(|&b| b == b'/')
                        .map(|p| i + p)
                        .unwrap_or(bytes.len());
                    let seg = &bytes[i..seg_end];
                    if seg.iter().all(|&b| b == b'.') && seg.len() <= 2 {
                        return false;
                    }
                }
                prev_slash = false;
            }
            _ => prev_slash = false,
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(p: &str) -> String {
        clean(p).into_owned()
    }

    #[test]
    fn already_clean_is_unchanged() {
        assert_eq!(c("/"), "/");
        assert_eq!(c("/foo/bar"), "/foo/bar");
        assert_eq!(c("/foo/bar/"), "/foo/bar/");
    }

    #[test]
    fn already_clean_avoids_allocation() {
        let p = "/foo/bar";
        match clean(p) {
            Cow::Borrowed(b) => assert_eq!(b, p),
            Cow::Owned(_) => panic!("expected borrowed for already-clean input"),
        }
    }

    #[test]
    fn empty_input_becomes_root() {
        assert_eq!(c(""), "/");
    }

    #[test]
    fn collapses_repeated_slashes() {
        assert_eq!(c("//foo///bar"), "/foo/bar");
    }

    #[test]
    fn resolves_dot_segments() {
        assert_eq!(c("/foo/./bar"), "/foo/bar");
        assert_eq!(c("/foo/."), "/foo/");
    }

    #[test]
    fn resolves_dot_dot_segments() {
        assert_eq!(c("/foo/../bar"), "/bar");
        assert_eq!(c("/foo/bar/.."), "/foo");
        assert_eq!(c("/foo/bar/../.."), "/");
    }

    #[test]
    fn dot_dot_at_root_is_discarded() {
        assert_eq!(c("/.."), "/");
        assert_eq!(c("/../../foo"), "/foo");
    }

    #[test]
    fn preserves_significant_trailing_slash() {
        assert_eq!(c("/foo/bar/"), "/foo/bar/");
        assert_eq!(c("/foo//bar//"), "/foo/bar/");
    }

    #[test]
    fn trailing_slash_eaten_by_dotdot_is_not_reintroduced() {
        assert_eq!(c("/foo/bar/../"), "/foo/");
    }

    #[test]
    fn always_has_leading_slash() {
        for p in ["a", "a/b", "foo/bar/"] {
            assert!(c(p).starts_with('/'));
        }
    }

    #[test]
    fn idempotent() {
        for p in [
            "/", "//", "/foo/./bar/..", "/../a/b/", "/a/b/c", "/a//b///c/",
        ] {
            let once = c(p);
            let twice = c(&once);
            assert_eq!(once, twice);
        }
    }
}
