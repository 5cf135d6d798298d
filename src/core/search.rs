use super::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Forward => "/",
            Self::Backward => "?",
        }
    }
}

/// The last explicit search. Survives mode changes; replaced only by a new
/// search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub pattern: String,
    pub direction: SearchDirection,
}

impl SearchState {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

/// Options that shape a single scan.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub wrap_scan: bool,
    pub ignore_case: bool,
}

/// Find `pattern` starting one position past `from` (or before it when
/// searching backward). When nothing turns up before the buffer boundary and
/// `wrap_scan` is set, the scan restarts once from the opposite boundary.
/// Returns the char offset of the match start.
pub fn find(
    host: &dyn Host,
    pattern: &str,
    from: usize,
    direction: SearchDirection,
    opts: SearchOptions,
) -> Option<usize> {
    let fold = |c: char| {
        if opts.ignore_case {
            c.to_lowercase().next().unwrap_or(c)
        } else {
            c
        }
    };
    let needle: Vec<char> = pattern.chars().map(fold).collect();
    if needle.is_empty() {
        return None;
    }
    let hay: Vec<char> = host.read_range(0..host.len()).chars().map(fold).collect();
    if needle.len() > hay.len() {
        return None;
    }
    let last = hay.len() - needle.len();
    let matches_at = |i: usize| hay[i..i + needle.len()] == needle[..];

    match direction {
        SearchDirection::Forward => {
            let first_pass = (from + 1..=last).find(|&i| matches_at(i));
            first_pass.or_else(|| {
                opts.wrap_scan
                    .then(|| (0..=last.min(from)).find(|&i| matches_at(i)))
                    .flatten()
            })
        }
        SearchDirection::Backward => {
            let first_pass = (0..from.min(last + 1)).rev().find(|&i| matches_at(i));
            first_pass.or_else(|| {
                opts.wrap_scan
                    .then(|| (from.min(last)..=last).rev().find(|&i| matches_at(i)))
                    .flatten()
            })
        }
    }
}

/// The run of word characters under or after `pos` on its line.
pub fn word_at(host: &dyn Host, pos: usize) -> Option<String> {
    let end_of_line = host.line_end(pos);
    let mut start = pos;
    while start < end_of_line && !host.char_at(start).is_some_and(is_word_char) {
        start += 1;
    }
    if start >= end_of_line {
        return None;
    }
    let line_start = host.line_start(pos);
    while start > line_start && host.char_at(start - 1).is_some_and(is_word_char) {
        start -= 1;
    }
    let mut end = start;
    while end < end_of_line && host.char_at(end).is_some_and(is_word_char) {
        end += 1;
    }
    Some(host.read_range(start..end))
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rope_host::RopeHost;

    const OPTS: SearchOptions = SearchOptions {
        wrap_scan: true,
        ignore_case: false,
    };

    #[test]
    fn test_find_forward_skips_current_position() {
        let host = RopeHost::with_text("foo bar foo");
        assert_eq!(find(&host, "foo", 0, SearchDirection::Forward, OPTS), Some(8));
    }

    #[test]
    fn test_find_forward_wraps() {
        let host = RopeHost::with_text("foo bar baz");
        assert_eq!(find(&host, "foo", 5, SearchDirection::Forward, OPTS), Some(0));
        let no_wrap = SearchOptions {
            wrap_scan: false,
            ..OPTS
        };
        assert_eq!(find(&host, "foo", 5, SearchDirection::Forward, no_wrap), None);
    }

    #[test]
    fn test_find_backward_and_wrap() {
        let host = RopeHost::with_text("ab ab ab");
        assert_eq!(find(&host, "ab", 6, SearchDirection::Backward, OPTS), Some(3));
        assert_eq!(find(&host, "ab", 0, SearchDirection::Backward, OPTS), Some(6));
    }

    #[test]
    fn test_only_match_is_current_position() {
        let host = RopeHost::with_text("xx needle yy");
        assert_eq!(find(&host, "needle", 3, SearchDirection::Forward, OPTS), Some(3));
        assert_eq!(find(&host, "needle", 3, SearchDirection::Backward, OPTS), Some(3));
    }

    #[test]
    fn test_find_missing_and_ignore_case() {
        let host = RopeHost::with_text("Hello");
        assert_eq!(find(&host, "hello", 0, SearchDirection::Forward, OPTS), None);
        let icase = SearchOptions {
            ignore_case: true,
            ..OPTS
        };
        assert_eq!(find(&host, "hello", 2, SearchDirection::Forward, icase), Some(0));
        assert_eq!(find(&host, "", 0, SearchDirection::Forward, OPTS), None);
        assert_eq!(find(&host, "Hello!", 0, SearchDirection::Forward, OPTS), None);
    }

    #[test]
    fn test_word_at() {
        let host = RopeHost::with_text("let foo_bar = 1;\nnext");
        assert_eq!(word_at(&host, 6).as_deref(), Some("foo_bar"));
        assert_eq!(word_at(&host, 3).as_deref(), Some("foo_bar"));
        assert_eq!(word_at(&host, 15), None);
    }
}
