//! Extraction of the allocation total from `go tool pprof -list` output.
//!
//! The report is treated as untyped text. The only layout assumption is that
//! somewhere in it a line carries the `Total` marker with the size as its
//! second whitespace-separated column, e.g.
//!
//! ```text
//! Total: 512kB
//! ROUTINE ======================== example.com/pkg.Alloc in /src/pkg/alloc.go
//!      512kB      512kB (flat, cum)   100% of Total
//! ```
//!
//! Later lines that also mention `Total` (the per-routine percentages) are
//! never consulted; the first marker line wins.

/// Marker token identifying the summary line.
pub const TOTAL_MARKER: &str = "Total";

/// Return the size token of the first line containing [`TOTAL_MARKER`].
///
/// Returns `None` when no line carries the marker or the marker line has no
/// second column.
///
/// # Examples
///
/// ```
/// use memscan::pprof::extract_total;
///
/// assert_eq!(extract_total("Total: 1.50MB\nROUTINE ..."), Some("1.50MB"));
/// assert_eq!(extract_total("no profile data"), None);
/// ```
#[must_use]
pub fn extract_total(report: &str) -> Option<&str> {
    report
        .lines()
        .find(|line| line.contains(TOTAL_MARKER))
        .and_then(|line| line.split_whitespace().nth(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Total: 2.01MB
ROUTINE ======================== example.com/cache.(*LRU).Put in /src/cache/lru.go
    2.01MB     2.01MB (flat, cum) 100% of Total
         .          .     10:func (c *LRU) Put(k string, v []byte) {
    2.01MB     2.01MB     11:\tc.items[k] = v
";

    #[test]
    fn test_extracts_size_from_summary_line() {
        assert_eq!(extract_total(LISTING), Some("2.01MB"));
    }

    #[test]
    fn test_marker_without_colon() {
        assert_eq!(extract_total("Total 512kB"), Some("512kB"));
    }

    #[test]
    fn test_marker_on_later_line() {
        let report = "File: store.test\nType: alloc_space\nTotal: 48kB\n";
        assert_eq!(extract_total(report), Some("48kB"));
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(extract_total(""), None);
        assert_eq!(
            extract_total("no matches found for regexp: pkg.test\n"),
            None
        );
    }

    #[test]
    fn test_marker_without_size() {
        assert_eq!(extract_total("Total:\nROUTINE"), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(extract_total("  Total:   64kB  \r\n"), Some("64kB"));
    }
}
