/// Numeric subject identifiers are runs of 18 or 19 consecutive decimal digits.
const MIN_ID_DIGITS: usize = 18;
const MAX_ID_DIGITS: usize = 19;

/// Extract the subject identifier from a user-supplied link.
///
/// Scans for the first run of at least 18 consecutive ASCII digits anywhere in
/// the input and returns its first 19 digits (or all 18 when the run is that
/// short). Returns `None` when no run is long enough; shorter digit runs are
/// skipped entirely.
pub fn extract_subject_id(link: &str) -> Option<String> {
    let bytes = link.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        let run = i - start;
        if run >= MIN_ID_DIGITS {
            let take = run.min(MAX_ID_DIGITS);
            return Some(link[start..start + take].to_string());
        }
    }

    None
}
