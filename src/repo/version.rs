use std::cmp::Ordering;

/// Total order over Debian version strings: epoch, then upstream version,
/// then revision. Malformed input is compared literally instead of erroring.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_epoch, a_upstream, a_revision) = split_version(a);
    let (b_epoch, b_upstream, b_revision) = split_version(b);

    compare_epochs(a_epoch, b_epoch)
        .then_with(|| verrevcmp(a_upstream, b_upstream))
        .then_with(|| verrevcmp(a_revision, b_revision))
}

/// Splits a version into (epoch, upstream, revision). The epoch is only the
/// all-digit run before a ':'; anything else before a colon stays part of the
/// upstream version. The revision is whatever follows the last '-'.
fn split_version(version: &str) -> (&str, &str, &str) {
    let (epoch, rest) = match version.split_once(':') {
        Some((e, r)) if !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit()) => (e, r),
        _ => ("", version),
    };

    let (upstream, revision) = match rest.rsplit_once('-') {
        Some((u, r)) => (u, r),
        None => (rest, ""),
    };

    (epoch, upstream, revision)
}

// Epochs are unbounded digit strings, so compare them as numbers without
// parsing: drop leading zeros, then longer wins, then lexical.
fn compare_epochs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// Character weight for the non-digit segments: '~' sorts before everything
// including end of string, letters before other characters. Digits weigh the
// same as end of string, so a digit terminates the segment on either side.
fn order(c: u8) -> i32 {
    match c {
        b'~' => -1,
        b'0'..=b'9' => 0,
        b'A'..=b'Z' | b'a'..=b'z' => i32::from(c),
        _ => i32::from(c) + 256,
    }
}

/// dpkg's verrevcmp: alternate between a lexical segment under the modified
/// alphabet and a numeric segment with leading zeros ignored.
fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() || j < b.len() {
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let wa = if i < a.len() { order(a[i]) } else { 0 };
            let wb = if j < b.len() { order(b[j]) } else { 0 };
            if wa != wb {
                return wa.cmp(&wb);
            }
            i += 1;
            j += 1;
        }

        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while i < a.len() && a[i].is_ascii_digit() && j < b.len() && b[j].is_ascii_digit() {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        if i < a.len() && a[i].is_ascii_digit() {
            return Ordering::Greater;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("1:2.3-4", "1:2.3-4"), Ordering::Equal);
        assert_eq!(compare_versions("", ""), Ordering::Equal);
    }

    #[test]
    fn test_comparison_is_antisymmetric() {
        let pairs = [
            ("1.0", "2.0"),
            ("1.0~rc1", "1.0"),
            ("1:0.5", "2.0"),
            ("1.0-1", "1.0-2"),
        ];
        for (a, b) in pairs {
            assert_eq!(compare_versions(a, b), compare_versions(b, a).reverse());
        }
    }

    #[test]
    fn test_transitivity_sample() {
        assert_eq!(compare_versions("0.9", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0", "2.0"), Ordering::Less);
        assert_eq!(compare_versions("0.9", "2.0"), Ordering::Less);
    }

    #[test]
    fn test_tilde_sorts_before_release() {
        assert_eq!(compare_versions("1.0", "1.0~rc1"), Ordering::Greater);
        assert_eq!(compare_versions("1.0~rc1", "1.0~rc2"), Ordering::Less);
        assert_eq!(compare_versions("1.0~~", "1.0~"), Ordering::Less);
    }

    #[test]
    fn test_epoch_dominates() {
        // dpkg --compare-versions 1:0.5 gt 2.0
        assert_eq!(compare_versions("1:0.5", "2.0"), Ordering::Greater);
        assert_eq!(compare_versions("1:1.0", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("10:1", "9:2"), Ordering::Greater);
        assert_eq!(compare_versions("0:1.0", "1.0"), Ordering::Equal);
    }

    #[test]
    fn test_revision_comparison() {
        assert_eq!(compare_versions("1.0-1", "1.0-2"), Ordering::Less);
        assert_eq!(compare_versions("1.0-1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0-rc1-2", "1.0-rc1-1"), Ordering::Greater);
    }

    #[test]
    fn test_letters_sort_before_other_characters() {
        assert_eq!(compare_versions("1.0a", "1.0+"), Ordering::Less);
        assert_eq!(compare_versions("1.0+dfsg", "1.0+deb"), Ordering::Greater);
    }

    #[test]
    fn test_digit_ends_a_letter_segment() {
        // the longer letter run "rc" outlasts "r" against the digit
        assert_eq!(compare_versions("1.0rc1", "1.0r1"), Ordering::Greater);
        assert_eq!(compare_versions("1.0~rc1", "1.0~1"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros_are_ignored() {
        assert_eq!(compare_versions("1.002", "1.2"), Ordering::Equal);
        assert_eq!(compare_versions("1.09", "1.1"), Ordering::Greater);
    }

    #[test]
    fn test_malformed_input_compares_literally() {
        assert_eq!(compare_versions("", "x"), Ordering::Less);
        assert_eq!(compare_versions("abc:1.0", "abc:1.0"), Ordering::Equal);
        assert_eq!(compare_versions("not-a-version", "not-a-version"), Ordering::Equal);
    }

    #[test]
    fn test_long_epochs_do_not_overflow() {
        assert_eq!(
            compare_versions("99999999999999999999999:1", "2:1"),
            Ordering::Greater
        );
    }
}
