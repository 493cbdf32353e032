use std::cmp::Ordering;
use std::path::Path;

/// One run of a filename split for natural ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Number(&'a str),
}

/// Code points of every Unicode decimal digit zero (category Nd).
/// Each is followed by the digits one through nine.
const DECIMAL_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140,
    0x1E2F0, 0x1E950, 0x1FBF0,
];

/// Value of a decimal digit in any script: '7', full-width '７', Arabic-Indic '٧'
fn decimal_value(c: char) -> Option<u32> {
    if c.is_ascii() {
        return c.to_digit(10);
    }

    let code = c as u32;
    let idx = DECIMAL_ZEROS.partition_point(|&zero| zero <= code);
    let zero = DECIMAL_ZEROS[..idx].last()?;
    let value = code - zero;
    (value < 10).then_some(value)
}

/// Split a name into alternating text and digit runs.
/// The result always starts and ends with a (possibly empty) text run,
/// so chunks at the same index of two names are of the same kind.
fn split_chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (i, c) in name.char_indices() {
        let is_digit = decimal_value(c).is_some();
        if is_digit != in_digits {
            let run = &name[start..i];
            chunks.push(if in_digits { Chunk::Number(run) } else { Chunk::Text(run) });
            start = i;
            in_digits = is_digit;
        }
    }

    let tail = &name[start..];
    if in_digits {
        chunks.push(Chunk::Number(tail));
        chunks.push(Chunk::Text(""));
    } else {
        chunks.push(Chunk::Text(tail));
    }

    chunks
}

/// Significant digit values of a run, leading zeros dropped
fn digit_values(run: &str) -> Vec<u32> {
    run.chars()
        .filter_map(decimal_value)
        .skip_while(|&d| d == 0)
        .collect()
}

/// Compare two digit runs by numeric value without parsing,
/// so arbitrarily long runs never overflow
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = digit_values(a);
    let b = digit_values(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Natural ("human") ordering of filenames: digit runs compare as numbers,
/// everything else compares case-insensitively. "ep2" sorts before "ep10".
///
/// Names that differ only by case or leading zeros compare equal here;
/// use [`natural_order`] for a total, deterministic order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = split_chunks(a);
    let right = split_chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Number(x), Chunk::Number(y)) => compare_numbers(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => compare_text(x, y),
            _ => unreachable!("split_chunks alternates text and number runs"),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

/// Natural ordering with ties broken by plain byte order
pub fn natural_order(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b).then_with(|| a.cmp(b))
}

/// Episode label for a 1-based position: "Ep01", "Ep11", "Ep100"
pub fn episode_label(position: usize) -> String {
    format!("Ep{:02}", position)
}

/// Get the file extension from a path
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Get the final component of a path as UTF-8, lossily
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
