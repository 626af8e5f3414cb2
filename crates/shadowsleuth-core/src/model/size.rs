/// Size and count formatting for run summaries.
///
/// Report rows carry whole KiB (see [`crate::model::file_record::size_kib`]);
/// these helpers only feed console output.

/// Bytes per KiB.
pub const KIB: u64 = 1024;

/// Larger units with the decimals shown for each.
const UNITS: [(&str, usize); 4] = [("KB", 1), ("MB", 1), ("GB", 2), ("TB", 2)];

/// Format a byte count with a binary unit (KB = 1024 bytes).
///
/// Counts below one KiB print exactly; TB is the largest unit.
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / KIB as f64;
    let mut unit = 0;
    while value >= KIB as f64 && unit + 1 < UNITS.len() {
        value /= KIB as f64;
        unit += 1;
    }
    let (name, decimals) = UNITS[unit];
    format!("{value:.decimals$} {name}")
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
