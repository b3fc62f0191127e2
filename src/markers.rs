/// Glyph that follows a day-of-month number: "16日".
pub const DAY_MARKER: char = '日';

/// Glyph that appears in weekday labels: "月曜", "曜日".
pub const WEEKDAY_MARKER: char = '曜';

/// Glyph that follows an hour number: "10時".
pub const HOUR_MARKER: char = '時';

/// Header keywords per column role. A header cell is classified by the
/// first role whose keyword list contains a substring of it, in the order
/// date → time → name.
pub const DATE_HEADER_KEYWORDS: &[&str] = &["日", "曜", "日付"];
pub const TIME_HEADER_KEYWORDS: &[&str] = &["時間", "時刻"];
pub const NAME_HEADER_KEYWORDS: &[&str] = &["名前", "氏名", "担当"];

/// Dash and wave glyphs accepted between the two ends of a time range:
/// hyphen (U+2010), ASCII hyphen-minus, en dash, ASCII tilde, wave dash,
/// full-width tilde, full-width hyphen-minus.
pub const RANGE_SEPARATORS: &[char] = &['‐', '-', '–', '~', '〜', '～', '－'];

/// Regex fragment: one decimal digit, ASCII or full-width.
pub const DIGIT: &str = "[0-9０-９]";

/// Regex fragment: the hour/minute separator, half- or full-width.
pub const CLOCK_SEPARATOR: &str = "[.:．：]";

/// Regex character class built from [`RANGE_SEPARATORS`].
pub fn range_separator_class() -> String {
    let mut class = String::from("[");
    for &c in RANGE_SEPARATORS {
        // '-' and '~' are the only members with meaning inside a class
        if c == '-' || c == '~' {
            class.push('\\');
        }
        class.push(c);
    }
    class.push(']');
    class
}

/// Full-width digits, indexed by value.
pub const FULL_WIDTH_DIGITS: [char; 10] = ['０', '１', '２', '３', '４', '５', '６', '７', '８', '９'];
const ASCII_DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Translate full-width digits to ASCII, leaving everything else alone.
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| {
            FULL_WIDTH_DIGITS
                .iter()
                .position(|&d| d == c)
                .map_or(c, |i| ASCII_DIGITS[i])
        })
        .collect()
}

/// Parse a run of ASCII or full-width digits.
pub fn parse_digits(s: &str) -> Option<u32> {
    let ascii = normalize_digits(s);
    if ascii.is_empty() || !ascii.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    ascii.parse().ok()
}
