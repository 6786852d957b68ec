// same mapping as translating "-0123456789/" into "⁻⁰¹²³⁴⁵⁶⁷⁸⁹⁄"
fn superscript_char(c: char) -> char {
    match c {
        '-' => '⁻',
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '/' => '⁄',
        other => other,
    }
}

/// Renders the textual form of `value` with every digit, minus sign and
/// fraction slash replaced by its superscript counterpart.
pub fn to_superscript(value: impl std::fmt::Display) -> String {
    value.to_string().chars().map(superscript_char).collect()
}

#[test]
fn superscript_test() {
    assert_eq!(to_superscript(2), "²");
    assert_eq!(to_superscript(-1), "⁻¹");
    assert_eq!(to_superscript(1234567890), "¹²³⁴⁵⁶⁷⁸⁹⁰");
    assert_eq!(to_superscript(num!(-3, 4)), "⁻³⁄⁴");
}

#[test]
fn superscript_passthrough_test() {
    assert_eq!(to_superscript("x+1"), "x+¹");
}
