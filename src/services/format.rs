/// English ordinal: 1st, 2nd, 3rd, 4th, ... 11th/12th/13th, 21st, 101st.
pub fn ordinal(n: usize) -> String {
    let suffix = match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{n}{suffix}")
}

/// Problem letter by ordinal: 0 -> A, 1 -> B, ... 25 -> Z, then spreadsheet
/// style AA, AB, ... so letters never collide on large problem sets.
pub fn problem_letter(ordinal: i32) -> String {
    let mut n = ordinal.max(0) as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Joins group names the way the ceremony sheet expects.
pub fn join_group_names(names: &[String]) -> String {
    names.join("、")
}

/// Quotes one CSV field, doubling embedded quotes.
pub fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
