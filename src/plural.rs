//! Plural-form selection rules
//!
//! Resource files declare plural entries as ordered form lists; the rule for
//! a language maps a count to an index into that list. Languages without an
//! explicit rule use the two-form one/other default.

/// Returns the form index for `count` in the given 2-letter language.
pub fn form_index(language: &str, count: i64) -> usize {
    let n = count.unsigned_abs();
    match language {
        // single form
        "id" | "ja" | "ka" | "km" | "ko" | "ms" | "th" | "vi" | "zh" => 0,
        // zero and one share the singular
        "fr" | "hy" => usize::from(n > 1),
        "ru" | "uk" | "be" | "sr" | "hr" | "bs" => slavic(n),
        "pl" => {
            if n == 1 {
                0
            } else if few_slavic(n) {
                1
            } else {
                2
            }
        }
        "cs" | "sk" => {
            if n == 1 {
                0
            } else if (2..=4).contains(&n) {
                1
            } else {
                2
            }
        }
        "lt" => {
            if n % 10 == 1 && !(11..=19).contains(&(n % 100)) {
                0
            } else if n % 10 >= 2 && !(11..=19).contains(&(n % 100)) {
                1
            } else {
                2
            }
        }
        "ro" => {
            if n == 1 {
                0
            } else if n == 0 || (1..=19).contains(&(n % 100)) {
                1
            } else {
                2
            }
        }
        "ar" => match n {
            0 => 0,
            1 => 1,
            2 => 2,
            _ if (3..=10).contains(&(n % 100)) => 3,
            _ if n % 100 >= 11 => 4,
            _ => 5,
        },
        _ => usize::from(n != 1),
    }
}

fn slavic(n: u64) -> usize {
    if n % 10 == 1 && n % 100 != 11 {
        0
    } else if few_slavic(n) {
        1
    } else {
        2
    }
}

fn few_slavic(n: u64) -> bool {
    (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100))
}
