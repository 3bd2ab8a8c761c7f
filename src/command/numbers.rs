//! Spoken number words to numeric values
//!
//! Handles phrases like "three", "twenty one", "one hundred and five",
//! "two thousand", "2 million" and "two point seven five".

/// Value of a number word below one hundred
fn small_value(word: &str) -> Option<u64> {
    let value = match word {
        "zero" | "oh" => 0,
        "one" | "a" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return word.parse().ok(),
    };
    Some(value)
}

/// Multiplier of a scale word
fn scale_value(word: &str) -> Option<u64> {
    match word {
        "thousand" => Some(1_000),
        "million" => Some(1_000_000),
        "billion" => Some(1_000_000_000),
        _ => None,
    }
}

/// Split a phrase into lowercase number words, treating hyphens as spaces
fn words(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty() && *w != "and")
        .map(ToString::to_string)
        .collect()
}

/// Convert the whole-number part of a phrase
fn whole_number(words: &[String]) -> Option<u64> {
    if words.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut current: u64 = 0;

    for word in words {
        if word == "hundred" {
            current = current.max(1).checked_mul(100)?;
        } else if let Some(scale) = scale_value(word) {
            total = total.checked_add(current.max(1).checked_mul(scale)?)?;
            current = 0;
        } else {
            current = current.checked_add(small_value(word)?)?;
        }
    }

    total.checked_add(current)
}

/// Convert a number phrase to a float
///
/// Digits after "point" are read one word at a time.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn words_to_number(phrase: &str) -> Option<f64> {
    let words = words(phrase);
    let (whole, fraction) = match words.iter().position(|w| w == "point") {
        Some(pos) => (&words[..pos], Some(&words[pos + 1..])),
        None => (&words[..], None),
    };

    let mut value = if whole.is_empty() && fraction.is_some() {
        0.0
    } else {
        whole_number(whole)? as f64
    };

    if let Some(digits) = fraction {
        if digits.is_empty() {
            return None;
        }
        let mut place = 0.1;
        for word in digits {
            let digit = small_value(word).filter(|d| *d < 10)?;
            value += digit as f64 * place;
            place /= 10.0;
        }
    }

    Some(value)
}

/// Convert a number phrase to an integer
///
/// Phrases with a fractional part do not convert.
#[must_use]
pub fn words_to_integer(phrase: &str) -> Option<i64> {
    let words = words(phrase);
    if words.iter().any(|w| w == "point") {
        return None;
    }
    whole_number(&words).and_then(|n| i64::try_from(n).ok())
}
