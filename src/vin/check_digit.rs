//! North American VIN check digit (position 9).

const WEIGHTS: [u32; 17] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

fn transliterate(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A' | 'J' => Some(1),
        'B' | 'K' | 'S' => Some(2),
        'C' | 'L' | 'T' => Some(3),
        'D' | 'M' | 'U' => Some(4),
        'E' | 'N' | 'V' => Some(5),
        'F' | 'W' => Some(6),
        'G' | 'P' | 'X' => Some(7),
        'H' | 'Y' => Some(8),
        'R' | 'Z' => Some(9),
        _ => None,
    }
}

/// Expected check character for a 17-character upper-case VIN, or `None`
/// when the VIN is not 17 characters or holds characters outside the VIN
/// alphabet (I, O, Q, punctuation).
pub fn expected_check_char(vin: &str) -> Option<char> {
    let chars: Vec<char> = vin.chars().collect();
    if chars.len() != 17 {
        return None;
    }
    let mut sum = 0u32;
    for (c, weight) in chars.iter().zip(WEIGHTS) {
        sum += transliterate(*c)? * weight;
    }
    match sum % 11 {
        10 => Some('X'),
        n => char::from_digit(n, 10),
    }
}

/// `Some(true)` when the check digit matches, `Some(false)` when it does
/// not, `None` when the VIN cannot be checked.
pub fn check_digit_valid(vin: &str) -> Option<bool> {
    let expected = expected_check_char(vin)?;
    vin.chars().nth(8).map(|actual| actual == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_vins_pass() {
        assert_eq!(check_digit_valid("1HGCM82633A004352"), Some(true));
        assert_eq!(check_digit_valid("1M8GDM9AXKP042788"), Some(true));
    }

    #[test]
    fn altered_vin_fails() {
        assert_eq!(check_digit_valid("1HGCM82643A004352"), Some(false));
    }

    #[test]
    fn short_or_malformed_vins_are_unchecked() {
        assert_eq!(check_digit_valid("1HGCM82633A"), None);
        assert_eq!(check_digit_valid("1HGCM8263OA004352"), None);
    }
}
