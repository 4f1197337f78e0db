//! Card number masking.
//!
//! Gateway responses already carry masked card numbers and are passed through as-is.
//! These helpers mask raw numbers that may appear in payloads written to logs.

/// Shortest digit run treated as a card number.
const MIN_CARD_DIGITS: usize = 13;
/// Longest digit run treated as a card number.
const MAX_CARD_DIGITS: usize = 19;

/// Masks a card number keeping the first six and last four characters.
///
/// Numbers of ten characters or fewer have no middle part to keep hidden and are
/// masked entirely.
///
/// # Examples
///
/// ```
/// use braspag_rest::masking::mask_card_number;
///
/// assert_eq!(mask_card_number("4551870000000183"), "455187******0183");
/// ```
#[must_use]
pub fn mask_card_number(card: &str) -> String {
    let chars: Vec<char> = card.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 10))
}

/// Masks every run of 13 to 19 consecutive ASCII digits in `input` that passes the Luhn
/// check.
///
/// Runs of other lengths and runs failing the checksum are left alone. Gateway references such
/// as `ProofOfSale` or `AcquirerTransactionId` are long digit strings too, and stay readable.
///
/// # Examples
///
/// ```
/// use braspag_rest::masking::redact_card_numbers;
///
/// let body = r#"{"CardNumber":"4551870000000183","Amount":15700}"#;
/// assert_eq!(redact_card_numbers(body), r#"{"CardNumber":"455187******0183","Amount":15700}"#);
/// ```
#[must_use]
pub fn redact_card_numbers(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        flush_digits(&mut output, &mut digits);
        output.push(c);
    }
    flush_digits(&mut output, &mut digits);

    output
}

/// Luhn (mod 10) checksum over a string of ASCII digits.
fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(position, digit)| match (position % 2, digit * 2) {
            (1, doubled) if doubled > 9 => doubled - 9,
            (1, doubled) => doubled,
            _ => digit,
        })
        .sum();
    sum % 10 == 0
}

fn flush_digits(output: &mut String, digits: &mut String) {
    if (MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) && luhn_valid(digits) {
        output.push_str(&mask_card_number(digits));
    } else {
        output.push_str(digits);
    }
    digits.clear();
}
