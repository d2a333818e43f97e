//! Phone normalization for UAE numbers.

/// Calling code assumed when the input carries none.
pub const DEFAULT_CALLING_CODE: &str = "971";

const MIN_DIGITS: usize = 9;
const MAX_DIGITS: usize = 15;

/// Normalizes free-form input into `+971…` international form.
///
/// Never fails; garbage in yields a syntactically international but possibly
/// meaningless number.
pub fn sanitize_phone_number(raw: &str) -> String {
    sanitize_for_calling_code(raw, DEFAULT_CALLING_CODE)
}

/// Same rules as [`sanitize_phone_number`] for an arbitrary calling code
/// (digits only, no leading `+`).
pub fn sanitize_for_calling_code(raw: &str, calling_code: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let prefix = format!("+{calling_code}");

    if let Some(local) = digits.strip_prefix('0') {
        format!("{prefix}{local}")
    } else if digits.starts_with(calling_code) {
        format!("+{digits}")
    } else {
        // Bare mobiles (`5XXXXXXXX`) and everything else take the prefix.
        // Stripping non-digits already removed any leading `+`.
        format!("{prefix}{digits}")
    }
}

/// Checks the digit count of a phone number, returning the warning to show
/// when it is out of range.
pub fn validate_phone_number(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Err("Phone number is required".into());
    }
    let count = raw.chars().filter(char::is_ascii_digit).count();
    if (MIN_DIGITS..=MAX_DIGITS).contains(&count) {
        Ok(())
    } else {
        Err("Please enter a valid phone number".into())
    }
}
