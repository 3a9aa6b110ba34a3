use std::str::FromStr;
use std::time::Duration;

/// `--timeout` values: one or more `<number><unit>` terms with unit `h`, `m`
/// or `s` (`30s`, `2m`, `1m30s`). A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

fn unit_seconds(unit: char) -> Result<u64, String> {
    match unit {
        'h' => Ok(3600),
        'm' => Ok(60),
        's' => Ok(1),
        other => Err(format!("Invalid duration unit: {}", other)),
    }
}

fn add_term(total: u64, digits: &str, scale: u64) -> Result<u64, String> {
    let value: u64 = digits.parse().map_err(|_| "Duration too large".to_string())?;
    value
        .checked_mul(scale)
        .and_then(|secs| total.checked_add(secs))
        .ok_or_else(|| "Duration too large".to_string())
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if input.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let mut total = 0u64;
        let mut rest = input.as_str();
        while !rest.is_empty() {
            let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            let (digits, tail) = rest.split_at(digits_end);
            let mut tail_chars = tail.chars();

            // Trailing bare number
            let Some(unit) = tail_chars.next() else {
                total = add_term(total, digits, 1)?;
                break;
            };
            if digits.is_empty() {
                return Err(format!("Invalid character in duration: {}", unit));
            }
            total = add_term(total, digits, unit_seconds(unit)?)?;
            rest = tail_chars.as_str();
        }

        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}
