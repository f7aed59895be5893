use std::str::FromStr;
use std::time::Duration;

/// Durations like `30s`, `10m`, `1h15m`. A bare number means seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let too_large = || format!("Duration too large: {}", s);
        let mut total: u64 = 0;
        let mut digits = String::new();

        for c in s.chars().map(Some).chain(std::iter::once(None)) {
            let c = match c {
                Some(c) if c.is_ascii_digit() => {
                    digits.push(c);
                    continue;
                }
                Some(c) if c.is_whitespace() => continue,
                Some(c) => c,
                None if digits.is_empty() => break,
                // A trailing bare number counts as seconds.
                None => 's',
            };
            if digits.is_empty() {
                return Err(format!("Invalid character in duration: {}", c));
            }
            let unit = unit_seconds(c).ok_or_else(|| format!("Invalid duration unit: {}", c))?;
            let amount: u64 = digits.parse().map_err(|_| too_large())?;
            total = amount
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(too_large)?;
            digits.clear();
        }

        if total == 0 {
            return Err("Duration must be a positive number".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}
