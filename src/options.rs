//! Selection catalogs known without asking the API.

/// Economic event types with impact ranges.
pub const EVENT_TYPES: [&str; 4] = ["CPI", "PPI", "NFP", "FOMC"];

pub const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub const GAP_DIRECTIONS: [&str; 2] = ["Up", "Down"];

/// Impact ranges of an economic event type.
pub fn economic_bins(event_type: &str) -> Option<&'static [&'static str]> {
    match event_type.to_ascii_uppercase().as_str() {
        "CPI" => Some(&["<0%", "0-1%", "1-2%", "2-3%", "3-5%", ">5%"]),
        "PPI" => Some(&["<0%", "0-2%", "2-4%", "4-8%", ">8%"]),
        "NFP" => Some(&["<0K", "0-100K", "100-200K", "200-300K", ">300K"]),
        "FOMC" => Some(&["0-1%", "1-2%", "2-3%", "3-4%", ">4%"]),
        _ => None,
    }
}

/// An earnings surprise bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarningsOutcome {
    pub value: &'static str,
    pub description: &'static str,
}

pub const EARNINGS_OUTCOMES: [EarningsOutcome; 5] = [
    EarningsOutcome {
        value: "Beat",
        description: "Beat (>10%)",
    },
    EarningsOutcome {
        value: "Slight Beat",
        description: "Slight Beat (0% to 10%)",
    },
    EarningsOutcome {
        value: "Miss",
        description: "Miss (<-10%)",
    },
    EarningsOutcome {
        value: "Slight Miss",
        description: "Slight Miss (-10% to 0%)",
    },
    EarningsOutcome {
        value: "Unknown",
        description: "Unknown (data unavailable)",
    },
];

/// Match an outcome name case-insensitively.
pub fn earnings_outcome(name: &str) -> Option<&'static EarningsOutcome> {
    let name = name.trim();
    EARNINGS_OUTCOMES
        .iter()
        .find(|outcome| outcome.value.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_by_event_type() {
        assert_eq!(economic_bins("cpi").map(|b| b.len()), Some(6));
        assert_eq!(economic_bins("NFP").unwrap()[0], "<0K");
        assert!(economic_bins("GDP").is_none());
    }

    #[test]
    fn test_outcome_lookup() {
        assert_eq!(earnings_outcome("slight beat").unwrap().value, "Slight Beat");
        assert!(earnings_outcome("Crushed").is_none());
    }
}
