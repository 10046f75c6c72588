//! Findings from reviewing a wallet balance listing component, together with
//! the corrected listing logic.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Performance,
    TypeSafety,
    LogicError,
    BestPractice,
    Maintainability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub id: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub title: &'static str,
    pub description: &'static str,
    pub fix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

const ISSUES: &[Issue] = &[
    Issue {
        id: "logic-error-1",
        category: Category::LogicError,
        severity: Severity::High,
        title: "Undefined Variable Reference",
        description: "Variable `lhsPriority` is used but never defined",
        fix: "Compare `balancePriority`, the variable that was actually declared.",
    },
    Issue {
        id: "logic-error-2",
        category: Category::LogicError,
        severity: Severity::High,
        title: "Incorrect Filter Logic",
        description: "The filter keeps non-positive amounts and drops positive ones",
        fix: "Keep a balance only when its priority is known and its amount is positive.",
    },
    Issue {
        id: "performance-1",
        category: Category::Performance,
        severity: Severity::High,
        title: "Unnecessary Re-computation",
        description: "The sorted list is recomputed when prices change although prices are not used",
        fix: "Depend on balances only.",
    },
    Issue {
        id: "performance-2",
        category: Category::Performance,
        severity: Severity::Medium,
        title: "Redundant Function Calls",
        description: "Priorities are looked up again for every comparison",
        fix: "Resolve each balance's priority once, or keep priorities in a map.",
    },
    Issue {
        id: "performance-3",
        category: Category::Performance,
        severity: Severity::Medium,
        title: "Missing Memoization for Formatted Balances",
        description: "Formatted balances are rebuilt on every render",
        fix: "Derive them from the sorted list only when it changes.",
    },
    Issue {
        id: "type-safety-1",
        category: Category::TypeSafety,
        severity: Severity::High,
        title: "Untyped Function Parameter",
        description: "The priority lookup accepts any value",
        fix: "Accept a closed set of blockchains.",
    },
    Issue {
        id: "type-safety-2",
        category: Category::TypeSafety,
        severity: Severity::Medium,
        title: "Missing Blockchain Property",
        description: "The balance type has no blockchain field although the code reads one",
        fix: "Add the blockchain to the balance type.",
    },
    Issue {
        id: "best-practice-1",
        category: Category::BestPractice,
        severity: Severity::Medium,
        title: "Array Index as Row Key",
        description: "Rows are keyed by their position in the list",
        fix: "Key rows by blockchain and currency.",
    },
    Issue {
        id: "best-practice-2",
        category: Category::BestPractice,
        severity: Severity::Low,
        title: "Empty Props Interface",
        description: "The props type extends its base without adding anything",
        fix: "Use the base props type directly.",
    },
    Issue {
        id: "maintainability-1",
        category: Category::Maintainability,
        severity: Severity::Medium,
        title: "Hardcoded Priority Values",
        description: "Priorities are buried in a switch statement",
        fix: "Keep priorities in one table.",
    },
    Issue {
        id: "maintainability-2",
        category: Category::Maintainability,
        severity: Severity::Low,
        title: "Inconsistent Code Formatting",
        description: "Indentation and spacing vary throughout the file",
        fix: "Run a formatter.",
    },
];

pub fn analyze() -> Analysis {
    let issues = ISSUES.to_vec();
    let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
    let summary = Summary {
        total: issues.len(),
        high: count(Severity::High),
        medium: count(Severity::Medium),
        low: count(Severity::Low),
    };
    Analysis { issues, summary }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blockchain {
    Osmosis,
    Ethereum,
    Arbitrum,
    Zilliqa,
    Neo,
    Unknown,
}

pub const UNKNOWN_PRIORITY: i32 = -99;

impl Blockchain {
    pub fn priority(self) -> i32 {
        match self {
            Self::Osmosis => 100,
            Self::Ethereum => 50,
            Self::Arbitrum => 30,
            Self::Zilliqa | Self::Neo => 20,
            Self::Unknown => UNKNOWN_PRIORITY,
        }
    }
}

impl FromStr for Blockchain {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Osmosis" => Self::Osmosis,
            "Ethereum" => Self::Ethereum,
            "Arbitrum" => Self::Arbitrum,
            "Zilliqa" => Self::Zilliqa,
            "Neo" => Self::Neo,
            _ => Self::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletBalance {
    pub currency: String,
    pub amount: f64,
    pub blockchain: Blockchain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedWalletBalance {
    pub balance: WalletBalance,
    pub formatted: String,
}

impl FormattedWalletBalance {
    /// `None` when no price is known for the currency.
    pub fn usd_value(&self, prices: &HashMap<String, f64>) -> Option<f64> {
        prices
            .get(&self.balance.currency)
            .map(|price| price * self.balance.amount)
    }

    pub fn row_key(&self) -> String {
        format!("{:?}-{}", self.balance.blockchain, self.balance.currency)
    }
}

/// Positive balances on known chains, highest priority first.
pub fn prioritized_balances(balances: &[WalletBalance]) -> Vec<FormattedWalletBalance> {
    let mut kept: Vec<(i32, &WalletBalance)> = balances
        .iter()
        .map(|b| (b.blockchain.priority(), b))
        .filter(|(priority, b)| *priority > UNKNOWN_PRIORITY && b.amount > 0.0)
        .collect();
    kept.sort_by_key(|(priority, _)| Reverse(*priority));
    kept.into_iter()
        .map(|(_, b)| FormattedWalletBalance {
            balance: b.clone(),
            formatted: format!("{:.2}", b.amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(currency: &str, amount: f64, chain: &str) -> WalletBalance {
        WalletBalance {
            currency: currency.into(),
            amount,
            blockchain: chain.parse().unwrap(),
        }
    }

    #[test]
    fn summary_counts_by_severity() {
        let analysis = analyze();
        assert_eq!(
            analysis.summary,
            Summary {
                total: 11,
                high: 4,
                medium: 5,
                low: 2,
            }
        );
    }

    #[test]
    fn balances_are_filtered_and_sorted() {
        let balances = vec![
            balance("NEO", 5.0, "Neo"),
            balance("ETH", 1.23456, "Ethereum"),
            balance("OSMO", 0.0, "Osmosis"),
            balance("XYZ", 100.0, "Solana"),
            balance("ATOM", 12.0, "Osmosis"),
            balance("ARB", -3.0, "Arbitrum"),
        ];
        let out = prioritized_balances(&balances);
        let currencies: Vec<&str> = out.iter().map(|b| b.balance.currency.as_str()).collect();
        assert_eq!(currencies, vec!["ATOM", "ETH", "NEO"]);
        assert_eq!(out[1].formatted, "1.23");
        assert_eq!(out[0].row_key(), "Osmosis-ATOM");
    }

    #[test]
    fn usd_value_uses_price_table() {
        let out = prioritized_balances(&[balance("ETH", 2.0, "Ethereum")]);
        let prices = HashMap::from([("ETH".to_string(), 1500.0)]);
        assert_eq!(out[0].usd_value(&prices), Some(3000.0));
        assert_eq!(out[0].usd_value(&HashMap::new()), None);
    }
}
