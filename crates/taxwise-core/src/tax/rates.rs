//! Marginal tax rate schedule.
//!
//! A step function over chargeable income. Brackets are ordered by their
//! inclusive upper bound; incomes at or above [`TOP_THRESHOLD`] take
//! [`TOP_RATE`].

use std::fmt::Write as _;

/// One bracket: incomes up to and including `up_to` pay `rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub up_to: f64,
    pub rate: f64,
}

/// An ordered, immutable bracket table.
#[derive(Debug, Clone, Copy)]
pub struct RateSchedule {
    brackets: &'static [Bracket],
    top_threshold: f64,
    top_rate: f64,
}

/// Income from which the top rate applies.
pub const TOP_THRESHOLD: f64 = 1_000_000.0;

/// Rate applied at and above [`TOP_THRESHOLD`].
pub const TOP_RATE: f64 = 0.30;

const BRACKETS: &[Bracket] = &[
    Bracket { up_to: 5_000.0, rate: 0.0 },
    Bracket { up_to: 20_000.0, rate: 0.01 },
    Bracket { up_to: 35_000.0, rate: 0.03 },
    Bracket { up_to: 50_000.0, rate: 0.08 },
    Bracket { up_to: 70_000.0, rate: 0.13 },
    Bracket { up_to: 100_000.0, rate: 0.21 },
    Bracket { up_to: 250_000.0, rate: 0.24 },
    Bracket { up_to: 400_000.0, rate: 0.245 },
    Bracket { up_to: 600_000.0, rate: 0.25 },
    Bracket { up_to: TOP_THRESHOLD, rate: 0.26 },
];

/// The schedule used throughout the crate.
pub static SCHEDULE: RateSchedule = RateSchedule {
    brackets: BRACKETS,
    top_threshold: TOP_THRESHOLD,
    top_rate: TOP_RATE,
};

impl RateSchedule {
    /// Marginal rate for `income`.
    ///
    /// Negative and non-finite incomes fall into the lowest bracket, except
    /// positive infinity which takes the top rate.
    pub fn rate_for(&self, income: f64) -> f64 {
        if income.is_nan() {
            return self.brackets.first().map_or(0.0, |b| b.rate);
        }
        if income >= self.top_threshold {
            return self.top_rate;
        }
        self.brackets
            .iter()
            .find(|b| income <= b.up_to)
            .map_or(self.top_rate, |b| b.rate)
    }

    /// Render the schedule as a markdown table for prompt embedding.
    pub fn reference_table(&self) -> String {
        let mut out = String::from("| Chargeable income (RM) | Rate |\n|---|---|\n");
        let mut lower = 0.0_f64;
        for b in self.brackets {
            let label = if b.up_to >= self.top_threshold {
                format!("{} - {}", fmt_rm(lower), fmt_rm(self.top_threshold - 1.0))
            } else {
                format!("{} - {}", fmt_rm(lower), fmt_rm(b.up_to))
            };
            let _ = writeln!(out, "| {label} | {} |", fmt_pct(b.rate));
            lower = b.up_to + 1.0;
        }
        let _ = writeln!(
            out,
            "| {} and above | {} |",
            fmt_rm(self.top_threshold),
            fmt_pct(self.top_rate)
        );
        out
    }
}

/// Marginal rate for `income` under the crate-wide [`SCHEDULE`].
pub fn rate_for(income: f64) -> f64 {
    SCHEDULE.rate_for(income)
}

fn fmt_rm(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fmt_pct(rate: f64) -> String {
    let pct = rate * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{}%", pct.round() as i64)
    } else {
        format!("{pct:.1}%")
    }
}
