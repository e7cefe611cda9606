/*!
Assembling estimation results and controlling their appearance

# Examples

Printing a stake-based estimate as CSV:

```
use bakestimator::prelude::*;

let stake = DelegateStake {
    full_balance: 6_000_000_000.0,
    delegated_balance: 0.0,
    deposit_limit: None,
    total_active_stake: 600_000_000_000_000.0,
    eligibility_threshold: 6_000_000_000.0,
};

let result = EstimationBuilder::new()
    .constants(StakeConstants::default())
    .stake(stake)
    .cycles(5)
    .build()
    .unwrap()
    .run()
    .unwrap();

println!("{}", result.table(Format::Csv));
```
*/

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{
    config::EstimatorConfig,
    error::Amount,
    rewards::{
        BakeTally, EndorseTally, MeanMax, RewardRange, RollTallies,
        StakeTallies, Tally,
    },
};

/// Floating point precision of CSV output.
pub const FLOAT_PRECISION_DIGITS: usize = 6;

/// Estimate under the roll-based protocols. Deposits and rewards are in
/// whole tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollReport {
    /// Rolls active across the network.
    pub active_rolls: u64,
    /// Rolls the baker bakes with.
    pub baking_rolls: u64,
    pub cycles: u64,
    pub bakes: MeanMax<Tally>,
    pub endorsements: MeanMax<Tally>,
    pub total: MeanMax<Tally>,
}

/// Estimate under the stake-based protocols. Stake and rewards are in whole
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeReport {
    /// Stake counted toward selection.
    pub active_stake: Amount,
    pub cycles: u64,
    pub bakes: MeanMax<BakeTally>,
    /// Endorsing slots are reported as an expectation only.
    pub endorsements: EndorseTally,
}

/// Result of a single estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum EstimationResult {
    RollBased(RollReport),
    StakeBased(StakeReport),
}

impl RollReport {
    /// Converts micro-unit tallies into a report.
    pub fn assemble(
        tallies: RollTallies,
        active_rolls: u64,
        baking_rolls: u64,
        cycles: u64,
        config: &EstimatorConfig,
    ) -> Self {
        let whole = |t: Tally| Tally {
            count: t.count,
            deposits: config.to_whole(t.deposits),
            rewards: config.to_whole(t.rewards),
        };

        RollReport {
            active_rolls,
            baking_rolls,
            cycles,
            bakes: tallies.bakes.map(whole),
            endorsements: tallies.endorsements.map(whole),
            total: tallies.total.map(whole),
        }
    }
}

impl StakeReport {
    /// Converts micro-unit tallies and the micro-unit active stake into a
    /// report.
    pub fn assemble(
        tallies: StakeTallies,
        active_stake: Amount,
        cycles: u64,
        config: &EstimatorConfig,
    ) -> Self {
        let whole = |b: BakeTally| BakeTally {
            count: b.count,
            rewards: RewardRange {
                min: config.to_whole(b.rewards.min),
                max: config.to_whole(b.rewards.max),
            },
        };

        StakeReport {
            active_stake: config.to_whole(active_stake),
            cycles,
            bakes: tallies.bakes.map(whole),
            endorsements: EndorseTally {
                count: tallies.endorsements.count,
                rewards: config.to_whole(tallies.endorsements.rewards),
            },
        }
    }
}

impl EstimationResult {
    pub fn cycles(&self) -> u64 {
        match self {
            Self::RollBased(r) => r.cycles,
            Self::StakeBased(r) => r.cycles,
        }
    }

    /// Expected number of blocks baked.
    pub fn mean_bakes(&self) -> f64 {
        match self {
            Self::RollBased(r) => r.bakes.mean.count,
            Self::StakeBased(r) => r.bakes.mean.count,
        }
    }

    /// Wraps this result for display in the given [`Format`].
    pub fn table(&self, format: Format) -> ReportTable<'_> {
        ReportTable {
            result: self,
            format,
        }
    }
}

/// Describes the appearance of a [`ReportTable`] as given by its [`Display`]
/// implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated, one row per category and statistic.
    Csv,
    /// Serialized result object.
    Json,
    /// Human-readable aligned tables.
    #[default]
    Text,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!(
                "unknown format `{}`, expected text, csv or json",
                other
            )),
        }
    }
}

/// An [`EstimationResult`] paired with the [`Format`] it is displayed in.
pub struct ReportTable<'a> {
    result: &'a EstimationResult,
    format: Format,
}

impl ReportTable<'_> {
    const ROLL_COLUMN_WIDTH: usize = 10;
    const STAKE_COLUMN_WIDTH: usize = 16;
    const LABEL_WIDTH: usize = 10;
    const SEPARATOR_HORIZONTAL: char = '-';
    const CSV_HEADER: &'static str =
        "category,statistic,count,deposits,rewards_min,rewards_max";

    fn rule(f: &mut Formatter<'_>, column_width: usize) -> std::fmt::Result {
        let width = Self::LABEL_WIDTH + 2 * column_width + 1;
        writeln!(
            f,
            "{}",
            Self::SEPARATOR_HORIZONTAL.to_string().repeat(width)
        )
    }

    fn header(f: &mut Formatter<'_>, column_width: usize) -> std::fmt::Result {
        writeln!(
            f,
            "{:label$}{:>col$} {:>col$}",
            "",
            "mean",
            "max",
            label = Self::LABEL_WIDTH,
            col = column_width
        )
    }

    fn roll_text(f: &mut Formatter<'_>, r: &RollReport) -> std::fmt::Result {
        let w = Self::ROLL_COLUMN_WIDTH;

        writeln!(f, "active rolls: {}", r.active_rolls)?;
        writeln!(f, "cycles: {}", r.cycles)?;

        let sections = [
            ("bakes", &r.bakes),
            ("endorsements", &r.endorsements),
            ("total", &r.total),
        ];
        for (name, stats) in sections {
            writeln!(f)?;
            writeln!(f, "{}", name)?;
            Self::rule(f, w)?;
            Self::header(f, w)?;

            let rows = [
                ("count", stats.mean.count, stats.max.count),
                ("deposits", stats.mean.deposits, stats.max.deposits),
                ("rewards", stats.mean.rewards, stats.max.rewards),
            ];
            for (label, mean, max) in rows {
                writeln!(f, "{:>8}: {:w$.2} {:w$.2}", label, mean, max)?;
            }
        }

        Ok(())
    }

    fn stake_text(f: &mut Formatter<'_>, r: &StakeReport) -> std::fmt::Result {
        let w = Self::STAKE_COLUMN_WIDTH;

        writeln!(f, "active stake: {}", fmt_float(r.active_stake))?;
        writeln!(f, "cycles: {}", r.cycles)?;

        writeln!(f)?;
        writeln!(f, "bakes")?;
        Self::rule(f, w)?;
        Self::header(f, w)?;
        writeln!(
            f,
            "{:>8}: {:>w$} {:>w$}",
            "count",
            fmt_count(r.bakes.mean.count),
            fmt_count(r.bakes.max.count)
        )?;
        writeln!(
            f,
            "{:>8}: {:>w$} {:>w$}",
            "rewards",
            fmt_range(&r.bakes.mean.rewards),
            fmt_range(&r.bakes.max.rewards)
        )?;

        writeln!(f)?;
        writeln!(f, "endorsements")?;
        Self::rule(f, w)?;
        writeln!(f, "{:>8}: {:>w$}", "count", fmt_count(r.endorsements.count))?;
        writeln!(f, "{:>8}: {:w$.1}", "rewards", r.endorsements.rewards)
    }

    fn csv(f: &mut Formatter<'_>, result: &EstimationResult) -> std::fmt::Result {
        let p = FLOAT_PRECISION_DIGITS;
        write!(f, "{}", Self::CSV_HEADER)?;

        match result {
            EstimationResult::RollBased(r) => {
                let sections = [
                    ("bakes", &r.bakes),
                    ("endorsements", &r.endorsements),
                    ("total", &r.total),
                ];
                for (name, stats) in sections {
                    for (statistic, t) in [("mean", stats.mean), ("max", stats.max)]
                    {
                        write!(
                            f,
                            "\n{},{},{:.p$},{:.p$},{:.p$},{:.p$}",
                            name,
                            statistic,
                            t.count,
                            t.deposits,
                            t.rewards,
                            t.rewards
                        )?;
                    }
                }
            }
            EstimationResult::StakeBased(r) => {
                for (statistic, b) in
                    [("mean", r.bakes.mean), ("max", r.bakes.max)]
                {
                    write!(
                        f,
                        "\nbakes,{},{:.p$},,{:.p$},{:.p$}",
                        statistic, b.count, b.rewards.min, b.rewards.max
                    )?;
                }
                write!(
                    f,
                    "\nendorsements,mean,{:.p$},,{:.p$},{:.p$}",
                    r.endorsements.count,
                    r.endorsements.rewards,
                    r.endorsements.rewards
                )?;
            }
        }

        Ok(())
    }
}

impl Display for ReportTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.format, self.result) {
            (Format::Text, EstimationResult::RollBased(r)) => {
                Self::roll_text(f, r)
            }
            (Format::Text, EstimationResult::StakeBased(r)) => {
                Self::stake_text(f, r)
            }
            (Format::Csv, result) => Self::csv(f, result),
            (Format::Json, result) => {
                let json = serde_json::to_string_pretty(result)
                    .map_err(|_| std::fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl Display for EstimationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table(Format::Text))
    }
}

/// Counts below 100 keep two decimals, larger ones are rounded.
fn fmt_count(value: f64) -> String {
    if value < 100.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.0}", value)
    }
}

/// Shortest round-trip form, keeping one decimal on whole numbers.
fn fmt_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn fmt_range(range: &RewardRange) -> String {
    format!("{:.1} - {:.1}", range.min, range.max)
}
