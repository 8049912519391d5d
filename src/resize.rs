// Interactive quota resize.
//
// Each pass re-reads the quota from the cluster, applies the size change to
// the hard threshold, recomputes the advisory threshold and writes the full
// triple back. Passes repeat until resolution fails or the operator stops.
//
// The write is not conditional on the value read: a change made by someone
// else between the read and the write is overwritten.

use crate::commands::Context;
use crate::error::{Result, ToolError};
use crate::model::{Quota, QuotaQuery, Thresholds};
use crate::size::{format_size, parse_size, SizeError};
use crate::table::QuotaTable;
use log::{info, warn};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Which quota to resize: an exact path, or a filter for the selection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(String),
    Filter(String),
}

impl Target {
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with('/') {
            Target::Path(arg.to_string())
        } else {
            Target::Filter(arg.to_string())
        }
    }
}

/// `+5G` grows the hard threshold, `-5G` shrinks it, `5G` replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeChange {
    Grow(u64),
    Shrink(u64),
    Set(u64),
}

impl FromStr for SizeChange {
    type Err = SizeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('+') {
            Ok(SizeChange::Grow(parse_size(rest)?))
        } else if let Some(rest) = s.strip_prefix('-') {
            Ok(SizeChange::Shrink(parse_size(rest)?))
        } else {
            Ok(SizeChange::Set(parse_size(s)?))
        }
    }
}

impl fmt::Display for SizeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeChange::Grow(b) => write!(f, "+{}", format_size(Some(*b))),
            SizeChange::Shrink(b) => write!(f, "-{}", format_size(Some(*b))),
            SizeChange::Set(b) => write!(f, "{}", format_size(Some(*b))),
        }
    }
}

impl SizeChange {
    /// New threshold triple. Only `hard` is edited; `advisory` follows it
    /// and `soft` is carried over.
    pub fn apply(self, current: &Thresholds) -> Result<Thresholds> {
        let hard = current.hard.unwrap_or(0);
        let hard = match self {
            SizeChange::Grow(bytes) => hard.checked_add(bytes).ok_or_else(|| {
                ToolError::Validation("hard threshold would exceed 64 bits".into())
            })?,
            SizeChange::Shrink(bytes) => hard.checked_sub(bytes).ok_or_else(|| {
                ToolError::Validation(format!(
                    "cannot shrink hard threshold {} by {}",
                    format_size(Some(hard)),
                    format_size(Some(bytes))
                ))
            })?,
            SizeChange::Set(bytes) => bytes,
        };
        Ok(Thresholds {
            hard: Some(hard),
            soft: current.soft,
            advisory: Some(advisory_for(hard)),
        })
    }
}

/// Advisory threshold: 90% of hard, rounded down.
pub fn advisory_for(hard: u64) -> u64 {
    (hard as u128 * 9 / 10) as u64
}

/// Outcome of one pass.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Go round again, showing `notice` above the fresh screen.
    Continue { notice: String },
    Stop(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    NotFound(String),
    Cancelled,
    Finished,
}

enum Resolution {
    Found(Quota),
    Unresolved(StopReason),
}

/// Run passes until one stops. Errors that end the session are returned;
/// rejected changes in selection mode are shown and the loop continues.
pub fn run(ctx: &mut Context<'_>, target: &Target, change: SizeChange) -> Result<StopReason> {
    let mut notice: Option<String> = None;
    loop {
        match step(ctx, target, change, notice.as_deref())? {
            LoopControl::Continue { notice: next } => notice = Some(next),
            LoopControl::Stop(reason) => return Ok(reason),
        }
    }
}

pub fn step(
    ctx: &mut Context<'_>,
    target: &Target,
    change: SizeChange,
    notice: Option<&str>,
) -> Result<LoopControl> {
    ctx.term.clear()?;
    if let Some(notice) = notice {
        writeln!(ctx.term.out(), "{}\n", notice)?;
    }

    let quota = match resolve(ctx, target)? {
        Resolution::Found(quota) => quota,
        Resolution::Unresolved(reason) => return Ok(LoopControl::Stop(reason)),
    };

    let outcome = change
        .apply(&quota.thresholds)
        .and_then(|thresholds| ctx.quotas.update(&quota.id, &thresholds).map(|()| thresholds));
    let thresholds = match outcome {
        Ok(thresholds) => thresholds,
        Err(err) if matches!(target, Target::Filter(_)) && recoverable(&err) => {
            warn!("resize of {} rejected: {}", quota.path, err);
            return Ok(LoopControl::Continue { notice: err.report_lines().join("\n") });
        }
        Err(err) => return Err(err),
    };

    info!("resized {} ({}) to hard={:?}", quota.path, quota.id, thresholds.hard);
    let notice = format!(
        "{}: hard {} -> {}, advisory {}",
        quota.path,
        format_size(quota.thresholds.hard),
        format_size(thresholds.hard),
        format_size(thresholds.advisory)
    );

    match target {
        Target::Filter(_) => Ok(LoopControl::Continue { notice }),
        Target::Path(path) => {
            writeln!(ctx.term.out(), "{}", notice)?;
            let again = ctx.term.confirm(&format!("Apply {} to {} again?", change, path))?;
            if again {
                Ok(LoopControl::Continue { notice })
            } else {
                Ok(LoopControl::Stop(StopReason::Finished))
            }
        }
    }
}

/// The cluster said no, or the change made no sense for this quota. The
/// operator can pick another row.
fn recoverable(err: &ToolError) -> bool {
    matches!(err, ToolError::Api { .. } | ToolError::Validation(_))
}

fn resolve(ctx: &mut Context<'_>, target: &Target) -> Result<Resolution> {
    match target {
        Target::Path(path) => {
            let found = ctx.quotas.find(&QuotaQuery::path(path))?.into_iter().next();
            Ok(match found {
                Some(quota) => Resolution::Found(quota),
                None => Resolution::Unresolved(StopReason::NotFound(path.clone())),
            })
        }
        Target::Filter(filter) => {
            let quotas = ctx.quotas.find(&QuotaQuery::enforced(true))?;
            let table = QuotaTable::new(&quotas, Some(filter)).with_color(ctx.term.supports_color());
            if table.is_empty() {
                return Ok(Resolution::Unresolved(StopReason::NotFound(format!(
                    "no enforced quota matches '{}'",
                    filter
                ))));
            }
            table.render(ctx.term.out())?;
            let Some(number) = ctx.term.pick_row()? else {
                return Ok(Resolution::Unresolved(StopReason::Cancelled));
            };
            Ok(match table.select(number) {
                Some(quota) => Resolution::Found(quota.clone()),
                None => Resolution::Unresolved(StopReason::NotFound(format!("row {}", number))),
            })
        }
    }
}
