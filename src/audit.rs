// Find directories without a quota: list the children of a directory and
// look each one up by exact path, one after the other.

use crate::commands::Context;
use crate::error::Result;
use crate::model::{Quota, QuotaQuery, Thresholds};
use crate::table::{QuotaTable, Row, Tabulate};
use log::debug;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum AuditEntry {
    Configured(Quota),
    Missing { path: String },
}

impl AuditEntry {
    pub fn path(&self) -> &str {
        match self {
            AuditEntry::Configured(quota) => &quota.path,
            AuditEntry::Missing { path } => path,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AuditEntry::Missing { .. })
    }
}

impl Tabulate for AuditEntry {
    fn row(&self) -> Row<'_> {
        match self {
            AuditEntry::Configured(quota) => quota.row(),
            AuditEntry::Missing { path } => Row {
                kind: "missing",
                path,
                thresholds: Thresholds::default(),
                logical: None,
                efficiency: None,
            },
        }
    }
}

/// One entry per child of `path`, in listing order. The first quota found
/// for a child wins.
pub fn collect(ctx: &Context<'_>, path: &str) -> Result<Vec<AuditEntry>> {
    let children = ctx.namespace.list_children(path)?;
    debug!("auditing {} children of {}", children.len(), path);

    let mut entries = Vec::with_capacity(children.len());
    for child in children {
        let found = ctx.quotas.find(&QuotaQuery::path(&child.path))?.into_iter().next();
        entries.push(match found {
            Some(quota) => AuditEntry::Configured(quota),
            None => AuditEntry::Missing { path: child.path },
        });
    }
    Ok(entries)
}

pub fn run(ctx: &mut Context<'_>, path: &str) -> Result<()> {
    let entries = collect(ctx, path)?;
    let missing = entries.iter().filter(|e| e.is_missing()).count();

    let table = QuotaTable::new(&entries, None).with_color(ctx.term.supports_color());
    let out = ctx.term.out();
    table.render(out)?;
    writeln!(out)?;
    writeln!(out, "{} of {} entries have no quota", missing, entries.len())?;
    Ok(())
}
