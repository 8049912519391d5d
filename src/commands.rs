// Command dispatch: turn the free-form parameters of the command line into
// a `Command` and run it against the cluster.

use crate::api::{NamespaceAuthority, QuotaAuthority};
use crate::audit;
use crate::error::{Result, ToolError};
use crate::model::{NewQuota, Quota, QuotaQuery};
use crate::resize::{self, SizeChange, StopReason, Target};
use crate::table::QuotaTable;
use crate::ui::Terminal;
use std::io::Write;

/// Collaborators a command runs against.
pub struct Context<'a> {
    pub quotas: &'a dyn QuotaAuthority,
    pub namespace: &'a dyn NamespaceAuthority,
    pub term: &'a mut dyn Terminal,
}

/// Enforced quotas, or volumes (directory quotas that only account).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Quotas,
    Volumes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Listing),
    Search { filter: String },
    Audit { path: String },
    Resize { target: Target, change: SizeChange },
    Create { path: String },
}

impl Command {
    /// Parse `<group> <command> [args...]`, e.g. `quota resize proj +5G`.
    pub fn from_params(params: &[String]) -> Result<Self> {
        let mut args = params.iter().map(String::as_str);
        let group = args.next().unwrap_or("");
        let cmd = args.next().unwrap_or("");
        match group {
            "quota" => match cmd {
                "list" => Ok(Command::List(Listing::Quotas)),
                "search" => Ok(Command::Search {
                    filter: required(args.next(), "isi quota search <filter>")?,
                }),
                "audit" => Ok(Command::Audit {
                    path: required(args.next(), "isi quota audit <path>")?,
                }),
                "resize" => {
                    let usage = "isi quota resize <path|filter> <size>";
                    let target = Target::parse(&required(args.next(), usage)?);
                    let change = required(args.next(), usage)?.parse::<SizeChange>()?;
                    Ok(Command::Resize { target, change })
                }
                _ => Err(not_implemented(&format!("isi quota {} not implemented.", cmd))),
            },
            "volume" => match cmd {
                "list" => Ok(Command::List(Listing::Volumes)),
                "create" => Ok(Command::Create {
                    path: required(args.next(), "isi volume create <path>")?,
                }),
                _ => Err(not_implemented(&format!("isi volume {} not implemented.", cmd))),
            },
            _ => Err(not_implemented(&format!("Command 'isi {}' not implemented.", group))),
        }
    }

    pub fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        match self {
            Command::List(listing) => {
                let enforced = *listing == Listing::Quotas;
                let quotas = ctx.quotas.find(&QuotaQuery::enforced(enforced))?;
                show(ctx, &quotas, None)
            }
            Command::Search { filter } => {
                let quotas = ctx.quotas.find(&QuotaQuery::enforced(true))?;
                show(ctx, &quotas, Some(filter.as_str()))
            }
            Command::Audit { path } => audit::run(ctx, path),
            Command::Resize { target, change } => match resize::run(ctx, target, *change)? {
                StopReason::NotFound(what) => Err(ToolError::NotFound(what)),
                StopReason::Cancelled | StopReason::Finished => Ok(()),
            },
            Command::Create { path } => {
                let quota = ctx.quotas.create(&NewQuota::volume(path))?;
                writeln!(ctx.term.out(), "Created volume {}", quota.path)?;
                show(ctx, std::slice::from_ref(&quota), None)
            }
        }
    }
}

fn show(ctx: &mut Context<'_>, quotas: &[Quota], filter: Option<&str>) -> Result<()> {
    let table = QuotaTable::new(quotas, filter).with_color(ctx.term.supports_color());
    table.render(ctx.term.out())?;
    Ok(())
}

fn required(arg: Option<&str>, usage: &str) -> Result<String> {
    match arg {
        Some(a) if !a.is_empty() => Ok(a.to_string()),
        _ => Err(ToolError::Validation(format!("missing argument, usage: {}", usage))),
    }
}

fn not_implemented(msg: &str) -> ToolError {
    ToolError::Validation(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SizeError;
    use crate::testing::{quota, MemCluster, ScriptedTerminal, GIB};

    fn parse(line: &str) -> Result<Command> {
        let params: Vec<String> = line.split_whitespace().map(String::from).collect();
        Command::from_params(&params)
    }

    fn message(err: ToolError) -> String {
        err.to_string()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse("quota list").unwrap(), Command::List(Listing::Quotas));
        assert_eq!(parse("volume list").unwrap(), Command::List(Listing::Volumes));
        assert_eq!(
            parse("quota search Proj").unwrap(),
            Command::Search { filter: "Proj".into() }
        );
        assert_eq!(
            parse("quota resize /ifs/data/proj -5G").unwrap(),
            Command::Resize {
                target: Target::Path("/ifs/data/proj".into()),
                change: SizeChange::Shrink(5 * GIB),
            }
        );
        assert_eq!(
            parse("volume create /ifs/vol1").unwrap(),
            Command::Create { path: "/ifs/vol1".into() }
        );
    }

    #[test]
    fn unknown_commands_are_not_implemented() {
        assert_eq!(message(parse("snapshot list").unwrap_err()), "Command 'isi snapshot' not implemented.");
        assert_eq!(message(parse("quota frob").unwrap_err()), "isi quota frob not implemented.");
        assert_eq!(message(parse("volume delete x").unwrap_err()), "isi volume delete not implemented.");
    }

    #[test]
    fn resize_without_size_is_rejected_before_any_call() {
        let err = parse("quota resize proj").unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(message(err).contains("<size>"));
    }

    #[test]
    fn resize_with_bad_unit_is_rejected() {
        let err = parse("quota resize proj 5Q").unwrap_err();
        assert!(matches!(err, ToolError::Size(SizeError::InvalidUnit('Q'))));
    }

    #[test]
    fn list_shows_only_enforced_quotas() {
        let mut volume = quota("v1", "/ifs/vol1", 1);
        volume.enforced = false;
        let cluster = MemCluster::with_quotas(vec![quota("q1", "/ifs/proj", 1), volume]);
        let mut term = ScriptedTerminal::default();
        let mut ctx = Context { quotas: &cluster, namespace: &cluster, term: &mut term };

        Command::List(Listing::Quotas).execute(&mut ctx).unwrap();
        Command::List(Listing::Volumes).execute(&mut ctx).unwrap();

        let text = term.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[2].contains("/ifs/proj"));
        assert!(lines[5].contains("/ifs/vol1"));
    }

    #[test]
    fn search_filters_case_insensitively() {
        let cluster = MemCluster::with_quotas(vec![
            quota("q1", "/ifs/data/Proj-A", 1),
            quota("q2", "/ifs/data/home", 1),
        ]);
        let mut term = ScriptedTerminal::default();
        let mut ctx = Context { quotas: &cluster, namespace: &cluster, term: &mut term };

        Command::Search { filter: "PROJ".into() }.execute(&mut ctx).unwrap();

        let text = term.text();
        assert!(text.contains("/ifs/data/Proj-A"));
        assert!(!text.contains("/ifs/data/home"));
    }

    #[test]
    fn create_adds_unenforced_directory_quota() {
        let cluster = MemCluster::default();
        let mut term = ScriptedTerminal::default();
        let mut ctx = Context { quotas: &cluster, namespace: &cluster, term: &mut term };

        Command::Create { path: "/ifs/vol1".into() }.execute(&mut ctx).unwrap();

        let created = cluster.quota("new-1").unwrap();
        assert_eq!(created.path, "/ifs/vol1");
        assert!(!created.enforced);
        assert!(term.text().starts_with("Created volume /ifs/vol1"));
    }

    #[test]
    fn unresolved_resize_is_not_found() {
        let cluster = MemCluster::default();
        let mut term = ScriptedTerminal::default();
        let mut ctx = Context { quotas: &cluster, namespace: &cluster, term: &mut term };
        let cmd = Command::Resize {
            target: Target::Path("/ifs/gone".into()),
            change: SizeChange::Set(GIB),
        };

        let err = cmd.execute(&mut ctx).unwrap_err();

        assert!(matches!(err, ToolError::NotFound(p) if p == "/ifs/gone"));
        assert!(cluster.updates().is_empty());
    }
}
