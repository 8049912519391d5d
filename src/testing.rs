// Test doubles: an in-memory cluster and a terminal that replays canned
// answers. Single-threaded, so RefCell is enough for interior mutability.

use crate::api::{NamespaceAuthority, QuotaAuthority};
use crate::error::{Result, ToolError};
use crate::model::{NamespaceEntry, NewQuota, Quota, QuotaQuery, Thresholds, Usage};
use crate::ui::Terminal;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Enforced directory quota with a `hard_gib` hard limit, advisory at 90%
/// and 2:1 efficiency.
pub fn quota(id: &str, path: &str, hard_gib: u64) -> Quota {
    Quota {
        id: id.to_string(),
        path: path.to_string(),
        kind: "directory".to_string(),
        enforced: true,
        thresholds: Thresholds {
            hard: Some(hard_gib * GIB),
            soft: None,
            advisory: Some(hard_gib * GIB / 10 * 9),
        },
        usage: Some(Usage { logical: 2048, physical: 1024 }),
    }
}

#[derive(Default)]
pub struct MemCluster {
    quotas: RefCell<Vec<Quota>>,
    children: RefCell<HashMap<String, Vec<NamespaceEntry>>>,
    updates: RefCell<Vec<(String, Thresholds)>>,
    finds: RefCell<usize>,
    reject_updates: RefCell<Option<Vec<String>>>,
}

impl MemCluster {
    pub fn with_quotas(quotas: Vec<Quota>) -> Self {
        let cluster = Self::default();
        *cluster.quotas.borrow_mut() = quotas;
        cluster
    }

    pub fn add_dir(&self, parent: &str, children: &[&str]) {
        let entries = children
            .iter()
            .map(|c| NamespaceEntry { path: format!("{}/{}", parent, c) })
            .collect();
        self.children.borrow_mut().insert(parent.to_string(), entries);
    }

    /// Make every update fail with these API messages.
    pub fn reject_updates(&self, messages: &[&str]) {
        *self.reject_updates.borrow_mut() = Some(messages.iter().map(|m| m.to_string()).collect());
    }

    pub fn updates(&self) -> Vec<(String, Thresholds)> {
        self.updates.borrow().clone()
    }

    pub fn find_calls(&self) -> usize {
        *self.finds.borrow()
    }

    pub fn quota(&self, id: &str) -> Option<Quota> {
        self.quotas.borrow().iter().find(|q| q.id == id).cloned()
    }
}

impl QuotaAuthority for MemCluster {
    fn find(&self, query: &QuotaQuery) -> Result<Vec<Quota>> {
        *self.finds.borrow_mut() += 1;
        Ok(self
            .quotas
            .borrow()
            .iter()
            .filter(|q| query.matches(q))
            .cloned()
            .collect())
    }

    fn create(&self, spec: &NewQuota) -> Result<Quota> {
        let mut quotas = self.quotas.borrow_mut();
        if quotas.iter().any(|q| q.path == spec.path) {
            return Err(ToolError::Api {
                status: 409,
                messages: vec![format!("Quota already exists for {}", spec.path)],
            });
        }
        let created = Quota {
            id: format!("new-{}", quotas.len() + 1),
            path: spec.path.clone(),
            kind: spec.kind.clone(),
            enforced: spec.enforced,
            thresholds: Thresholds::default(),
            usage: None,
        };
        quotas.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: &str, thresholds: &Thresholds) -> Result<()> {
        if let Some(messages) = self.reject_updates.borrow().clone() {
            return Err(ToolError::Api { status: 400, messages });
        }
        let mut quotas = self.quotas.borrow_mut();
        let quota = quotas.iter_mut().find(|q| q.id == id).ok_or_else(|| ToolError::Api {
            status: 404,
            messages: vec![format!("Quota {} not found", id)],
        })?;
        quota.thresholds = *thresholds;
        self.updates.borrow_mut().push((id.to_string(), *thresholds));
        Ok(())
    }
}

impl NamespaceAuthority for MemCluster {
    fn list_children(&self, path: &str) -> Result<Vec<NamespaceEntry>> {
        self.children
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| ToolError::Api {
                status: 404,
                messages: vec![format!("Path {} not found", path)],
            })
    }
}

/// Terminal that records output and answers prompts from a script. Once
/// the script runs out, row prompts are cancelled and confirmations declined.
#[derive(Default)]
pub struct ScriptedTerminal {
    pub output: Vec<u8>,
    pub picks: VecDeque<Option<usize>>,
    pub confirms: VecDeque<bool>,
    pub clears: usize,
    pub row_prompts: usize,
}

impl ScriptedTerminal {
    pub fn picking(picks: &[Option<usize>]) -> Self {
        ScriptedTerminal { picks: picks.iter().copied().collect(), ..Default::default() }
    }

    pub fn confirming(confirms: &[bool]) -> Self {
        ScriptedTerminal { confirms: confirms.iter().copied().collect(), ..Default::default() }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Terminal for ScriptedTerminal {
    fn out(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn pick_row(&mut self) -> io::Result<Option<usize>> {
        self.row_prompts += 1;
        Ok(self.picks.pop_front().flatten())
    }

    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(self.confirms.pop_front().unwrap_or(false))
    }
}
