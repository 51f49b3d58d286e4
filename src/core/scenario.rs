//! Scripted operation lists
//!
//! A scenario is a TOML document with an optional `[config]` table and a
//! list of `[[operation]]` entries, replayed in order against a fresh
//! simulator. Files are referenced by name; the earliest file with that name
//! is the target.
//!
//! ```toml
//! [config]
//! total_blocks = 64
//! seed = 1
//!
//! [[operation]]
//! op = "create"
//! name = "a.log"
//! size_kb = 16
//! strategy = "random"
//!
//! [[operation]]
//! op = "defragment"
//! ```

use crate::core::allocator::Strategy;
use crate::core::config::SimulatorConfig;
use crate::core::error::{Result, SimError};
use crate::core::fragment::Fragment;
use crate::core::history::FragmentationHistory;
use crate::core::stats::Stats;
use crate::Simulator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One scripted user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", deny_unknown_fields)]
pub enum Operation {
    Create {
        name: String,
        size_kb: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strategy: Option<Strategy>,
    },
    Delete {
        name: String,
    },
    Resize {
        name: String,
        size_kb: u64,
    },
    Defragment,
    Analyze,
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Delete { .. } => "delete",
            Operation::Resize { .. } => "resize",
            Operation::Defragment => "defragment",
            Operation::Analyze => "analyze",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimulatorConfig,

    #[serde(default, rename = "operation")]
    pub operations: Vec<Operation>,
}

/// Result of replaying one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    /// True when a new snapshot replaced the old one
    pub applied: bool,
    /// Why the step was a no-op
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Final layout of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub id: String,
    pub name: String,
    pub size_kb: u64,
    pub blocks: Vec<usize>,
    pub fragments: Vec<Fragment>,
    pub color: &'static str,
}

/// Everything a scenario run produced
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
    pub stats: Stats,
    pub files: Vec<FileSummary>,
    pub history: FragmentationHistory,
}

impl ScenarioReport {
    pub fn applied_count(&self) -> usize {
        self.steps.iter().filter(|s| s.applied).count()
    }

    /// Render the report as JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(s)?;
        scenario.config.check()?;
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Replay every operation against a fresh simulator
    ///
    /// Failed operations are recorded as no-op steps and do not stop the run.
    pub fn run(&self) -> Result<ScenarioReport> {
        let mut sim = Simulator::new(self.config.clone())?;
        let mut steps = Vec::with_capacity(self.operations.len());

        for (index, op) in self.operations.iter().enumerate() {
            let outcome = apply(&mut sim, op);
            let (applied, detail) = match outcome {
                Ok(true) => (true, None),
                Ok(false) => (false, Some("no change".to_string())),
                Err(e) => (false, Some(e.to_string())),
            };
            steps.push(StepOutcome {
                index,
                op: op.kind(),
                applied,
                detail,
            });
        }

        let files = sim
            .storage()
            .files()
            .map(|f| FileSummary {
                id: f.id().to_string(),
                name: f.name().to_string(),
                size_kb: f.size_kb(),
                blocks: f.blocks().to_vec(),
                fragments: f.fragments().to_vec(),
                color: f.color(),
            })
            .collect();

        let report = ScenarioReport {
            steps,
            stats: sim.stats(),
            files,
            history: sim.history().clone(),
        };
        info!(
            "Scenario finished: {}/{} operations applied",
            report.applied_count(),
            report.steps.len()
        );
        Ok(report)
    }
}

fn apply(sim: &mut Simulator, op: &Operation) -> Result<bool> {
    match op {
        Operation::Create {
            name,
            size_kb,
            strategy,
        } => {
            let strategy = strategy.unwrap_or(sim.config().default_strategy);
            sim.create_file_with(name.as_str(), *size_kb, strategy)
                .map(|_| true)
        }
        Operation::Delete { name } => {
            let id = lookup(sim, name)?;
            sim.delete_file(id).map(|_| true)
        }
        Operation::Resize { name, size_kb } => {
            let id = lookup(sim, name)?;
            sim.resize_file(id, *size_kb)
        }
        Operation::Defragment => sim.defragment().map(|_| true),
        Operation::Analyze => {
            sim.analyze();
            Ok(false)
        }
    }
}

fn lookup(sim: &Simulator, name: &str) -> Result<crate::core::storage::FileId> {
    sim.storage()
        .file_by_name(name)
        .map(|f| f.id())
        .ok_or_else(|| SimError::UnknownFileName(name.to_string()))
}
