//! # Apply Subcommand
//!
//! Replays a YAML script of placement commands against the latest snapshot
//! of a chart and saves the result as a new version.
//!
//! ```yaml
//! - arm: { code: DIA }
//! - click: 11
//! - click: 21
//! - arm: { code: LCD, detail: 1 }
//! - click: 16
//! - face: O
//! - remove: { tooth: 11, code: DIA }
//! - confirm
//! - remove-detail: { tooth: 36, code: DDE, index: 0 }
//! - remove-face: { tooth: 16, code: LCD, face: O }
//! - cancel
//! - disarm
//! ```
//!
//! The first failing command aborts the run and nothing is saved. A script
//! that stops halfway through a face selection or a group delete confirmation
//! is rejected the same way.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_yaml::with::singleton_map_recursive;

use odonto_core::{ChartId, Direction, FaceKey, FindingColor, ToothNumber};
use odonto_state::{ArmOptions, ClickOutcome, PartRemoval, PlacementEngine, RemovalOutcome};
use odonto_store::{ChartSession, FileStore};

use crate::config::Settings;

/// Arguments for the `odonto apply` subcommand.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Chart identifier.
    #[arg(long)]
    pub chart: ChartId,
    /// YAML script of placement commands.
    #[arg(long)]
    pub script: PathBuf,
    /// Run the script without saving.
    #[arg(long)]
    pub dry_run: bool,
}

/// Parameters of an `arm` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmSpec {
    /// Finding code.
    pub code: String,
    /// Color for user-choice findings.
    #[serde(default)]
    pub color: Option<FindingColor>,
    /// Detail option index.
    #[serde(default)]
    pub detail: Option<usize>,
    /// Direction for directional findings.
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// A finding slot on one tooth.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotRef {
    /// Tooth number.
    pub tooth: ToothNumber,
    /// Finding code.
    pub code: String,
}

/// Parameters of a `remove-detail` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailRef {
    /// Tooth number.
    pub tooth: ToothNumber,
    /// Finding code.
    pub code: String,
    /// Index into the applied details.
    pub index: usize,
}

/// Parameters of a `remove-face` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaceRef {
    /// Tooth number.
    pub tooth: ToothNumber,
    /// Finding code.
    pub code: String,
    /// Face key or name.
    pub face: String,
}

/// One scripted engine command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptCommand {
    /// Arm a finding.
    Arm(ArmSpec),
    /// Click a tooth.
    Click(ToothNumber),
    /// Select a face for the pending face-targeted finding.
    Face(String),
    /// Cancel the pending interaction.
    Cancel,
    /// Request removal of a whole finding.
    Remove(SlotRef),
    /// Confirm a pending group removal.
    Confirm,
    /// Remove one applied detail.
    RemoveDetail(DetailRef),
    /// Remove one face entry.
    RemoveFace(FaceRef),
    /// Return to idle.
    Disarm,
}

/// Parse a script. Commands are single-key maps (`- click: 11`) or bare
/// names for commands without parameters (`- confirm`).
pub fn parse_script(yaml: &str) -> Result<Vec<ScriptCommand>> {
    singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(yaml))
        .context("invalid placement script")
}

fn parse_face(face: &str) -> Result<FaceKey> {
    Ok(face.parse::<FaceKey>()?)
}

/// Run one command, returning a short description of what happened.
pub fn execute(engine: &mut PlacementEngine, command: &ScriptCommand) -> Result<String> {
    let summary = match command {
        ScriptCommand::Arm(spec) => {
            let options = ArmOptions {
                color: spec.color,
                detail: spec.detail,
                direction: spec.direction,
            };
            engine.arm(&spec.code, options)?;
            format!("armed {}", spec.code)
        }
        ScriptCommand::Click(tooth) => match engine.click(*tooth)? {
            ClickOutcome::Ignored => format!("click {tooth} ignored, nothing armed"),
            ClickOutcome::Placed { teeth } => format!("placed on {}", join(&teeth)),
            ClickOutcome::AwaitingFace { tooth } => format!("{tooth}: awaiting face"),
            ClickOutcome::RangeStarted { tooth } => format!("range started at {tooth}"),
        },
        ScriptCommand::Face(face) => {
            let face = parse_face(face)?;
            engine.select_face(face)?;
            format!("face {face} selected")
        }
        ScriptCommand::Cancel => {
            if engine.cancel() {
                "cancelled".to_string()
            } else {
                "nothing to cancel".to_string()
            }
        }
        ScriptCommand::Remove(slot) => match engine.request_removal(slot.tooth, &slot.code)? {
            RemovalOutcome::Removed { teeth } => format!("removed {} from {}", slot.code, join(&teeth)),
            RemovalOutcome::NeedsConfirmation { members } => {
                format!("{} is grouped on {}, awaiting confirm", slot.code, join(&members))
            }
        },
        ScriptCommand::Confirm => {
            let teeth = engine.confirm_removal()?;
            format!("removed group from {}", join(&teeth))
        }
        ScriptCommand::RemoveDetail(d) => {
            describe_part(engine.remove_detail(d.tooth, &d.code, d.index)?, &d.code)
        }
        ScriptCommand::RemoveFace(f) => {
            let face = parse_face(&f.face)?;
            describe_part(engine.remove_face(f.tooth, &f.code, face)?, &f.code)
        }
        ScriptCommand::Disarm => {
            engine.disarm();
            "disarmed".to_string()
        }
    };
    Ok(summary)
}

fn describe_part(outcome: PartRemoval, code: &str) -> String {
    match outcome {
        PartRemoval::Removed => format!("{code}: part removed"),
        PartRemoval::SlotCleared { teeth } => format!("{code}: slot cleared on {}", join(&teeth)),
    }
}

fn join(teeth: &[ToothNumber]) -> String {
    teeth.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Execute the apply subcommand.
pub fn run_apply(args: &ApplyArgs, settings: &Settings) -> Result<u8> {
    let commands = load_script(&args.script)?;
    let mut session = ChartSession::open(FileStore::new(&settings.store_root), args.chart)
        .with_context(|| format!("cannot open chart {}", args.chart))?;

    for (step, command) in commands.iter().enumerate() {
        let summary = execute(session.engine_mut(), command)
            .with_context(|| format!("step {} ({command:?}) failed", step + 1))?;
        tracing::info!(step = step + 1, "{summary}");
    }
    let mode = session.engine().mode();
    if mode.is_interaction_pending() {
        bail!("script ended in {}; finish it with `face`, `confirm` or `cancel`", mode.name());
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(session.chart())?);
        return Ok(0);
    }
    let meta = session.save()?;
    println!("chart {} saved as version {} ({})", meta.chart_id, meta.version, meta.digest);
    Ok(0)
}

fn load_script(path: &Path) -> Result<Vec<ScriptCommand>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script {}", path.display()))?;
    parse_script(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(yaml: &str) -> Result<PlacementEngine> {
        let mut engine = PlacementEngine::new();
        for command in parse_script(yaml)? {
            execute(&mut engine, &command)?;
        }
        Ok(engine)
    }

    #[test]
    fn parse_every_command_form() {
        let commands = parse_script(
            "- arm: { code: AOF, color: blue }\n\
             - click: 14\n\
             - face: O\n\
             - cancel\n\
             - remove: { tooth: 11, code: DIA }\n\
             - confirm\n\
             - remove-detail: { tooth: 11, code: DDE, index: 0 }\n\
             - remove-face: { tooth: 16, code: LCD, face: Oclusal }\n\
             - disarm\n",
        )
        .unwrap();
        assert_eq!(commands.len(), 9);
        assert_eq!(
            commands[0],
            ScriptCommand::Arm(ArmSpec {
                code: "AOF".into(),
                color: Some(FindingColor::Blue),
                detail: None,
                direction: None,
            })
        );
        assert_eq!(commands[1], ScriptCommand::Click(ToothNumber::new(14).unwrap()));
        assert_eq!(commands[3], ScriptCommand::Cancel);
    }

    #[test]
    fn parse_module_doc_example() {
        let commands = parse_script(
            "- arm: { code: DIA }\n\
             - click: 11\n\
             - click: 21\n\
             - arm: { code: LCD, detail: 1 }\n\
             - click: 16\n\
             - face: O\n\
             - remove: { tooth: 11, code: DIA }\n\
             - confirm\n\
             - remove-detail: { tooth: 36, code: DDE, index: 0 }\n\
             - remove-face: { tooth: 16, code: LCD, face: O }\n\
             - cancel\n\
             - disarm\n",
        )
        .unwrap();
        assert_eq!(commands.len(), 12);
        assert_eq!(commands[5], ScriptCommand::Face("O".into()));
        assert_eq!(
            commands[6],
            ScriptCommand::Remove(SlotRef { tooth: ToothNumber::new(11).unwrap(), code: "DIA".into() })
        );
        assert_eq!(commands[7], ScriptCommand::Confirm);
        assert_eq!(
            commands[9],
            ScriptCommand::RemoveFace(FaceRef {
                tooth: ToothNumber::new(16).unwrap(),
                code: "LCD".into(),
                face: "O".into(),
            })
        );
        assert_eq!(commands[11], ScriptCommand::Disarm);
    }

    #[test]
    fn unknown_command_rejected_at_parse() {
        assert!(parse_script("- paint: 11\n").is_err());
    }

    #[test]
    fn invalid_tooth_rejected_at_parse() {
        assert!(parse_script("- click: 19\n").is_err());
    }

    #[test]
    fn diastema_and_caries_script() {
        let engine = run(
            "- arm: { code: DIA }\n\
             - click: 11\n\
             - click: 21\n\
             - arm: { code: LCD, detail: 1 }\n\
             - click: 16\n\
             - face: O\n",
        )
        .unwrap();
        let t16 = ToothNumber::new(16).unwrap();
        assert!(engine.chart().get(ToothNumber::new(21).unwrap(), "DIA").is_some());
        assert!(engine.chart().get(t16, "LCD").unwrap().faces.contains_key(&FaceKey::Occlusal));
    }

    #[test]
    fn group_removal_with_confirm() {
        let engine = run(
            "- arm: { code: DIA }\n\
             - click: 11\n\
             - click: 21\n\
             - remove: { tooth: 21, code: DIA }\n\
             - confirm\n",
        )
        .unwrap();
        assert!(engine.chart().is_empty());
    }

    #[test]
    fn failing_step_reports_error() {
        let err = run("- arm: { code: AOF }\n").unwrap_err();
        assert!(err.to_string().contains("color"));
    }

    #[test]
    fn bad_face_name_rejected() {
        assert!(run(
            "- arm: { code: LCD }\n\
             - click: 16\n\
             - face: top\n"
        )
        .is_err());
    }
}
