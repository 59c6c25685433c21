use crate::evaluate::{run_evaluate, run_rubric_show, EvaluateArgs, RubricShowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use valorador::config::RubricSettings;
use valorador::error::AppError;
use valorador::workflows::rubric::{ScoringOverrides, ScoringProfile};

#[derive(Parser, Debug)]
#[command(
    name = "valorador",
    about = "Score research project proposals against a Team/Body rubric",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a session file and optionally export the report
    Evaluate(EvaluateArgs),
    /// Inspect the rubric definition in use
    Rubric {
        #[command(subcommand)]
        command: RubricCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RubricCommand {
    /// Print rubric items, scales and scoring thresholds
    Show(RubricShowArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[command(flatten)]
    pub(crate) thresholds: ThresholdArgs,
}

/// Where the rubric and scoring configuration are read from. Flags win over `APP_*` variables.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct SourceArgs {
    /// Rubric definition file (.json, .yaml, .yml or .csv)
    #[arg(long)]
    pub(crate) rubric: Option<PathBuf>,
    /// Scoring configuration file (.json, .yaml or .yml)
    #[arg(long)]
    pub(crate) scoring: Option<PathBuf>,
    /// Built-in scoring profile: estandar or ampliado
    #[arg(long, value_parser = crate::infra::parse_profile)]
    pub(crate) profile: Option<ScoringProfile>,
}

impl SourceArgs {
    pub(crate) fn apply(&self, settings: &mut RubricSettings) {
        if let Some(path) = &self.rubric {
            settings.rubric_path = Some(path.clone());
        }
        if let Some(path) = &self.scoring {
            settings.scoring_path = Some(path.clone());
        }
        if let Some(profile) = self.profile {
            settings.profile = profile;
        }
    }
}

/// Threshold overrides applied on top of the profile and scoring file.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ThresholdArgs {
    /// Cuerpo maximum
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) body_max: Option<i64>,
    /// Cuerpo minimum required
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) body_min: Option<i64>,
    /// Equipo maximum
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) team_max: Option<i64>,
    /// Equipo minimum required
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) team_min: Option<i64>,
    /// Global minimum required for the total
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) global_min: Option<i64>,
    /// Cap the Equipo score at its maximum
    #[arg(long, conflicts_with = "no_cap_team")]
    pub(crate) cap_team: bool,
    /// Let the Equipo score exceed its maximum
    #[arg(long)]
    pub(crate) no_cap_team: bool,
}

impl ThresholdArgs {
    pub(crate) fn overrides(&self) -> ScoringOverrides {
        let cap_team = match (self.cap_team, self.no_cap_team) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };

        ScoringOverrides {
            body_maximum: self.body_max,
            body_minimum_required: self.body_min,
            team_maximum: self.team_max,
            team_minimum_required: self.team_min,
            cap_team,
            global_minimum_required: self.global_min,
            ..ScoringOverrides::default()
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    dispatch(cli).await
}

async fn dispatch(cli: Cli) -> Result<(), AppError> {
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Rubric {
            command: RubricCommand::Show(args),
        } => run_rubric_show(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn serve_is_the_default_command() {
        assert!(parse(&["valorador"]).command.is_none());
    }

    #[test]
    fn evaluate_collects_threshold_overrides() {
        let cli = parse(&[
            "valorador",
            "evaluate",
            "--input",
            "sesion.json",
            "--profile",
            "ampliado",
            "--body-min",
            "40",
            "--global-min",
            "55",
            "--no-cap-team",
            "--export-dir",
            "informe",
        ]);

        let Some(Command::Evaluate(args)) = cli.command else {
            panic!("expected evaluate command");
        };
        assert_eq!(args.input, PathBuf::from("sesion.json"));
        assert_eq!(args.source.profile, Some(ScoringProfile::Ampliado));
        assert_eq!(args.export_dir, Some(PathBuf::from("informe")));

        let overrides = args.thresholds.overrides();
        assert_eq!(overrides.body_minimum_required, Some(40));
        assert_eq!(overrides.global_minimum_required, Some(55));
        assert_eq!(overrides.cap_team, Some(false));
        assert_eq!(overrides.body_maximum, None);
        assert_eq!(overrides.profile, None);
    }

    #[test]
    fn cap_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "valorador",
            "evaluate",
            "--input",
            "sesion.json",
            "--cap-team",
            "--no-cap-team",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn attachment_requires_an_export_directory() {
        let result = Cli::try_parse_from([
            "valorador",
            "evaluate",
            "--input",
            "sesion.json",
            "--attachment",
            "plantilla.xlsx",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let result = Cli::try_parse_from(["valorador", "rubric", "show", "--profile", "generoso"]);
        assert!(result.is_err());
    }

    #[test]
    fn source_flags_override_settings() {
        let mut settings = RubricSettings {
            rubric_path: Some(PathBuf::from("env.yaml")),
            scoring_path: None,
            profile: ScoringProfile::Estandar,
        };
        let source = SourceArgs {
            rubric: Some(PathBuf::from("flag.csv")),
            scoring: None,
            profile: Some(ScoringProfile::Ampliado),
        };

        source.apply(&mut settings);
        assert_eq!(settings.rubric_path, Some(PathBuf::from("flag.csv")));
        assert_eq!(settings.scoring_path, None);
        assert_eq!(settings.profile, ScoringProfile::Ampliado);
    }
}
