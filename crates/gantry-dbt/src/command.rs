//! Templated dbt invocations.
//!
//! Every command follows one shell template: activate the project's
//! virtualenv, change into the project folder, run one dbt subcommand.
//! Values spliced into the template are screened for shell control
//! substrings first; assembly fails before any process could be spawned.

use serde::{Deserialize, Serialize};

use crate::error::DbtError;

/// Substrings that may never appear in a templated value.
pub const BANNED_SUBSTRINGS: [&str; 3] = ["&&", "\n", "|"];

/// Rejects `value` if it contains any banned substring.
pub fn screen_argument(value: &str) -> Result<(), DbtError> {
    for banned in BANNED_SUBSTRINGS {
        if value.contains(banned) {
            return Err(DbtError::UnsafeCommandArgument {
                value: value.to_string(),
                found: banned,
            });
        }
    }
    Ok(())
}

/// The dbt subcommands a pipeline can run, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbtPhase {
    Seed,
    Run,
    Test,
    Docs,
}

impl DbtPhase {
    pub const ORDER: [Self; 4] = [Self::Seed, Self::Run, Self::Test, Self::Docs];

    /// Task id of this phase in assembled workflows.
    pub fn task_id(self) -> &'static str {
        match self {
            Self::Seed => "dbt_seed",
            Self::Run => "dbt_run",
            Self::Test => "dbt_test",
            Self::Docs => "dbt_docs_generate",
        }
    }
}

/// One dbt project and the selector flags applied to its invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbtProject {
    pub project_folder: String,
    pub venv_folder: String,
    pub models: Vec<String>,
    pub exclude: Vec<String>,
    pub full_refresh: bool,
}

impl DbtProject {
    /// Renders the shell command for one phase.
    pub fn render(&self, phase: DbtPhase) -> Result<String, DbtError> {
        self.screen()?;

        let mut args: Vec<&str> = Vec::new();
        match phase {
            DbtPhase::Seed => {
                args.push("seed");
                if self.full_refresh {
                    args.push("--full-refresh");
                }
            }
            DbtPhase::Run => {
                args.push("run");
                if self.full_refresh {
                    args.push("--full-refresh");
                }
                self.push_selectors(&mut args);
            }
            DbtPhase::Test => {
                args.push("test");
                self.push_selectors(&mut args);
            }
            DbtPhase::Docs => {
                args.push("docs");
                args.push("generate");
            }
        }

        Ok(format!(
            "source {}/bin/activate\ncd {}\ndbt {}",
            self.venv_folder,
            self.project_folder,
            args.join(" ")
        ))
    }

    fn push_selectors<'a>(&'a self, args: &mut Vec<&'a str>) {
        if !self.exclude.is_empty() {
            args.push("--exclude");
            args.extend(self.exclude.iter().map(String::as_str));
        }
        if !self.models.is_empty() {
            args.push("--models");
            args.extend(self.models.iter().map(String::as_str));
        }
    }

    fn screen(&self) -> Result<(), DbtError> {
        screen_argument(&self.project_folder)?;
        screen_argument(&self.venv_folder)?;
        for model in &self.models {
            screen_argument(model)?;
        }
        for pattern in &self.exclude {
            screen_argument(pattern)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> DbtProject {
        DbtProject {
            project_folder: "/opt/dbt/analytics".to_string(),
            venv_folder: "/opt/dbt/env".to_string(),
            models: Vec::new(),
            exclude: Vec::new(),
            full_refresh: false,
        }
    }

    #[test]
    fn commands_follow_the_activate_cd_dbt_template() {
        let command = project().render(DbtPhase::Run).unwrap();
        assert_eq!(
            command,
            "source /opt/dbt/env/bin/activate\ncd /opt/dbt/analytics\ndbt run"
        );
        assert_eq!(
            project().render(DbtPhase::Docs).unwrap().lines().last(),
            Some("dbt docs generate")
        );
    }

    #[test]
    fn selector_flags_apply_to_run_and_test_only() {
        let mut project = project();
        project.models = vec!["tag:nightly".to_string(), "+orders".to_string()];
        project.exclude = vec!["legacy".to_string()];

        let run = project.render(DbtPhase::Run).unwrap();
        assert!(run.ends_with("dbt run --exclude legacy --models tag:nightly +orders"));

        let test = project.render(DbtPhase::Test).unwrap();
        assert!(test.ends_with("dbt test --exclude legacy --models tag:nightly +orders"));

        let seed = project.render(DbtPhase::Seed).unwrap();
        assert!(seed.ends_with("dbt seed"));
    }

    #[test]
    fn full_refresh_flag_applies_to_seed_and_run() {
        let mut project = project();
        project.full_refresh = true;
        assert!(project.render(DbtPhase::Seed).unwrap().ends_with("dbt seed --full-refresh"));
        assert!(project.render(DbtPhase::Run).unwrap().ends_with("dbt run --full-refresh"));
        assert!(project.render(DbtPhase::Test).unwrap().ends_with("dbt test"));
    }

    #[test]
    fn shell_control_substrings_are_rejected() {
        let mut with_chain = project();
        with_chain.project_folder = "/opt/dbt && rm -rf /".to_string();
        let err = with_chain.render(DbtPhase::Run).unwrap_err();
        assert!(
            matches!(err, DbtError::UnsafeCommandArgument { found, .. } if found == "&&")
        );

        let mut with_newline = project();
        with_newline.models = vec!["orders\ncurl evil".to_string()];
        assert!(with_newline.render(DbtPhase::Run).is_err());

        let mut with_pipe = project();
        with_pipe.venv_folder = "/opt|/env".to_string();
        assert!(with_pipe.render(DbtPhase::Seed).is_err());

        assert!(project().render(DbtPhase::Run).is_ok());
    }
}
