//! External builder commands.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::build::context::SiteContext;
use crate::build::paths::resolve_against;
use crate::build::step::{BuildStep, StepError};
use crate::config::{CommandSpec, ProgramSpec};

/// Step that runs an external program.
///
/// The program inherits stdout/stderr so its own progress output shows up
/// alongside ours. It runs in the project root and learns about the site
/// through `SITEWATCH_*` environment variables.
pub struct CommandStep {
    name: String,
    title: String,
    spec: CommandSpec,
    root: PathBuf,
}

impl CommandStep {
    pub fn new(name: String, title: String, spec: CommandSpec, root: PathBuf) -> Self {
        Self {
            name,
            title,
            spec,
            root,
        }
    }

    /// The command line as shown in logs and errors.
    fn display(&self) -> String {
        match &self.spec {
            CommandSpec::Shell(line) => line.clone(),
            CommandSpec::Program(program) => std::iter::once(program.program.as_str())
                .chain(program.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn command(&self, ctx: &SiteContext) -> Command {
        let mut command = match &self.spec {
            CommandSpec::Shell(line) => shell_command(line),
            CommandSpec::Program(program) => program_command(program),
        };

        let cwd = match &self.spec {
            CommandSpec::Program(program) => program
                .cwd
                .as_ref()
                .map(|cwd| resolve_against(&self.root, cwd))
                .unwrap_or_else(|| self.root.clone()),
            CommandSpec::Shell(_) => self.root.clone(),
        };

        command
            .current_dir(cwd)
            .env("SITEWATCH_STEP", &self.name)
            .env("SITEWATCH_ROOT", &ctx.root)
            .env("SITEWATCH_SOURCE", &ctx.source_dir)
            .env("SITEWATCH_OUTPUT", &ctx.output_dir)
            .env("SITEWATCH_CONTEXT", ctx.to_json());
        command
    }
}

fn program_command(program: &ProgramSpec) -> Command {
    let mut command = Command::new(&program.program);
    command.args(&program.args).envs(&program.env);
    command
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

impl BuildStep for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn run(&self, ctx: &mut SiteContext) -> Result<(), StepError> {
        let shown = self.display();
        debug!("running `{}`", shown);

        let status = self
            .command(ctx)
            .status()
            .map_err(|source| StepError::Spawn {
                command: shown.clone(),
                source,
            })?;

        if !status.success() {
            return Err(StepError::CommandFailed {
                command: shown,
                status,
            });
        }

        Ok(())
    }
}
