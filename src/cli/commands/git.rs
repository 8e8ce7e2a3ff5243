//! Git shortcuts.
//!
//! Provides `opskit git status`, `log`, `branches`, `sync` and `commit`,
//! all run in the current working directory.

use clap::{Args, Subcommand};

use crate::error::Result;
use crate::shell::{CommandOutput, Invocation};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::non_empty;

/// Arguments for the git command.
#[derive(Debug, Clone, Args)]
pub struct GitArgs {
    #[command(subcommand)]
    pub command: GitSubcommand,
}

/// Git subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum GitSubcommand {
    /// Branch and changed files
    Status,
    /// Recent commits, one per line
    Log {
        /// Number of commits
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Local and remote branches
    Branches,
    /// Pull with rebase, then push
    Sync,
    /// Stage everything and commit
    Commit {
        /// Commit message
        #[arg(value_parser = non_empty())]
        message: String,
    },
}

impl GitSubcommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Log { .. } => "log",
            Self::Branches => "branches",
            Self::Sync => "sync",
            Self::Commit { .. } => "commit",
        }
    }
}

/// The git command implementation.
pub struct GitCommand<'a> {
    ctx: &'a CommandContext,
    args: GitArgs,
}

impl<'a> GitCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: GitArgs) -> Self {
        Self { ctx, args }
    }

    fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new("git").args(args).cwd(&self.ctx.cwd)
    }

    /// Read-only query, bounded by the command timeout.
    fn git<I, S>(&self, ui: &mut dyn UserInterface, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = self.ctx.bounded(self.invocation(args));
        self.ctx.run_tool(ui, &inv)
    }

    /// Operation that may wait on the network or hooks; runs to completion.
    fn git_unbounded<I, S>(&self, ui: &mut dyn UserInterface, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ctx.run_tool(ui, &self.invocation(args))
    }

    fn print(ui: &mut dyn UserInterface, output: &CommandOutput) {
        for line in output.stdout.lines() {
            ui.message(line);
        }
    }

    fn status(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self.git(ui, ["status", "--short", "--branch"])?;
        Self::print(ui, &output);

        let mut lines = output.stdout.lines();
        let branch = lines
            .next()
            .and_then(|l| l.strip_prefix("## "))
            .map(|l| l.split("...").next().unwrap_or(l).to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let changed = lines.filter(|l| !l.trim().is_empty()).count();

        if changed == 0 {
            ui.success("Working tree clean");
        }
        Ok(CommandResult::success(format!(
            "on {}, {} changed file(s)",
            branch, changed
        )))
    }

    fn log(&self, count: usize, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self.git(ui, ["log", "--oneline", "-n", &count.to_string()])?;
        Self::print(ui, &output);
        Ok(CommandResult::success(format!(
            "{} commit(s)",
            output.stdout.lines().count()
        )))
    }

    fn branches(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self.git(ui, ["branch", "-a"])?;
        Self::print(ui, &output);
        let current = output
            .stdout
            .lines()
            .find_map(|l| l.strip_prefix("* "))
            .unwrap_or("detached")
            .to_string();
        Ok(CommandResult::success(format!(
            "{} branch(es), current {}",
            output.stdout.lines().count(),
            current
        )))
    }

    fn sync(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut spinner = ui.start_spinner("Pulling...");
        let pulled = self.git_unbounded(ui, ["pull", "--rebase"]);
        if pulled.is_err() {
            spinner.finish_error("Pull failed");
        }
        pulled?;

        spinner.set_message("Pushing...");
        let pushed = self.git_unbounded(ui, ["push"]);
        if pushed.is_err() {
            spinner.finish_error("Push failed");
        }
        pushed?;

        spinner.finish_success("Synced with remote");
        Ok(CommandResult::success("pulled and pushed"))
    }

    fn commit(&self, message: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.git_unbounded(ui, ["add", "-A"])?;
        let output = self.git_unbounded(ui, ["commit", "-m", message])?;
        let headline = output.stdout.lines().next().unwrap_or_default().to_string();
        ui.success(&headline);
        Ok(CommandResult::success(format!("committed '{}'", message)))
    }
}

impl Command for GitCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.command {
            GitSubcommand::Status => self.status(ui),
            GitSubcommand::Log { count } => self.log(*count, ui),
            GitSubcommand::Branches => self.branches(ui),
            GitSubcommand::Sync => self.sync(ui),
            GitSubcommand::Commit { message } => self.commit(message, ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::dispatcher::test_support::context;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn run(ctx: &CommandContext, command: GitSubcommand, ui: &mut MockUI) -> Result<CommandResult> {
        GitCommand::new(ctx, GitArgs { command }).execute(ui)
    }

    #[test]
    fn status_counts_changes_in_cwd() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::success(
            "## main...origin/main [ahead 1]\n M src/lib.rs\n?? notes.txt\n",
        ));
        let mut ui = MockUI::new();

        let result = run(&ctx, GitSubcommand::Status, &mut ui).unwrap();

        assert_eq!(result.summary, "on main, 2 changed file(s)");
        assert_eq!(
            runner.invocations()[0].cwd.as_deref(),
            Some(temp.path())
        );
    }

    #[test]
    fn clean_tree_is_reported() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::success("## main\n"));
        let mut ui = MockUI::new();

        run(&ctx, GitSubcommand::Status, &mut ui).unwrap();

        assert!(ui.has_success("Working tree clean"));
    }

    #[test]
    fn log_passes_count() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::success("abc123 first\ndef456 second\n"));
        let mut ui = MockUI::new();

        let result = run(&ctx, GitSubcommand::Log { count: 2 }, &mut ui).unwrap();

        assert_eq!(runner.invocations()[0].display(), "git log --oneline -n 2");
        assert_eq!(result.summary, "2 commit(s)");
    }

    #[test]
    fn branches_finds_current() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::success(
            "* main\n  feature\n  remotes/origin/main\n",
        ));
        let mut ui = MockUI::new();

        let result = run(&ctx, GitSubcommand::Branches, &mut ui).unwrap();

        assert_eq!(result.summary, "3 branch(es), current main");
    }

    #[test]
    fn sync_stops_when_pull_fails() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::failure(Some(1), "CONFLICT"));

        let err = run(&ctx, GitSubcommand::Sync, &mut MockUI::new()).unwrap_err();

        assert_eq!(err.exit_code(), 1);
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn sync_pulls_then_pushes() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);

        run(&ctx, GitSubcommand::Sync, &mut MockUI::new()).unwrap();

        let commands: Vec<String> = runner.invocations().iter().map(|i| i.display()).collect();
        assert_eq!(commands, ["git pull --rebase", "git push"]);
        assert!(runner.invocations().iter().all(|i| i.timeout.is_none()));
    }

    #[test]
    fn read_only_queries_are_bounded() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);

        run(&ctx, GitSubcommand::Branches, &mut MockUI::new()).unwrap();

        assert_eq!(
            runner.invocations()[0].timeout,
            Some(ctx.settings.commands.timeout())
        );
    }

    #[test]
    fn commit_stages_then_commits() {
        let temp = TempDir::new().unwrap();
        let (ctx, runner) = context(&temp);
        runner.push_output(CommandOutput::success(""));
        runner.push_output(CommandOutput::success("[main abc123] Fix typo\n"));
        let mut ui = MockUI::new();

        let result = run(
            &ctx,
            GitSubcommand::Commit {
                message: "Fix typo".to_string(),
            },
            &mut ui,
        )
        .unwrap();

        let commands: Vec<String> = runner.invocations().iter().map(|i| i.display()).collect();
        assert_eq!(commands, ["git add -A", "git commit -m 'Fix typo'"]);
        assert!(ui.has_success("[main abc123] Fix typo"));
        assert_eq!(result.summary, "committed 'Fix typo'");
    }
}
