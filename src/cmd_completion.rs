use anyhow::Result;
use clap::{App, IntoApp, Parser};
use clap_complete::{generate, Shell};

/// Generate shell completion scripts.
///
/// If you need to set up completions manually, follow the instructions below.
/// The exact config file locations might vary based on your system. Make sure
/// to restart your shell before testing whether completions are working.
///
/// ### bash
///
/// First, ensure that you install `bash-completion` using your package manager.
///
/// After, add this to your `~/.bash_profile`:
///
///         eval "$(rds-snapshot completion -s bash)"
///
/// ### zsh
/// Generate a `_rds-snapshot` completion script and put it somewhere in your `$fpath`:
///
///         rds-snapshot completion -s zsh > /usr/local/share/zsh/site-functions/_rds-snapshot
///
/// Ensure that the following is present in your `~/.zshrc`:
///         autoload -U compinit
///         compinit -i
///
/// Zsh version 5.7 or later is recommended.
///
/// ### fish
///
/// Generate a `rds-snapshot.fish` completion script:
///
///         rds-snapshot completion -s fish > ~/.config/fish/completions/rds-snapshot.fish
///
/// ### PowerShell
///
/// Open your profile script with:
///
///         mkdir -Path (Split-Path -Parent $profile) -ErrorAction SilentlyContinue
///         notepad $profile
///
/// Add the line and save the file:
///
/// Invoke-Expression -Command $(rds-snapshot completion -s powershell | Out-String)
#[derive(Parser, Debug, Clone)]
#[clap(verbatim_doc_comment)]
pub struct CmdCompletion {
    /// Shell type: {bash|zsh|fish|powershell}
    #[clap(short, long, default_value = "bash")]
    pub shell: Shell,
}

#[async_trait::async_trait]
impl crate::cmd::Command for CmdCompletion {
    async fn run(&self, ctx: &mut crate::context::Context) -> Result<()> {
        // Convert our opts into a clap app.
        let mut app: App = crate::Opts::into_app();
        let name = app.get_name().to_string();
        // Generate the completion script.
        generate(self.shell, &mut app, name, &mut ctx.io.out);

        Ok(())
    }
}
