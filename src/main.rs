//! Manage AWS RDS database snapshots from the command line.
#![deny(missing_docs)]

// Always export the cmd_* modules as public so that it tells us when we are
// missing docs.

mod cmd;
/// The completion command.
pub mod cmd_completion;
/// The snapshot command.
pub mod cmd_snapshot;
mod config;
mod context;
mod iostreams;
mod provider;
mod rds;
mod reconcile;

use clap::Parser;

/// Manage RDS database snapshots.
///
/// Environment variables that can be used with rds-snapshot.
///
/// AWS_ACCESS_KEY_ID, AWS_ACCESS_KEY (in order of precedence): the AWS access
/// key used to sign control-plane requests when --aws-access-key is not given.
///
/// AWS_SECRET_ACCESS_KEY, AWS_SECRET_KEY (in order of precedence): the AWS
/// secret key used to sign control-plane requests when --aws-secret-key is not
/// given.
///
/// AWS_REGION, EC2_REGION (in order of precedence): the region for commands
/// that do not pass --region.
///
/// DEBUG: set to any value to enable verbose output to standard error.
///
/// NO_COLOR: set to any value to avoid printing ANSI escape sequences for
/// color output.
///
/// CLICOLOR: set to "0" to disable printing ANSI colors in output.
///
/// CLICOLOR_FORCE: set to a value other than "0" to keep ANSI colors in output
/// even when the output is piped.
#[derive(Parser, Debug, Clone)]
#[clap(version = clap::crate_version!(), author = clap::crate_authors!("\n"))]
struct Opts {
    /// Print debug info
    #[clap(short, long, global = true, env)]
    debug: bool,

    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser, Debug, Clone)]
enum SubCommand {
    Completion(cmd_completion::CmdCompletion),
    Snapshot(cmd_snapshot::CmdSnapshot),
}

#[tokio::main]
async fn main() {
    // Parse the command line arguments.
    let opts: Opts = Opts::parse();

    let mut ctx = context::Context::new(opts.debug);

    match opts.subcmd {
        SubCommand::Completion(cmd) => run_cmd(&cmd, &mut ctx).await,
        SubCommand::Snapshot(cmd) => run_cmd(&cmd, &mut ctx).await,
    }
}

async fn run_cmd(cmd: &impl crate::cmd::Command, ctx: &mut context::Context) {
    if let Err(err) = cmd.run(ctx).await {
        // Failures follow the same JSON contract as successes so callers can
        // always parse standard output.
        let failure = serde_json::json!({ "failed": true, "msg": err.to_string() });
        ctx.io.write_json(&failure).unwrap();
        std::process::exit(1);
    }
}
