use std::io::Write;

use anyhow::Result;
use clap::Parser;

use crate::reconcile::{reconcile, DesiredState, ReconcileRequest};

/// Ensure a database snapshot is present or absent.
///
/// With '--state present', the named snapshot is created as a copy of
/// '--source-snapshot' unless it already exists. An existing snapshot counts
/// as satisfied regardless of what it was originally copied from.
///
/// With '--state absent', the named snapshot is deleted if it exists.
///
/// The result is reported as JSON on standard output: '{"changed": bool}' on
/// success, '{"failed": true, "msg": ...}' on failure. The copy and delete
/// operations are asynchronous on the AWS side; this command does not wait for
/// them to complete.
#[derive(Parser, Debug, Clone)]
#[clap(verbatim_doc_comment)]
pub struct CmdSnapshot {
    /// The database snapshot identifier. Case-insensitive.
    #[clap(name = "name", default_value = "")]
    pub name: String,

    /// The state the snapshot should be reconciled to.
    #[clap(long, arg_enum)]
    pub state: DesiredState,

    /// Identifier of the source snapshot to copy. Required for
    /// '--state present' and not allowed for '--state absent'.
    #[clap(long = "source-snapshot")]
    pub source_snapshot: Option<String>,

    /// The AWS region to use. Falls back to AWS_REGION or EC2_REGION.
    #[clap(long)]
    pub region: Option<String>,

    /// AWS access key. Falls back to AWS_ACCESS_KEY_ID or AWS_ACCESS_KEY.
    #[clap(long = "aws-access-key")]
    pub aws_access_key: Option<String>,

    /// AWS secret key. Falls back to AWS_SECRET_ACCESS_KEY or AWS_SECRET_KEY.
    #[clap(long = "aws-secret-key")]
    pub aws_secret_key: Option<String>,
}

#[async_trait::async_trait]
impl crate::cmd::Command for CmdSnapshot {
    async fn run(&self, ctx: &mut crate::context::Context) -> Result<()> {
        let config = crate::config::AwsConfig::resolve(
            self.region.as_deref(),
            self.aws_access_key.as_deref(),
            self.aws_secret_key.as_deref(),
        )?;

        if ctx.debug {
            writeln!(ctx.io.err_out, "using region {}", config.region)?;
        }

        let client = crate::rds::RdsClient::new(&config);

        let request = ReconcileRequest {
            state: self.state,
            name: self.name.to_string(),
            source_snapshot: self.source_snapshot.clone(),
        };
        let outcome = reconcile(&request, &client).await?;

        ctx.io.write_json(&serde_json::json!(outcome))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use crate::cmd::Command;

    pub struct TestItem {
        name: String,
        cmd: crate::cmd_snapshot::CmdSnapshot,
        want_out: String,
        want_err: String,
    }

    /// Every case here fails during resolution or validation, before any
    /// request leaves the process.
    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    #[serial]
    async fn test_cmd_snapshot_validation() {
        for key in [
            "AWS_REGION",
            "EC2_REGION",
            "AWS_ACCESS_KEY_ID",
            "AWS_ACCESS_KEY",
            "AWS_SECRET_ACCESS_KEY",
            "AWS_SECRET_KEY",
        ] {
            std::env::remove_var(key);
        }

        let tests: Vec<TestItem> = vec![
            TestItem {
                name: "no region".to_string(),
                cmd: crate::cmd_snapshot::CmdSnapshot {
                    name: "my-rds-id".to_string(),
                    state: crate::reconcile::DesiredState::Absent,
                    source_snapshot: None,
                    region: None,
                    aws_access_key: Some("AKID".to_string()),
                    aws_secret_key: Some("secret".to_string()),
                },
                want_out: "".to_string(),
                want_err: "region not specified".to_string(),
            },
            TestItem {
                name: "no credentials".to_string(),
                cmd: crate::cmd_snapshot::CmdSnapshot {
                    name: "my-rds-id".to_string(),
                    state: crate::reconcile::DesiredState::Absent,
                    source_snapshot: None,
                    region: Some("us-east-1".to_string()),
                    aws_access_key: None,
                    aws_secret_key: None,
                },
                want_out: "".to_string(),
                want_err: "AWS credentials not specified".to_string(),
            },
            TestItem {
                name: "no name".to_string(),
                cmd: crate::cmd_snapshot::CmdSnapshot {
                    name: "".to_string(),
                    state: crate::reconcile::DesiredState::Absent,
                    source_snapshot: None,
                    region: Some("us-east-1".to_string()),
                    aws_access_key: Some("AKID".to_string()),
                    aws_secret_key: Some("secret".to_string()),
                },
                want_out: "".to_string(),
                want_err: "parameter name required".to_string(),
            },
            TestItem {
                name: "present without source".to_string(),
                cmd: crate::cmd_snapshot::CmdSnapshot {
                    name: "copy-of-my-rds".to_string(),
                    state: crate::reconcile::DesiredState::Present,
                    source_snapshot: None,
                    region: Some("us-east-1".to_string()),
                    aws_access_key: Some("AKID".to_string()),
                    aws_secret_key: Some("secret".to_string()),
                },
                want_out: "".to_string(),
                want_err: "parameter source_snapshot required for state=present".to_string(),
            },
            TestItem {
                name: "absent with source".to_string(),
                cmd: crate::cmd_snapshot::CmdSnapshot {
                    name: "my-rds-id".to_string(),
                    state: crate::reconcile::DesiredState::Absent,
                    source_snapshot: Some("my-rds-id".to_string()),
                    region: Some("us-east-1".to_string()),
                    aws_access_key: Some("AKID".to_string()),
                    aws_secret_key: Some("secret".to_string()),
                },
                want_out: "".to_string(),
                want_err: "parameter source_snapshot not allowed for state=absent".to_string(),
            },
        ];

        for t in tests {
            let (mut io, stdout_path, stderr_path) = crate::iostreams::IoStreams::test();
            // We need to also turn off the fancy terminal colors.
            // This ensures it also works in GitHub actions/any CI.
            io.set_color_enabled(false);
            let mut ctx = crate::context::Context { io, debug: false };

            match t.cmd.run(&mut ctx).await {
                Ok(()) => {
                    panic!("test {}: expected an error", t.name);
                }
                Err(err) => {
                    let stdout = std::fs::read_to_string(stdout_path).unwrap();
                    let stderr = std::fs::read_to_string(stderr_path).unwrap();
                    assert_eq!(stdout, t.want_out, "test {}", t.name);
                    if !err.to_string().contains(&t.want_err) {
                        assert_eq!(err.to_string(), t.want_err, "test {}: err mismatch", t.name);
                    }
                    assert!(stderr.is_empty(), "test {}: {}", t.name, stderr);
                }
            }
        }
    }
}
