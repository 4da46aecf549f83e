//! lifecycle command - Set a bucket lifecycle rule
//!
//! Replaces the bucket's lifecycle configuration with the single rule
//! described by the flags.

use clap::Args;
use s3ops_core::{
    BucketManager, LifecycleOptions, LifecycleRule, NoncurrentVersionTransition, RuleStatus, Tag,
    Transition,
};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Set a lifecycle rule on a bucket
#[derive(Args, Debug)]
pub struct LifecycleArgs {
    /// Bucket name
    pub bucket: String,

    /// Rule identifier
    #[arg(long, default_value = s3ops_core::lifecycle::DEFAULT_RULE_ID)]
    pub rule_id: String,

    /// Rule status (Enabled or Disabled)
    #[arg(long, default_value = "Enabled")]
    pub status: RuleStatus,

    /// Only apply to keys with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Only apply to objects carrying this tag (key=value, repeatable)
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<Tag>,

    /// Expire current versions after this many days
    #[arg(long)]
    pub expiration_days: Option<i32>,

    /// Remove delete markers that have no noncurrent versions left
    #[arg(long)]
    pub expired_object_delete_marker: bool,

    /// Transition current versions (DAYS:CLASS, repeatable)
    #[arg(long = "transition", value_name = "DAYS:CLASS")]
    pub transitions: Vec<Transition>,

    /// Expire noncurrent versions after this many days
    #[arg(long)]
    pub noncurrent_expiration_days: Option<i32>,

    /// Transition noncurrent versions (DAYS:CLASS, repeatable)
    #[arg(long = "noncurrent-transition", value_name = "DAYS:CLASS")]
    pub noncurrent_transitions: Vec<NoncurrentVersionTransition>,
}

impl LifecycleArgs {
    fn to_options(&self) -> LifecycleOptions {
        LifecycleOptions {
            rule_id: Some(self.rule_id.clone()),
            status: Some(self.status),
            prefix: self.prefix.clone(),
            tags: self.tags.clone(),
            expiration_days: self.expiration_days,
            expired_object_delete_marker: self.expired_object_delete_marker.then_some(true),
            transitions: self.transitions.clone(),
            noncurrent_version_expiration_days: self.noncurrent_expiration_days,
            noncurrent_version_transitions: self.noncurrent_transitions.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LifecycleOutput {
    status: &'static str,
    bucket: String,
    rule: LifecycleRule,
}

/// Execute the lifecycle command
pub async fn execute(args: LifecycleArgs, ctx: &Context) -> ExitCode {
    let options = args.to_options();

    // Validate before connecting so usage errors never touch the network
    let rule = match options.build() {
        Ok(rule) => rule,
        Err(e) => return ctx.fail("Invalid lifecycle rule", &e),
    };

    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    if let Err(e) = BucketManager::new(resource)
        .set_lifecycle_policy(&args.bucket, &options)
        .await
    {
        return ctx.fail(
            &format!("Failed to set lifecycle policy on '{}'", args.bucket),
            &e,
        );
    }

    if ctx.formatter.is_json() {
        ctx.formatter.json(&LifecycleOutput {
            status: "success",
            bucket: args.bucket,
            rule,
        });
    } else {
        ctx.formatter.success(&format!(
            "Lifecycle rule '{}' ({}) set on bucket '{}'.",
            rule.id, rule.status, args.bucket
        ));
    }
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    use s3ops_core::LifecycleFilter;

    fn parse(args: &[&str]) -> LifecycleArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Lifecycle(args) => args,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_prefix_and_expiration() {
        let args = parse(&[
            "s3ops",
            "lifecycle",
            "logs",
            "--prefix",
            "tmp/",
            "--expiration-days",
            "7",
        ]);
        let rule = args.to_options().build().unwrap();
        assert_eq!(rule.id, "DefaultRule");
        assert_eq!(rule.status, RuleStatus::Enabled);
        assert_eq!(rule.filter, LifecycleFilter::Prefix("tmp/".into()));
        assert_eq!(rule.expiration.and_then(|e| e.days), Some(7));
    }

    #[test]
    fn test_repeated_tags_and_transitions() {
        let args = parse(&[
            "s3ops",
            "lifecycle",
            "data",
            "--rule-id",
            "archive",
            "--status",
            "disabled",
            "--tag",
            "team=ml",
            "--tag",
            "tier=cold",
            "--transition",
            "30:STANDARD_IA",
            "--transition",
            "90:GLACIER",
        ]);
        let rule = args.to_options().build().unwrap();
        assert_eq!(rule.id, "archive");
        assert_eq!(rule.status, RuleStatus::Disabled);
        assert!(matches!(rule.filter, LifecycleFilter::And { prefix: None, ref tags } if tags.len() == 2));
        assert_eq!(rule.transitions.len(), 2);
        assert_eq!(rule.transitions[1].storage_class, "GLACIER");
    }

    #[test]
    fn test_noncurrent_flags() {
        let args = parse(&[
            "s3ops",
            "lifecycle",
            "data",
            "--noncurrent-expiration-days",
            "60",
            "--noncurrent-transition",
            "30:GLACIER",
        ]);
        let rule = args.to_options().build().unwrap();
        assert_eq!(rule.noncurrent_version_expiration_days, Some(60));
        assert_eq!(rule.noncurrent_version_transitions[0].noncurrent_days, 30);
        assert!(rule.filter.is_empty());
    }

    #[test]
    fn test_rule_without_action_is_rejected() {
        let args = parse(&["s3ops", "lifecycle", "data", "--prefix", "x/"]);
        assert!(args.to_options().build().is_err());
    }

    #[test]
    fn test_malformed_values_rejected_by_parser() {
        assert!(Cli::try_parse_from(["s3ops", "lifecycle", "b", "--tag", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["s3ops", "lifecycle", "b", "--transition", "GLACIER"]).is_err());
    }
}
