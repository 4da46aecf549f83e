//! Conversion of validated lifecycle rules into SDK request types

use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, ExpirationStatus, LifecycleExpiration,
    LifecycleRule as SdkLifecycleRule, LifecycleRuleAndOperator, LifecycleRuleFilter,
    NoncurrentVersionExpiration, NoncurrentVersionTransition as SdkNoncurrentVersionTransition,
    Tag as SdkTag, Transition as SdkTransition, TransitionStorageClass,
};

use s3ops_core::{Error, LifecycleFilter, LifecycleRule, Result, RuleStatus, Tag};

/// Wrap a single rule in a bucket lifecycle configuration
pub(crate) fn to_configuration(rule: &LifecycleRule) -> Result<BucketLifecycleConfiguration> {
    BucketLifecycleConfiguration::builder()
        .rules(to_sdk_rule(rule)?)
        .build()
        .map_err(|e| Error::General(format!("Invalid lifecycle configuration: {e}")))
}

pub(crate) fn to_sdk_rule(rule: &LifecycleRule) -> Result<SdkLifecycleRule> {
    let status = match rule.status {
        RuleStatus::Enabled => ExpirationStatus::Enabled,
        RuleStatus::Disabled => ExpirationStatus::Disabled,
    };

    let mut builder = SdkLifecycleRule::builder()
        .id(&rule.id)
        .status(status)
        .filter(to_sdk_filter(&rule.filter)?);

    if let Some(expiration) = &rule.expiration {
        builder = builder.expiration(
            LifecycleExpiration::builder()
                .set_days(expiration.days)
                .set_expired_object_delete_marker(expiration.expired_object_delete_marker)
                .build(),
        );
    }

    for transition in &rule.transitions {
        builder = builder.transitions(
            SdkTransition::builder()
                .days(transition.days)
                .storage_class(TransitionStorageClass::from(transition.storage_class.as_str()))
                .build(),
        );
    }

    if let Some(days) = rule.noncurrent_version_expiration_days {
        builder = builder.noncurrent_version_expiration(
            NoncurrentVersionExpiration::builder()
                .noncurrent_days(days)
                .build(),
        );
    }

    for transition in &rule.noncurrent_version_transitions {
        builder = builder.noncurrent_version_transitions(
            SdkNoncurrentVersionTransition::builder()
                .noncurrent_days(transition.noncurrent_days)
                .storage_class(TransitionStorageClass::from(transition.storage_class.as_str()))
                .build(),
        );
    }

    builder
        .build()
        .map_err(|e| Error::General(format!("Invalid lifecycle rule: {e}")))
}

fn to_sdk_filter(filter: &LifecycleFilter) -> Result<LifecycleRuleFilter> {
    let filter = match filter {
        LifecycleFilter::All => LifecycleRuleFilter::builder().build(),
        LifecycleFilter::Prefix(prefix) => LifecycleRuleFilter::builder().prefix(prefix).build(),
        LifecycleFilter::Tag(tag) => LifecycleRuleFilter::builder().tag(to_sdk_tag(tag)?).build(),
        LifecycleFilter::And { prefix, tags } => {
            let tags = tags.iter().map(to_sdk_tag).collect::<Result<Vec<_>>>()?;
            let and = LifecycleRuleAndOperator::builder()
                .set_prefix(prefix.clone())
                .set_tags(Some(tags))
                .build();
            LifecycleRuleFilter::builder().and(and).build()
        }
    };
    Ok(filter)
}

fn to_sdk_tag(tag: &Tag) -> Result<SdkTag> {
    SdkTag::builder()
        .key(&tag.key)
        .value(&tag.value)
        .build()
        .map_err(|e| Error::InvalidArgument(format!("Invalid tag '{}': {e}", tag.key)))
}
