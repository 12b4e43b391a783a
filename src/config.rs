use std::env;

use thiserror::Error;

const AWS_REGION: &str = "AWS_REGION";
const EC2_REGION: &str = "EC2_REGION";
const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";

/// Region and credentials for talking to the AWS control plane, resolved once
/// before any command logic runs.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("region not specified and unable to determine region from AWS_REGION or EC2_REGION")]
    MissingRegion,
    #[error("AWS credentials not specified and unable to determine them from AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY")]
    MissingCredentials,
}

impl AwsConfig {
    // Resolution precedence
    // 1. explicit flag
    // 2. environment
    pub fn resolve(
        region: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
    ) -> Result<AwsConfig, ConfigError> {
        let region =
            first_non_empty(region, &[AWS_REGION, EC2_REGION]).ok_or(ConfigError::MissingRegion)?;
        let access_key = first_non_empty(access_key, &[AWS_ACCESS_KEY_ID, AWS_ACCESS_KEY])
            .ok_or(ConfigError::MissingCredentials)?;
        let secret_key = first_non_empty(secret_key, &[AWS_SECRET_ACCESS_KEY, AWS_SECRET_KEY])
            .ok_or(ConfigError::MissingCredentials)?;

        Ok(AwsConfig {
            region,
            access_key,
            secret_key,
        })
    }
}

fn first_non_empty(explicit: Option<&str>, env_keys: &[&str]) -> Option<String> {
    if let Some(value) = explicit {
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    for key in env_keys {
        let value = get_env_var(key);
        if !value.is_empty() {
            return Some(value);
        }
    }

    None
}

pub fn get_env_var(key: &str) -> String {
    match env::var(key) {
        Ok(val) => val,
        Err(_) => "".to_string(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;

    fn clear_aws_env() {
        for key in [
            AWS_REGION,
            EC2_REGION,
            AWS_ACCESS_KEY_ID,
            AWS_ACCESS_KEY,
            AWS_SECRET_ACCESS_KEY,
            AWS_SECRET_KEY,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_explicit_flags_win_over_environment() {
        clear_aws_env();
        env::set_var(AWS_REGION, "eu-west-1");
        env::set_var(AWS_ACCESS_KEY_ID, "AKIDENV");
        env::set_var(AWS_SECRET_ACCESS_KEY, "env-secret");

        let config =
            AwsConfig::resolve(Some("us-east-1"), Some("AKIDFLAG"), Some("flag-secret")).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.access_key, "AKIDFLAG");
        assert_eq!(config.secret_key, "flag-secret");
    }

    #[test]
    #[serial]
    fn test_environment_fallback_order() {
        clear_aws_env();
        env::set_var(EC2_REGION, "ap-southeast-2");
        env::set_var(AWS_ACCESS_KEY, "AKIDOLD");
        env::set_var(AWS_SECRET_KEY, "old-secret");

        let config = AwsConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.region, "ap-southeast-2");
        assert_eq!(config.access_key, "AKIDOLD");
        assert_eq!(config.secret_key, "old-secret");

        // The modern variable names take precedence over the legacy ones.
        env::set_var(AWS_REGION, "us-west-2");
        env::set_var(AWS_ACCESS_KEY_ID, "AKIDNEW");
        env::set_var(AWS_SECRET_ACCESS_KEY, "new-secret");

        let config = AwsConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.access_key, "AKIDNEW");
        assert_eq!(config.secret_key, "new-secret");

        clear_aws_env();
    }

    #[test]
    #[serial]
    fn test_missing_region() {
        clear_aws_env();

        let err = AwsConfig::resolve(None, Some("AKID"), Some("secret")).unwrap_err();
        assert!(err.to_string().starts_with("region not specified"), "{}", err);
    }

    #[test]
    #[serial]
    fn test_missing_credentials() {
        clear_aws_env();

        let err = AwsConfig::resolve(Some("us-east-1"), None, None).unwrap_err();
        assert!(err.to_string().contains("credentials not specified"), "{}", err);

        // An empty flag does not count as supplied.
        let err = AwsConfig::resolve(Some("us-east-1"), Some(""), Some("")).unwrap_err();
        assert!(err.to_string().contains("credentials not specified"), "{}", err);
    }
}
