use crate::config::types::{AccountConfig, ApiConfig, CollectorConfig, Config, JobEntry, OutputConfig};
use crate::strategy::FOLLOWER_MAX_PAGE_SIZE;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_accounts(&config.accounts)?;
    validate_collector_config(&config.collector, config.accounts.len())?;
    validate_output_config(&config.output)?;
    validate_jobs(&config.jobs)?;
    Ok(())
}

fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_accounts(accounts: &[AccountConfig]) -> Result<(), ConfigError> {
    if accounts.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[accounts]] entry is required".to_string(),
        ));
    }

    for (index, account) in accounts.iter().enumerate() {
        let fields = [
            ("consumer-key", &account.consumer_key),
            ("consumer-secret", &account.consumer_secret),
            ("access-token", &account.access_token),
            ("access-token-secret", &account.access_token_secret),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "accounts[{}].{} cannot be empty",
                    index, name
                )));
            }
        }
    }

    Ok(())
}

fn validate_collector_config(config: &CollectorConfig, accounts: usize) -> Result<(), ConfigError> {
    if config.account >= accounts {
        return Err(ConfigError::Validation(format!(
            "collector.account is {} but only {} account(s) are configured",
            config.account, accounts
        )));
    }

    if config.total == Some(0) {
        return Err(ConfigError::Validation(
            "collector.total must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.jsonl_dir.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "jsonl-dir cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_jobs(jobs: &[JobEntry]) -> Result<(), ConfigError> {
    for job in jobs {
        match job {
            JobEntry::Search(search) => {
                if search.keyword.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "search keyword cannot be empty".to_string(),
                    ));
                }
            }
            JobEntry::UserTimeline(timeline) => validate_screen_name(&timeline.screen_name)?,
            JobEntry::FollowerList(followers) => {
                validate_screen_name(&followers.screen_name)?;
                if followers.count == 0 || followers.count > FOLLOWER_MAX_PAGE_SIZE {
                    return Err(ConfigError::Validation(format!(
                        "follower-list count must be between 1 and {}, got {}",
                        FOLLOWER_MAX_PAGE_SIZE, followers.count
                    )));
                }
            }
        }

        if job.collection_name().trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} job has an empty collection name",
                job.mode()
            )));
        }
    }

    Ok(())
}

/// Screen names are 1-15 characters of letters, digits and underscores
fn validate_screen_name(name: &str) -> Result<(), ConfigError> {
    let name = name.strip_prefix('@').unwrap_or(name);

    if name.is_empty() || name.len() > 15 {
        return Err(ConfigError::Validation(format!(
            "screen-name '{}' must be 1-15 characters",
            name
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Validation(format!(
            "screen-name '{}' may only contain letters, digits and underscores",
            name
        )));
    }

    Ok(())
}
