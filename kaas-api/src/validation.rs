///! Request validation and normalization
///! Turns request bodies into provisioning intents before any cluster call

use crate::provisioning::spec::{AppSpec, DatabaseServiceSpec, EnvironmentVariable, ResourceRequests};
use kaas_common::{CreateApplicationRequest, CreateDatabaseServiceRequest, EnvVar, Error};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// The name doubles as the Service name, so it must be an RFC 1035 label
pub const MAX_NAME_LENGTH: usize = 63;

/// Longest name that still leaves room for the `-health-probe` suffix
/// within the 52 characters allowed for CronJob names
pub const MAX_MONITORED_NAME_LENGTH: usize = 52 - "-health-probe".len();

/// Regex patterns for validation
static WORKLOAD_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").unwrap()
});

static HOSTNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static ENV_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-._a-zA-Z][-._a-zA-Z0-9]*$").unwrap()
});

/// Validation result type
pub type ValidationResult<T> = Result<T, Error>;

/// Workload name validation
pub fn validate_workload_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(Error::Validation("AppName cannot be empty".to_string()));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::Validation(
            format!("AppName too long (max {} characters)", MAX_NAME_LENGTH)
        ));
    }

    if !WORKLOAD_NAME_REGEX.is_match(name) {
        return Err(Error::Validation(format!(
            "AppName '{}' must consist of lowercase alphanumeric characters or '-', start with a letter and end with an alphanumeric character",
            name
        )));
    }

    Ok(())
}

/// Port number validation
pub fn validate_port(port: i64) -> ValidationResult<i32> {
    const MIN_PORT: i64 = 1;
    const MAX_PORT: i64 = 65535;

    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(Error::Validation(
            format!("ServicePort must be between {} and {}", MIN_PORT, MAX_PORT)
        ));
    }

    Ok(port as i32)
}

/// Hostname validation
pub fn validate_hostname(hostname: &str) -> ValidationResult<()> {
    if hostname.is_empty() {
        return Err(Error::Validation("DomainAddress cannot be empty".to_string()));
    }

    if hostname.len() > 253 {
        return Err(Error::Validation(
            "DomainAddress too long (max 253 characters)".to_string()
        ));
    }

    if !HOSTNAME_REGEX.is_match(hostname) {
        return Err(Error::Validation(
            format!("Invalid DomainAddress '{}'", hostname)
        ));
    }

    Ok(())
}

/// Image repository and tag validation
pub fn validate_image(repository: &str, tag: &str) -> ValidationResult<String> {
    if repository.trim().is_empty() {
        return Err(Error::Validation("ImageAddress cannot be empty".to_string()));
    }

    if tag.trim().is_empty() {
        return Err(Error::Validation("ImageTag cannot be empty".to_string()));
    }

    if repository.chars().any(char::is_whitespace) || tag.chars().any(char::is_whitespace) {
        return Err(Error::Validation(
            "ImageAddress and ImageTag cannot contain whitespace".to_string()
        ));
    }

    Ok(format!("{}:{}", repository, tag))
}

/// Pull cpu and memory out of a free-form resource map.
///
/// Keys match case-insensitively; `ram` is accepted for memory.
pub fn extract_resources(resources: &BTreeMap<String, String>) -> ValidationResult<ResourceRequests> {
    let lookup = |keys: &[&str]| {
        resources
            .iter()
            .find(|(k, _)| keys.iter().any(|key| k.eq_ignore_ascii_case(key)))
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let cpu = lookup(&["cpu"])
        .ok_or_else(|| Error::Validation("Resources must include a 'cpu' entry".to_string()))?;
    let memory = lookup(&["memory", "ram"])
        .ok_or_else(|| Error::Validation("Resources must include a 'memory' entry".to_string()))?;

    Ok(ResourceRequests { cpu, memory })
}

/// Environment variable validation; keys must be non-empty and unique
pub fn validate_env_vars(envs: &[EnvVar]) -> ValidationResult<Vec<EnvironmentVariable>> {
    let mut seen = HashSet::new();

    envs.iter()
        .map(|env| {
            if env.key.is_empty() {
                return Err(Error::Validation("Environment variable Key cannot be empty".to_string()));
            }

            if !ENV_KEY_REGEX.is_match(&env.key) {
                return Err(Error::Validation(
                    format!("Invalid environment variable Key '{}'", env.key)
                ));
            }

            if !seen.insert(env.key.as_str()) {
                return Err(Error::Validation(
                    format!("Duplicate environment variable Key '{}'", env.key)
                ));
            }

            Ok(EnvironmentVariable {
                key: env.key.clone(),
                value: env.value.clone(),
                is_secret: env.is_secret,
            })
        })
        .collect()
}

/// Validate an application request and build its [`AppSpec`]
pub fn normalize_application(request: &CreateApplicationRequest) -> ValidationResult<AppSpec> {
    let name = request.app_name.trim();
    validate_workload_name(name)?;

    if request.monitoring && name.len() > MAX_MONITORED_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "AppName too long for monitoring (max {} characters)",
            MAX_MONITORED_NAME_LENGTH
        )));
    }

    if request.replicas < 1 {
        return Err(Error::Validation("Replicas must be at least 1".to_string()));
    }

    let image = validate_image(&request.image_address, &request.image_tag)?;
    let service_port = validate_port(request.service_port)?;

    let domain = match request.domain_address.as_deref().map(str::trim) {
        Some(domain) if !domain.is_empty() => {
            validate_hostname(domain)?;
            Some(domain.to_string())
        }
        _ => None,
    };

    Ok(AppSpec {
        name: name.to_string(),
        replicas: request.replicas,
        image,
        service_port,
        domain,
        resources: extract_resources(&request.resources)?,
        env: validate_env_vars(&request.envs)?,
        monitoring_enabled: request.monitoring,
    })
}

/// Validate a database service request and build its [`DatabaseServiceSpec`]
pub fn normalize_database_service(
    request: &CreateDatabaseServiceRequest,
) -> ValidationResult<DatabaseServiceSpec> {
    let name = request.app_name.trim();
    validate_workload_name(name)?;

    Ok(DatabaseServiceSpec {
        name: name.to_string(),
        resources: extract_resources(&request.resources)?,
        external_access: request.external,
    })
}
