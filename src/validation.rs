//! Input validators shared by the provisioning saga and callers.
//!
//! All functions are pure; none of them talk to the control plane.

use crate::Error;

/// Maximum length of a cluster name.
pub const MAX_CLUSTER_NAME_LENGTH: usize = 15;

const OPENSHIFT_VERSION_PREFIX: &str = "openshift-v";

/// Returns `true` if `key` can identify a cluster by ID or name.
///
/// Keys are interpolated into search queries, so only ASCII letters,
/// digits, `_` and `-` are accepted.
pub fn is_valid_cluster_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Returns `true` if `name` is a DNS-1035 label of at most 15 characters.
///
/// The name starts with a lowercase letter, ends with a lowercase letter or
/// digit, and contains only lowercase letters, digits and `-`.
pub fn is_valid_cluster_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    bytes.len() <= MAX_CLUSTER_NAME_LENGTH
        && first.is_ascii_lowercase()
        && (last.is_ascii_lowercase() || last.is_ascii_digit())
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Returns `true` if `username` is acceptable as an identity provider user.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && !matches!(username, "~" | "." | "..")
        && !username.contains([':', '/', '%'])
}

/// Returns the `major.minor` part of an OpenShift version.
///
/// Accepts raw IDs like `openshift-v4.10.3` as well as plain versions.
///
/// ```
/// use ocm_control::validation::version_minor;
///
/// assert_eq!(version_minor("openshift-v4.10.3"), "4.10");
/// assert_eq!(version_minor("4.9"), "4.9");
/// ```
pub fn version_minor(version: &str) -> String {
    let raw = version
        .strip_prefix(OPENSHIFT_VERSION_PREFIX)
        .unwrap_or(version);
    raw.splitn(3, '.').take(2).collect::<Vec<_>>().join(".")
}

fn parse_version(version: &str) -> Result<semver::Version, Error> {
    let raw = version
        .strip_prefix(OPENSHIFT_VERSION_PREFIX)
        .or_else(|| version.strip_prefix('v'))
        .unwrap_or(version);
    let end = raw.find(['-', '+']).unwrap_or(raw.len());
    let (core, suffix) = raw.split_at(end);
    let padding = match core.split('.').count() {
        1 => ".0.0",
        2 => ".0",
        _ => "",
    };

    semver::Version::parse(&format!("{}{}{}", core, padding, suffix)).map_err(|err| {
        Error::invalid_argument(format!("invalid version '{}': {}", version, err))
    })
}

/// Returns `true` if the cluster version is at least the operator's minimum.
///
/// Full semantic versions are compared. Missing minor or patch components
/// count as zero, so `4` reads as `4.0.0`, and a pre-release sorts before
/// its release.
pub fn check_supported_version(cluster_version: &str, operator_version: &str) -> Result<bool, Error> {
    Ok(parse_version(cluster_version)? >= parse_version(operator_version)?)
}

/// Checks the number of subnets supplied for a cluster.
///
/// PrivateLink clusters take one private subnet per zone (1 or 3). Other
/// BYO-VPC clusters take a private and a public subnet per zone (2 or 6).
pub fn validate_subnets_count(multi_az: bool, private_link: bool, count: usize) -> Result<(), Error> {
    let zones = if multi_az { 3 } else { 1 };
    let (expected, kind) = if private_link {
        (zones, "private")
    } else {
        (zones * 2, "private and public")
    };
    if count == expected {
        return Ok(());
    }
    let topology = if multi_az { "multi-AZ" } else { "single-AZ" };
    Err(Error::invalid_argument(format!(
        "{} cluster requires {} {} subnet(s), got {}",
        topology, expected, kind, count
    )))
}

/// Checks the number of availability zones supplied for a cluster.
pub fn validate_availability_zones_count(multi_az: bool, count: usize) -> Result<(), Error> {
    let expected = if multi_az { 3 } else { 1 };
    if count == expected {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "the number of availability zones for a {} cluster should be {}, instead received: {}",
            if multi_az { "multi AZ" } else { "single AZ" },
            expected,
            count
        )))
    }
}
