//! Crate-wide constants.

/// Name of the primary build file inside a build context.
pub const DOCKERFILE: &str = "Dockerfile";

/// Number of hex characters of the Dockerfile digest used in image tags.
pub const TAG_HASH_PREFIX_LEN: usize = 12;

/// Namespace prepended to fixture ids when tagging images.
pub const DEFAULT_IMAGE_NAMESPACE: &str = "dockfix";

/// Bind address sentinel. Any other value in a descriptor is an explicit request.
pub const DEFAULT_BIND_IP: &str = "127.0.0.1";

/// Engine executable used when no override is configured.
pub const DEFAULT_DOCKER_PROGRAM: &str = "docker";

pub const DOCKER_PROGRAM_ENV: &str = "DOCKFIX_DOCKER";
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";
pub const NETWORK_ENV: &str = "DOCKER_FIXTURES_NETWORK";
pub const NO_CACHE_ENV: &str = "DOCKFIX_NO_CACHE";
pub const IMAGE_NAMESPACE_ENV: &str = "DOCKFIX_IMAGE_NAMESPACE";

/// Prefix for temporary build directories.
pub const BUILD_DIR_PREFIX: &str = "docker-build";
