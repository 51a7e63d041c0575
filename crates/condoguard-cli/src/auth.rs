//! Access level for an invocation
//!
//! A single shared admin password unlocks write commands. Without a
//! password the register is read-only.

use anyhow::{bail, Result};
use tracing::{info, warn};

use condoguard_core::{AccessLevel, Config};

/// Environment variable read when `--password` is not given
pub const PASSWORD_ENV: &str = "CONDOGUARD_PASSWORD";

/// Password from the flag, falling back to the environment
pub fn supplied_password(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
}

/// Resolve the access level for a supplied password
///
/// No password means VIEWER. A wrong password is refused rather than
/// silently downgraded.
pub fn resolve(config: &Config, password: Option<&str>) -> Result<AccessLevel> {
    match password {
        None => Ok(AccessLevel::Viewer),
        Some(p) if p == config.admin_password => {
            info!("Admin access granted");
            Ok(AccessLevel::Admin)
        }
        Some(_) => {
            warn!("Rejected admin password");
            bail!("Incorrect password. Omit --password for read-only access.")
        }
    }
}

/// Fail unless `access` allows writes
pub fn require_admin(access: AccessLevel, action: &str) -> Result<()> {
    if access.is_admin() {
        return Ok(());
    }
    bail!(
        "Permission denied: {} requires admin access.\n\
         Pass --password or set {}.",
        action,
        PASSWORD_ENV
    )
}
