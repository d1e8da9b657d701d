use std::process::Command;

use anyhow::bail;
use tracing::debug;

/// Environment variable gating [`try_drop_l3_cache`].
pub const DROP_CACHE_ENV: &str = "CUDF_BENCHMARK_DROP_CACHE";

/// Evicts the OS cache before a cold-read benchmark iteration, if the
/// `CUDF_BENCHMARK_DROP_CACHE` environment variable is set.
///
/// Has no effect when the variable is unset. May require sudo access to run
/// successfully. When the variable is set and no drop command succeeds
/// (usually for lack of privileges) this is an error: a benchmark asked to
/// run cold must not silently run warm.
pub fn try_drop_l3_cache() -> anyhow::Result<()> {
    if std::env::var_os(DROP_CACHE_ENV).is_none() {
        return Ok(());
    }

    for cmd in [
        "/sbin/sysctl vm.drop_caches=3",
        "sudo /sbin/sysctl vm.drop_caches=3",
    ] {
        let dropped = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if dropped {
            return Ok(());
        }
        debug!("cache drop command failed: {cmd}");
    }

    bail!("{DROP_CACHE_ENV} is set but no cache drop command succeeded");
}
