use crate::session::Session;
use wrapter_core::requirements::{TFLINT, TOFU};

/// Any non-empty value tolerates validation failures.
pub const ALLOW_FAIL_ENV: &str = "ALLOW_FAIL_VALIDATION";

pub fn run(session: &Session, allow_fail: bool) -> anyhow::Result<()> {
    session.require(&[TOFU, TFLINT])?;
    let allow_fail =
        allow_fail || std::env::var_os(ALLOW_FAIL_ENV).is_some_and(|v| !v.is_empty());

    let toolchain = session.toolchain();
    let dirs = session.dirs()?;
    let mut failed = 0usize;
    for dir in &dirs {
        tracing::info!(dir = %dir.display(), "validating");
        match toolchain.validate(dir) {
            Ok(()) => {}
            Err(e) if allow_fail => {
                tracing::warn!(dir = %dir.display(), error = %e, "validation failed");
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if failed > 0 {
        println!(
            "Validation failed in {failed} of {} directories (tolerated)",
            dirs.len()
        );
    }
    Ok(())
}
