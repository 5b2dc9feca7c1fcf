pub mod config;
pub mod create;
pub mod doc;
pub mod fmt;
pub mod init;
pub mod key;
pub mod lint;
pub mod lock;
pub mod plan;
pub mod validate;

use crate::session::Session;
use std::path::Path;
use wrapter_core::toolchain::Toolchain;

/// Run `op` in the working directory and every directory below it, in walk
/// order. The first failure stops the walk.
pub fn for_each_dir<F>(session: &Session, what: &str, mut op: F) -> anyhow::Result<()>
where
    F: FnMut(&Toolchain<'_>, &Path) -> wrapter_core::Result<()>,
{
    let toolchain = session.toolchain();
    for dir in session.dirs()? {
        tracing::info!(dir = %dir.display(), "{what}");
        op(&toolchain, &dir)?;
    }
    Ok(())
}
