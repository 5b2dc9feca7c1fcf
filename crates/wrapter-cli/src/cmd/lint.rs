use crate::session::Session;
use wrapter_core::requirements::{TFLINT, TOFU};

pub fn run(session: &Session) -> anyhow::Result<()> {
    session.require(&[TOFU, TFLINT])?;
    super::for_each_dir(session, "linting", |tc, dir| tc.lint(dir))
}
