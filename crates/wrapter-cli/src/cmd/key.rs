use crate::output::{print_fields, print_json};
use crate::session::Session;

pub fn run(session: &Session) -> anyhow::Result<()> {
    let cfg = session.load_config()?;
    let ctx = session.derive(&cfg)?;

    if session.json {
        return print_json(&ctx);
    }

    let bucket = cfg.state_bucket();
    print_fields(&[
        ("State key", ctx.state_key.as_str()),
        ("Bucket", bucket.as_str()),
        ("Account", ctx.account_id.as_str()),
        ("Environment", ctx.environment.as_str()),
        ("Region", ctx.region.as_str()),
    ]);
    Ok(())
}
