use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    // git information is optional, e.g. for packaged sources
    let _ = EmitBuilder::builder()
        .git_branch()
        .git_sha(true)
        .fail_on_error()
        .quiet()
        .emit();
    Ok(())
}
