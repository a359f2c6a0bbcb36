// Version metadata for `forensics-iam --version`.
fn main() -> shadow_rs::SdResult<()> {
    println!("cargo:rerun-if-changed=build.rs");
    shadow_rs::ShadowBuilder::builder().build()?;
    Ok(())
}
