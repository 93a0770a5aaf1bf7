fn main() -> anyhow::Result<()> {
    studypath_lib::run()?;
    Ok(())
}
