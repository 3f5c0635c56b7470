//! End-to-end tests over the on-disk fixtures in `test_data/`.

mod loading;
mod patterns;
mod round_trip;
mod vars;

#[cfg(test)]
pub(crate) fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(name)
}
