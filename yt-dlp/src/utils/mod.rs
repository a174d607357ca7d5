//! Small helpers shared by the fetcher.

/// Returns the file name of an executable on the current platform.
///
/// # Arguments
///
/// * `name` - The name of the executable, without extension.
pub fn find_executable(name: impl AsRef<str>) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", name.as_ref())
    } else {
        name.as_ref().to_string()
    }
}

/// Converts borrowed arguments into owned ones.
pub fn to_owned<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().map(|arg| arg.as_ref().to_string()).collect()
}
