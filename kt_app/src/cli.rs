use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Config file path from the first command-line argument
pub fn config_path() -> PathBuf {
    config_path_from(std::env::args(), DEFAULT_CONFIG_PATH)
}

/// `args` includes the program name, as `std::env::args` does
pub fn config_path_from<I>(args: I, default: &str) -> PathBuf
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().nth(1).filter(|arg| !arg.trim().is_empty()).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(default))
}
