use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "topsites")
}

/// Data directory (~/.local/share/topsites or platform equivalent),
/// falling back to the working directory when no home is known.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default config file location (~/.config/topsites/config.toml)
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("TopSites.db")
}

pub fn default_resource_dir() -> PathBuf {
    data_dir().join("resources")
}
