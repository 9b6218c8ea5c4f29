use std::path::PathBuf;

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub theme: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("KALENDER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("praxiskalender")
            });

        let db_path = data_dir.join("praxis.db");

        let theme = std::env::var("KALENDER_THEME").unwrap_or_else(|_| "dark".to_string());

        Self {
            data_dir,
            db_path,
            theme,
        }
    }
}
