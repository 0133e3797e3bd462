use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb_uri: String,
    pub db_name: String,
    /// Directory banner image files are expected to live under.
    pub uploads_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let mongodb_uri =
            env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017/".to_string());
        let db_name = env::var("MONGO_DB_NAME").unwrap_or_else(|_| "dreamx".to_string());
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());

        Ok(Self {
            mongodb_uri,
            db_name,
            uploads_dir: PathBuf::from(uploads_dir),
        })
    }
}
