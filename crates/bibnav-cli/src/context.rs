use std::path::{Path, PathBuf};

use anyhow::Result;
use bibnav_runtime::config::resolve_data_dir;
use bibnav_runtime::{Config, RecordStore};
use once_cell::sync::OnceCell;

pub struct ExecutionContext {
    data_dir: PathBuf,
    config_path: PathBuf,
    database: Option<PathBuf>,
    config: OnceCell<Config>,
}

impl ExecutionContext {
    pub fn new(
        data_dir: Option<String>,
        config_path: Option<PathBuf>,
        database: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir.as_deref())?;
        let config_path = match config_path {
            Some(path) => path,
            None => Config::default_path()?,
        };

        Ok(Self {
            data_dir,
            config_path,
            database,
            config: OnceCell::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> Result<&Config> {
        self.config.get_or_try_init(|| {
            let config = Config::load_from(&self.config_path)?;
            config.validate()?;
            Ok(config)
        })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(self.config()?.database_path(&self.data_dir)),
        }
    }

    pub fn open_store(&self) -> Result<RecordStore> {
        let path = self.database_path()?;
        let options = self.config()?.store_options();
        Ok(RecordStore::open(path, options)?)
    }
}
