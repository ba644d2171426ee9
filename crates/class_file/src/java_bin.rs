use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{ClassFile, ClassFileError, Parser, Result};

/// An opened and fully decoded class file.
#[derive(Debug)]
pub struct JavaBin {
    path: PathBuf,
    class_file: ClassFile,
}
impl JavaBin {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening {}", path.display());
        let file = File::open(path)?;
        let class_file = Parser::new(file).parse()?;

        Ok(Self {
            path: path.to_owned(),
            class_file,
        })
    }

    pub fn close(self) {
        debug!("closing {}", self.path.display());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn class_file(&self) -> &ClassFile {
        &self.class_file
    }

    /// `"0xMAJOR 0xMINOR"`.
    pub fn version(&self) -> String {
        self.class_file.version()
    }

    pub fn constant_pool_count(&self) -> usize {
        self.class_file.constant_pool.len()
    }

    pub fn symbols_count(&self) -> usize {
        self.constant_pool_count()
    }

    pub fn entrypoint(&self) -> Result<u64> {
        Err(ClassFileError::NotAvailable("entrypoint"))
    }

    pub fn symbols(&self) -> Result<Vec<String>> {
        Err(ClassFileError::NotAvailable("symbols"))
    }
}
