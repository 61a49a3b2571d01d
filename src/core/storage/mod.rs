//! Acesso ao armazenamento removível.
//!
//! O firmware só lê e sobrescreve arquivos inteiros num único diretório,
//! então é só isso que a camada oferece. `DirStorage` mapeia os arquivos
//! num diretório do host (ponto de montagem do cartão SD); `MemStorage`
//! guarda tudo em RAM e pode simular falhas do dispositivo.

pub mod save_store;

pub use save_store::{CorruptKind, LoadedSlot, SaveStore, SlotError, SlotFlags};

use log::{debug, trace};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Erros da camada de armazenamento
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("erro de E/S: {0}")]
    Io(#[from] io::Error),
    #[error("nome de arquivo inválido {0:?}")]
    InvalidName(String),
    #[error("dispositivo cheio ({needed} bytes necessários, {available} disponíveis)")]
    DeviceFull { needed: usize, available: usize },
}

/// Resultado das operações de armazenamento
pub type StorageResult<T> = Result<T, StorageError>;

/// Armazenamento plano de arquivos inteiros
pub trait Storage {
    /// Lê o arquivo inteiro; `Ok(None)` se não existir
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Substitui o arquivo inteiro por `data`
    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()>;

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.read(name)?.is_some())
    }
}

/// Rejeita nomes que sairiam do diretório de saves
pub fn validate_name(name: &str) -> StorageResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Arquivos num diretório do host
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl Storage for DirStorage {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_of(name)?;
        match fs::read(&path) {
            Ok(data) => {
                trace!("Lido {} ({} bytes)", path.display(), data.len());
                Ok(Some(data))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.path_of(name)?;
        let mut file = File::create(&path)?;
        file.write_all(data)?;
        // O cartão pode ser removido logo após o commit
        file.sync_all()?;
        debug!("Gravado {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.path_of(name)?.is_file())
    }
}

/// Arquivos em RAM, com limite de capacidade e injeção de falhas de escrita
#[derive(Debug, Clone, Default)]
pub struct MemStorage {
    files: HashMap<String, Vec<u8>>,
    capacity: Option<usize>,
    fail_writes: bool,
    writes: usize,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limita o total de bytes armazenados
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Faz toda escrita seguinte falhar com erro de E/S
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Escritas bem-sucedidas até agora
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Grava direto, sem injeção de falhas nem contadores
    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_string(), data);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    fn used_bytes_excluding(&self, name: &str) -> usize {
        self.files
            .iter()
            .filter(|(n, _)| n.as_str() != name)
            .map(|(_, d)| d.len())
            .sum()
    }
}

impl Storage for MemStorage {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_name(name)?;
        Ok(self.files.get(name).cloned())
    }

    fn write(&mut self, name: &str, data: &[u8]) -> StorageResult<()> {
        validate_name(name)?;
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "falha de escrita simulada").into());
        }
        if let Some(capacity) = self.capacity {
            let available = capacity.saturating_sub(self.used_bytes_excluding(name));
            if data.len() > available {
                return Err(StorageError::DeviceFull {
                    needed: data.len(),
                    available,
                });
            }
        }
        self.files.insert(name.to_string(), data.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_name(name)?;
        Ok(self.files.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Zelda.srm").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("saves/zelda.srm").is_err());
        assert!(validate_name("..\\boot.bin").is_err());
    }

    #[test]
    fn test_mem_storage_read_write() {
        let mut storage = MemStorage::new();
        assert!(storage.read("a.srm").unwrap().is_none());
        assert!(!storage.exists("a.srm").unwrap());

        storage.write("a.srm", &[1, 2, 3]).unwrap();
        assert_eq!(storage.read("a.srm").unwrap(), Some(vec![1, 2, 3]));
        assert!(storage.exists("a.srm").unwrap());
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_mem_storage_fault_injection() {
        let mut storage = MemStorage::new();
        storage.set_fail_writes(true);
        assert!(matches!(storage.write("a.srm", &[0]), Err(StorageError::Io(_))));
        assert_eq!(storage.write_count(), 0);

        storage.set_fail_writes(false);
        assert!(storage.write("a.srm", &[0]).is_ok());
    }

    #[test]
    fn test_mem_storage_capacity() {
        let mut storage = MemStorage::with_capacity_limit(1024);
        storage.write("a.srm", &[0; 1000]).unwrap();
        assert!(matches!(
            storage.write("b.srm", &[0; 100]),
            Err(StorageError::DeviceFull { needed: 100, available: 24 })
        ));
        // Sobrescrever o mesmo arquivo reaproveita o espaço
        storage.write("a.srm", &[1; 1024]).unwrap();
    }
}
