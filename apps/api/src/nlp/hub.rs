//! Model file resolution and one-time loading.

use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::Device;
use candle_nn::VarBuilder;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use tokenizers::Tokenizer;
use tracing::info;

use crate::nlp::{Entity, EntityRecognizer, ModelError, TextEmbedder};

/// The three files every BERT-style checkpoint needs.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Resolves model files from a local directory, or downloads them from the
    /// Hugging Face hub (cached under the standard hub cache directory).
    pub fn fetch(model_id: &str, revision: &str) -> Result<Self, ModelError> {
        let local = Path::new(model_id);
        if local.is_dir() {
            return Ok(Self {
                config: local.join("config.json"),
                tokenizer: local.join("tokenizer.json"),
                weights: local.join("model.safetensors"),
            });
        }

        let api = Api::new()?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        Ok(Self {
            config: repo.get("config.json")?,
            tokenizer: repo.get("tokenizer.json")?,
            weights: repo.get("model.safetensors")?,
        })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| ModelError::Config(format!("{}: {e}", path.display())))
}

pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, ModelError> {
    Tokenizer::from_file(path).map_err(|e| ModelError::Tokenizer(e.to_string()))
}

pub fn load_weights(path: &Path, device: &Device) -> Result<VarBuilder<'static>, ModelError> {
    // SAFETY: the safetensors file lives in the hub cache and is not modified
    // while mapped.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(
            &[path.to_path_buf()],
            candle_transformers::models::bert::DTYPE,
            device,
        )?
    };
    Ok(vb)
}

type Loader<M> = Box<dyn Fn() -> Result<M, ModelError> + Send + Sync>;

/// A model loaded on first use and kept for the life of the process.
///
/// Concurrent first callers block on the same initialization; a failed load
/// is not cached, so the next request retries it.
pub struct LazyModel<M> {
    name: String,
    loader: Loader<M>,
    cell: OnceCell<M>,
}

impl<M> LazyModel<M> {
    pub fn new(
        name: impl Into<String>,
        loader: impl Fn() -> Result<M, ModelError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&M, ModelError> {
        self.cell.get_or_try_init(|| {
            info!("Loading {} model...", self.name);
            let start = Instant::now();
            let model = (self.loader)()?;
            info!("{} model loaded in {:.2?}", self.name, start.elapsed());
            Ok(model)
        })
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<M: TextEmbedder> TextEmbedder for LazyModel<M> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        self.get()?.embed(text)
    }
}

impl<M: EntityRecognizer> EntityRecognizer for LazyModel<M> {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        self.get()?.recognize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ConstantEmbedder;

    impl TextEmbedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
            Ok(vec![1.0, 0.0])
        }
    }

    #[test]
    fn test_lazy_model_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let lazy = LazyModel::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ConstantEmbedder)
        });

        assert!(!lazy.is_loaded());
        lazy.embed("a").unwrap();
        lazy.embed("b").unwrap();
        assert!(lazy.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lazy_model_loads_once_under_concurrent_first_use() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let lazy = Arc::new(LazyModel::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(ConstantEmbedder)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                std::thread::spawn(move || lazy.embed("x").unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let lazy = LazyModel::new("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ModelError::Config("first attempt fails".to_string()))
            } else {
                Ok(ConstantEmbedder)
            }
        });

        assert!(lazy.embed("x").is_err());
        assert!(lazy.embed("x").is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_local_directory_resolves_without_hub() {
        let dir = std::env::temp_dir();
        let files = ModelFiles::fetch(dir.to_str().unwrap(), "main").unwrap();
        assert_eq!(files.config, dir.join("config.json"));
        assert_eq!(files.weights, dir.join("model.safetensors"));
    }
}
