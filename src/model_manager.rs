use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::models::BuiltinModel;

/// Environment variable holding the hub access token sent with download
/// requests. Read once per download, never per classification request.
pub const HUB_TOKEN_ENV: &str = "HF_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// Downloads and verifies model artifacts into a local cache directory.
///
/// Artifacts are fetched from the model hub with an optional bearer token
/// (`HF_TOKEN`). When the catalog pins a SHA-256 digest the downloaded
/// bytes and the bytes on disk are both checked against it; un-pinned
/// artifacts are re-hashed for logging only. Artifacts live under
/// `<cache>/<model-name>/`, and concurrent downloads through the same
/// manager are serialized by an internal lock.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    client: Client,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("AMYGDALA_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("amygdala").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("amygdala").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("amygdala").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            client: Client::new(),
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn get_model_path(&self, model: BuiltinModel) -> PathBuf {
        let info = model.get_model_info();
        self.models_dir.join(info.name).join("model.onnx")
    }

    pub fn get_tokenizer_path(&self, model: BuiltinModel) -> PathBuf {
        let info = model.get_model_info();
        self.models_dir.join(info.name).join("tokenizer.json")
    }

    pub fn is_model_downloaded(&self, model: BuiltinModel) -> bool {
        let model_path = self.get_model_path(model);
        let tokenizer_path = self.get_tokenizer_path(model);
        log::debug!(
            "Model file {:?} exists: {}, tokenizer file {:?} exists: {}",
            model_path,
            model_path.exists(),
            tokenizer_path,
            tokenizer_path.exists()
        );
        model_path.exists() && tokenizer_path.exists()
    }

    pub async fn download_model(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let info = model.get_model_info();
        let _lock = self.download_lock.lock().await;

        let model_dir = self.models_dir.join(&info.name);
        log::info!("Creating model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        let model_path = self.get_model_path(model);
        let model_result = if model_path.exists() {
            if !self.verify_artifact(&model_path, info.model_hash.as_deref())? {
                log::warn!("Model file verification failed, redownloading");
                self.fetch_and_verify(&info.model_url, &model_path, info.model_hash.as_deref(), "model")
                    .await
            } else {
                log::info!("Existing model file verified successfully");
                Ok(())
            }
        } else {
            log::info!("Model file does not exist, downloading...");
            self.fetch_and_verify(&info.model_url, &model_path, info.model_hash.as_deref(), "model")
                .await
        };

        let tokenizer_path = self.get_tokenizer_path(model);
        let tokenizer_result = if tokenizer_path.exists() {
            if !self.verify_artifact(&tokenizer_path, info.tokenizer_hash.as_deref())? {
                log::warn!("Tokenizer file verification failed, redownloading");
                self.fetch_and_verify(
                    &info.tokenizer_url,
                    &tokenizer_path,
                    info.tokenizer_hash.as_deref(),
                    "tokenizer",
                )
                .await
            } else {
                log::info!("Existing tokenizer file verified successfully");
                Ok(())
            }
        } else {
            log::info!("Tokenizer file does not exist, downloading...");
            self.fetch_and_verify(
                &info.tokenizer_url,
                &tokenizer_path,
                info.tokenizer_hash.as_deref(),
                "tokenizer",
            )
            .await
        };

        match (model_result, tokenizer_result) {
            (Ok(()), Ok(())) => {
                log::info!("Model and tokenizer ready to use");
                Ok(())
            }
            (Err(e), _) => {
                log::error!("Failed to setup model file: {}", e);
                // Remove both artifacts so a retry starts clean
                let _ = self.remove_download(model);
                Err(e)
            }
            (_, Err(e)) => {
                log::error!("Failed to setup tokenizer file: {}", e);
                let _ = self.remove_download(model);
                Err(e)
            }
        }
    }

    fn file_digest(&self, path: &Path) -> Result<String, ModelError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        let hash = self.file_digest(path)?;
        log::debug!(
            "Verified {:?}: calculated {}, expected {}",
            path,
            hash,
            expected_hash
        );
        Ok(hash == expected_hash)
    }

    /// Checks one artifact against its catalog entry. A pinned digest must
    /// match; an un-pinned artifact only has to exist.
    fn verify_artifact(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ModelError> {
        match expected_hash {
            Some(hash) => self.verify_file(path, hash),
            None => Ok(path.exists()),
        }
    }

    pub fn verify_model(&self, model: BuiltinModel) -> Result<bool, ModelError> {
        let info = model.get_model_info();
        let model_path = self.get_model_path(model);
        let tokenizer_path = self.get_tokenizer_path(model);

        if !model_path.exists() || !tokenizer_path.exists() {
            log::info!("One or both model files do not exist");
            return Ok(false);
        }

        let model_ok = self.verify_artifact(&model_path, info.model_hash.as_deref())?;
        let tokenizer_ok = self.verify_artifact(&tokenizer_path, info.tokenizer_hash.as_deref())?;
        Ok(model_ok && tokenizer_ok)
    }

    async fn fetch_and_verify(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);

        let mut request = self.client.get(url);
        if let Ok(token) = env::var(HUB_TOKEN_ENV) {
            if !token.is_empty() {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        log::info!("{} digest: {}", file_type, hash);

        if let Some(expected) = expected_hash {
            if hash != expected {
                log::error!(
                    "{} hash mismatch: expected {}, got {}",
                    file_type,
                    expected,
                    hash
                );
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;

        // Re-hash what actually landed on disk
        if !self.verify_artifact(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", file_type);
        Ok(())
    }

    pub fn remove_download(&self, model: BuiltinModel) -> Result<(), ModelError> {
        let model_path = self.get_model_path(model);
        let tokenizer_path = self.get_tokenizer_path(model);

        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        if tokenizer_path.exists() {
            fs::remove_file(&tokenizer_path)?;
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, model: BuiltinModel) -> Result<(), ModelError> {
        if !self.is_model_downloaded(model) {
            log::info!("Model {:?} not found, downloading...", model);
            self.download_model(model).await?;
        } else if !self.verify_model(model)? {
            log::info!("Model {:?} verification failed, re-downloading...", model);
            self.remove_download(model)?;
            self.download_model(model).await?;
        } else {
            log::info!("Model {:?} present and verified", model);
        }
        Ok(())
    }
}
