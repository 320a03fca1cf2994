// ============================================================================
// ARMAZENAMENTO DOS DOCUMENTOS
// ============================================================================
//
// Description:
//   Grava os arquivos enviados em UPLOADS_DIR com nome aleatório
//   (doc-<uuid><ext>) e remove os arquivos quando o documento ou o paciente
//   é apagado.
//
// Points d'attention:
//   - Só PDF e Word, no máximo 10 MB por arquivo e 10 arquivos por requisição
//   - O limite de tamanho é verificado durante o streaming; o arquivo parcial
//     é apagado
//   - Remoção é best-effort: arquivo inexistente não é erro
//
// ============================================================================

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use actix_web::web::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const MAX_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub original_name: String,
    pub stored_name: String,
    pub size: i32,
    pub mime_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Tipo de arquivo não permitido. Apenas PDF e Word são aceitos.")]
    NotAllowed,

    #[error("Arquivo excede o limite de 10 MB")]
    TooLarge,

    #[error("Máximo de 10 arquivos por envio")]
    TooMany,

    #[error("Falha ao ler o arquivo enviado: {0}")]
    Stream(String),

    #[error("Falha ao gravar o arquivo: {0}")]
    Io(#[from] io::Error),
}

impl UploadError {
    /// Erros do cliente (tipo, tamanho, quantidade, corpo truncado) contra erros de disco
    pub fn is_client_error(&self) -> bool {
        !matches!(self, UploadError::Io(_))
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn is_allowed(mime_type: &str) -> bool {
        ALLOWED_MIME_TYPES.contains(&mime_type)
    }

    /// doc-<uuid><ext>, mantendo só uma extensão curta e alfanumérica
    pub fn stored_name_for(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        format!("doc-{}{}", Uuid::new_v4().simple(), ext)
    }

    /// Caminho dentro de UPLOADS_DIR; nomes com separadores são recusados
    pub fn path_for(&self, stored_name: &str) -> Option<PathBuf> {
        let valid = !stored_name.is_empty()
            && stored_name != "."
            && stored_name != ".."
            && !stored_name.contains(['/', '\\']);
        valid.then(|| self.root.join(stored_name))
    }

    /// Grava o stream em disco respeitando o limite de tamanho
    pub async fn save_stream<S, E>(
        &self,
        original_name: &str,
        mime_type: &str,
        mut stream: S,
    ) -> Result<StoredUpload, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        if !Self::is_allowed(mime_type) {
            return Err(UploadError::NotAllowed);
        }

        let stored_name = Self::stored_name_for(original_name);
        let path = self.root.join(&stored_name);
        let mut file = fs::File::create(&path).await?;
        let mut size = 0usize;

        let written: Result<(), UploadError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| UploadError::Stream(e.to_string()))?;
                size += chunk.len();
                if size > MAX_FILE_SIZE {
                    return Err(UploadError::TooLarge);
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            self.remove(&stored_name).await;
            return Err(e);
        }

        Ok(StoredUpload {
            original_name: original_name.to_string(),
            stored_name,
            size: size as i32,
            mime_type: mime_type.to_string(),
        })
    }

    /// Remove o arquivo físico; ausência não é erro
    pub async fn remove(&self, stored_name: &str) {
        let Some(path) = self.path_for(stored_name) else {
            tracing::warn!(stored_name, "Nome de arquivo inválido ignorado na remoção");
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Falha ao remover arquivo"),
        }
    }

    pub async fn remove_all(&self, uploads: &[StoredUpload]) {
        for upload in uploads {
            self.remove(&upload.stored_name).await;
        }
    }
}
