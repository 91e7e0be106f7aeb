use crate::embeddings::Embedding;
use crate::error::{RagError, Result};
use crate::index::{ChunkMetadata, IndexedChunk, RetrievalHit, VectorIndex};
use log::{debug, info};
use qdrant_client::qdrant::{
    with_payload_selector, CreateCollectionBuilder, Distance, PointStruct, SearchPoints,
    UpsertPointsBuilder, Value, VectorParams, WithPayloadSelector,
};
use qdrant_client::{Qdrant, QdrantError};
use std::collections::HashMap;
use std::env;

const SERVICE: &str = "qdrant";

/// Configuration for Qdrant
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl QdrantConfig {
    /// Read the configuration from the environment.
    ///
    /// Returns `None` when `QDRANT_URL` is unset so callers can fall back to
    /// an in-memory index.
    pub fn from_env() -> Option<Self> {
        let url = env::var("QDRANT_URL").ok()?;
        let api_key = env::var("QDRANT_API_KEY").ok();

        Some(QdrantConfig { url, api_key })
    }
}

/// Vector index stored in a Qdrant collection, scored by cosine similarity
pub struct QdrantIndex {
    client: Qdrant,
    collection_name: String,
}

impl QdrantIndex {
    /// Create a new Qdrant-backed index for the given document set
    pub fn new(config: QdrantConfig, document_name: &str) -> Result<Self> {
        let config_builder = Qdrant::from_url(&config.url);
        let config_builder = if let Some(api_key) = config.api_key {
            config_builder.api_key(api_key)
        } else {
            config_builder
        };

        let client = config_builder.build().map_err(qdrant_error)?;

        Ok(QdrantIndex {
            client,
            collection_name: get_collection_name(document_name),
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Check if the collection exists
    pub async fn collection_exists(&self) -> Result<bool> {
        match self.client.collection_info(&self.collection_name).await {
            Ok(_) => Ok(true),
            Err(QdrantError::ResponseError { status })
                if status.code() == tonic::Code::NotFound =>
            {
                Ok(false)
            }
            Err(e) => Err(qdrant_error(e)),
        }
    }

    /// Create the collection for vectors of the given dimension
    pub async fn create_collection(&self, dimension: u64) -> Result<()> {
        let create_collection = CreateCollectionBuilder::new(self.collection_name.clone())
            .vectors_config(VectorParams {
                size: dimension,
                distance: Distance::Cosine.into(),
                ..Default::default()
            });

        self.client
            .create_collection(create_collection)
            .await
            .map_err(qdrant_error)?;

        info!(
            "Created collection {} ({} dimensions)",
            self.collection_name, dimension
        );
        Ok(())
    }

    /// Delete the collection
    pub async fn delete_collection(&self) -> Result<()> {
        self.client
            .delete_collection(self.collection_name.clone())
            .await
            .map_err(qdrant_error)?;

        info!("Deleted collection {}", self.collection_name);
        Ok(())
    }
}

impl VectorIndex for QdrantIndex {
    async fn upsert(&self, chunks: Vec<IndexedChunk>) -> Result<()> {
        let Some(first) = chunks.first() else {
            return Ok(());
        };

        if !self.collection_exists().await? {
            self.create_collection(first.vector.dimension() as u64)
                .await?;
        }

        let points: Vec<PointStruct> = chunks.into_iter().map(to_point).collect();
        debug!(
            "Upserting {} points into {}",
            points.len(),
            self.collection_name
        );

        // wait(true) so the points are searchable once this returns
        let upsert_request =
            UpsertPointsBuilder::new(self.collection_name.clone(), points).wait(true);

        self.client
            .upsert_points(upsert_request)
            .await
            .map_err(qdrant_error)?;

        Ok(())
    }

    async fn query(&self, vector: &Embedding, top_k: usize) -> Result<Vec<RetrievalHit>> {
        // A collection that was never built has nothing to return
        if !self.collection_exists().await? {
            return Ok(Vec::new());
        }

        let search_request = SearchPoints {
            collection_name: self.collection_name.clone(),
            vector: vector.values.clone(),
            limit: top_k as u64,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(with_payload_selector::SelectorOptions::Enable(true)),
            }),
            ..Default::default()
        };

        let search_response = self
            .client
            .search_points(search_request)
            .await
            .map_err(qdrant_error)?;

        Ok(search_response
            .result
            .into_iter()
            .filter_map(|scored_point| to_hit(&scored_point.payload, scored_point.score))
            .collect())
    }
}

fn to_point(chunk: IndexedChunk) -> PointStruct {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert("text".to_string(), chunk.text.into());
    payload.insert(
        "chunk_index".to_string(),
        (chunk.metadata.chunk_index as i64).into(),
    );

    PointStruct::new(chunk.id, chunk.vector.values, payload)
}

/// Points without text are skipped; a missing chunk index leaves metadata empty
fn to_hit(payload: &HashMap<String, Value>, score: f32) -> Option<RetrievalHit> {
    let text = payload.get("text")?.as_str()?;
    let metadata = payload
        .get("chunk_index")
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
        .map(|chunk_index| ChunkMetadata { chunk_index });

    Some(RetrievalHit {
        text: text.to_string(),
        metadata,
        score,
    })
}

fn qdrant_error(err: QdrantError) -> RagError {
    match err {
        QdrantError::ResponseError { status } => RagError::service_with_code(
            SERVICE,
            status.code() as i32,
            status.message().to_string(),
        ),
        other => RagError::service(SERVICE, other.to_string()),
    }
}

/// Generate a collection name from a file name
fn get_collection_name(file_name: &str) -> String {
    // Replace non-alphanumeric characters with underscores and convert to lowercase
    let name = file_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase();

    format!("docuchat_{}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name() {
        assert_eq!(get_collection_name("My Report.pdf"), "docuchat_my_report_pdf");
    }

    #[test]
    fn test_payload_round_trip() {
        let point = to_point(IndexedChunk {
            id: "6f1c2d3e-0000-4000-8000-000000000001".to_string(),
            text: "hello".to_string(),
            metadata: ChunkMetadata { chunk_index: 3 },
            vector: Embedding::new(vec![0.1, 0.2]),
        });

        let hit = to_hit(&point.payload, 0.87).unwrap();
        assert_eq!(hit.text, "hello");
        assert_eq!(hit.metadata, Some(ChunkMetadata { chunk_index: 3 }));
        assert_eq!(hit.score, 0.87);
    }

    #[test]
    fn test_missing_metadata() {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert("text".to_string(), "orphan".to_string().into());

        let hit = to_hit(&payload, 0.5).unwrap();
        assert_eq!(hit.metadata, None);

        assert!(to_hit(&HashMap::new(), 0.5).is_none());
    }
}
