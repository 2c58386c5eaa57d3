use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use fake::{faker::lorem::en::Sentence, Fake};
use once_cell::sync::Lazy;
use rag_indexer::{
    configuration::IndexerSettings,
    domain::{
        entities::{
            collection::CollectionConfig,
            content_point::{ContentPoint, Embeddings},
            source_item::{ContentType, SourceItem, SourceType},
        },
        services::indexer::Indexer,
    },
    ports::{
        collection_repository::{CollectionRepository, CollectionRepositoryError},
        embedder::{Embedder, EmbedderError},
        point_repository::{PointRepository, PointRepositoryError},
        sleeper::Sleeper,
        source_processor::{SourceProcessor, SourceProcessorError},
    },
    telemetry::{get_tracing_subscriber, init_tracing_subscriber},
};

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "indexer_tests".to_string();

    // The sink is part of the type returned by `get_tracing_subscriber`,
    // so each sink needs its own code branch
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

/// A call received by the fake vector store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CollectionExists(String),
    DeleteCollection(String),
    CreateCollection(String, CollectionConfig),
    Upsert(String, Vec<ContentPoint>),
}

/// In-memory vector store recording every call, serving both repository ports
#[derive(Default)]
pub struct FakeVectorStore {
    pub existing_collection: bool,
    pub failing_collection_exists: bool,
    pub failing_delete_collection: bool,
    pub failing_create_collection: bool,
    /// Number of upsert calls failing before the store starts succeeding
    pub failing_first_upserts: usize,
    /// Number of upsert calls succeeding before the store fails all the following ones
    pub succeeding_upserts_before_outage: Option<usize>,
    /// Left public so the fake can be built with `..Default::default()`
    pub recorded_calls: Mutex<Vec<StoreCall>>,
}

impl FakeVectorStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.recorded_calls.lock().unwrap().clone()
    }

    pub fn upserted_batches(&self) -> Vec<Vec<ContentPoint>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Upsert(_, points) => Some(points),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.recorded_calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CollectionRepository for FakeVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool, CollectionRepositoryError> {
        self.record(StoreCall::CollectionExists(name.to_string()));

        if self.failing_collection_exists {
            return Err(CollectionRepositoryError::StoreError(
                "connection refused".into(),
            ));
        }
        Ok(self.existing_collection)
    }

    async fn delete_collection(&self, name: &str) -> Result<(), CollectionRepositoryError> {
        self.record(StoreCall::DeleteCollection(name.to_string()));

        if self.failing_delete_collection {
            return Err(CollectionRepositoryError::StoreError(
                "collection is locked".into(),
            ));
        }
        Ok(())
    }

    async fn create_collection(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> Result<(), CollectionRepositoryError> {
        self.record(StoreCall::CreateCollection(name.to_string(), config));

        if self.failing_create_collection {
            return Err(CollectionRepositoryError::StoreError(
                "invalid vector size".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PointRepository for FakeVectorStore {
    async fn upsert(
        &self,
        collection_name: &str,
        points: &[ContentPoint],
    ) -> Result<(), PointRepositoryError> {
        let nb_previous_upserts = self.upserted_batches().len();
        self.record(StoreCall::Upsert(
            collection_name.to_string(),
            points.to_vec(),
        ));

        if nb_previous_upserts < self.failing_first_upserts {
            return Err(PointRepositoryError::StoreError("service unavailable".into()));
        }
        if let Some(nb_succeeding) = self.succeeding_upserts_before_outage {
            if nb_previous_upserts >= nb_succeeding {
                return Err(PointRepositoryError::StoreError("service unavailable".into()));
            }
        }
        Ok(())
    }
}

/// Returns `[i, i, i]` for its i-th call
#[derive(Default)]
pub struct SequenceEmbedder {
    /// Zero-based index of the call that fails
    pub failing_call: Option<usize>,
    pub received_texts: Mutex<Vec<String>>,
}

impl SequenceEmbedder {
    pub fn texts(&self) -> Vec<String> {
        self.received_texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for SequenceEmbedder {
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbedderError> {
        let call_index = {
            let mut texts = self.received_texts.lock().unwrap();
            texts.push(text.to_string());
            texts.len() - 1
        };

        if self.failing_call == Some(call_index) {
            return Err(EmbedderError::RequestError("model overloaded".into()));
        }
        Ok(vec![call_index as f32; 3])
    }
}

/// Serves a fixed list of items, or fails, and counts how many times it was processed
pub struct FakeSourceProcessor {
    source_items: Vec<SourceItem>,
    failing: bool,
    nb_process_calls: Mutex<usize>,
}

impl FakeSourceProcessor {
    pub fn new(source_items: Vec<SourceItem>) -> Self {
        Self {
            source_items,
            failing: false,
            nb_process_calls: Mutex::new(0),
        }
    }

    /// A source whose root directory cannot be read
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(vec![])
        }
    }

    pub fn nb_process_calls(&self) -> usize {
        *self.nb_process_calls.lock().unwrap()
    }
}

impl SourceProcessor for FakeSourceProcessor {
    fn process(&self) -> Result<Vec<SourceItem>, SourceProcessorError> {
        *self.nb_process_calls.lock().unwrap() += 1;

        if self.failing {
            return Err(SourceProcessorError::InvalidRoot("missing/docs".into()));
        }
        Ok(self.source_items.clone())
    }
}

/// Records the waits instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// An indexer wired with fakes, keeping a handle on each of them
pub struct TestApp {
    pub indexer: Indexer,
    pub store: Arc<FakeVectorStore>,
    pub embedder: Arc<SequenceEmbedder>,
    pub source_processor: Arc<FakeSourceProcessor>,
    pub sleeper: Arc<RecordingSleeper>,
}

pub fn spawn_indexer(
    source_items: Vec<SourceItem>,
    store: FakeVectorStore,
    embedder: SequenceEmbedder,
    settings: IndexerSettings,
) -> TestApp {
    spawn_indexer_with_source(
        FakeSourceProcessor::new(source_items),
        store,
        embedder,
        settings,
    )
}

pub fn spawn_indexer_with_source(
    source_processor: FakeSourceProcessor,
    store: FakeVectorStore,
    embedder: SequenceEmbedder,
    settings: IndexerSettings,
) -> TestApp {
    Lazy::force(&TRACING);

    let store = Arc::new(store);
    let embedder = Arc::new(embedder);
    let source_processor = Arc::new(source_processor);
    let sleeper = Arc::new(RecordingSleeper::default());

    let indexer = Indexer::new(
        source_processor.clone(),
        embedder.clone(),
        store.clone(),
        store.clone(),
        sleeper.clone(),
        settings,
    );

    TestApp {
        indexer,
        store,
        embedder,
        source_processor,
        sleeper,
    }
}

/// Default settings with vectors matching `SequenceEmbedder`
pub fn test_settings() -> IndexerSettings {
    IndexerSettings {
        vector_size: 3,
        ..IndexerSettings::default()
    }
}

pub fn source_item(content: &str) -> SourceItem {
    SourceItem {
        content: content.to_string(),
        content_type: ContentType::Markdown,
        source_type: SourceType::File,
        source_location: format!("docs/{}.md#0", content.len()),
    }
}

pub fn fake_source_items(nb_items: usize) -> Vec<SourceItem> {
    (0..nb_items)
        .map(|_| source_item(&Sentence(3..10).fake::<String>()))
        .collect()
}
