//! 应用层测试夹具：真实的 SQLite / Sled 存储 + 假源站与假翻译器

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::application::cache::{ChapterCache, NovelCache};
use crate::application::commands::handlers::MaterializeFileHandler;
use crate::application::orchestrator::{ProgressSink, TranslateOrchestrator};
use crate::application::ports::{
    ChapterRepositoryPort, ChapterWriteError, NovelRepositoryPort, RemoteChapter,
    RemoteNovelMetadata, RepositoryError, SourceFetchError, SourceProviderPort,
    TranslationCounters, TranslatorCreateError, TranslatorError, TranslatorFactoryPort,
    TranslatorPort,
};
use crate::application::queries::handlers::GetTranslateTaskHandler;
use crate::domain::chapter::{Chapter, ChapterTranslation, ChapterTranslationOutline};
use crate::domain::novel::{ChapterKey, Glossary, Novel, NovelKey, TocEntry};
use crate::domain::TranslatorId;
use crate::infrastructure::adapters::render::DefaultNovelFileRenderer;
use crate::infrastructure::adapters::storage::FsFileArtifactStorage;
use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
use crate::infrastructure::persistence::{SledChapterRepository, SqliteNovelRepository};

/// 在假适配器调用中途执行的异步动作，用来模拟并发写入
pub type Hook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub fn hook<F, Fut>(f: F) -> Hook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(f()) })
}

// ============================================================================
// Source Provider
// ============================================================================

/// 固定内容的源站：一卷三章
#[derive(Default)]
pub struct FakeSourceProvider {
    metadata_calls: AtomicUsize,
    chapter_calls: AtomicUsize,
    fail_metadata: AtomicBool,
    fail_chapters: AtomicBool,
    metadata_hook: Mutex<Option<Hook>>,
}

impl FakeSourceProvider {
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn chapter_calls(&self) -> usize {
        self.chapter_calls.load(Ordering::SeqCst)
    }

    pub fn fail_metadata(&self, fail: bool) {
        self.fail_metadata.store(fail, Ordering::SeqCst);
    }

    pub fn fail_chapters(&self, fail: bool) {
        self.fail_chapters.store(fail, Ordering::SeqCst);
    }

    /// 下一次抓取元数据时先执行 hook
    pub fn before_next_metadata(&self, hook: Hook) {
        *self.metadata_hook.lock().unwrap() = Some(hook);
    }
}

#[async_trait]
impl SourceProviderPort for FakeSourceProvider {
    async fn fetch_metadata(&self, _key: &NovelKey) -> Result<RemoteNovelMetadata, SourceFetchError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let hook = self.metadata_hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook().await;
        }
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(SourceFetchError::NetworkError("connection reset".into()));
        }
        Ok(RemoteNovelMetadata {
            title: "異世界転生".into(),
            introduction: "あらすじ".into(),
            toc: vec![
                TocEntry::volume("第一章"),
                TocEntry::chapter("第一話", "c1"),
                TocEntry::chapter("第二話", "c2"),
                TocEntry::chapter("第三話", "c3"),
            ],
        })
    }

    async fn fetch_chapter(&self, key: &ChapterKey) -> Result<RemoteChapter, SourceFetchError> {
        self.chapter_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_chapters.load(Ordering::SeqCst) {
            return Err(SourceFetchError::Timeout);
        }
        let paragraphs: &[&str] = match key.chapter_id() {
            "c1" => &["一の一", "一の二"],
            "c2" => &["二の一", "二の二", "二の三"],
            "c3" => &["三の一"],
            _ => return Err(SourceFetchError::NotFound(key.to_string())),
        };
        Ok(RemoteChapter {
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        })
    }
}

// ============================================================================
// Translator
// ============================================================================

/// 假翻译器工厂，译文为 "译:" + 原文
#[derive(Clone, Default)]
pub struct FakeTranslatorFactory {
    abort_on: Option<String>,
    skip_on: Option<String>,
    hook_on: Option<(String, Hook)>,
    fail_create: bool,
    metadata_unsupported: bool,
    calls: Arc<AtomicUsize>,
    last_glossary: Arc<Mutex<Glossary>>,
}

impl FakeTranslatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 遇到包含 text 的输入时返回 Abort
    pub fn abort_on(mut self, text: &str) -> Self {
        self.abort_on = Some(text.to_string());
        self
    }

    /// 遇到包含 text 的输入时返回 Skip
    pub fn skip_on(mut self, text: &str) -> Self {
        self.skip_on = Some(text.to_string());
        self
    }

    /// 遇到包含 text 的输入时先执行 hook，再正常翻译
    pub fn hook_on(mut self, text: &str, hook: Hook) -> Self {
        self.hook_on = Some((text.to_string(), hook));
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata_unsupported = true;
        self
    }

    /// translate 调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_glossary(&self) -> Glossary {
        self.last_glossary.lock().unwrap().clone()
    }
}

impl TranslatorFactoryPort for FakeTranslatorFactory {
    fn create(
        &self,
        translator: TranslatorId,
        glossary: Glossary,
        _access_token: Option<String>,
    ) -> Result<Box<dyn TranslatorPort>, TranslatorCreateError> {
        if self.fail_create {
            return Err(TranslatorCreateError {
                translator,
                reason: "missing credentials".into(),
            });
        }
        *self.last_glossary.lock().unwrap() = glossary;
        Ok(Box::new(FakeTranslator {
            factory: self.clone(),
        }))
    }
}

struct FakeTranslator {
    factory: FakeTranslatorFactory,
}

#[async_trait]
impl TranslatorPort for FakeTranslator {
    async fn translate(&self, texts: Vec<String>) -> Result<Vec<String>, TranslatorError> {
        self.factory.calls.fetch_add(1, Ordering::SeqCst);
        let contains = |needle: &Option<String>| {
            needle
                .as_ref()
                .map_or(false, |n| texts.iter().any(|t| t.contains(n.as_str())))
        };
        if contains(&self.factory.abort_on) {
            return Err(TranslatorError::Abort("quota exceeded".into()));
        }
        if contains(&self.factory.skip_on) {
            return Err(TranslatorError::Skip("bad response".into()));
        }
        if let Some((needle, hook)) = &self.factory.hook_on {
            if texts.iter().any(|t| t.contains(needle.as_str())) {
                hook().await;
            }
        }
        Ok(texts.iter().map(|t| format!("译:{}", t)).collect())
    }

    fn supports_metadata(&self) -> bool {
        !self.factory.metadata_unsupported
    }
}

// ============================================================================
// Progress Sink
// ============================================================================

/// 记录所有回调
#[derive(Default)]
pub struct RecordingSink {
    starts: Mutex<Vec<usize>>,
    successes: Mutex<Vec<Option<TranslationCounters>>>,
    failures: AtomicUsize,
    logs: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn starts(&self) -> Vec<usize> {
        self.starts.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<Option<TranslationCounters>> {
        self.successes.lock().unwrap().clone()
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn on_start(&self, total: usize) {
        self.starts.lock().unwrap().push(total);
    }

    fn on_chapter_success(&self, counters: Option<TranslationCounters>) {
        self.successes.lock().unwrap().push(counters);
    }

    fn on_chapter_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 统计 find 次数的章节仓库
struct CountingChapterRepository {
    inner: SledChapterRepository,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl ChapterRepositoryPort for CountingChapterRepository {
    async fn find(&self, key: &ChapterKey) -> Result<Option<Chapter>, RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find(key).await
    }

    async fn save_source(
        &self,
        key: &ChapterKey,
        paragraphs: Vec<String>,
    ) -> Result<Chapter, RepositoryError> {
        self.inner.save_source(key, paragraphs).await
    }

    async fn update_translation(
        &self,
        key: &ChapterKey,
        translator: TranslatorId,
        translation: ChapterTranslation,
    ) -> Result<Chapter, ChapterWriteError> {
        self.inner.update_translation(key, translator, translation).await
    }

    async fn translation_outlines(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<Vec<ChapterTranslationOutline>, RepositoryError> {
        self.inner.translation_outlines(novel, translator).await
    }

    async fn paragraph_stats(
        &self,
        novel: &NovelKey,
        translator: TranslatorId,
    ) -> Result<TranslationCounters, RepositoryError> {
        self.inner.paragraph_stats(novel, translator).await
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub provider: Arc<FakeSourceProvider>,
    chapter_reads: Arc<AtomicUsize>,
    files_dir: PathBuf,
    _dir: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();

        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let chapter_reads = Arc::new(AtomicUsize::new(0));
        let chapter_repo = CountingChapterRepository {
            inner: SledChapterRepository::open(dir.path().join("chapters.sled")).unwrap(),
            reads: chapter_reads.clone(),
        };

        Self {
            novel_repo: Arc::new(SqliteNovelRepository::new(pool)),
            chapter_repo: Arc::new(chapter_repo),
            provider: Arc::new(FakeSourceProvider::default()),
            chapter_reads,
            files_dir: dir.path().join("files"),
            _dir: dir,
        }
    }

    pub fn novel_key(&self) -> NovelKey {
        NovelKey::new("kakuyomu", "1").unwrap()
    }

    pub fn chapter_key(&self, chapter_id: &str) -> ChapterKey {
        self.novel_key().chapter(chapter_id).unwrap()
    }

    pub fn novel_cache(&self) -> NovelCache {
        NovelCache::new(self.novel_repo.clone(), self.provider.clone())
    }

    pub fn chapter_cache(&self) -> ChapterCache {
        ChapterCache::new(
            self.chapter_repo.clone(),
            self.novel_repo.clone(),
            self.provider.clone(),
        )
    }

    pub fn get_task_handler(&self) -> GetTranslateTaskHandler {
        GetTranslateTaskHandler::new(
            Arc::new(self.novel_cache()),
            self.chapter_repo.clone(),
            Duration::minutes(10),
        )
    }

    pub fn materialize_handler(&self) -> MaterializeFileHandler {
        MaterializeFileHandler::new(
            self.novel_repo.clone(),
            self.chapter_repo.clone(),
            Arc::new(FsFileArtifactStorage::new(&self.files_dir)),
            Arc::new(DefaultNovelFileRenderer::new()),
        )
    }

    pub fn orchestrator(&self, factory: FakeTranslatorFactory) -> TranslateOrchestrator {
        TranslateOrchestrator::new(
            self.novel_repo.clone(),
            self.chapter_repo.clone(),
            Arc::new(self.novel_cache()),
            Arc::new(self.chapter_cache()),
            Arc::new(factory),
            Duration::minutes(10),
        )
    }

    /// 确保小说已同步，返回最新状态
    pub async fn sync_novel(&self) -> Novel {
        self.novel_cache()
            .get_or_sync_remote(&self.novel_key(), Duration::minutes(10))
            .await
            .unwrap()
    }

    /// 替换术语表，返回更新后的小说
    pub async fn set_glossary(&self, glossary: Glossary) -> Novel {
        let mut novel = self.sync_novel().await;
        novel.replace_glossary(glossary);
        self.novel_repo
            .update_glossary(&novel.key, novel.versioned_glossary())
            .await
            .unwrap();
        novel
    }

    /// 推进 change_at
    pub async fn touch_novel(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        self.novel_repo
            .touch_change_at(&self.novel_key(), Utc::now())
            .await
            .unwrap();
    }

    /// 章节仓库 find 调用次数
    pub fn chapter_reads(&self) -> usize {
        self.chapter_reads.load(Ordering::SeqCst)
    }
}
