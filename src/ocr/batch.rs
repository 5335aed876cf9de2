use super::client::OcrClient;
use super::{PageRenderer, PageResult, reassemble};
use crate::config::Ocr;
use crate::engine::Extraction;
use crate::optimize::{ImageSettings, optimize_image};
use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const WORKER_THREAD_NAME: &str = "ocr-worker";

#[derive(Debug, Clone, Copy)]
pub struct OcrSettings {
    pub dpi: u32,
    pub max_workers: usize,
    pub per_call_timeout: Duration,
    pub image: ImageSettings,
}

impl OcrSettings {
    pub fn from_config(cfg: &Ocr) -> Self {
        Self {
            dpi: cfg.image_dpi,
            max_workers: cfg.max_workers.max(1),
            per_call_timeout: cfg.api_timeout(),
            image: ImageSettings {
                max_dimension: cfg.max_image_size,
                jpeg_quality: cfg.jpeg_quality,
            },
        }
    }
}

/// One optimized page waiting for OCR.
pub struct PageImage {
    pub page_index: usize,
    pub jpeg: Vec<u8>,
}

/// Renders a PDF, sends every page to the OCR client with at most
/// `max_workers` calls in flight, and stitches the answers back in page order.
///
/// Calls run as tasks on a runtime owned by the coordinator. `extract` blocks
/// the calling thread; from inside another Tokio runtime the batch is driven
/// from a scoped helper thread instead.
pub struct OcrBatchCoordinator {
    client: Arc<dyn OcrClient>,
    renderer: Box<dyn PageRenderer>,
    settings: OcrSettings,
    runtime: Option<Runtime>,
}

impl OcrBatchCoordinator {
    pub fn new(
        client: Arc<dyn OcrClient>,
        renderer: Box<dyn PageRenderer>,
        settings: OcrSettings,
    ) -> Result<Self> {
        // One spare worker keeps the timer driver running while every
        // in-flight call is blocked.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(settings.max_workers.max(1) + 1)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()
            .context("building OCR runtime")?;
        Ok(Self {
            client,
            renderer,
            settings,
            runtime: Some(runtime),
        })
    }

    /// Errors only when the PDF cannot be rasterized; page-level failures
    /// become empty pages.
    pub fn extract(&self, path: &Path) -> Result<Extraction> {
        let started = Instant::now();
        let pages = self
            .renderer
            .render_pages(path, self.settings.dpi)
            .with_context(|| format!("rasterizing {}", path.display()))?;
        if pages.is_empty() {
            warn!("{} rendered to zero pages", path.display());
            return Ok(Extraction::empty());
        }
        let page_count = pages.len();
        info!(
            "rendered {} pages of {} at {} dpi",
            page_count,
            path.display(),
            self.settings.dpi
        );

        let mut images = Vec::with_capacity(page_count);
        for (page_index, page) in pages.into_iter().enumerate() {
            match optimize_image(page, &self.settings.image) {
                Ok(optimized) => {
                    debug!(
                        "page {} optimized to {}x{} ({} bytes)",
                        page_index + 1,
                        optimized.width,
                        optimized.height,
                        optimized.bytes.len()
                    );
                    images.push(PageImage {
                        page_index,
                        jpeg: optimized.bytes,
                    });
                }
                // Left out of the dispatch; its slot reports a failed page.
                Err(err) => warn!("page {} could not be encoded: {:#}", page_index + 1, err),
            }
        }

        let results = self.dispatch(images, page_count);

        let ok_pages = results.iter().filter(|r| r.succeeded).count();
        let extraction = reassemble(results);
        info!(
            "OCR finished for {}: {}/{} pages ok, {} tables, {:.2}s",
            path.display(),
            ok_pages,
            page_count,
            extraction.tables.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(extraction)
    }

    /// Runs the OCR calls and returns exactly `page_count` results indexed by
    /// page. Pages that never answered before the aggregate deadline
    /// (per-call timeout times page count) are reported as failed.
    pub fn dispatch(&self, images: Vec<PageImage>, page_count: usize) -> Vec<PageResult> {
        let Some(runtime) = self.runtime.as_ref() else {
            return (0..page_count).map(PageResult::failed).collect();
        };
        let client = Arc::clone(&self.client);
        let settings = self.settings;

        let slots = if Handle::try_current().is_ok() {
            // `block_on` may not nest inside a runtime; drive it from a
            // thread that is outside any runtime context.
            std::thread::scope(|scope| {
                scope
                    .spawn(|| run_batch(runtime, client, images, page_count, settings))
                    .join()
            })
            .unwrap_or_else(|_| {
                warn!("OCR batch thread panicked");
                vec![None; page_count]
            })
        } else {
            run_batch(runtime, client, images, page_count, settings)
        };

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| PageResult::failed(index)))
            .collect()
    }
}

impl Drop for OcrBatchCoordinator {
    fn drop(&mut self) {
        // Never blocks, so dropping is also safe inside an async context and
        // does not wait for calls still stuck past their timeout.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn run_batch(
    runtime: &Runtime,
    client: Arc<dyn OcrClient>,
    images: Vec<PageImage>,
    page_count: usize,
    settings: OcrSettings,
) -> Vec<Option<PageResult>> {
    let per_call = settings.per_call_timeout;
    let aggregate = per_call.saturating_mul(page_count.max(1) as u32);
    let permits = Arc::new(Semaphore::new(settings.max_workers.max(1)));
    let handle = runtime.handle().clone();

    let mut slots: Vec<Option<PageResult>> = vec![None; page_count];
    runtime.block_on(async {
        let deadline = tokio::time::Instant::now() + aggregate;
        let mut in_flight: FuturesUnordered<_> = images
            .into_iter()
            .map(|page| {
                ocr_page(
                    handle.clone(),
                    Arc::clone(&client),
                    Arc::clone(&permits),
                    page,
                    per_call,
                )
            })
            .collect();

        loop {
            match tokio::time::timeout_at(deadline, in_flight.next()).await {
                Ok(Some(result)) => {
                    let index = result.page_index;
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("OCR batch hit the aggregate timeout of {:?}", aggregate);
                    break;
                }
            }
        }
    });
    slots
}

/// Aborts the spawned call when the waiting side gives up on it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Waits for a worker slot, spawns the call on the pool and times it from
/// the waiting side, so a call that never yields still counts as timed out.
async fn ocr_page(
    handle: Handle,
    client: Arc<dyn OcrClient>,
    permits: Arc<Semaphore>,
    page: PageImage,
    timeout: Duration,
) -> PageResult {
    let page_index = page.page_index;
    let number = page_index + 1;
    let Ok(permit) = permits.acquire_owned().await else {
        return PageResult::failed(page_index);
    };

    let started = Instant::now();
    let mut call = AbortOnDrop(handle.spawn(async move {
        // Held until the call returns, even past its timeout.
        let _permit = permit;
        client.ocr(&page.jpeg).await
    }));

    match tokio::time::timeout(timeout, &mut call.0).await {
        Ok(Ok(Ok(response))) => {
            info!(
                "OCR page {} done in {:.2}s",
                number,
                started.elapsed().as_secs_f64()
            );
            PageResult::from_response(page_index, &response)
        }
        Ok(Ok(Err(err))) => {
            warn!("OCR page {} failed: {}", number, err);
            PageResult::failed(page_index)
        }
        Ok(Err(err)) => {
            warn!("OCR page {} task died: {}", number, err);
            PageResult::failed(page_index)
        }
        Err(_) => {
            warn!("OCR page {} timed out after {:?}", number, timeout);
            PageResult::failed(page_index)
        }
    }
}
