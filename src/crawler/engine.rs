//! Crawl engine - depth-first crawl orchestration
//!
//! This module contains the main crawl loop, including:
//! - Seeding the frontier from canonicalized seed URLs
//! - Fetching pages through the retry policy
//! - Extracting and classifying links
//! - Persisting page and link rows
//! - Stopping on an empty frontier, an exhausted page budget, or cancellation

use crate::classify::{
    GeminiOptions, GeminiScorer, KeywordClassifier, KeywordScorer, LinkCandidate, OpenAiOptions,
    OpenAiScorer, PriorityTier, RelevancyScore, RelevancyScorer, ScorerUnavailable,
};
use crate::config::{CrawlSettings, ScorerKind};
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::{ExtractedLink, HtmlLinkExtractor, LinkExtractor};
use crate::crawler::summary::{CrawlSummary, Termination};
use crate::crawler::visited::VisitedSet;
use crate::storage::{LinkRecord, PageRecord, SqliteStorage, Storage};
use crate::url::canonicalize_url;
use crate::CrawlError;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Depth-first crawler over one seed set
pub struct CrawlEngine {
    settings: CrawlSettings,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn LinkExtractor + Send + Sync>,
    scorer: Arc<dyn RelevancyScorer>,
    storage: Box<dyn Storage + Send>,
    cancel: CancellationToken,
}

impl CrawlEngine {
    /// Creates an engine from its collaborators
    ///
    /// # Arguments
    ///
    /// * `settings` - Limits, keyword sets and retry policy for the run
    /// * `fetcher` - Performs single HTTP attempts
    /// * `extractor` - Turns page bodies into links
    /// * `scorer` - Rates link relevancy; failures fall back to keywords
    /// * `storage` - Receives page and link rows
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn Fetcher>,
        extractor: Box<dyn LinkExtractor + Send + Sync>,
        scorer: Arc<dyn RelevancyScorer>,
        storage: Box<dyn Storage + Send>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
            scorer,
            storage,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the crawl between pages
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Crawls depth-first from `seeds`
    ///
    /// Seeds are canonicalized and deduplicated; invalid seeds are logged and
    /// skipped. Per-URL failures are recorded on the page row and never abort
    /// the run. Only storage failures are fatal.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run finished, ran out of budget, or was cancelled
    /// * `Err(CrawlError)` - A page or link row could not be written
    pub async fn crawl(&mut self, seeds: &[String]) -> Result<CrawlSummary, CrawlError> {
        let mut summary = CrawlSummary::default();
        let mut enqueued = VisitedSet::new();
        let mut fetched = VisitedSet::new();
        let mut frontier = Frontier::new();

        let mut accepted = Vec::with_capacity(seeds.len());
        for seed in seeds {
            match canonicalize_url(seed) {
                Ok(canonical) => {
                    if enqueued.mark_if_new(&canonical) {
                        accepted.push(canonical);
                    } else {
                        tracing::debug!("Duplicate seed skipped: {}", seed);
                    }
                }
                Err(e) => tracing::warn!("Skipping invalid seed {}: {}", seed, e),
            }
        }
        frontier.push_seeds(accepted);

        tracing::info!(
            "Starting crawl: {} seeds, max depth {}, max pages {}, scorer {}",
            frontier.pending(),
            self.settings.max_depth,
            self.settings
                .max_pages
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
            self.scorer.name()
        );

        let start_time = Instant::now();

        let termination = loop {
            if frontier.is_empty() {
                break Termination::Completed;
            }
            if self.budget_exhausted(&summary) {
                tracing::info!("Page budget of {} reached", summary.pages_fetched);
                break Termination::BudgetExhausted;
            }
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled");
                break Termination::Cancelled;
            }

            let Some((index, entry)) = frontier.pop() else {
                break Termination::Completed;
            };
            let entry = entry.clone();

            if entry.depth > self.settings.max_depth {
                continue;
            }
            if !fetched.mark_if_new(&entry.url) {
                tracing::debug!("Already fetched: {}", entry.url);
                continue;
            }

            self.visit(index, &entry, &mut frontier, &mut enqueued, &mut summary)
                .await?;

            if summary.pages_fetched % 10 == 0 {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {} pages, {} links, {} in frontier, {:.2} pages/sec",
                    summary.pages_fetched,
                    summary.links_discovered,
                    frontier.pending(),
                    summary.pages_fetched as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }
        };

        let discarded = frontier.discard();
        if discarded > 0 {
            tracing::info!("Discarded {} unvisited frontier entries", discarded);
        }
        summary.frontier_discarded = discarded as u64;
        summary.termination = termination;

        tracing::info!(
            "Crawl {}: {} pages ({} failed), {} links in {:?}",
            termination,
            summary.pages_fetched,
            summary.pages_failed,
            summary.links_discovered,
            start_time.elapsed()
        );

        Ok(summary)
    }

    fn budget_exhausted(&self, summary: &CrawlSummary) -> bool {
        self.settings
            .max_pages
            .map_or(false, |max| summary.pages_fetched >= u64::from(max))
    }

    /// Fetches one frontier entry and records everything learned from it
    async fn visit(
        &mut self,
        index: usize,
        entry: &FrontierEntry,
        frontier: &mut Frontier,
        enqueued: &mut VisitedSet,
        summary: &mut CrawlSummary,
    ) -> Result<(), CrawlError> {
        tracing::debug!(
            "Fetching {} (depth {}, from {})",
            entry.url,
            entry.depth,
            frontier.parent_url(index).unwrap_or("seed")
        );

        let response = match self
            .settings
            .retry
            .fetch_with_retry(self.fetcher.as_ref(), &entry.url)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Failed to fetch {}: {}", entry.url, err);
                let page = PageRecord {
                    url: entry.url.clone(),
                    fetched_at: Utc::now(),
                    status_code: err.status,
                    title: None,
                    depth: entry.depth,
                    error: Some(err.to_string()),
                };
                return self.record_page(&page, summary);
            }
        };

        let parsed = match self
            .extractor
            .extract(&response.body, &response.final_url)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!("Failed to extract links from {}: {}", entry.url, err);
                let page = PageRecord {
                    url: entry.url.clone(),
                    fetched_at: Utc::now(),
                    status_code: Some(response.status_code),
                    title: None,
                    depth: entry.depth,
                    error: Some(err.to_string()),
                };
                return self.record_page(&page, summary);
            }
        };

        let page = PageRecord {
            url: entry.url.clone(),
            fetched_at: Utc::now(),
            status_code: Some(response.status_code),
            title: parsed.title.clone(),
            depth: entry.depth,
            error: None,
        };
        self.record_page(&page, summary)?;

        let total = parsed.links.len();
        let links = &parsed.links[..total.min(self.settings.max_links_per_page)];
        if links.len() < total {
            tracing::debug!(
                "Capped {} links on {} to {}",
                total,
                entry.url,
                links.len()
            );
        }

        let child_depth = entry.depth + 1;
        let follow = child_depth <= self.settings.max_depth;

        let candidates: Vec<LinkCandidate<'_>> = links
            .iter()
            .map(|link| LinkCandidate {
                url: &link.url,
                text: &link.text,
                context: &link.context,
            })
            .collect();
        let mut verdicts = self.scorer.score_page(&candidates).await.into_iter();

        let mut records = Vec::with_capacity(links.len());
        let mut children = Vec::new();

        for link in links {
            let canonical = canonicalize_url(&link.url).ok();
            let target_url = canonical.clone().unwrap_or_else(|| link.url.clone());

            let verdict = verdicts
                .next()
                .unwrap_or_else(|| Err(ScorerUnavailable::new("no verdict returned")));
            let (tier, score) = combine_verdict(
                &self.settings.classifier,
                self.scorer.name(),
                link,
                verdict,
                summary,
            );
            summary.links_by_tier.record(tier);

            records.push(LinkRecord {
                source_page_url: entry.url.clone(),
                target_url,
                anchor_context: link.context.clone(),
                priority_tier: tier,
                relevancy_score: score,
                discovered_at: Utc::now(),
            });

            if let Some(canonical) = canonical {
                if follow && enqueued.mark_if_new(&canonical) {
                    children.push(canonical);
                }
            }
        }

        let written = self.storage.insert_links(&records)?;
        summary.links_discovered += written as u64;

        tracing::info!(
            "Crawled {} (depth {}): {} links, {} queued",
            entry.url,
            entry.depth,
            written,
            children.len()
        );

        frontier.push_children(index, children);
        Ok(())
    }

    fn record_page(
        &mut self,
        page: &PageRecord,
        summary: &mut CrawlSummary,
    ) -> Result<(), CrawlError> {
        if !self.storage.insert_page(page)? {
            tracing::debug!("Page {} already recorded by an earlier run", page.url);
        }

        summary.pages_fetched += 1;
        if page.is_failed() {
            summary.pages_failed += 1;
        }
        Ok(())
    }
}

/// Combines the keyword tier with the scorer verdict, keeping the higher tier
fn combine_verdict(
    classifier: &KeywordClassifier,
    scorer_name: &str,
    link: &ExtractedLink,
    verdict: Result<RelevancyScore, ScorerUnavailable>,
    summary: &mut CrawlSummary,
) -> (PriorityTier, Option<f64>) {
    let keyword_tier = classifier.tier(&link.context, &link.url);

    match verdict {
        Ok(verdict) => {
            let tier = keyword_tier.max(verdict.tier);
            tracing::debug!(
                "{} -> {} (keywords {}, {} {:.2}: {})",
                link.url,
                tier,
                keyword_tier,
                scorer_name,
                verdict.score,
                verdict.rationale
            );
            (tier, Some(verdict.score))
        }
        Err(err) => {
            tracing::warn!("{}; using keyword tier for {}", err, link.url);
            let matches = classifier.matches(&link.context, &link.url);
            tracing::debug!(
                "{} -> {} (high {:?}, medium {:?})",
                link.url,
                keyword_tier,
                matches.high,
                matches.medium
            );
            summary.scorer_fallbacks += 1;
            (keyword_tier, None)
        }
    }
}

/// Picks the relevancy scorer named by the settings
///
/// The LLM scorers need an API key from the environment. Without one the
/// keyword scorer is used and a warning is logged.
pub fn build_scorer(settings: &CrawlSettings) -> Result<Arc<dyn RelevancyScorer>, CrawlError> {
    let scorer = &settings.scorer;
    let keyword = || -> Arc<dyn RelevancyScorer> {
        Arc::new(KeywordScorer::new(settings.classifier.clone()))
    };

    let key_env = match scorer.kind {
        ScorerKind::Keyword => return Ok(keyword()),
        ScorerKind::OpenAi => &scorer.api_key_env,
        ScorerKind::Gemini => &scorer.gemini.api_key_env,
    };

    let api_key = match std::env::var(key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!("{} is not set; falling back to keyword scoring", key_env);
            return Ok(keyword());
        }
    };

    let timeout = Duration::from_secs(scorer.timeout_secs);
    let built: Arc<dyn RelevancyScorer> = match scorer.kind {
        ScorerKind::Gemini => {
            let options = GeminiOptions {
                endpoint: scorer.gemini.endpoint.clone(),
                model: scorer.gemini.model.clone(),
                api_key,
                temperature: scorer.temperature,
                timeout,
                calls_per_minute: scorer.calls_per_minute,
                batch_size: scorer.gemini.batch_size,
            };
            Arc::new(GeminiScorer::new(options, &settings.classifier)?)
        }
        _ => {
            let options = OpenAiOptions {
                endpoint: scorer.endpoint.clone(),
                model: scorer.model.clone(),
                api_key,
                temperature: scorer.temperature,
                timeout,
                calls_per_minute: scorer.calls_per_minute,
            };
            Arc::new(OpenAiScorer::new(options, &settings.classifier)?)
        }
    };

    Ok(built)
}

/// Runs a complete crawl with the production collaborators
///
/// This function:
///
/// 1. Opens (and optionally clears) the SQLite database
/// 2. Builds the HTTP client and relevancy scorer
/// 3. Crawls the configured seeds until done, out of budget, or cancelled
///
/// # Arguments
///
/// * `settings` - Resolved crawl settings
/// * `fresh` - Clear both tables before crawling
/// * `cancel` - Stops the crawl between pages when cancelled
///
/// # Example
///
/// ```no_run
/// use linkscout::config::{load_config, Overrides};
/// use linkscout::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("linkscout.toml"))?;
/// let settings = config.resolve(&Overrides::default());
/// let summary = run_crawl(settings, false, CancellationToken::new()).await?;
/// println!("{} pages", summary.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    settings: CrawlSettings,
    fresh: bool,
    cancel: CancellationToken,
) -> Result<CrawlSummary, CrawlError> {
    let mut storage = SqliteStorage::new(&settings.database_path)?;
    if fresh {
        tracing::info!("Clearing {}", settings.database_path.display());
        storage.clear()?;
    }

    let client = build_http_client(&settings.user_agent, settings.request_timeout)?;
    let scorer = build_scorer(&settings)?;
    let seeds = settings.seeds.clone();

    let mut engine = CrawlEngine::new(
        settings,
        Arc::new(HttpFetcher::new(client)),
        Box::new(HtmlLinkExtractor),
        scorer,
        Box::new(storage),
    )
    .with_cancellation(cancel);

    engine.crawl(&seeds).await
}
