//! Question Listing Service
//!
//! Read-through orchestration of `GET /api/questions`: cacheability check,
//! server cache lookup, data-store query, tier truncation, per-caller
//! annotation, cache population. Mutation endpoints call `invalidate` after
//! their write commits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::{encode_listing, CachedValue, ServerQueryCache, FILTERS_KEY};
use crate::error::Result;
use crate::models::{
    Caller, FilterOptions, ListedQuestion, ListingParams, ListingQuery, ProgressStatus, Question,
    QuestionsResponse, StatusFilter, SubscriptionStatus, TagChange,
};
use crate::repository::{
    QuestionFilter, QuestionOrder, QuestionRepository, TagRow, TagUpdate, Window,
};
use crate::service::{
    build_filter_options, clean_tag_list, CacheDirective, CachePolicy, CacheStatus,
};

/// A listing response and how it may be cached downstream.
#[derive(Debug, Clone)]
pub struct Listing {
    pub response: Arc<QuestionsResponse>,
    pub directive: CacheDirective,
}

/// What the caller is allowed to see.
#[derive(Debug, Clone)]
struct AccessTier {
    subscription: Option<SubscriptionStatus>,
    /// `None` means unlimited
    max_questions: Option<u64>,
}

/// Outcome of a tag cleanup pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagCleanup {
    /// One entry per rewritten row
    pub changes: Vec<TagChange>,
    pub topics_removed: usize,
    pub companies_removed: usize,
}

// == Question Listing Service ==
pub struct QuestionListingService {
    repository: Arc<dyn QuestionRepository>,
    cache: ServerQueryCache,
    policy: CachePolicy,
    free_tier_limit: u64,
}

impl QuestionListingService {
    pub fn new(
        repository: Arc<dyn QuestionRepository>,
        cache: ServerQueryCache,
        policy: CachePolicy,
        free_tier_limit: u64,
    ) -> Self {
        Self {
            repository,
            cache,
            policy,
            free_tier_limit,
        }
    }

    pub fn cache(&self) -> &ServerQueryCache {
        &self.cache
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn repository(&self) -> &Arc<dyn QuestionRepository> {
        &self.repository
    }

    // == Invalidate ==
    /// Flushes the whole server cache after a committed write.
    pub async fn invalidate(&self, reason: &str) -> usize {
        let removed = self.cache.invalidate_all().await;
        info!(reason, removed, "listing cache invalidated");
        removed
    }

    // == List ==
    /// Serves one listing page from raw query parameters.
    pub async fn list(&self, caller: &Caller, params: &ListingParams) -> Result<Listing> {
        let query = params.normalize()?;
        self.list_query(caller, query).await
    }

    /// Serves one listing page from a normalized query.
    pub async fn list_query(&self, caller: &Caller, mut query: ListingQuery) -> Result<Listing> {
        // Anonymous callers only ever see the first page.
        let page_restricted = !caller.is_authenticated() && query.page > 1;
        if page_restricted {
            query.page = 1;
        }

        let cacheable = self.policy.is_cacheable(&query, page_restricted);
        let key = encode_listing(&query, Some(caller.identity()));

        if cacheable {
            if let Some(hit) = self.cache.get_listing(&key).await {
                return Ok(Listing {
                    response: hit.value,
                    directive: CacheDirective::Cacheable {
                        max_age: hit.remaining_ms / 1000,
                        created_at: hit.created_at,
                        status: CacheStatus::Hit,
                    },
                });
            }
        }

        let generation = self.cache.generation();
        let response = Arc::new(self.compute(caller, &query, page_restricted).await?);

        if !cacheable {
            return Ok(Listing {
                response,
                directive: CacheDirective::NoStore,
            });
        }

        // A write committed while computing makes this response stale for the cache.
        let ttl = self.policy.ttl_for(&query);
        let Some(created_at) = self
            .cache
            .set_if_generation(key, CachedValue::Listing(response.clone()), Some(ttl), generation)
            .await
        else {
            return Ok(Listing {
                response,
                directive: CacheDirective::NoStore,
            });
        };
        Ok(Listing {
            response,
            directive: CacheDirective::Cacheable {
                max_age: ttl.as_secs(),
                created_at,
                status: CacheStatus::Miss,
            },
        })
    }

    async fn compute(
        &self,
        caller: &Caller,
        query: &ListingQuery,
        page_restricted: bool,
    ) -> Result<QuestionsResponse> {
        let tier = self.access_tier(caller).await;
        let filter = QuestionFilter {
            search: Some(query.search.clone()).filter(|s| !s.is_empty()),
            difficulty: query.difficulty,
            topics: query.topics.clone(),
            companies: query.companies.clone(),
        };
        let order = QuestionOrder {
            field: query.sort_field,
            direction: query.sort_direction,
        };

        let (progress, note_counts) = match caller.user_id.as_deref() {
            Some(user_id) => (
                self.repository.progress_for(user_id).await?,
                self.repository.note_counts_for(user_id).await?,
            ),
            None => (HashMap::new(), HashMap::new()),
        };

        let status_of = |question: &Question| {
            progress
                .get(&question.id)
                .copied()
                .unwrap_or(ProgressStatus::NotDone)
        };

        let wanted_status = match query.status {
            StatusFilter::Done if caller.is_authenticated() => Some(ProgressStatus::Done),
            StatusFilter::NotDone if caller.is_authenticated() => Some(ProgressStatus::NotDone),
            _ => None,
        };

        let (mut rows, mut total_count) = match wanted_status {
            Some(status) => {
                let matching: Vec<Question> = self
                    .repository
                    .find_questions(&filter, order, Window::default())
                    .await?
                    .into_iter()
                    .filter(|q| status_of(q) == status)
                    .collect();
                let total = matching.len() as u64;
                let page: Vec<Question> = matching
                    .into_iter()
                    .skip(query.offset() as usize)
                    .take(query.limit as usize)
                    .collect();
                (page, total)
            }
            None => {
                let window = Window {
                    offset: query.offset(),
                    limit: Some(u64::from(query.limit)),
                };
                let page = self.repository.find_questions(&filter, order, window).await?;
                let total = self.repository.count_questions(&filter).await?;
                (page, total)
            }
        };

        let mut premium_required = false;
        if let Some(max) = tier.max_questions {
            if total_count > max {
                premium_required = true;
                total_count = max;
                let offset = query.offset();
                if offset >= max {
                    rows.clear();
                } else {
                    rows.truncate((max - offset) as usize);
                }
            }
        }

        let filters = self.filter_options().await?;

        let questions = rows
            .into_iter()
            .map(|mut question| {
                question.acceptance_rate = question.effective_acceptance_rate();
                let status = status_of(&question);
                let notes_count = note_counts.get(&question.id).copied().unwrap_or(0);
                ListedQuestion {
                    question,
                    status,
                    notes_count,
                }
            })
            .collect();

        debug!(
            caller = caller.identity(),
            total_count, "listing computed from data store"
        );

        Ok(QuestionsResponse {
            questions,
            total_count,
            filters: (*filters).clone(),
            subscription: tier.subscription,
            premium_required,
            is_authenticated: caller.is_authenticated(),
            is_page_restricted: page_restricted,
        })
    }

    // == Filter Options ==
    /// Tag universe, cached under its own key with the longer TTL.
    pub async fn filter_options(&self) -> Result<Arc<FilterOptions>> {
        if let Some(filters) = self.cache.get_filters().await {
            return Ok(filters);
        }
        let generation = self.cache.generation();
        let rows = self.repository.question_tags().await?;
        let filters = Arc::new(build_filter_options(&rows));
        self.cache
            .set_if_generation(
                FILTERS_KEY,
                CachedValue::Filters(filters.clone()),
                Some(self.policy.filters_ttl),
                generation,
            )
            .await;
        Ok(filters)
    }

    // == Admin Maintenance ==
    /// Flushes the server cache and rebuilds the tag universe from the store.
    pub async fn regenerate_filters(&self) -> Result<Arc<FilterOptions>> {
        self.invalidate("filters regenerated").await;
        self.filter_options().await
    }

    /// Rewrites every row whose tags are not already cleaned, deduplicated
    /// and sorted, then flushes the server cache.
    pub async fn cleanup_tags(&self) -> Result<TagCleanup> {
        let rows = self
            .repository
            .find_questions(
                &QuestionFilter::default(),
                QuestionOrder::default(),
                Window::default(),
            )
            .await?;

        let mut cleanup = TagCleanup::default();
        let mut updates = Vec::new();
        for question in rows {
            let topics = clean_tag_list(&question.topics);
            let companies = clean_tag_list(&question.companies);
            if topics == question.topics && companies == question.companies {
                continue;
            }
            cleanup.topics_removed += question.topics.len().saturating_sub(topics.len());
            cleanup.companies_removed += question.companies.len().saturating_sub(companies.len());
            cleanup.changes.push(TagChange {
                question_id: question.id.clone(),
                old_topics: question.topics,
                new_topics: topics.clone(),
                old_companies: question.companies,
                new_companies: companies.clone(),
            });
            updates.push(TagUpdate {
                question_id: question.id,
                tags: TagRow { topics, companies },
            });
        }

        let updated = self.repository.replace_tags(updates).await?;
        info!(updated, "question tags cleaned up");
        self.invalidate("tags cleaned up").await;
        Ok(cleanup)
    }

    async fn access_tier(&self, caller: &Caller) -> AccessTier {
        let free = AccessTier {
            subscription: None,
            max_questions: Some(self.free_tier_limit),
        };
        let Some(user_id) = caller.user_id.as_deref() else {
            return free;
        };

        // A failed lookup falls back to free-tier limits.
        let subscription = match self.repository.subscription_for(user_id).await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(user_id, "subscription lookup failed: {}", err);
                None
            }
        };

        match subscription {
            Some(sub) if sub.is_current(Utc::now()) => AccessTier {
                subscription: Some(SubscriptionStatus {
                    access_level: sub.plan.clone(),
                    max_questions: None,
                    is_active: true,
                    plan_name: sub.plan,
                    end_date: Some(sub.end_date),
                    can_access_all: true,
                }),
                max_questions: None,
            },
            _ => AccessTier {
                subscription: Some(SubscriptionStatus {
                    access_level: "FREE".to_string(),
                    max_questions: Some(self.free_tier_limit),
                    is_active: false,
                    plan_name: "Free Plan".to_string(),
                    end_date: None,
                    can_access_all: false,
                }),
                ..free
            },
        }
    }
}
