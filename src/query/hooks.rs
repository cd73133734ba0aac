//! Per-resource query bindings.
//!
//! Each method pairs one service function with its cache key and staleness
//! window, so every caller asking for the same resource, filters and language
//! shares one cached result.

use std::time::Duration;

use super::{QueryCache, QueryKey, QueryState};
use crate::models::{AstroImage, BackgroundImage, Category, MainPageLocation, Project, Tag, UserProfile};
use crate::services::Services;

/// Staleness windows per resource.
pub mod stale {
    use std::time::Duration;

    pub const IMAGES: Duration = Duration::from_secs(5 * 60);
    pub const IMAGE_DETAIL: Duration = Duration::from_secs(10 * 60);
    pub const TAGS: Duration = Duration::from_secs(10 * 60);
    pub const PROJECTS: Duration = Duration::from_secs(30 * 60);
    pub const TRAVEL: Duration = Duration::from_secs(30 * 60);
    pub const CATEGORIES: Duration = Duration::from_secs(60 * 60);
    pub const PROFILE: Duration = Duration::from_secs(60 * 60);
    pub const BACKGROUND: Duration = Duration::from_secs(60 * 60);
}

/// Resource names used in cache keys.
pub mod resources {
    pub const PROFILE: &str = "profile";
    pub const BACKGROUND: &str = "background";
    pub const IMAGES: &str = "images";
    pub const IMAGE: &str = "image";
    pub const TAGS: &str = "tags";
    pub const CATEGORIES: &str = "categories";
    pub const PROJECTS: &str = "projects";
    pub const TRAVEL_HIGHLIGHTS: &str = "travel-highlights";
    pub const TRAVEL_HIGHLIGHT: &str = "travel-highlight";

    pub const ALL: &[&str] = &[
        PROFILE,
        BACKGROUND,
        IMAGES,
        IMAGE,
        TAGS,
        CATEGORIES,
        PROJECTS,
        TRAVEL_HIGHLIGHTS,
        TRAVEL_HIGHLIGHT,
    ];
}

/// Cached access to every content API resource.
#[derive(Debug, Clone)]
pub struct PortfolioQueries {
    cache: QueryCache,
    services: Services,
}

impl PortfolioQueries {
    pub fn new(services: Services) -> Self {
        Self {
            cache: QueryCache::new(),
            services,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn profile(&self, lang: &str) -> QueryState<UserProfile> {
        let services = self.services.clone();
        let lang_tag = lang.to_string();
        self.cache
            .fetch(QueryKey::new(resources::PROFILE, lang), stale::PROFILE, move || async move {
                services.fetch_profile(&lang_tag).await
            })
            .await
    }

    pub async fn background(&self, lang: &str) -> QueryState<Option<BackgroundImage>> {
        let services = self.services.clone();
        let lang_tag = lang.to_string();
        self.cache
            .fetch(QueryKey::new(resources::BACKGROUND, lang), stale::BACKGROUND, move || async move {
                services.fetch_background(&lang_tag).await
            })
            .await
    }

    pub async fn astro_images(
        &self,
        filter: Option<&str>,
        tag: Option<&str>,
        lang: &str,
    ) -> QueryState<Vec<AstroImage>> {
        let key = QueryKey::new(resources::IMAGES, lang)
            .param("filter", filter)
            .param("tag", tag);
        let services = self.services.clone();
        let (filter, tag, lang_tag) = (owned(filter), owned(tag), lang.to_string());
        self.cache
            .fetch(key, stale::IMAGES, move || async move {
                services
                    .fetch_astro_images(filter.as_deref(), tag.as_deref(), &lang_tag)
                    .await
            })
            .await
    }

    pub async fn astro_image(&self, slug: &str, lang: &str) -> QueryState<AstroImage> {
        let key = QueryKey::new(resources::IMAGE, lang).param("slug", Some(slug));
        let services = self.services.clone();
        let (slug, lang_tag) = (slug.to_string(), lang.to_string());
        self.cache
            .fetch(key, stale::IMAGE_DETAIL, move || async move {
                services.fetch_astro_image(&slug, &lang_tag).await
            })
            .await
    }

    pub async fn tags(&self, filter: Option<&str>, lang: &str) -> QueryState<Vec<Tag>> {
        let key = QueryKey::new(resources::TAGS, lang).param("filter", filter);
        let services = self.services.clone();
        let (filter, lang_tag) = (owned(filter), lang.to_string());
        self.cache
            .fetch(key, stale::TAGS, move || async move {
                services.fetch_tags(filter.as_deref(), &lang_tag).await
            })
            .await
    }

    pub async fn categories(&self, lang: &str) -> QueryState<Vec<Category>> {
        let services = self.services.clone();
        let lang_tag = lang.to_string();
        self.cache
            .fetch(QueryKey::new(resources::CATEGORIES, lang), stale::CATEGORIES, move || async move {
                services.fetch_categories(&lang_tag).await
            })
            .await
    }

    pub async fn projects(&self, lang: &str) -> QueryState<Vec<Project>> {
        let services = self.services.clone();
        let lang_tag = lang.to_string();
        self.cache
            .fetch(QueryKey::new(resources::PROJECTS, lang), stale::PROJECTS, move || async move {
                services.fetch_projects(&lang_tag).await
            })
            .await
    }

    pub async fn travel_highlights(&self, lang: &str) -> QueryState<Vec<MainPageLocation>> {
        let services = self.services.clone();
        let lang_tag = lang.to_string();
        self.cache
            .fetch(QueryKey::new(resources::TRAVEL_HIGHLIGHTS, lang), stale::TRAVEL, move || async move {
                services.fetch_travel_highlights(&lang_tag).await
            })
            .await
    }

    pub async fn travel_highlight(
        &self,
        country: &str,
        place: Option<&str>,
        lang: &str,
    ) -> QueryState<MainPageLocation> {
        let key = QueryKey::new(resources::TRAVEL_HIGHLIGHT, lang)
            .param("country", Some(country))
            .param("place", place);
        let services = self.services.clone();
        let (country, place, lang_tag) = (country.to_string(), owned(place), lang.to_string());
        self.cache
            .fetch(key, stale::TRAVEL, move || async move {
                services
                    .fetch_travel_highlight(&country, place.as_deref(), &lang_tag)
                    .await
            })
            .await
    }

    /// Drop cached entries for one resource, or all of them.
    pub fn invalidate(&self, resource: Option<&str>) -> usize {
        match resource {
            Some(resource) => self.cache.invalidate(resource),
            None => self.cache.clear(),
        }
    }

    /// Evict entries nobody has read within `max_idle`.
    pub fn collect_garbage(&self, max_idle: Duration) -> usize {
        let removed = self.cache.prune(max_idle);
        if removed > 0 {
            tracing::debug!(removed, "Pruned idle query cache entries");
        }
        removed
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}
