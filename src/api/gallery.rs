//! Gallery endpoints.

use axum::extract::{Path, Query, State};
use serde::Serialize;

use super::{loaded, success, ApiResult, LangQuery};
use crate::models::{AstroImage, Category, Tag};
use crate::view::gallery::{active_modal_image, GalleryParams};
use crate::view::sanitize::sanitize_opt;
use crate::AppState;

/// Path of the gallery page the links point at.
pub const GALLERY_PATH: &str = "/astrophotography";

#[derive(Debug, Serialize)]
pub struct GalleryImage {
    #[serde(flatten)]
    pub image: AstroImage,
    /// Gallery URL with this image's modal open
    pub href: String,
    /// Display labels for camera, telescope and tracker
    pub equipment: Vec<String>,
}

impl GalleryImage {
    fn new(image: AstroImage, params: &GalleryParams) -> Self {
        Self {
            href: params.open_modal(&image).href(GALLERY_PATH),
            equipment: image.equipment_labels(),
            image,
        }
    }
}

/// Sidebar tag with the gallery URL that selects it.
#[derive(Debug, Serialize)]
pub struct TagLink {
    #[serde(flatten)]
    pub tag: Tag,
    pub href: String,
    pub active: bool,
}

/// Category with the gallery URL that switches to it.
#[derive(Debug, Serialize)]
pub struct CategoryLink {
    #[serde(flatten)]
    pub category: Category,
    pub href: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryView {
    pub params: GalleryParams,
    pub images: Vec<GalleryImage>,
    pub tags: Vec<TagLink>,
    /// Gallery URL with the tag filter removed, when one is set
    pub clear_tag_href: Option<String>,
    pub modal_image: Option<GalleryImage>,
    /// Gallery URL with the modal closed, when it is open
    pub close_href: Option<String>,
    /// Served from a stale entry while a refresh runs
    pub is_refreshing: bool,
}

/// GET /api/gallery?filter=&tag=&img= - Image grid, tag sidebar and modal.
pub async fn get_gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<GalleryView> {
    let lang = lang.resolve(&state.config.default_lang);

    let (images, tags) = tokio::join!(
        state
            .queries
            .astro_images(params.filter.as_deref(), params.tag.as_deref(), &lang),
        state.queries.tags(params.filter.as_deref(), &lang),
    );
    let is_refreshing = images.is_fetching;
    let mut images = loaded(images)?;
    let tags = loaded(tags)?;

    for image in &mut images {
        sanitize_opt(&mut image.description);
    }

    let modal_image = active_modal_image(&images, params.img.as_deref())
        .map(|image| GalleryImage::new(image.clone(), &params));
    let close_href = modal_image
        .as_ref()
        .map(|_| params.close_modal().href(GALLERY_PATH));

    let images = images
        .into_iter()
        .map(|image| GalleryImage::new(image, &params))
        .collect();

    let tags = tags
        .into_iter()
        .map(|tag| TagLink {
            href: params.with_tag(Some(&tag.slug)).href(GALLERY_PATH),
            active: params.tag.as_deref() == Some(tag.slug.as_str()),
            tag,
        })
        .collect();
    let clear_tag_href = params
        .tag
        .as_ref()
        .map(|_| params.with_tag(None).href(GALLERY_PATH));

    success(GalleryView {
        params,
        images,
        tags,
        clear_tag_href,
        modal_image,
        close_href,
        is_refreshing,
    })
}

/// GET /api/gallery/{slug} - One image.
pub async fn get_gallery_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<AstroImage> {
    let lang = lang.resolve(&state.config.default_lang);
    let mut image = loaded(state.queries.astro_image(&slug, &lang).await)?;
    sanitize_opt(&mut image.description);
    success(image)
}

/// GET /api/categories - Gallery categories with their gallery links.
pub async fn list_categories(
    State(state): State<AppState>,
    Query(lang): Query<LangQuery>,
) -> ApiResult<Vec<CategoryLink>> {
    let lang = lang.resolve(&state.config.default_lang);
    let categories = loaded(state.queries.categories(&lang).await)?;

    let links = categories
        .into_iter()
        .map(|category| CategoryLink {
            href: GalleryParams::default()
                .with_filter(Some(&category.slug))
                .href(GALLERY_PATH),
            category,
        })
        .collect();
    success(links)
}
