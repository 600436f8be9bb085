//! Post bodies arrive as JSON or as multipart forms carrying an `image`
//! file; both end up as one `PostInput`.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, http::header, web};
use futures::TryStreamExt;

use quill_core::ports::{ImageStore, StorageError};
use quill_core::services::PostInput;
use quill_core::validation::split_tags;
use quill_shared::dto::{PostFields, TagList};

use crate::middleware::error::{AppError, AppResult, JSON_LIMIT};

const IMAGE_FIELD: &str = "image";

/// An uploaded file held in memory until the whole form has been read.
pub struct PendingImage {
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A parsed post body. The image is not stored until `into_input`.
#[derive(Default)]
pub struct PostForm {
    pub input: PostInput,
    pub image: Option<PendingImage>,
}

impl PostForm {
    pub async fn read(
        req: &HttpRequest,
        payload: web::Payload,
        max_image_bytes: usize,
    ) -> AppResult<Self> {
        if is_multipart(req) {
            Self::from_multipart(Multipart::new(req.headers(), payload), max_image_bytes).await
        } else {
            Self::from_json(payload).await
        }
    }

    /// Store the pending image, if any, and hand back the service input.
    pub async fn into_input(self, images: &dyn ImageStore) -> AppResult<PostInput> {
        let mut input = self.input;
        if let Some(image) = self.image {
            let filename = images
                .store(
                    image.original_name.as_deref(),
                    image.content_type.as_deref(),
                    image.bytes,
                )
                .await?;
            input.featured_image = Some(filename);
        }
        Ok(input)
    }

    async fn from_json(payload: web::Payload) -> AppResult<Self> {
        let bytes = payload
            .to_bytes_limited(JSON_LIMIT)
            .await
            .map_err(|_| AppError::BadRequest("Request body is too large".into()))?
            .map_err(|e| AppError::BadRequest(format!("Failed to read body: {}", e)))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let fields: PostFields = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

        // Stored filenames only come from uploads; JSON may only point
        // at an external image.
        if let Some(url) = &fields.featured_image {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::BadRequest(
                    "featuredImage must be an absolute http(s) URL".into(),
                ));
            }
        }

        Ok(Self {
            input: PostInput {
                title: fields.title,
                content: fields.content,
                category: fields.category,
                excerpt: fields.excerpt,
                tags: fields.tags.map(|tags| match tags {
                    TagList::List(list) => list,
                    TagList::Csv(raw) => split_tags(&raw),
                }),
                featured_image: fields.featured_image,
            },
            image: None,
        })
    }

    async fn from_multipart(mut multipart: Multipart, max_image_bytes: usize) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.try_next().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .filter(|filename| !filename.is_empty())
                    .map(String::from);
                // Browsers send an unnamed empty part for an untouched file input.
                if original_name.is_none() {
                    read_field(&mut field, max_image_bytes).await?;
                    continue;
                }

                let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
                if !content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
                    return Err(StorageError::NotAnImage.into());
                }

                let bytes = read_field(&mut field, max_image_bytes)
                    .await?
                    .ok_or(StorageError::TooLarge(max_image_bytes))?;
                form.image = Some(PendingImage {
                    original_name,
                    content_type,
                    bytes,
                });
                continue;
            }

            let bytes = read_field(&mut field, JSON_LIMIT)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Field '{}' is too large", name)))?;
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::BadRequest(format!("Field '{}' is not UTF-8", name)))?;

            let input = &mut form.input;
            match name.as_str() {
                "title" => input.title = Some(value),
                "content" => input.content = Some(value),
                "category" => input.category = Some(value),
                "excerpt" => input.excerpt = Some(value),
                "tags" | "tags[]" => input
                    .tags
                    .get_or_insert_with(Vec::new)
                    .extend(split_tags(&value)),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Read a whole field, or `None` once it grows past `limit`.
async fn read_field(field: &mut Field, limit: usize) -> AppResult<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

fn bad_multipart(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {}", err))
}
