//! Upload form, results view and the two actions that move between them.
//!
//! GET  /        current view for the session
//! POST /submit  multipart upload (`front_cover`, `back_cover`)
//! POST /next    clear the listing and go back to the form

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use crate::common::image::UploadedImage;
use crate::domains::listings::ListingExtractor;
use crate::server::app::AppState;
use crate::server::session::{Notice, PageEvent, PageMode, PageState};
use crate::server::views::render_page;

pub const SESSION_COOKIE: &str = "book_lister_session";

const FRONT_FIELD: &str = "front_cover";
const BACK_FIELD: &str = "back_cover";

/// A file part as received, before format validation.
#[derive(Debug, Clone, Default)]
pub struct RawUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// Both form inputs. A browser sends an empty part when no file is chosen.
#[derive(Debug, Clone, Default)]
pub struct CoverUploads {
    pub front: Option<RawUpload>,
    pub back: Option<RawUpload>,
}

/// Run one submit action against the current page state.
///
/// Validation happens before any call: missing or unreadable images never
/// reach the extractor. Only the input form accepts a submit; on the results
/// view it is a no-op.
pub async fn submit_listing(
    state: PageState,
    uploads: CoverUploads,
    extractor: &ListingExtractor,
) -> (PageState, Option<Notice>) {
    if state.mode() == PageMode::Results {
        info!("Submit ignored while showing results");
        return (state, None);
    }

    let (front, back) = match (present(uploads.front), present(uploads.back)) {
        (Some(front), Some(back)) => (front, back),
        _ => return state.apply(PageEvent::MissingImages),
    };

    let validated = UploadedImage::from_upload(
        "Front cover",
        front.bytes,
        front.content_type.as_deref(),
        front.file_name.as_deref(),
    )
    .and_then(|front_image| {
        UploadedImage::from_upload(
            "Back cover",
            back.bytes,
            back.content_type.as_deref(),
            back.file_name.as_deref(),
        )
        .map(|back_image| (front_image, back_image))
    });

    let (front, back) = match validated {
        Ok(images) => images,
        Err(e) => return state.apply(PageEvent::InvalidUpload(e.to_string())),
    };

    match extractor.extract(&front, &back).await {
        Ok(listing) => state.apply(PageEvent::ExtractionSucceeded(listing)),
        Err(e) => {
            warn!(error = %e, "Listing extraction failed");
            state.apply(PageEvent::ExtractionFailed(e.to_string()))
        }
    }
}

fn present(upload: Option<RawUpload>) -> Option<RawUpload> {
    upload.filter(|u| !u.bytes.is_empty())
}

pub async fn index_handler(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let (session_id, page) = state.sessions.resolve(session_cookie(&headers)).await;
    with_session_cookie(Html(render_page(&page, None)).into_response(), &session_id)
}

pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let (session_id, page) = state.sessions.resolve(session_cookie(&headers)).await;

    let (page, notice) = match read_uploads(multipart).await {
        Ok(uploads) => submit_listing(page, uploads, &state.extractor).await,
        Err(reason) => page.apply(reason),
    };

    state.sessions.save(&session_id, page.clone()).await;

    let response = match notice {
        None => Redirect::to("/").into_response(),
        Some(notice) => {
            let status = match notice {
                Notice::Warning(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Notice::Error(_) => StatusCode::BAD_GATEWAY,
            };
            (status, Html(render_page(&page, Some(&notice)))).into_response()
        }
    };
    with_session_cookie(response, &session_id)
}

pub async fn next_handler(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let (session_id, page) = state.sessions.resolve(session_cookie(&headers)).await;
    let (page, _) = page.apply(PageEvent::Reset);
    state.sessions.save(&session_id, page).await;

    info!(session = %session_id, "Listing cleared");
    with_session_cookie(Redirect::to("/").into_response(), &session_id)
}

/// Collect the two file parts. A body that cannot be read at all counts as
/// missing images; an oversized one gets its own warning.
async fn read_uploads(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<CoverUploads, PageEvent> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Submit without a multipart body");
        PageEvent::MissingImages
    })?;

    let mut uploads = CoverUploads::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_failure(e.status(), &e.body_text())),
        };

        let name = field.name().unwrap_or_default().to_string();
        if name != FRONT_FIELD && name != BACK_FIELD {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_failure(e.status(), &e.body_text()))?;

        let upload = RawUpload {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        };
        if name == FRONT_FIELD {
            uploads.front = Some(upload);
        } else {
            uploads.back = Some(upload);
        }
    }

    Ok(uploads)
}

fn multipart_failure(status: StatusCode, detail: &str) -> PageEvent {
    warn!(status = %status, detail, "Failed to read upload");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        PageEvent::InvalidUpload("The uploaded images are too large.".to_string())
    } else {
        PageEvent::MissingImages
    }
}

/// Extract the session id from the `Cookie` header
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn with_session_cookie(mut response: Response, session_id: &str) -> Response {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, session_id
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "Session id is not a valid header value"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::common::image::fixtures::{JPEG_BYTES, PNG_BYTES};
    use crate::domains::listings::BookCondition;
    use crate::kernel::MockAI;
    use crate::server::session::MISSING_IMAGES_WARNING;
    use serde_json::json;

    fn upload(bytes: &[u8]) -> Option<RawUpload> {
        Some(RawUpload {
            bytes: bytes.to_vec(),
            ..Default::default()
        })
    }

    fn dune_ai() -> Arc<MockAI> {
        Arc::new(MockAI::new().with_json_response(&json!({
            "book_title": "Dune",
            "book_description": "Sci-fi classic...",
            "book_condition": "Good",
        })))
    }

    #[tokio::test]
    async fn zero_or_one_image_never_calls_extractor() {
        let ai = dune_ai();
        let extractor = ListingExtractor::new(ai.clone());

        for uploads in [
            CoverUploads::default(),
            CoverUploads { front: upload(PNG_BYTES), back: None },
            CoverUploads { front: None, back: upload(JPEG_BYTES) },
            CoverUploads { front: upload(PNG_BYTES), back: upload(b"") },
        ] {
            let (state, notice) = submit_listing(PageState::new(), uploads, &extractor).await;
            assert_eq!(state.mode(), PageMode::InputForm);
            assert_eq!(notice, Some(Notice::Warning(MISSING_IMAGES_WARNING.into())));
        }

        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_format_never_calls_extractor() {
        let ai = dune_ai();
        let extractor = ListingExtractor::new(ai.clone());
        let uploads = CoverUploads {
            front: upload(PNG_BYTES),
            back: Some(RawUpload {
                bytes: b"GIF89a....".to_vec(),
                content_type: Some("image/gif".into()),
                file_name: Some("back.gif".into()),
            }),
        };

        let (state, notice) = submit_listing(PageState::new(), uploads, &extractor).await;

        assert_eq!(state.mode(), PageMode::InputForm);
        assert_eq!(
            notice,
            Some(Notice::Warning("Back cover is not a PNG or JPEG image".into()))
        );
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn two_images_and_conforming_reply_show_results() {
        let extractor = ListingExtractor::new(dune_ai());
        let uploads = CoverUploads { front: upload(PNG_BYTES), back: upload(JPEG_BYTES) };

        let (state, notice) = submit_listing(PageState::new(), uploads, &extractor).await;

        assert!(notice.is_none());
        assert_eq!(state.mode(), PageMode::Results);
        let listing = state.listing().unwrap();
        assert_eq!(listing.title, "Dune");
        assert_eq!(listing.description, "Sci-fi classic...");
        assert_eq!(listing.condition, BookCondition::Good);
    }

    #[tokio::test]
    async fn extraction_failure_shows_error_and_stays_on_form() {
        let ai = Arc::new(MockAI::new().with_failure("timed out"));
        let extractor = ListingExtractor::new(ai);
        let uploads = CoverUploads { front: upload(PNG_BYTES), back: upload(JPEG_BYTES) };

        let (state, notice) = submit_listing(PageState::new(), uploads, &extractor).await;

        assert_eq!(state.mode(), PageMode::InputForm);
        assert!(state.listing().is_none());
        match notice {
            Some(Notice::Error(message)) => {
                assert!(message.starts_with("Error: Failed to process the images"));
                assert!(message.contains("timed out"));
            }
            other => panic!("expected error notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_on_results_view_does_not_call_extractor() {
        let ai = dune_ai();
        let extractor = ListingExtractor::new(ai.clone());
        let both = || CoverUploads { front: upload(PNG_BYTES), back: upload(JPEG_BYTES) };

        let (results, _) = submit_listing(PageState::new(), both(), &extractor).await;
        assert_eq!(results.mode(), PageMode::Results);
        assert_eq!(ai.call_count(), 1);

        let (state, notice) = submit_listing(results.clone(), both(), &extractor).await;

        assert_eq!(state, results);
        assert!(notice.is_none());
        assert_eq!(ai.call_count(), 1);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; book_lister_session=abc-123; other=1"),
        );
        assert_eq!(session_cookie(&headers), Some("abc-123"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("book_lister_session="));
        assert_eq!(session_cookie(&empty), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
