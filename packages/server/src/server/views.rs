//! Server-rendered pages for the two views.

use html_escape::encode_text;

use crate::domains::listings::BookListing;
use crate::server::session::{Notice, PageMode, PageState};

const PAGE_TITLE: &str = "Used Book Lister";

pub fn render_page(state: &PageState, notice: Option<&Notice>) -> String {
    let body = match (state.mode(), state.listing()) {
        (PageMode::Results, Some(listing)) => render_results(listing),
        // Results without a listing cannot be constructed; fall back to the form.
        _ => render_form(notice),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{PAGE_TITLE}</title>
<style>
body {{ font-family: sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }}
.notice {{ padding: 0.75rem 1rem; border-radius: 0.25rem; margin-bottom: 1rem; }}
.notice.warning {{ background: #fff6da; color: #7a5b00; }}
.notice.error {{ background: #fde8e8; color: #8a1c1c; }}
form.busy button {{ opacity: 0.6; pointer-events: none; }}
</style>
</head>
<body>
<h1>Used Book Listing Creator</h1>
{body}
</body>
</html>
"#
    )
}

fn render_notice(notice: &Notice) -> String {
    let (class, message) = match notice {
        Notice::Warning(message) => ("warning", message),
        Notice::Error(message) => ("error", message),
    };
    format!(
        r#"<div class="notice {class}" role="alert">{}</div>"#,
        encode_text(message)
    )
}

fn render_form(notice: Option<&Notice>) -> String {
    let notice = notice.map(render_notice).unwrap_or_default();
    format!(
        r#"{notice}
<form method="post" action="/submit" enctype="multipart/form-data"
      onsubmit="this.classList.add('busy'); this.querySelector('button').textContent = 'Processing images, please wait...';">
<p><label for="front_cover">Front of Book</label><br>
<input type="file" id="front_cover" name="front_cover" accept=".png,.jpg,.jpeg,image/png,image/jpeg"></p>
<p><label for="back_cover">Back of Book</label><br>
<input type="file" id="back_cover" name="back_cover" accept=".png,.jpg,.jpeg,image/png,image/jpeg"></p>
<button type="submit">SUBMIT</button>
</form>"#
    )
}

fn render_results(listing: &BookListing) -> String {
    format!(
        r#"<h2>TITLE:</h2>
<p class="title">{}</p>
<h2>DESCRIPTION:</h2>
<p class="description">{}</p>
<h2>CONDITION ESTIMATE:</h2>
<p class="condition">{}</p>
<form method="post" action="/next">
<button type="submit">Next Book</button>
</form>"#,
        encode_text(&listing.title),
        encode_text(&listing.description),
        encode_text(listing.condition.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::listings::BookCondition;
    use crate::server::session::PageEvent;

    #[test]
    fn form_view_has_both_inputs_and_submit() {
        let html = render_page(&PageState::new(), None);

        assert!(html.contains(r#"name="front_cover""#));
        assert!(html.contains(r#"name="back_cover""#));
        assert!(html.contains(">SUBMIT</button>"));
        assert!(!html.contains("TITLE:"));
    }

    #[test]
    fn notices_are_rendered_by_class() {
        let warning = render_page(&PageState::new(), Some(&Notice::Warning("careful".into())));
        assert!(warning.contains(r#"<div class="notice warning" role="alert">careful</div>"#));

        let error = render_page(&PageState::new(), Some(&Notice::Error("Error: x".into())));
        assert!(error.contains(r#"<div class="notice error" role="alert">Error: x</div>"#));
    }

    #[test]
    fn results_view_shows_escaped_fields() {
        let listing =
            BookListing::new("<b>Dune</b>", "Spice & sand", BookCondition::LikeNew).unwrap();
        let (state, _) = PageState::new().apply(PageEvent::ExtractionSucceeded(listing));
        let html = render_page(&state, None);

        assert!(html.contains("&lt;b&gt;Dune&lt;/b&gt;"));
        assert!(html.contains("Spice &amp; sand"));
        assert!(html.contains(r#"<p class="condition">like New</p>"#));
        assert!(html.contains("Next Book"));
        assert!(!html.contains(r#"name="front_cover""#));
    }
}
