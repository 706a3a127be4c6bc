use crate::listing::text;
use tracing::warn;

/// Challenge pages carry little visible text. Past this, vendor widget
/// markup (Turnstile on a lead form, an Incapsula script) is not a block.
const INTERSTITIAL_TEXT_CHARS: usize = 1_000;
/// How much of a long page's text is inspected for block phrases.
const LONG_PAGE_PREVIEW_CHARS: usize = 2_000;

/// Name of the anti-bot interstitial a page looks like, if any.
///
/// Phrases are matched against the visible text only; reCAPTCHA scripts and
/// widgets embedded in ordinary listings never count.
pub fn detect_block_reason(html: &str) -> Option<&'static str> {
    let visible = text::visible_text(html).to_lowercase();

    if visible.chars().count() > INTERSTITIAL_TEXT_CHARS {
        let preview: String = visible.chars().take(LONG_PAGE_PREVIEW_CHARS).collect();
        if preview.contains("verify you are human") || preview.contains("please verify you") {
            return Some("Human Verification");
        }
        if preview.contains("access denied") || preview.contains("access to this page has been denied") {
            return Some("Access Denied");
        }
        if visible.contains("captcha") {
            warn!(
                "Captcha mentioned in a page with {} chars of text; treating as content",
                visible.len()
            );
        }
        return None;
    }

    if visible.contains("verify you are human") || visible.contains("please verify you") {
        return Some("Human Verification");
    }
    if visible.contains("access denied") || visible.contains("access to this page has been denied") {
        return Some("Access Denied");
    }
    if visible.contains("captcha") || visible.contains("are you human") || visible.contains("prove you're human") {
        return Some("Captcha");
    }

    let markup = html.to_lowercase();
    if markup.contains("cf-chl-") || markup.contains("cf-turnstile") || visible.contains("just a moment...") {
        return Some("Cloudflare");
    }
    if markup.contains("px-captcha") || visible.contains("perimeterx") {
        return Some("PerimeterX");
    }
    if markup.contains("_incapsula_resource") || visible.contains("incapsula incident") {
        return Some("Incapsula");
    }
    if visible.contains("unusual traffic") || visible.contains("automated request") {
        return Some("Bot Detected");
    }
    None
}
