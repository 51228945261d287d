// src/spell/title.rs
use scraper::{Html, Selector};

/// Trailing text the site appends to every classic spell page title.
pub const TITLE_SUFFIX: &str = " - Spell - Classic World of Warcraft";

/// Text of the first `<title>` element, if the document has one.
pub fn document_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("title").expect("CSS selector for <title> should be valid");
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>())
}

/// Strip the site suffix and surrounding whitespace from a page title.
pub fn spell_name(title: &str) -> String {
    title.replace(TITLE_SUFFIX, "").trim().to_string()
}
