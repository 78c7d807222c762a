//! Tables that basketball-reference ships inside HTML comments.
//!
//! Secondary tables (four factors, line score, ...) are rendered as
//! `<!-- <div><table id="..."> ... </table></div> -->` and only revealed by
//! client-side script. They are invisible to CSS selection on the live
//! document, so they are recovered by scanning comment nodes and parsing the
//! comment text as a document of its own.

use scraper::{ElementRef, Html};

pub trait HiddenTables {
    /// Text of the first comment node containing `marker`.
    fn comment_containing(&self, marker: &str) -> Option<&str>;

    /// The first comment containing `marker`, parsed as a standalone document.
    fn hidden_document(&self, marker: &str) -> Option<Html> {
        self.comment_containing(marker).map(Html::parse_document)
    }
}

impl HiddenTables for Html {
    fn comment_containing(&self, marker: &str) -> Option<&str> {
        self.tree
            .values()
            .filter_map(|node| node.as_comment())
            .map(|comment| &**comment)
            .find(|text| text.contains(marker))
    }
}

/// Concatenated, trimmed text content of an element.
pub fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn finds_table_inside_comment() {
        let html = Html::parse_document(
            r#"<html><body>
                <div id="all_other"><!--
                    <table id="other"><tr><td>1</td></tr></table>
                --></div>
                <div id="all_four_factors"><!--
                    <table id="four_factors"><tbody><tr><td data-stat="pace">99.1</td></tr></tbody></table>
                --></div>
            </body></html>"#,
        );
        let table = Selector::parse("table#four_factors").unwrap();

        assert_eq!(html.select(&table).count(), 0);

        let hidden = html.hidden_document("four_factors").unwrap();
        let el = hidden.select(&table).next().unwrap();
        assert_eq!(text_of(&el), "99.1");
    }

    #[test]
    fn missing_marker() {
        let html = Html::parse_document("<html><body><!-- nothing here --></body></html>");
        assert!(html.comment_containing("line_score").is_none());
        assert!(html.hidden_document("line_score").is_none());
    }
}
