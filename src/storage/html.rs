//! HTML link list.

use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::Result;
use crate::models::Record;
use crate::storage::{LinkSink, append_bytes};

const STYLE: &str = r#"<style>
body, html {
    font-size: 24px;
    color: #fff;
    background-color: #000;
}
li {
    padding: 3px;
}
a:link {
    color: #ccc;
}
a:visited {
    color: #e343e8;
}
a:hover, a:active {
    font-weight: bold;
    color: #93ed0c;
    background-color: #152a40;
}
</style>"#;

const FOOTER: &str = "</ul>\n</body>\n</html>\n";

/// Writes a static page listing every link; each opens in a new window.
#[derive(Debug, Clone)]
pub struct HtmlListSink {
    path: PathBuf,
    title: String,
}

impl HtmlListSink {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }

    fn header(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n<ul>\n",
            encode_text(&self.title),
            STYLE
        )
    }
}

impl LinkSink for HtmlListSink {
    fn begin(&mut self) -> Result<()> {
        append_bytes(&self.path, self.header().as_bytes())
    }

    fn write(&mut self, link: &str, _record: &Record) -> Result<()> {
        let item = format!(
            "<li><a href=\"{}\" target=\"_blank\">{}</a></li>\n",
            encode_double_quoted_attribute(link),
            encode_text(link)
        );
        append_bytes(&self.path, item.as_bytes())
    }

    fn finish(&mut self) -> Result<()> {
        append_bytes(&self.path, FOOTER.as_bytes())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_page_lists_links() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("links.html");
        let mut sink = HtmlListSink::new(&path, "a.com captures");
        let record = Record::new();

        sink.begin().unwrap();
        sink.write("https://web.archive.org/web/1/http://a.com/x.jpg", &record)
            .unwrap();
        sink.write("https://web.archive.org/web/2/http://a.com/y.png", &record)
            .unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "<li><a href=\"https://web.archive.org/web/1/http://a.com/x.jpg\" target=\"_blank\">https://web.archive.org/web/1/http://a.com/x.jpg</a></li>\n"
        ));
        assert!(content.ends_with(FOOTER));

        let page = Html::parse_document(&content);
        let links = Selector::parse("li > a[target=_blank]").unwrap();
        assert_eq!(page.select(&links).count(), 2);
        let title = Selector::parse("title").unwrap();
        let title_text: String = page.select(&title).next().unwrap().text().collect();
        assert_eq!(title_text, "a.com captures");
    }

    #[test]
    fn test_empty_run_still_has_header_and_footer() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("links.html");
        let mut sink = HtmlListSink::new(&path, "results");

        sink.begin().unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
        assert!(content.contains("<style>"));
        assert!(content.ends_with(FOOTER));
        assert!(!content.contains("<li>"));
    }

    #[test]
    fn test_links_are_escaped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("links.html");
        let mut sink = HtmlListSink::new(&path, "<a> & \"b\"");
        let link = "https://web.archive.org/web/1/http://a.com/x?a=1&b=\"<2>\"";

        sink.begin().unwrap();
        sink.write(link, &Record::new()).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<title>&lt;a&gt; &amp; \"b\"</title>"));
        assert!(content.contains(
            "href=\"https://web.archive.org/web/1/http://a.com/x?a=1&amp;b=&quot;&lt;2&gt;&quot;\""
        ));
        assert!(!content.contains("<2>"));

        let page = Html::parse_document(&content);
        let anchor = Selector::parse("li > a").unwrap();
        let a = page.select(&anchor).next().unwrap();
        assert_eq!(a.value().attr("href"), Some(link));
        assert_eq!(a.text().collect::<String>(), link);
    }
}
