//! HTML page shell for static output.
//!
//! Wraps rendered page content with the site navigation, previous/next
//! links, the edit link and the table of contents.

use std::fmt::Write;

use folio_renderer::{TocItem, escape_html};

/// Navigation entry as shown in the sidebar.
pub struct NavItemData {
    pub title: String,
    /// Relative link to the page; `None` for sections.
    pub url: Option<String>,
    pub children: Vec<NavItemData>,
    pub is_active: bool,
}

/// Link to a neighbouring page.
pub struct LinkData {
    pub title: String,
    pub url: String,
}

/// All data needed to render a page.
pub struct PageData<'a> {
    pub title: &'a str,
    pub site_name: &'a str,
    /// Relative link to the site root.
    pub home_url: &'a str,
    pub html_content: &'a str,
    pub canonical_url: Option<&'a str>,
    pub edit_url: Option<&'a str>,
    pub update_date: &'a str,
    pub previous: Option<LinkData>,
    pub next: Option<LinkData>,
    pub toc: &'a [TocItem],
    pub navigation: Vec<NavItemData>,
}

/// Render a complete HTML page.
pub fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if page.title == page.site_name {
        let _ = writeln!(html, "<title>{}</title>", escape_html(page.title));
    } else {
        let _ = writeln!(
            html,
            "<title>{} - {}</title>",
            escape_html(page.title),
            escape_html(page.site_name)
        );
    }
    if let Some(url) = page.canonical_url {
        let _ = writeln!(html, "<link rel=\"canonical\" href=\"{}\">", escape_html(url));
    }
    html.push_str("</head>\n<body>\n");

    render_sidebar(&mut html, page);

    html.push_str("<main>\n<article>\n");
    html.push_str(page.html_content);
    html.push_str("\n</article>\n");
    render_footer(&mut html, page);
    html.push_str("</main>\n");

    render_toc(&mut html, page.toc);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, page: &PageData<'_>) {
    html.push_str("<aside class=\"site-nav\">\n");
    let _ = writeln!(
        html,
        "<a href=\"{}\" class=\"site-name\">{}</a>",
        escape_html(page.home_url),
        escape_html(page.site_name)
    );
    if !page.navigation.is_empty() {
        html.push_str("<nav>\n<ul>\n");
        render_nav_items(html, &page.navigation);
        html.push_str("</ul>\n</nav>\n");
    }
    html.push_str("</aside>\n");
}

fn render_nav_items(html: &mut String, items: &[NavItemData]) {
    for item in items {
        html.push_str("<li>");
        match &item.url {
            Some(url) => {
                let class = if item.is_active { " class=\"active\"" } else { "" };
                let _ = write!(
                    html,
                    "<a href=\"{}\"{class}>{}</a>",
                    escape_html(url),
                    escape_html(&item.title)
                );
            }
            None => {
                let _ = write!(
                    html,
                    "<span class=\"section\">{}</span>",
                    escape_html(&item.title)
                );
            }
        }
        if !item.children.is_empty() {
            html.push_str("\n<ul>\n");
            render_nav_items(html, &item.children);
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }
}

fn render_footer(html: &mut String, page: &PageData<'_>) {
    html.push_str("<footer>\n");
    if let Some(url) = page.edit_url {
        let _ = writeln!(
            html,
            "<a href=\"{}\" class=\"edit-link\">Edit this page</a>",
            escape_html(url)
        );
    }
    if page.previous.is_some() || page.next.is_some() {
        html.push_str("<nav class=\"pager\">\n");
        if let Some(link) = &page.previous {
            let _ = writeln!(
                html,
                "<a href=\"{}\" rel=\"prev\">&larr; {}</a>",
                escape_html(&link.url),
                escape_html(&link.title)
            );
        }
        if let Some(link) = &page.next {
            let _ = writeln!(
                html,
                "<a href=\"{}\" rel=\"next\">{} &rarr;</a>",
                escape_html(&link.url),
                escape_html(&link.title)
            );
        }
        html.push_str("</nav>\n");
    }
    let _ = writeln!(
        html,
        "<p class=\"update-date\">Last update: {}</p>",
        escape_html(page.update_date)
    );
    html.push_str("</footer>\n");
}

fn render_toc(html: &mut String, toc: &[TocItem]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"toc\">\n<h3>On this page</h3>\n<ul>\n");
    render_toc_items(html, toc);
    html.push_str("</ul>\n</aside>\n");
}

fn render_toc_items(html: &mut String, items: &[TocItem]) {
    for item in items {
        let _ = write!(
            html,
            "<li><a href=\"{}\">{}</a>",
            escape_html(&item.url()),
            escape_html(&item.text)
        );
        if !item.children.is_empty() {
            html.push_str("\n<ul>\n");
            render_toc_items(html, &item.children);
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(title: &'a str, content: &'a str) -> PageData<'a> {
        PageData {
            title,
            site_name: "Docs",
            home_url: "./",
            html_content: content,
            canonical_url: None,
            edit_url: None,
            update_date: "2024-01-01",
            previous: None,
            next: None,
            toc: &[],
            navigation: Vec::new(),
        }
    }

    #[test]
    fn render_page_contains_content() {
        let html = render_page(&page("My Page", "<p>Hello world</p>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("<title>My Page - Docs</title>"));
        assert!(html.contains("Last update: 2024-01-01"));
        assert!(!html.contains("rel=\"canonical\""));
        assert!(!html.contains("On this page"));
    }

    #[test]
    fn render_page_title_equal_to_site_name() {
        let html = render_page(&page("Docs", ""));
        assert!(html.contains("<title>Docs</title>"));
    }

    #[test]
    fn render_page_escapes_title() {
        let html = render_page(&page("<script>", ""));
        assert!(html.contains("<title>&lt;script&gt; - Docs</title>"));
    }

    #[test]
    fn render_page_contains_links() {
        let html = render_page(&PageData {
            canonical_url: Some("https://example.com/guide/"),
            edit_url: Some("https://example.com/repo/edit/main/docs/guide.md"),
            previous: Some(LinkData {
                title: "Home".to_owned(),
                url: "../".to_owned(),
            }),
            next: Some(LinkData {
                title: "Usage".to_owned(),
                url: "../usage/".to_owned(),
            }),
            ..page("Guide", "")
        });
        assert!(html.contains("<link rel=\"canonical\" href=\"https://example.com/guide/\">"));
        assert!(html.contains("href=\"https://example.com/repo/edit/main/docs/guide.md\""));
        assert!(html.contains("<a href=\"../\" rel=\"prev\">&larr; Home</a>"));
        assert!(html.contains("<a href=\"../usage/\" rel=\"next\">Usage &rarr;</a>"));
    }

    #[test]
    fn render_page_contains_nested_toc() {
        let toc = [TocItem {
            text: "Intro".to_owned(),
            anchor_id: "intro".to_owned(),
            level: 2,
            children: vec![TocItem {
                text: "Details".to_owned(),
                anchor_id: "details".to_owned(),
                level: 3,
                children: Vec::new(),
            }],
        }];
        let html = render_page(&PageData {
            toc: &toc,
            ..page("Guide", "")
        });
        assert!(html.contains("On this page"));
        assert!(html.contains("<li><a href=\"#intro\">Intro</a>\n<ul>\n<li><a href=\"#details\">Details</a></li>"));
    }

    #[test]
    fn render_page_marks_active_nav_item() {
        let html = render_page(&PageData {
            navigation: vec![
                NavItemData {
                    title: "Home".to_owned(),
                    url: Some("../".to_owned()),
                    children: Vec::new(),
                    is_active: false,
                },
                NavItemData {
                    title: "Guide".to_owned(),
                    url: None,
                    children: vec![NavItemData {
                        title: "Install".to_owned(),
                        url: Some("./".to_owned()),
                        children: Vec::new(),
                        is_active: true,
                    }],
                    is_active: false,
                },
            ],
            ..page("Install", "")
        });
        assert!(html.contains("<a href=\"../\">Home</a>"));
        assert!(html.contains("<span class=\"section\">Guide</span>"));
        assert!(html.contains("<a href=\"./\" class=\"active\">Install</a>"));
    }
}
