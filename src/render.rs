//! HTML rendering.
//!
//! Pure functions from store records to markup — no I/O. The write step and
//! output layout live in [`crate::generate`].
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolation is auto-escaped, which is the sanitization backstop for
//! untrusted source files: a `<script>` tag in an author bio renders as
//! text, never as markup. Free-text bodies go through markdown conversion
//! with raw HTML neutralized first (see [`markdown_to_safe_html`]).
//!
//! Pages live at two depths in the output tree — detail and listing pages
//! inside a kind directory, the homepage at the root — so every renderer
//! takes a `prefix` (`"../"` or `""`) for stylesheet and cross links.

use crate::config::SiteMeta;
use crate::model::{Article, Author, Category, ContentKind, Section, TrendingTopic};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, html as md_html};

/// Convert markdown to HTML with raw HTML neutralized.
///
/// pulldown-cmark passes inline HTML through untouched by default; since
/// source files are untrusted, HTML events are downgraded to text events so
/// the serializer escapes them. Markdown formatting (emphasis, lists,
/// links) still works.
pub fn markdown_to_safe_html(source: &str) -> String {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Format a unix timestamp relative to `now` ("3 days ago").
pub fn relative_date(then: i64, now: i64) -> String {
    let secs = now.saturating_sub(then);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    let days = secs / 86_400;
    if days > 365 {
        plural(days / 365, "year")
    } else if days > 30 {
        plural(days / 30, "month")
    } else if days > 0 {
        plural(days, "day")
    } else if secs > 3_600 {
        plural(secs / 3_600, "hour")
    } else {
        plural((secs / 60).max(1), "minute")
    }
}

// ============================================================================
// Document chrome
// ============================================================================

/// Base HTML document: head with stylesheet link, site header, content.
fn base_document(title: &str, site: &SiteMeta, prefix: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - " (site.name) }
                link rel="stylesheet" href={ (prefix) "assets/style.css" };
            }
            body {
                (site_header(site, prefix))
                main { (content) }
                footer.site-footer {
                    p { "© " (site.name) }
                }
            }
        }
    }
}

/// Site header: name, tagline, and the fixed section navigation.
fn site_header(site: &SiteMeta, prefix: &str) -> Markup {
    html! {
        header.site-header {
            a.site-name href={ (prefix) "index.html" } { (site.name) }
            p.site-tagline { (site.tagline) }
            nav.site-nav {
                a href={ (prefix) "index.html" } { "Home" }
                a href={ (prefix) "articles/index.html" } { "Articles" }
                a href={ (prefix) "authors/index.html" } { "Authors" }
                a href={ (prefix) "categories/index.html" } { "Categories" }
                a href={ (prefix) "trending/index.html" } { "Trending" }
            }
        }
    }
}

/// Link to a record's detail page from a page at the given prefix depth.
fn detail_href(prefix: &str, kind: ContentKind, slug: &str) -> String {
    format!("{prefix}{}/{}", kind.dir_name(), kind.detail_page_name(slug))
}

/// One article row in a listing: headline, byline, excerpt.
fn article_row(prefix: &str, article: &Article, author: &Author, category: &Category, now: i64) -> Markup {
    html! {
        article.article-row {
            h3 {
                a href=(detail_href(prefix, ContentKind::Articles, &article.slug)) {
                    (article.title)
                }
            }
            p.byline {
                "By "
                a href=(detail_href(prefix, ContentKind::Authors, &author.slug)) { (author.name) }
                " in "
                a href=(detail_href(prefix, ContentKind::Categories, &category.slug)) { (category.name) }
                " · "
                (relative_date(article.created_at, now))
            }
            @if !article.excerpt.is_empty() {
                p.excerpt { (article.excerpt) }
            }
        }
    }
}

// ============================================================================
// Detail pages
// ============================================================================

/// Author detail page: profile plus their articles (live from the store).
pub fn render_author_page(site: &SiteMeta, author: &Author, articles: &[(Article, Category)], now: i64) -> Markup {
    let content = html! {
        article.author-page {
            h1 { (author.name) }
            p.author-title { (author.title) " · " (author.location) }
            @if !author.expertise.is_empty() {
                ul.expertise {
                    @for area in &author.expertise {
                        li { (area) }
                    }
                }
            }
            div.bio { (PreEscaped(markdown_to_safe_html(&author.bio))) }
            @if !author.email.is_empty() {
                p.contact { a href={ "mailto:" (author.email) } { (author.email) } }
            }
            section.author-articles {
                h2 { "Articles (" (articles.len()) ")" }
                @for (article, category) in articles {
                    (article_row("../", article, author, category, now))
                }
            }
        }
    };
    base_document(&author.name, site, "../", content)
}

/// Category detail page with its article list.
pub fn render_category_page(
    site: &SiteMeta,
    category: &Category,
    articles: &[(Article, Author)],
    now: i64,
) -> Markup {
    let content = html! {
        article.category-page {
            h1 {
                span.category-icon { (category.icon) }
                " " (category.name)
            }
            span.category-badge style=(format!("background-color: {};", category.color)) {
                (articles.len()) " articles"
            }
            @if !category.description.is_empty() {
                p.category-description { (category.description) }
            }
            section.category-articles {
                @for (article, author) in articles {
                    (article_row("../", article, author, category, now))
                }
            }
        }
    };
    base_document(&category.name, site, "../", content)
}

/// Article detail page: lead, ordered sections, byline cross-links, tags.
pub fn render_article_page(
    site: &SiteMeta,
    article: &Article,
    sections: &[Section],
    author: &Author,
    category: &Category,
    now: i64,
) -> Markup {
    let content = html! {
        article.article-page {
            h1 { (article.title) }
            p.byline {
                "By "
                a href=(detail_href("../", ContentKind::Authors, &author.slug)) { (author.name) }
                " in "
                a href=(detail_href("../", ContentKind::Categories, &category.slug)) { (category.name) }
                " · "
                (relative_date(article.created_at, now))
            }
            @if !article.excerpt.is_empty() {
                p.excerpt { (article.excerpt) }
            }
            div.article-lead { (PreEscaped(markdown_to_safe_html(&article.content))) }
            @for section in sections {
                section.article-section {
                    h2 { (section.heading) }
                    div { (PreEscaped(markdown_to_safe_html(&section.body))) }
                }
            }
            @if !article.tags.is_empty() {
                ul.tags {
                    @for tag in &article.tags {
                        li { (tag) }
                    }
                }
            }
        }
    };
    base_document(&article.title, site, "../", content)
}

/// Trending topic detail page. Related articles are soft references: only
/// the ones that resolve against the store are shown, dangling ids are
/// silently skipped by the caller.
pub fn render_topic_page(site: &SiteMeta, topic: &TrendingTopic, related: &[Article]) -> Markup {
    let content = html! {
        article.topic-page {
            h1 { (topic.title) }
            p.heat { "Heat score: " (topic.heat_score) }
            @if !topic.hashtag.is_empty() {
                p.hashtag { (topic.hashtag) }
            }
            div.description { (PreEscaped(markdown_to_safe_html(&topic.description))) }
            @if !related.is_empty() {
                section.related {
                    h2 { "Related articles" }
                    ul {
                        @for article in related {
                            li {
                                a href=(detail_href("../", ContentKind::Articles, &article.slug)) {
                                    (article.title)
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(&topic.title, site, "../", content)
}

// ============================================================================
// Listing pages
// ============================================================================

/// Author listing with live article counts.
pub fn render_author_listing(site: &SiteMeta, authors: &[(Author, i64)]) -> Markup {
    let content = html! {
        h1 { "Authors" }
        div.author-grid {
            @for (author, count) in authors {
                div.author-card {
                    h2 {
                        a href=(ContentKind::Authors.detail_page_name(&author.slug)) {
                            (author.name)
                        }
                    }
                    p { (author.title) }
                    p.count { (count) " articles" }
                }
            }
        }
    };
    base_document("Authors", site, "../", content)
}

/// Category listing. Counts are recomputed from the store every run, never
/// cached in the page.
pub fn render_category_listing(site: &SiteMeta, categories: &[(Category, i64)]) -> Markup {
    let content = html! {
        h1 { "Categories" }
        div.category-grid {
            @for (category, count) in categories {
                div.category-card style=(format!("border-color: {};", category.color)) {
                    h2 {
                        span.category-icon { (category.icon) }
                        " "
                        a href=(ContentKind::Categories.detail_page_name(&category.slug)) {
                            (category.name)
                        }
                    }
                    @if !category.description.is_empty() {
                        p { (category.description) }
                    }
                    p.count { (count) " articles" }
                }
            }
        }
    };
    base_document("Categories", site, "../", content)
}

/// All articles, newest first.
pub fn render_article_listing(
    site: &SiteMeta,
    articles: &[(Article, Author, Category)],
    now: i64,
) -> Markup {
    let content = html! {
        h1 { "Articles" }
        @for (article, author, category) in articles {
            (article_row("../", article, author, category, now))
        }
    };
    base_document("Articles", site, "../", content)
}

/// Trending listing, ordered by heat score descending (the caller passes
/// topics already in store order).
pub fn render_trending_listing(site: &SiteMeta, topics: &[TrendingTopic]) -> Markup {
    let content = html! {
        h1 { "Trending" }
        ol.trending-list {
            @for topic in topics {
                li {
                    a href=(ContentKind::Trending.detail_page_name(&topic.slug)) {
                        (topic.title)
                    }
                    span.heat { " (" (topic.heat_score) ")" }
                }
            }
        }
    };
    base_document("Trending", site, "../", content)
}

/// Homepage: recent articles, category overview with counts, top topics.
pub fn render_homepage(
    site: &SiteMeta,
    recent: &[(Article, Author, Category)],
    categories: &[(Category, i64)],
    topics: &[TrendingTopic],
    now: i64,
) -> Markup {
    let content = html! {
        section.latest {
            h2 { "Latest" }
            @for (article, author, category) in recent {
                (article_row("", article, author, category, now))
            }
        }
        section.categories-overview {
            h2 { "Categories" }
            ul {
                @for (category, count) in categories {
                    li {
                        a href=(detail_href("", ContentKind::Categories, &category.slug)) {
                            (category.name)
                        }
                        " (" (count) ")"
                    }
                }
            }
        }
        @if !topics.is_empty() {
            section.trending-overview {
                h2 { "Trending" }
                ol {
                    @for topic in topics {
                        li {
                            a href=(detail_href("", ContentKind::Trending, &topic.slug)) {
                                (topic.title)
                            }
                        }
                    }
                }
            }
        }
    };
    base_document("Home", site, "", content)
}
