//! Output rendering: each new item goes through a user-supplied handlebars
//! template. The template is compiled once per run; strict mode makes a
//! reference to an unknown field a render error.

use crate::types::{CheckerError, FeedIdentity, FeedItem, Result};
use handlebars::{
    to_json, Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderError,
};
use serde_json::value::Map;
use tracing::debug;
use url::Url;

const OUTPUT_TEMPLATE: &str = "output";

pub const DEFAULT_OUTPUT_FORMAT: &str = "{{ full_url link }}\n";

#[derive(Debug)]
pub struct Emitter {
    registry: Handlebars<'static>,
}

impl Emitter {
    /// Compile the output template. A syntax error here is fatal for the
    /// whole run, before any feed is touched.
    pub fn new(format: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // The sink is plain text, not HTML.
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("full_url", Box::new(full_url_helper));
        registry
            .register_template_string(OUTPUT_TEMPLATE, format)
            .map_err(|e| CheckerError::TemplateSyntax {
                source: Box::new(e),
            })?;

        Ok(Self { registry })
    }

    /// Render one feed's new items, in order, into a single buffer. A render
    /// error aborts the remaining items for this feed.
    pub fn render_feed(
        &self,
        feed: &FeedIdentity,
        feed_title: Option<&str>,
        items: &[FeedItem],
    ) -> Result<String> {
        let mut rendered = String::new();
        for item in items {
            rendered.push_str(&self.render_item(feed, feed_title, item)?);
        }
        debug!("rendered {} item(s) for feed {}", items.len(), feed.name);
        Ok(rendered)
    }

    pub fn render_item(
        &self,
        feed: &FeedIdentity,
        feed_title: Option<&str>,
        item: &FeedItem,
    ) -> Result<String> {
        let data = item_data(feed, feed_title, item);
        self.registry
            .render(OUTPUT_TEMPLATE, &data)
            .map_err(|e| CheckerError::TemplateRender {
                feed: feed.name.clone(),
                source: Box::new(e),
            })
    }
}

/// Template-addressable fields. Absent values render as empty strings rather
/// than being omitted, so strict mode only trips on fields that never exist.
fn item_data(
    feed: &FeedIdentity,
    feed_title: Option<&str>,
    item: &FeedItem,
) -> Map<String, serde_json::Value> {
    let mut data = Map::new();
    data.insert("link".to_string(), to_json(&item.link));
    data.insert("title".to_string(), to_json(&item.title));
    data.insert(
        "description".to_string(),
        to_json(item.description.as_deref().unwrap_or("")),
    );
    data.insert(
        "published".to_string(),
        to_json(
            item.published_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ),
    );
    data.insert("feed_name".to_string(), to_json(&feed.name));
    data.insert("feed_url".to_string(), to_json(feed.source_url.as_str()));
    data.insert("feed_title".to_string(), to_json(feed_title.unwrap_or("")));
    data
}

/// `{{ full_url link }}`: resolve an item link against the feed's own URL
/// when the link has no scheme/host of its own.
fn full_url_helper(
    h: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let link = h
        .param(0)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| RenderError::new("full_url expects a string parameter"))?;
    let base = ctx
        .data()
        .get("feed_url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RenderError::new("feed_url missing from render data"))?;

    out.write(&absolutize(base, link))?;
    Ok(())
}

fn absolutize(base: &str, link: &str) -> String {
    match Url::parse(link) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => match Url::parse(base).and_then(|b| b.join(link)) {
            Ok(joined) => joined.to_string(),
            // Leave degenerate links untouched rather than dropping the item.
            Err(_) => link.to_string(),
        },
    }
}
