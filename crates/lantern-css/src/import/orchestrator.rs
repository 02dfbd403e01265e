//! The parsing pipeline: tokenize, parse, build, then expand `@import`s.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use lantern_common::{DefaultNetworkProcessor, DefaultUrlResolver, NetworkProcessor, UrlResolver};
use url::Url;

use super::cache::{CachedSheet, RuleCache};
use crate::builder::{
    DefaultPreparator, DefaultRuleFactory, PendingImport, PrepareContext, Preparator, RuleFactory,
    TreeBuilder,
};
use crate::error::{CssError, ImportError, ParseError};
use crate::input::CssInput;
use crate::media::{self, AutoImportMedia, MediaQueryList};
use crate::model::{ElementRef, Origin, Priority, RuleList, Stylesheet};
use crate::parser::{ParseMode, Parser, SyntaxTree};
use crate::tokenizer::tokenize;

/// Where a stylesheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source<'a> {
    /// The value of a `style` attribute.
    Inline {
        /// The declarations.
        css: &'a str,
        /// The element carrying the attribute.
        element: Option<ElementRef>,
    },
    /// The contents of a `<style>` element.
    Embedded(&'a str),
    /// A stylesheet to fetch.
    Url(Url),
}

impl Source<'_> {
    const fn kind(&self) -> SourceKind {
        match self {
            Self::Inline { .. } => SourceKind::Inline,
            Self::Embedded(_) => SourceKind::Embedded,
            Self::Url(_) => SourceKind::Url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Inline,
    Embedded,
    Url,
}

impl SourceKind {
    const fn error_message(self) -> &'static str {
        match self {
            Self::Inline => "Unable to parse inline CSS style",
            Self::Embedded => "Unable to parse embedded CSS style",
            Self::Url => "Unable to parse URL CSS style",
        }
    }

    const fn mode(self) -> ParseMode {
        match self {
            Self::Inline => ParseMode::DeclarationList,
            Self::Embedded | Self::Url => ParseMode::Stylesheet,
        }
    }
}

/// Per-call parse settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Encoding label overriding what the transport reports.
    pub encoding: Option<String>,
    /// Base URL (or filesystem path) for resolving imports of text sources.
    pub base: Option<String>,
    /// Cascade origin of the built rules.
    pub origin: Origin,
    /// Give the built rules [`Origin::Inline`].
    pub inline_priority: bool,
}

impl ParseOptions {
    /// Set the base URL or path.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Set the encoding override.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Set the cascade origin.
    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Request inline priority.
    #[must_use]
    pub const fn with_inline_priority(mut self, inline_priority: bool) -> Self {
        self.inline_priority = inline_priority;
        self
    }

    const fn priority(&self) -> Priority {
        Priority::new(if self.inline_priority {
            Origin::Inline
        } else {
            self.origin
        })
    }
}

/// The CSS parsing context.
///
/// Holds every collaborator of the pipeline. Values are cheap to share:
/// all calls take `&self`, and the cache may be shared between parsers.
pub struct CssParser {
    factory: Arc<dyn RuleFactory>,
    preparator: Arc<dyn Preparator>,
    network: Arc<dyn NetworkProcessor>,
    url_resolver: Arc<dyn UrlResolver>,
    cache: Arc<RuleCache>,
    auto_import_media: AutoImportMedia,
}

impl CssParser {
    /// A parser with the default collaborators and a disabled cache.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a parser.
    #[must_use]
    pub fn builder() -> CssParserBuilder {
        CssParserBuilder::default()
    }

    /// Parse `source` into a new stylesheet created by the factory.
    ///
    /// # Errors
    ///
    /// Fails when a URL source cannot be fetched, when the base URL in
    /// `options` is invalid, or when the source cannot be parsed at all.
    /// Failing imports never fail the call.
    pub fn parse(&self, source: Source<'_>, options: &ParseOptions) -> Result<Stylesheet, CssError> {
        let mut stylesheet = self.factory.create_stylesheet();
        self.append(source, options, &mut stylesheet)?;
        Ok(stylesheet)
    }

    /// Parse `source` and append its rules to `stylesheet`.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse). On error, `stylesheet` is unchanged.
    pub fn append(
        &self,
        source: Source<'_>,
        options: &ParseOptions,
        stylesheet: &mut Stylesheet,
    ) -> Result<(), CssError> {
        let kind = source.kind();
        let mut chain = ImportChain::default();
        let rules = match source {
            Source::Url(url) => self.load_url(&url, options, &mut chain)?,
            Source::Inline { css, element } => {
                Arc::new(self.load_text(css, kind, element, options, &mut chain)?)
            }
            Source::Embedded(css) => Arc::new(self.load_text(css, kind, None, options, &mut chain)?),
        };
        stylesheet.extend(rules.iter().cloned());
        Ok(())
    }

    /// Parse a standalone media query list. See [`media::parse_media_query`].
    #[must_use]
    pub fn parse_media_query(&self, text: &str) -> Option<MediaQueryList> {
        media::parse_media_query(text)
    }

    /// The rule cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<RuleCache> {
        &self.cache
    }

    /// The import acceptance policy.
    #[must_use]
    pub const fn auto_import_media(&self) -> &AutoImportMedia {
        &self.auto_import_media
    }

    fn load_text(
        &self,
        css: &str,
        kind: SourceKind,
        element: Option<ElementRef>,
        options: &ParseOptions,
        chain: &mut ImportChain,
    ) -> Result<RuleList, CssError> {
        let base = options
            .base
            .as_deref()
            .map(|base| {
                self.url_resolver
                    .resolve_base(base)
                    .map_err(|source| CssError::InvalidBase {
                        base: base.to_string(),
                        source,
                    })
            })
            .transpose()?;
        let input = CssInput::from_text(css, base);
        self.build(&input, kind, element, options, chain)
    }

    /// Fetch, build and cache the stylesheet at `url`.
    fn load_url(
        &self,
        url: &Url,
        options: &ParseOptions,
        chain: &mut ImportChain,
    ) -> Result<Arc<RuleList>, CssError> {
        let priority = options.priority();
        if let Some(sheet) = self.cache.get(url.as_str(), priority) {
            if chain.reaches_into(&sheet) {
                log::trace!("{url}: cached copy imports a sheet being expanded, reparsing");
            } else {
                log::trace!("{url}: served from cache");
                chain.reuse(url, &sheet);
                return Ok(sheet.rules);
            }
        }

        let fetched = self.network.fetch(url).map_err(|source| CssError::Fetch {
            url: url.to_string(),
            source,
        })?;
        let input = CssInput::from_bytes(
            &fetched.bytes,
            options.encoding.as_deref(),
            fetched.charset.as_deref(),
            Some(url.clone()),
        );

        chain.push(url);
        let rules = self.build(&input, SourceKind::Url, None, options, chain);
        let imports = chain.pop();

        let rules = Arc::new(rules?);
        match imports {
            Some(imports) => self.cache.insert(
                url.as_str(),
                priority,
                CachedSheet::new(Arc::clone(&rules), imports),
            ),
            None => log::trace!("{url}: not cached, a cyclic import was cut below it"),
        }
        Ok(rules)
    }

    /// Tokenize, parse and build one input, then expand its imports in
    /// front of its own rules.
    fn build(
        &self,
        input: &CssInput,
        kind: SourceKind,
        element: Option<ElementRef>,
        options: &ParseOptions,
        chain: &mut ImportChain,
    ) -> Result<RuleList, CssError> {
        let tree = parse_tree(input, kind.mode()).map_err(|source| {
            log::error!("{}: {}: {source}", input.location(), kind.error_message());
            CssError::Parse {
                message: kind.error_message(),
                source,
            }
        })?;

        let context = PrepareContext {
            element,
            inline_priority: options.inline_priority,
            origin: options.origin,
        };
        let output =
            TreeBuilder::new(self.factory.as_ref(), self.preparator.as_ref(), context).build(tree);

        let mut rules = RuleList::new();
        for import in &output.imports {
            rules.extend(self.expand_import(import, input.base.as_ref(), options, chain));
        }
        rules.extend(output.rules);
        Ok(rules)
    }

    /// The rules one `@import` contributes. Failures contribute nothing.
    fn expand_import(
        &self,
        import: &PendingImport,
        base: Option<&Url>,
        options: &ParseOptions,
        chain: &mut ImportChain,
    ) -> RuleList {
        if !self.auto_import_media.honours(&import.media) {
            log::trace!("skipping @import {} for media `{}`", import.path, import.media);
            return RuleList::new();
        }

        match self.import_rules(import, base, options, chain) {
            Ok(rules) if import.media.is_empty() => rules.as_ref().clone(),
            Ok(rules) if rules.is_empty() => RuleList::new(),
            Ok(rules) => vec![self.factory.create_rule_media(
                options.priority(),
                import.media.clone(),
                rules.as_ref().clone(),
            )],
            Err(error) => {
                log::warn!("{error}");
                RuleList::new()
            }
        }
    }

    fn import_rules(
        &self,
        import: &PendingImport,
        base: Option<&Url>,
        options: &ParseOptions,
        chain: &mut ImportChain,
    ) -> Result<Arc<RuleList>, ImportError> {
        let url = self
            .url_resolver
            .resolve_import_target(base, &import.path)
            .map_err(|source| ImportError::Resolve {
                href: import.path.clone(),
                source,
            })?;

        if chain.cut(&url) {
            return Err(ImportError::Cyclic {
                url: url.to_string(),
            });
        }

        self.load_url(&url, options, chain)
            .map_err(|error| ImportError::from_load(url.as_str(), error))
    }
}

/// The URLs being expanded in one call, outermost first.
///
/// When an import is refused as cyclic, every sheet above the refused
/// ancestor is missing rules it would have on its own, so none of them may
/// be cached.
#[derive(Debug, Default)]
struct ImportChain {
    frames: Vec<ChainFrame>,
}

#[derive(Debug)]
struct ChainFrame {
    url: String,
    /// Outermost ancestor a cyclic import below this sheet pointed back to.
    cut_at: Option<usize>,
    /// Every URL pulled in below this sheet.
    imports: Vec<String>,
}

impl ImportChain {
    fn push(&mut self, url: &Url) {
        self.frames.push(ChainFrame {
            url: url.to_string(),
            cut_at: None,
            imports: Vec::new(),
        });
    }

    /// Leave the innermost sheet. Returns the URLs it pulled in, or `None`
    /// when a cyclic import left its rules incomplete.
    fn pop(&mut self) -> Option<Vec<String>> {
        let frame = self.frames.pop()?;
        if let Some(parent) = self.frames.last_mut() {
            parent.imports.push(frame.url);
            parent.imports.extend(frame.imports.iter().cloned());
        }
        match frame.cut_at {
            Some(target) if target < self.frames.len() => {
                self.mark_cut(target);
                None
            }
            _ => Some(frame.imports),
        }
    }

    /// Whether `url` is already being expanded; if so, records the cut.
    fn cut(&mut self, url: &Url) -> bool {
        let Some(target) = self.position(url.as_str()) else {
            return false;
        };
        self.mark_cut(target);
        true
    }

    /// Whether a cached sheet pulled in a URL that is being expanded now.
    fn reaches_into(&self, sheet: &CachedSheet) -> bool {
        self.frames.iter().any(|frame| sheet.imports(&frame.url))
    }

    /// Record a cached sheet as imported by the innermost sheet.
    fn reuse(&mut self, url: &Url, sheet: &CachedSheet) {
        if let Some(frame) = self.frames.last_mut() {
            frame.imports.push(url.to_string());
            frame.imports.extend(sheet.imports.iter().cloned());
        }
    }

    fn position(&self, url: &str) -> Option<usize> {
        self.frames.iter().position(|frame| frame.url == url)
    }

    fn mark_cut(&mut self, target: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.cut_at = Some(frame.cut_at.map_or(target, |current| current.min(target)));
        }
    }
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize and parse, turning a panic anywhere in either stage into
/// [`ParseError::Internal`].
fn parse_tree(input: &CssInput, mode: ParseMode) -> Result<SyntaxTree, ParseError> {
    let location = input.location();
    let tree = panic::catch_unwind(AssertUnwindSafe(|| {
        let tokens = tokenize(&input.text, Some(location))?;
        Parser::new(tokens).parse(mode)
    }))
    .map_err(|payload| ParseError::Internal(panic_message(payload.as_ref())))??;
    log::trace!("{location}: {tree:?}");
    Ok(tree)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "parser panicked".to_string())
}

/// Configures a [`CssParser`].
#[derive(Default)]
pub struct CssParserBuilder {
    factory: Option<Arc<dyn RuleFactory>>,
    preparator: Option<Arc<dyn Preparator>>,
    network: Option<Arc<dyn NetworkProcessor>>,
    url_resolver: Option<Arc<dyn UrlResolver>>,
    cache: Option<Arc<RuleCache>>,
    use_cache: Option<bool>,
    auto_import_media: AutoImportMedia,
}

impl CssParserBuilder {
    /// Use `factory` to create model values.
    #[must_use]
    pub fn factory(mut self, factory: Arc<dyn RuleFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Pass built items through `preparator`.
    #[must_use]
    pub fn preparator(mut self, preparator: Arc<dyn Preparator>) -> Self {
        self.preparator = Some(preparator);
        self
    }

    /// Fetch stylesheets through `network`.
    #[must_use]
    pub fn network(mut self, network: Arc<dyn NetworkProcessor>) -> Self {
        self.network = Some(network);
        self
    }

    /// Resolve base and import URLs through `url_resolver`.
    #[must_use]
    pub fn url_resolver(mut self, url_resolver: Arc<dyn UrlResolver>) -> Self {
        self.url_resolver = Some(url_resolver);
        self
    }

    /// Share `cache` instead of creating a private one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<RuleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable or disable the cache when the parser is built.
    #[must_use]
    pub const fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Decide which conditioned imports are expanded.
    #[must_use]
    pub fn auto_import_media(mut self, auto_import_media: AutoImportMedia) -> Self {
        self.auto_import_media = auto_import_media;
        self
    }

    /// Build the parser.
    #[must_use]
    pub fn build(self) -> CssParser {
        let cache = self.cache.unwrap_or_default();
        if let Some(use_cache) = self.use_cache {
            cache.set_enabled(use_cache);
        }
        CssParser {
            factory: self.factory.unwrap_or_else(|| Arc::new(DefaultRuleFactory)),
            preparator: self.preparator.unwrap_or_else(|| Arc::new(DefaultPreparator)),
            network: self
                .network
                .unwrap_or_else(|| Arc::new(DefaultNetworkProcessor::new())),
            url_resolver: self
                .url_resolver
                .unwrap_or_else(|| Arc::new(DefaultUrlResolver::new())),
            cache,
            auto_import_media: self.auto_import_media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"static message"), "static message");
        assert_eq!(panic_message(&"owned message".to_string()), "owned message");
        assert_eq!(panic_message(&42_u8), "parser panicked");
    }

    #[test]
    fn caught_panic_is_an_internal_error() {
        let result: std::thread::Result<()> = panic::catch_unwind(|| panic!("index out of range"));
        let payload = result.unwrap_err();
        let error = ParseError::Internal(panic_message(payload.as_ref()));
        assert_eq!(error.to_string(), "internal parser failure: index out of range");
    }

    #[test]
    fn cut_marks_only_sheets_above_the_target() {
        let (a, b, c) = (url("http://t/a.css"), url("http://t/b.css"), url("http://t/c.css"));
        let mut chain = ImportChain::default();
        chain.push(&a);
        chain.push(&b);
        assert!(chain.cut(&a));
        assert_eq!(chain.pop(), None);

        // A later sibling of b is unaffected.
        chain.push(&c);
        assert!(!chain.cut(&b));
        assert_eq!(chain.pop(), Some(Vec::new()));
        assert_eq!(
            chain.pop(),
            Some(vec![b.to_string(), c.to_string()])
        );
    }

    #[test]
    fn self_import_leaves_the_sheet_complete() {
        let a = url("http://t/a.css");
        let mut chain = ImportChain::default();
        chain.push(&a);
        assert!(chain.cut(&a));
        assert_eq!(chain.pop(), Some(Vec::new()));
    }

    #[test]
    fn cached_sheet_importing_an_ancestor_is_not_reused() {
        let (a, b) = (url("http://t/a.css"), url("http://t/b.css"));
        let sheet = CachedSheet::new(Arc::new(Vec::new()), vec![b.to_string()]);
        let mut chain = ImportChain::default();
        chain.push(&b);
        assert!(chain.reaches_into(&sheet));

        let mut chain = ImportChain::default();
        chain.push(&a);
        assert!(!chain.reaches_into(&sheet));
        chain.reuse(&b, &sheet);
        assert_eq!(chain.pop(), Some(vec![b.to_string(), b.to_string()]));
    }
}
