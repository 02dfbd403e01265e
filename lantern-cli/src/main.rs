//! Lantern CLI
//!
//! Parses a stylesheet (file, URL or literal text), expands its imports
//! and prints the resulting rules.

use std::fs;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lantern_common::{DefaultUrlResolver, UrlResolver};
use lantern_css::{
    AutoImportMedia, CssParser, ElementRef, Origin, ParseOptions, Source, Stylesheet,
    parse_media_query,
};
use owo_colors::OwoColorize;
use url::Url;

/// Lantern - CSS parser with @import resolution and media queries
#[derive(Parser, Debug)]
#[command(name = "lantern")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = r#"EXAMPLES:
    # Parse a local stylesheet
    lantern ./site.css

    # Parse a remote stylesheet, expanding screen imports too
    lantern --media screen https://example.com/main.css

    # Parse literal text against a base URL
    lantern --css '@import "theme.css"; p { color: red }' --base https://example.com/

    # Parse a style attribute
    lantern --css --inline 'color: red; margin: 0'

    # Inspect a media query
    lantern media 'screen and (min-width: 100px)'
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path or URL of the stylesheet, or the CSS text with --css
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Treat SOURCE as CSS text instead of a path or URL
    #[arg(long)]
    css: bool,

    /// Parse as the contents of a style attribute (declarations only)
    #[arg(long)]
    inline: bool,

    /// Element id the inline declarations belong to
    #[arg(long, value_name = "ID", requires = "inline")]
    element: Option<usize>,

    /// Base URL or path for resolving imports of CSS text
    #[arg(long, value_name = "URL|PATH")]
    base: Option<String>,

    /// Encoding label overriding the one reported with fetched bytes
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Cascade origin of the rules (user-agent, user, author, inline)
    #[arg(long, default_value = "author", value_parser = parse_origin)]
    origin: Origin,

    /// Also expand imports whose media matches this query list
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["import_all", "no_imports"])]
    media: Option<String>,

    /// Expand every import regardless of its media
    #[arg(long, conflicts_with = "no_imports")]
    import_all: bool,

    /// Expand no imports at all
    #[arg(long)]
    no_imports: bool,

    /// Enable the rule cache
    #[arg(long)]
    cache: bool,

    /// Print the stylesheet as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a media query list and print it
    Media {
        /// The media query list, e.g. "screen and (min-width: 100px)"
        query: String,

        /// Print the query list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Command::Media { query, json }) = &cli.command {
        return print_media(query, *json);
    }

    let Some(source) = cli.source.as_deref() else {
        bail!("a SOURCE is required; see --help");
    };

    let policy = import_policy(&cli);
    log::debug!("import policy: {policy:?}");
    let parser = CssParser::builder()
        .auto_import_media(policy)
        .use_cache(cli.cache)
        .build();

    let mut options = ParseOptions::default()
        .with_origin(cli.origin)
        .with_inline_priority(cli.inline);
    options.encoding.clone_from(&cli.encoding);
    options.base.clone_from(&cli.base);

    let stylesheet = if cli.css {
        parse_text(&parser, &cli, source, &options)?
    } else if cli.inline {
        let text = fs::read_to_string(source).with_context(|| format!("reading {source}"))?;
        if options.base.is_none() {
            options.base = Some(source.to_string());
        }
        parse_text(&parser, &cli, &text, &options)?
    } else {
        let url = source_url(source)?;
        parser
            .parse(Source::Url(url), &options)
            .with_context(|| format!("parsing {source}"))?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stylesheet)?);
    } else {
        print_stylesheet(&stylesheet);
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the default level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn parse_origin(value: &str) -> Result<Origin, String> {
    value
        .parse()
        .map_err(|_| format!("unknown origin `{value}` (expected user-agent, user, author or inline)"))
}

fn import_policy(cli: &Cli) -> AutoImportMedia {
    if cli.no_imports {
        AutoImportMedia::none()
    } else if cli.import_all {
        AutoImportMedia::all()
    } else if let Some(media) = &cli.media {
        AutoImportMedia::parse(media)
    } else {
        AutoImportMedia::default()
    }
}

fn parse_text(
    parser: &CssParser,
    cli: &Cli,
    text: &str,
    options: &ParseOptions,
) -> Result<Stylesheet> {
    let source = if cli.inline {
        Source::Inline {
            css: text,
            element: cli.element.map(ElementRef),
        }
    } else {
        Source::Embedded(text)
    };
    Ok(parser.parse(source, options)?)
}

/// URLs with a scheme are used as they are; anything else is a path.
fn source_url(source: &str) -> Result<Url> {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file" | "data") => Ok(url),
        _ => Ok(DefaultUrlResolver::new().resolve_base(source)?),
    }
}

fn print_stylesheet(stylesheet: &Stylesheet) {
    println!("{}", "=== Stylesheet ===".bold().cyan());
    println!("{} rules", stylesheet.len());
    for rule in stylesheet {
        println!("{rule}");
    }
}

fn print_media(query: &str, json: bool) -> Result<()> {
    let Some(media) = parse_media_query(query) else {
        bail!("malformed media query `{query}`");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&media)?);
        return Ok(());
    }
    println!("{}", "=== Media Query List ===".bold().cyan());
    println!("{} queries", media.len());
    for entry in &media {
        println!("{entry}");
    }
    println!("matches empty: {}", media.matches_empty());
    Ok(())
}
