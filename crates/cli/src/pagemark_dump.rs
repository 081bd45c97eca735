//! pagemark-dump - Tokenize or interpret a raw content stream
//!
//! A command line tool that reads an already decoded page content stream
//! and prints either its tokens or the paint calls it produces.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use pagemark_core::interp::{Interpreter, Page, PaintEvent, TraceHandler};
use pagemark_core::parser::{Lexer, Program, Token};
use pagemark_core::resources::{Font, ResourceResolver, SimpleFont};
use pagemark_core::InterpreterConfig;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "pagemark-dump")]
#[command(author, version, about = "Dump the tokens or paint calls of a content stream")]
#[command(disable_version_flag = true)]
struct Args {
    /// Decoded content stream file
    #[arg(required = true)]
    file: PathBuf,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Log interpreter diagnostics at debug level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Print tokens instead of interpreting
    #[arg(short = 't', long, action = ArgAction::SetTrue)]
    tokens: bool,

    /// Write JSON instead of plain text
    #[arg(short = 'j', long, action = ArgAction::SetTrue)]
    json: bool,

    /// Page width in points
    #[arg(short = 'W', long, default_value = "612")]
    width: f64,

    /// Page height in points
    #[arg(short = 'H', long, default_value = "792")]
    height: f64,

    /// Page rotation in degrees
    #[arg(short = 'R', long, default_value = "0")]
    rotate: i32,

    /// Maximum nesting of forms and tiles
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,

    /// Only accept EI followed by whitespace or end of data
    #[arg(long = "strict-inline-image-end", action = ArgAction::SetTrue)]
    strict_inline_image_end: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

/// Resources for a stream read without its document: every font name
/// resolves to the same fixed-width stand-in.
#[derive(Debug)]
struct DetachedResources {
    font: Arc<dyn Font>,
}

impl DetachedResources {
    fn new() -> Self {
        Self {
            font: Arc::new(SimpleFont::new("Detached").with_default_width(500.0)),
        }
    }
}

impl ResourceResolver for DetachedResources {
    fn font(&self, _name: &str) -> Option<Arc<dyn Font>> {
        Some(Arc::clone(&self.font))
    }
}

/// JSON form of a token, with spans resolved against the program.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TokenRecord {
    Operator { op: String },
    Number { value: f64 },
    Name { name: String },
    String { text: String, len: usize },
    Array { items: Vec<TokenRecord> },
    DictOpen,
    DictClose,
    Boolean { value: bool },
    InlineImageData { len: usize },
}

impl TokenRecord {
    fn new(program: &Program, token: &Token) -> Self {
        match token {
            Token::Operator(op) => TokenRecord::Operator { op: op.to_string() },
            Token::Number(value) => TokenRecord::Number { value: *value },
            Token::Name(span) => TokenRecord::Name {
                name: program.name_str(*span).into_owned(),
            },
            Token::String(span) => {
                let bytes = program.decoded(*span);
                TokenRecord::String {
                    text: escape(bytes),
                    len: bytes.len(),
                }
            }
            Token::Array(items) => TokenRecord::Array {
                items: items.iter().map(|t| TokenRecord::new(program, t)).collect(),
            },
            Token::DictOpen => TokenRecord::DictOpen,
            Token::DictClose => TokenRecord::DictClose,
            Token::Boolean(value) => TokenRecord::Boolean { value: *value },
            Token::InlineImageData(span) => TokenRecord::InlineImageData { len: span.len },
        }
    }
}

/// Escape non-printable bytes for display.
fn escape(s: &[u8]) -> String {
    s.iter().flat_map(|&b| std::ascii::escape_default(b)).map(char::from).collect()
}

/// Render a token the way it would be written in a content stream.
fn format_token(program: &Program, token: &Token) -> String {
    match token {
        Token::Operator(op) => op.to_string(),
        Token::Number(n) => format!("{n}"),
        Token::Name(span) => format!("/{}", program.name_str(*span)),
        Token::String(span) => format!("({})", escape(program.decoded(*span))),
        Token::Array(items) => {
            let inner: Vec<String> = items.iter().map(|t| format_token(program, t)).collect();
            format!("[{}]", inner.join(" "))
        }
        Token::DictOpen => "<<".to_string(),
        Token::DictClose => ">>".to_string(),
        Token::Boolean(b) => b.to_string(),
        Token::InlineImageData(span) => format!("<{} bytes of image data>", span.len),
    }
}

fn dump_tokens<W: Write>(out: &mut W, program: &Program, json: bool) -> Result<()> {
    if json {
        let records: Vec<TokenRecord> = program
            .tokens()
            .iter()
            .map(|t| TokenRecord::new(program, t))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
        return Ok(());
    }

    // One line per operator, operands first
    let mut line = Vec::new();
    for token in program.tokens() {
        line.push(format_token(program, token));
        if matches!(token, Token::Operator(_) | Token::InlineImageData(_)) {
            writeln!(out, "{}", line.join(" "))?;
            line.clear();
        }
    }
    if !line.is_empty() {
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}

fn dump_events<W: Write>(out: &mut W, events: &[PaintEvent], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, events)?;
        writeln!(out)?;
    } else {
        for event in events {
            writeln!(out, "{event:?}")?;
        }
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "pagemark_core=debug" } else { "pagemark_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map {}", args.file.display()))?;
    let content = Bytes::copy_from_slice(&mmap);
    debug!(bytes = content.len(), "content loaded");

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("cannot create {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    let mut config = InterpreterConfig::default()
        .with_strict_inline_image_end(args.strict_inline_image_end);
    if let Some(depth) = args.max_depth {
        config = config.with_max_nesting_depth(depth);
    }

    if args.tokens {
        let program = Lexer::with_options(config.lexer)
            .tokenize(content).context("tokenizing failed")?;
        dump_tokens(&mut output, &program, args.json)?;
        output.flush()?;
        return Ok(());
    }

    let page = Page::new(
        (0.0, 0.0, args.width, args.height),
        content,
        Arc::new(DetachedResources::new()),
    )
    .with_rotate(args.rotate);

    let mut handler = TraceHandler::new();
    let result = Interpreter::with_config(&mut handler, page.resources.clone(), config)
        .render_page(&page);
    dump_events(&mut output, handler.events(), args.json)?;
    output.flush()?;

    if let Err(e) = &result {
        warn!(error = %e, events = handler.events().len(), "output is partial");
    }
    result.context("content stream aborted")
}
