//! tagsoup CLI - inspect how markup is parsed and repaired
//!
//! Usage:
//!   tagsoup <file>                 Print the node tree
//!   tagsoup <file> --errors        Also list syntax problems
//!   tagsoup <file> --json          Dump tree and errors as JSON
//!   tagsoup --html '<p>x'          Parse inline markup

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tagsoup_dom::{NodeKind, print_tree};
use tagsoup_html::{HtmlDocument, NodeId, ParseError, ParseOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// tagsoup - lenient HTML parser inspector
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(name = "tagsoup")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    tagsoup ./index.html

    # Show what was repaired
    tagsoup --errors --fix-nested ./index.html

    # Parse inline markup
    tagsoup --html '<ul><li>a<li>b</ul>'

    # Which charset does a page declare?
    tagsoup --detect-encoding ./legacy.html
"#)]
struct Cli {
    /// HTML file to parse
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this markup instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// List syntax problems after the tree
    #[arg(short, long)]
    errors: bool,

    /// Print tree and errors as JSON
    #[arg(short, long)]
    json: bool,

    /// Only report the charset declared in the markup
    #[arg(long)]
    detect_encoding: bool,

    /// Print the markup of the element with this id
    #[arg(long, value_name = "ID")]
    outer: Option<String>,

    /// Read parse options from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Close unterminated li/tr/td/th when a sibling starts
    #[arg(long)]
    fix_nested: bool,

    /// Leave elements open until the end of input
    #[arg(long)]
    auto_close: bool,

    /// Do not report elements left open
    #[arg(long)]
    no_check_syntax: bool,

    /// Compute a CRC-32 of the input
    #[arg(long)]
    checksum: bool,

    /// Stop after this element closes
    #[arg(long, value_name = "NAME")]
    stopper: Option<String>,

    /// Deepest nesting accepted
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Attach up to LEN bytes of offending markup to each error
    #[arg(long, value_name = "LEN", num_args = 0..=1, default_missing_value = "100")]
    extract_source: Option<usize>,

    /// Log parser progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Input as read from disk or the command line.
enum Input {
    Bytes(Vec<u8>),
    Text(String),
}

#[derive(Serialize)]
struct Report<'a> {
    tree: Value,
    errors: &'a [ParseError],
    declared_encoding: Option<&'static str>,
    stream_encoding: Option<&'static str>,
    checksum: Option<u32>,
    remainder_offset: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = read_input(&cli)?;
    let options = build_options(&cli)?;
    debug!(?options, "parse options");
    let mut doc = HtmlDocument::with_options(options);

    if cli.detect_encoding {
        let text = match &input {
            Input::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Input::Text(text) => text.clone(),
        };
        match doc.detect_encoding(&text)? {
            Some(encoding) => println!("{}", encoding.name()),
            None => println!("no charset declared"),
        }
        return Ok(());
    }

    match input {
        Input::Bytes(bytes) => doc.load_bytes(&bytes)?,
        Input::Text(text) => doc.load_html(&text)?,
    }

    if let Some(id) = &cli.outer {
        let Some(node) = doc.get_element_by_id(id) else {
            bail!("no element with id `{id}`");
        };
        println!("{}", doc.outer_html(node)?);
        return Ok(());
    }

    if cli.json {
        let report = Report {
            tree: node_to_json(&doc, doc.root()),
            errors: doc.errors(),
            declared_encoding: doc.declared_encoding().map(|e| e.name()),
            stream_encoding: doc.stream_encoding().map(|e| e.name()),
            checksum: doc.checksum(),
            remainder_offset: doc.remainder_offset(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== Node Tree ===");
    print_tree(doc.tree(), doc.root(), 0);

    if let Some(checksum) = doc.checksum() {
        println!("\n=== Checksum ===");
        println!("{checksum:08x}");
    }
    if let Some(remainder) = doc.remainder() {
        println!("\n=== Unparsed ({} bytes) ===", remainder.len());
    }
    if cli.errors {
        print_errors(doc.errors());
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(cli: &Cli) -> Result<Input> {
    if let Some(html) = &cli.html {
        return Ok(Input::Text(html.clone()));
    }
    let Some(path) = &cli.path else {
        bail!("expected a file path or --html");
    };
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Input::Bytes(bytes))
}

/// Options from `--config`, then individual flags on top.
fn build_options(cli: &Cli) -> Result<ParseOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing options in {}", path.display()))?
        }
        None => ParseOptions::default(),
    };
    if cli.fix_nested {
        options.fix_nested_tags = true;
    }
    if cli.auto_close {
        options.auto_close_on_end = true;
    }
    if cli.no_check_syntax {
        options.check_syntax = false;
    }
    if cli.checksum {
        options.compute_checksum = true;
    }
    if let Some(stopper) = &cli.stopper {
        options.stopper_node_name = Some(stopper.clone());
    }
    if let Some(max_depth) = cli.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(max_length) = cli.extract_source {
        options.extract_error_source_text = true;
        options.extract_error_source_text_max_length = max_length;
    }
    Ok(options)
}

fn print_errors(errors: &[ParseError]) {
    println!("\n=== Parse Errors ({}) ===", errors.len());
    if errors.is_empty() {
        println!("  {}", "none".green());
        return;
    }
    for error in errors {
        println!(
            "  {} {} {}",
            format!("{}:{}", error.line, error.column).dimmed(),
            error.code.to_string().red().bold(),
            error.reason
        );
        if let Some(snippet) = &error.source_text {
            println!("      {}", snippet.yellow());
        }
    }
}

/// Convert a node and its subtree to JSON.
fn node_to_json(doc: &HtmlDocument, id: NodeId) -> Value {
    let tree = doc.tree();
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let mut object = Map::new();
    let _ = object.insert("type".to_owned(), json!(node.kind()));
    let _ = object.insert("line".to_owned(), json!(node.line));
    let _ = object.insert("column".to_owned(), json!(node.column));

    match node.kind() {
        NodeKind::Document => {}
        NodeKind::Element => {
            let _ = object.insert("name".to_owned(), json!(tree.raw_name(id)));
            let attributes: Vec<Value> = node
                .attributes()
                .iter()
                .map(|attribute| {
                    json!({
                        "name": attribute.name(doc.text()),
                        "value": attribute.value(doc.text()),
                    })
                })
                .collect();
            if !attributes.is_empty() {
                let _ = object.insert("attributes".to_owned(), Value::Array(attributes));
            }
            let _ = object.insert("closed".to_owned(), json!(node.is_closed()));
        }
        NodeKind::Text | NodeKind::Comment => {
            let _ = object.insert("content".to_owned(), json!(tree.text(id)));
        }
    }

    let children = tree.children(id);
    if !children.is_empty() {
        let children = children
            .iter()
            .map(|&child| node_to_json(doc, child))
            .collect();
        let _ = object.insert("children".to_owned(), Value::Array(children));
    }
    Value::Object(object)
}
