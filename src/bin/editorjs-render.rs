use editorjs_blocks::{render_document, BlockError, FailurePolicy, RenderConfig};
use std::env;
use std::fs;
use std::process;

struct Options {
    plain: bool,
    config_path: Option<String>,
    files: Vec<String>,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(args) {
        Some(options) if !options.files.is_empty() => options,
        _ => {
            eprintln!("Usage: editorjs-render [--plain] [--config <config.yaml>] <document.json>...");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  editorjs-render post.json");
            eprintln!("  editorjs-render --plain --config render.yaml posts/*.json");
            eprintln!();
            eprintln!("Without --config, EDITORJS_INTERNAL_HOSTS and EDITORJS_CSS_PREFIX are read.");
            process::exit(1);
        }
    };

    let config = match load_config(options.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ configuration has errors:");
            print_error(&e);
            process::exit(1);
        }
    };

    let mut exit_code = 0;

    for file_path in &options.files {
        match render_file(file_path, &config, options.plain) {
            Ok((output, failures)) => {
                println!("{}", output);
                if failures > 0 {
                    eprintln!("✗ {} rendered with {} invalid block(s)", file_path, failures);
                    exit_code = 1;
                } else {
                    eprintln!("✓ {} rendered", file_path);
                }
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn parse_args(args: Vec<String>) -> Option<Options> {
    let mut options = Options {
        plain: false,
        config_path: None,
        files: Vec::new(),
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plain" => options.plain = true,
            "--config" => options.config_path = Some(iter.next()?),
            "-h" | "--help" => return None,
            _ => options.files.push(arg),
        }
    }

    Some(options)
}

fn load_config(path: Option<&str>) -> Result<RenderConfig, BlockError> {
    match path {
        Some(path) => RenderConfig::load(path),
        None => RenderConfig::from_env(),
    }
}

fn render_file(
    path: &str,
    config: &RenderConfig,
    plain: bool,
) -> Result<(String, usize), BlockError> {
    let content = fs::read_to_string(path)
        .map_err(|e| BlockError::DeserializationError(format!("Failed to read file: {}", e)))?;

    let rendered = render_document(&content, config, FailurePolicy::Placeholder)?;
    for failure in rendered.failures() {
        eprintln!("  block {}:", failure.index);
        print_error(&failure.error);
    }

    let output = if plain {
        rendered.plain_text()
    } else {
        rendered.html()
    };
    Ok((output, rendered.failures().len()))
}

fn print_error(error: &BlockError) {
    match error {
        BlockError::SchemaViolation {
            block_type,
            field,
            reason,
        } => {
            eprintln!("  Schema violation in '{}' block, field '{}':", block_type, field);
            eprintln!("    {}", reason);
        }
        BlockError::UnknownBlockType { block_type } => {
            eprintln!("  Unknown block type '{}'", block_type);
            eprintln!("    No implementation is registered for it");
        }
        BlockError::DeserializationError(msg) => {
            eprintln!("  Deserialization error:");
            eprintln!("    {}", msg);
        }
        BlockError::InvalidConfig(msg) => {
            eprintln!("  Invalid configuration:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
