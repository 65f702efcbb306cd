use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::Parser;
use sniffjson::{ParseOptions, SplitMode, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sniffjson",
    version,
    about = "Parse lenient JSON-like text and print its canonical form"
)]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Only validate the input; print nothing on success.
    #[arg(long)]
    check: bool,

    /// Print indented JSON instead of the canonical one-line render.
    #[arg(long, conflicts_with = "check")]
    pretty: bool,

    /// Maximum container nesting depth.
    #[arg(long, value_name = "number", default_value_t = sniffjson::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Disable the nesting depth limit.
    #[arg(long, conflicts_with = "max_depth")]
    unbounded: bool,

    /// Split on bracket depth only, ignoring quotes.
    #[arg(long)]
    legacy_split: bool,
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        let max_depth = (!self.unbounded).then_some(self.max_depth);
        let split_mode = if self.legacy_split {
            SplitMode::Legacy
        } else {
            SplitMode::QuoteAware
        };
        ParseOptions::new()
            .with_max_depth(max_depth)
            .with_split_mode(split_mode)
    }
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (input_text, input_source) = read_input(args.input.as_deref())?;
    let value = sniffjson::parse_with_options(&input_text, &args.parse_options())?;
    tracing::debug!(kind = value.type_name(), source = ?input_source, "parsed input");

    if args.check {
        return Ok(());
    }

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    with_output_writer(output_target.path(), |writer| {
        write_value(writer, &value, args.pretty)
    })?;
    if let OutputTarget::File(path) = &output_target {
        report_status(&input_source, path);
    }
    Ok(())
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_value(writer: &mut dyn Write, value: &Value, pretty: bool) -> Result<(), Box<dyn Error>> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &serde_json::Value::from(value))?;
    } else {
        writer.write_all(value.render().as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn report_status(input_source: &InputSource, output_path: &str) {
    let input_label = match input_source {
        InputSource::Stdin => "stdin",
        InputSource::File(path) => path.as_str(),
    };
    println!("✔ Parsed {input_label} → {output_path}");
}
