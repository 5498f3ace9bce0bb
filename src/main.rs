use std::io::Read;
use std::process::ExitCode;

use dotenv::dotenv;
use serde_json::{Map, Value};
use wikitext_templates::wikitext::{ParseOptionsBuilder, QueryType, WikiText, WtError};

fn usage() {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] [page.wiki]\n");
    println!("Reads the page from stdin when no file is given.\n");
    println!("Options:");
    println!("    --template NAME: print NAME's key/value fields instead of the whole page");
    println!("    --match MODE: how NAME is matched (exact, startswith, contains; default exact)");
    println!("    --trace: log every grammar rule entry (also WIKITEXT_TRACE=1)");
}

fn trace_from_env() -> bool {
    std::env::var("WIKITEXT_TRACE").is_ok_and(|v| !v.is_empty() && v != "0")
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        usage();
        return Ok(());
    }
    let trace = args.contains("--trace") || trace_from_env();
    let template: Option<String> = args.opt_value_from_str("--template")?;
    let mode: QueryType = args.opt_value_from_str("--match")?.unwrap_or_default();
    let path: Option<String> = args.opt_free_from_str()?;

    let rest = args.finish();
    if !rest.is_empty() {
        usage();
        return Err(format!("Unknown extra arguments passed: {:?}", rest).into());
    }

    let wt = match &path {
        Some(path) => WikiText::from_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            WikiText::new(buf)
        }
    };
    let options = ParseOptionsBuilder::default().trace(trace).build()?;
    let wt = wt.with_options(options);

    let page = wt.get_parsed()?;
    log::info!(
        "[{}] {} element(s), {} top-level template(s)",
        wt.page_name().unwrap_or("stdin"),
        page.elements.len(),
        page.templates().count()
    );

    let output = match template {
        Some(name) => {
            let found = page.find_template(&name, mode).ok_or_else(|| {
                WtError::not_found(format!("No template matching '{}' ({})", name, mode))
            })?;
            let fields: Map<String, Value> = found
                .named_values()
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            serde_json::to_string_pretty(&fields)?
        }
        None => serde_json::to_string_pretty(page)?,
    };
    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
