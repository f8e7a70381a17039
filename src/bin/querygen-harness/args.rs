use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: querygen-harness [OPTIONS] [QUERY...]

With no QUERY the ten built-in sample questions are tested.

Options:
  -n, --count N        Number of search queries to request (1-5, default 3)
      --vary-counts    Request 1 through 5 queries for the same question
                       (cannot be combined with -n)
  -i, --interactive    Prompt for a custom query and which test sets to run
  -o, --save           Save results to a timestamped JSON file
      --output PATH    Save results to PATH
  -p, --provider NAME  gemini or openai
  -m, --model ID       Model override
      --json           Print the run as JSON instead of text
  -h, --help           Show this help";

#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub query: Option<String>,    // positional words, joined
    pub count: Option<u32>,       // -n/--count
    pub vary_counts: bool,        // --vary-counts
    pub interactive: bool,        // -i/--interactive
    pub save: bool,               // -o/--save
    pub output: Option<PathBuf>,  // --output
    pub provider: Option<String>, // -p/--provider
    pub model: Option<String>,    // -m/--model
    pub json_output: bool,        // --json
    pub help: bool,               // -h/--help
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Result<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    /// Parse from a slice of arguments (for testing)
    pub fn parse_from(args: &[String]) -> Result<Self> {
        let mut result = CliArgs::default();
        let mut words: Vec<&str> = Vec::new();
        let mut only_words = false;

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            if only_words {
                words.push(arg);
                i += 1;
                continue;
            }

            match arg.as_str() {
                "-n" | "--count" => {
                    let value = take_value(args, &mut i, arg)?;
                    let count = value
                        .parse::<u32>()
                        .map_err(|_| anyhow!("{arg} expects a positive integer, got '{value}'"))?;
                    result.count = Some(count);
                }
                "--vary-counts" => result.vary_counts = true,
                "-i" | "--interactive" => result.interactive = true,
                "-o" | "--save" => result.save = true,
                "--output" => {
                    result.output = Some(PathBuf::from(take_value(args, &mut i, arg)?));
                }
                "-p" | "--provider" => {
                    result.provider = Some(take_value(args, &mut i, arg)?.to_string());
                }
                "-m" | "--model" => {
                    result.model = Some(take_value(args, &mut i, arg)?.to_string());
                }
                "--json" => result.json_output = true,
                "-h" | "--help" => result.help = true,
                "--" => only_words = true,
                unknown if unknown.starts_with('-') && unknown.len() > 1 => {
                    return Err(anyhow!("Unknown argument: {unknown}"));
                }
                word => words.push(word),
            }

            i += 1;
        }

        if !words.is_empty() {
            result.query = Some(words.join(" "));
        }

        if result.vary_counts && result.count.is_some() {
            return Err(anyhow!(
                "--vary-counts always requests 1 through 5 queries; drop -n/--count"
            ));
        }

        if result.interactive && result.json_output {
            return Err(anyhow!("--interactive cannot be combined with --json"));
        }

        Ok(result)
    }

    pub fn wants_persist(&self) -> bool {
        self.save || self.output.is_some()
    }
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}
