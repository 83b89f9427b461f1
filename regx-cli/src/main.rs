mod logging;

use clap::{Parser, Subcommand};
use colored::Colorize;
use regx_core::{Builder, Pattern, Slot, Substitution, Template};

#[derive(Parser)]
#[command(name = "regx")]
#[command(about = "Regx - an extended regex dialect compiled to ECMAScript syntax")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    logging: logging::LogArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Pattern text and how to compile it
#[derive(clap::Args, Debug)]
struct PatternArgs {
    /// The pattern; every `${}` is filled by the next --sub value
    pattern: String,
    /// Flags, e.g. "gi" or "nsUX"
    #[arg(short, long, default_value = "")]
    flags: String,
    /// Read trailing flags after a delimiter, '/' unless given as --delimited=CHAR
    #[arg(
        long,
        value_name = "CHAR",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "/"
    )]
    delimited: Option<char>,
    /// JSON value substituted into the next `${}` hole
    #[arg(short, long = "sub", value_name = "JSON")]
    subs: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Test a pattern against input
    Test {
        #[command(flatten)]
        pattern: PatternArgs,
        /// The input string to test
        input: String,
        /// Show capture groups
        #[arg(short, long)]
        verbose: bool,
    },
    /// Convert dialect text to native source
    Convert {
        #[command(flatten)]
        pattern: PatternArgs,
        /// Show flags and group layout
        #[arg(short, long)]
        debug: bool,
    },
    /// Find all matches in input
    Find {
        #[command(flatten)]
        pattern: PatternArgs,
        /// The input string
        input: String,
    },
    /// Check if pattern matches
    Match {
        #[command(flatten)]
        pattern: PatternArgs,
        /// The input string
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.logging.setup_logging() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::Test {
            pattern,
            input,
            verbose,
        } => cmd_test(&pattern, &input, verbose),
        Commands::Convert { pattern, debug } => cmd_convert(&pattern, debug),
        Commands::Find { pattern, input } => cmd_find(&pattern, &input),
        Commands::Match { pattern, input } => cmd_match(&pattern, &input),
    }
}

impl PatternArgs {
    fn compile(&self) -> Result<Pattern, Box<dyn std::error::Error>> {
        let subs = self
            .subs
            .iter()
            .map(|json| serde_json::from_str::<serde_json::Value>(json).map(Substitution::from))
            .collect::<Result<Vec<_>, _>>()?;
        let template = Template::parse(&self.pattern, subs)?;

        let mut builder = Builder::new().flags(&self.flags)?;
        if let Some(delimiter) = self.delimited {
            builder = builder.delimited(delimiter);
        }
        Ok(builder.build(&template)?)
    }

    fn compile_or_exit(&self) -> Pattern {
        match self.compile() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

fn cmd_test(args: &PatternArgs, input: &str, verbose: bool) {
    println!("{}", "Testing pattern...".bold());
    println!("  Pattern: {}", args.pattern.cyan());
    println!("  Input:   {}", input.yellow());
    println!();

    let pattern = args.compile_or_exit();

    if let Some(m) = pattern.find(input) {
        println!("{}", "✓ Match found!".green().bold());
        println!("  Position: {}..{}", m.start(), m.end());
        println!("  Match:    {}", m.as_str().green());

        if verbose && m.len() > 1 {
            println!();
            println!("{}", "Capture groups:".bold());
            for (idx, group) in m.iter().enumerate().skip(1) {
                match group {
                    Some(text) => println!("  Group {}: {}", idx, text.green()),
                    None => println!("  Group {}: {}", idx, "(unmatched)".dimmed()),
                }
            }
            let mut names: Vec<_> = m.named_groups().iter().collect();
            names.sort_by_key(|(_, range)| range.start);
            for (name, range) in names {
                println!(
                    "  {}: {}..{} = {}",
                    name.cyan(),
                    range.start,
                    range.end,
                    &input[range.clone()].green()
                );
            }
        }
    } else {
        println!("{}", "✗ No match".red());
    }
}

fn cmd_convert(args: &PatternArgs, debug: bool) {
    println!("{}", "Converting pattern...".bold());
    println!("  Input:  {}", args.pattern.cyan());
    println!();

    let pattern = args.compile_or_exit();

    println!("{}", "Output:".bold());
    println!("  {}", pattern.to_string().green());

    if debug {
        println!();
        println!("{}", "Details:".bold());
        println!("  Source:         {}", pattern.source());
        println!("  Flags:          {}", pattern.flags());
        println!("  Original flags: {}", pattern.original_flags());
        println!("  Groups:");
        for (index, slot) in pattern.groups().slots().iter().enumerate().skip(1) {
            let description = match slot {
                Slot::Anonymous => "anonymous".to_string(),
                Slot::Named(name) => format!("named {}", name.cyan()),
                Slot::Suppressed => "synthetic (hidden)".dimmed().to_string(),
            };
            println!("    \\{}: {}", index, description);
        }
    }
}

fn cmd_find(args: &PatternArgs, input: &str) {
    let pattern = args.compile_or_exit();

    // find always lists every match
    let matches: Vec<_> = pattern.matches(input).collect();

    if matches.is_empty() {
        println!("{}", "No matches found".red());
    } else {
        println!(
            "{} {}",
            "Found".bold(),
            format!("{} match(es)", matches.len()).green()
        );
        println!();

        for (i, m) in matches.iter().enumerate() {
            println!(
                "  [{}] {}..{} = {}",
                i + 1,
                m.start(),
                m.end(),
                m.as_str().green()
            );
        }
    }
}

fn cmd_match(args: &PatternArgs, input: &str) {
    let pattern = args.compile_or_exit();

    if pattern.is_match(input) {
        println!("{}", "true".green());
        std::process::exit(0);
    } else {
        println!("{}", "false".red());
        std::process::exit(1);
    }
}
