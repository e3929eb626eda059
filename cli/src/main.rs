//! lessonmerge CLI - merges generated digital-competence content into lesson plans
//!
//! A command-line tool for placing marked sections into an existing `.docx`
//! or rendering them into a fresh one.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use lessonmerge::{
    create_docx, export_text, merge_file, parse_sections, preview_markdown, CleanupOptions,
    ExportOptions, FallbackKind, Highlight, MergeOptions, MergeReport, RenderOptions,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Merge generated lesson content into Word documents
#[derive(Parser)]
#[command(
    name = "lessonmerge",
    version,
    about = "Merge generated digital-competence content into DOCX lesson plans",
    long_about = "lessonmerge - places ===NLS_<ID>=== sections into a lesson plan.\n\n\
                  Usage:\n  \
                  lessonmerge merge <lesson.docx> <result.txt>   Merge into an existing plan\n  \
                  lessonmerge new <result.txt>                   Render a fresh document\n  \
                  lessonmerge sections <result.txt>              List sections and anchors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge generated text into an existing document
    Merge {
        /// Original lesson plan (.docx)
        original: PathBuf,

        /// Generated text file ("-" for stdin)
        text: PathBuf,

        /// Output file path (default: <original>_NLS.docx next to the original)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How highlighted content is marked
        #[arg(long, default_value = "color")]
        highlight: HighlightMode,

        /// Text color (hex RGB) or note label, depending on --highlight
        #[arg(long)]
        highlight_value: Option<String>,

        /// Do not label sections appended at the end
        #[arg(long)]
        no_labels: bool,

        /// Apply text cleanup
        #[arg(long)]
        cleanup: Option<CleanupMode>,

        /// Print the merge report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render generated text into a fresh document
    New {
        /// Generated text file ("-" for stdin)
        text: PathBuf,

        /// Output file path (default: Giao_an_NLS.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// How highlighted content is marked
        #[arg(long, default_value = "color")]
        highlight: HighlightMode,

        /// Text color (hex RGB) or note label, depending on --highlight
        #[arg(long)]
        highlight_value: Option<String>,

        /// Apply text cleanup
        #[arg(long)]
        cleanup: Option<CleanupMode>,
    },

    /// List the marked sections of generated text
    Sections {
        /// Generated text file ("-" for stdin)
        text: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Print generated text with markers rewritten for reading
    Preview {
        /// Generated text file ("-" for stdin)
        text: PathBuf,
    },

    /// Export generated text unchanged as a plain-text file
    Text {
        /// Generated text file ("-" for stdin)
        text: PathBuf,

        /// Output file path (default: Giao_an_NLS.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Highlight mode
#[derive(Clone, Copy, ValueEnum)]
enum HighlightMode {
    /// Colored text
    Color,
    /// Italic note after the text
    Note,
}

/// Cleanup mode
#[derive(Clone, Copy, ValueEnum)]
enum CleanupMode {
    /// Only drop delimiter and placeholder lines
    Minimal,
    /// Full cleanup (default)
    Standard,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Merge {
            original,
            text,
            output,
            highlight,
            highlight_value,
            no_labels,
            cleanup,
            json,
        } => {
            let raw = read_text(&text)?;
            let mut options =
                MergeOptions::new().with_render(render_options(highlight, highlight_value, cleanup)?);
            if no_labels {
                options = options.without_labels();
            }
            let export_options = ExportOptions::new().with_merge(options);

            let pb = create_spinner("Merging document...");
            let result = merge_file(&original, &raw, &export_options.merge);
            pb.finish_and_clear();

            let merged = match result {
                Ok(merged) => merged,
                Err(e) => {
                    let fallback = sibling(&original, export_options.text_file_name());
                    fs::write(&fallback, export_text(&raw))?;
                    eprintln!(
                        "{} Merge failed; text saved to {}",
                        "!".yellow().bold(),
                        fallback.display()
                    );
                    return Err(e.into());
                }
            };

            let output =
                output.unwrap_or_else(|| sibling(&original, &export_options.merged_file_name(&original)));
            fs::write(&output, &merged.bytes)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&merged.report)?);
            } else {
                print_report(&merged.report);
            }
            println!("{} Merged: {}", "✓".green().bold(), output.display());
        }

        Commands::New {
            text,
            output,
            highlight,
            highlight_value,
            cleanup,
        } => {
            let raw = read_text(&text)?;
            let options = render_options(highlight, highlight_value, cleanup)?;
            let output = output.unwrap_or_else(|| PathBuf::from(ExportOptions::default().fresh_file_name()));

            let pb = create_spinner("Rendering document...");
            let result = create_docx(&raw, &options);
            pb.finish_and_clear();

            match result {
                Ok(bytes) => {
                    fs::write(&output, bytes)?;
                    println!("{} Created: {}", "✓".green().bold(), output.display());
                }
                Err(e) => {
                    let fallback = output.with_extension("txt");
                    fs::write(&fallback, export_text(&raw))?;
                    eprintln!(
                        "{} Rendering failed; text saved to {}",
                        "!".yellow().bold(),
                        fallback.display()
                    );
                    return Err(e.into());
                }
            }
        }

        Commands::Sections { text, json } => {
            let raw = read_text(&text)?;
            let sections = parse_sections(&raw);

            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
                return Ok(());
            }

            println!("{}", "Sections".cyan().bold());
            println!("{}", "─".repeat(40));
            for section in &sections {
                let first = section
                    .anchors
                    .first()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "(no anchor, appended at end)".dimmed().to_string());
                println!("{}: {}", section.marker.bold(), first);
            }
            println!("\n{}: {}", "Total".bold(), sections.len());
            if lessonmerge::cites_distribution(&raw) {
                println!("{} Objectives quoted from the PPCT", "ℹ".blue().bold());
            }
        }

        Commands::Preview { text } => {
            let raw = read_text(&text)?;
            write_output(None, &preview_markdown(&raw))?;
        }

        Commands::Text { text, output } => {
            let raw = read_text(&text)?;
            let output = output.unwrap_or_else(|| PathBuf::from(ExportOptions::default().text_file_name()));
            fs::write(&output, export_text(&raw))?;
            println!("{} Saved: {}", "✓".green().bold(), output.display());
        }
    }

    Ok(())
}

fn render_options(
    mode: HighlightMode,
    value: Option<String>,
    cleanup: Option<CleanupMode>,
) -> lessonmerge::Result<RenderOptions> {
    let highlight = match (mode, value) {
        (HighlightMode::Color, Some(rgb)) => Highlight::color(&rgb)?,
        (HighlightMode::Color, None) => Highlight::default(),
        (HighlightMode::Note, label) => Highlight::Note(label.unwrap_or_else(|| "(NLS)".to_string())),
    };

    let options = RenderOptions::new().with_highlight(highlight);
    Ok(match cleanup {
        Some(CleanupMode::Minimal) => options.with_cleanup(CleanupOptions::minimal()),
        Some(CleanupMode::Standard) | None => options,
    })
}

fn print_report(report: &MergeReport) {
    println!("{}", "Merge Report".cyan().bold());
    println!("{}", "─".repeat(40));
    for placement in &report.placements {
        println!("  {} {} → {}", "✓".green(), placement.marker, placement.anchor);
    }
    for marker in &report.unplaced {
        println!("  {} {} → end of document", "!".yellow(), marker);
    }
    match report.fallback {
        FallbackKind::None => {}
        FallbackKind::Sections => println!("{}", "Unplaced sections were appended at the end".yellow()),
        FallbackKind::WholeText => println!("{}", "No anchor matched; the whole text was appended".yellow()),
    }
    println!("{}: {}", "Summary".bold(), report);
}

/// Reads generated text from a file, or stdin for `-`.
fn read_text(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        fs::read_to_string(path)
    }
}

fn sibling(original: &Path, name: &str) -> PathBuf {
    original.parent().unwrap_or(Path::new(".")).join(name)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_options_from_flags() {
        let options = render_options(HighlightMode::Color, Some("#c00000".into()), None).unwrap();
        assert_eq!(options.highlight, Highlight::Color("C00000".into()));

        let options = render_options(HighlightMode::Note, None, Some(CleanupMode::Minimal)).unwrap();
        assert_eq!(options.highlight, Highlight::Note("(NLS)".into()));
        assert_eq!(options.cleanup, CleanupOptions::minimal());
    }

    #[test]
    fn test_invalid_highlight_color_rejected() {
        let err = render_options(HighlightMode::Color, Some(r#"F00"/><x"#.into()), None).unwrap_err();
        assert!(matches!(err, lessonmerge::Error::InvalidOption(_)));
        assert!(render_options(HighlightMode::Color, Some("red".into()), None).is_err());

        // Note labels are free text.
        assert!(render_options(HighlightMode::Note, Some("<mới>".into()), None).is_ok());
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling(Path::new("/tmp/plans/Bai_3.docx"), "Bai_3_NLS.docx"),
            PathBuf::from("/tmp/plans/Bai_3_NLS.docx")
        );
    }

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ket_qua.txt");
        fs::write(&path, "===NLS_MỤC_TIÊU===\nA\n===END===").unwrap();
        assert_eq!(parse_sections(&read_text(&path).unwrap()).len(), 1);
    }
}
