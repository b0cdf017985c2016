use clap::{Parser, Subcommand};
use quote_paper::generate::QuoteGenerator;
use quote_paper::record::Quote;
use quote_paper::{config, output, rotate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quote-paper")]
#[command(about = "Render quotes into e-reader lock-screen wallpapers")]
#[command(long_about = "\
Render quotes into e-reader lock-screen wallpapers

Every quote becomes one fixed-size PNG, set in a randomly picked font at
the largest size that fits the canvas.

Project layout:

  my-quotes/
  ├── quote-paper.toml        # Optional config (run 'quote-paper gen-config')
  ├── data/                   # CSV input: \"Quote text\", Speaker
  │   └── stoics.csv
  ├── fonts/ttf/              # Quote faces (.ttf/.otf); system fonts if empty
  └── output/                 # Generated images
      └── stoics_quote_001.png

Run without a command for the interactive menu.")]
#[command(version = version_string())]
struct Cli {
    /// Project root (default: nearest directory with quote-paper.toml, else cwd)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Seed for font selection, for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate images from every CSV file in the data directory
    Generate {
        /// Data directory (default from config)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate images from a single CSV file
    GenerateFile {
        csv: PathBuf,
        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate one image from a quote (prompts for missing values)
    Adhoc {
        #[arg(long)]
        quote: Option<String>,
        #[arg(long)]
        speaker: Option<String>,
    },
    /// Rotate every image in the output directory (or DIR) by 180°
    Rotate { dir: Option<PathBuf> },
    /// Print a stock quote-paper.toml with all options documented
    GenConfig,
}

/// Resolved project context shared by all commands.
struct Project {
    root: PathBuf,
    config: config::QuoteConfig,
    seed: Option<u64>,
}

impl Project {
    fn load(root: Option<PathBuf>, seed: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let root = match root {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir()?;
                config::find_project_root(&cwd).unwrap_or(cwd)
            }
        };
        let config = config::load_config(&root)?;
        Ok(Self { root, config, seed })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.resolve(&self.config.paths.output_dir))
    }

    fn generator(&self) -> Result<QuoteGenerator<StdRng>, Box<dyn std::error::Error>> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let generator = QuoteGenerator::from_config(&self.config, &self.root, rng)?;
        log::info!("fonts: {}", generator.fonts().names().join(", "));
        Ok(generator)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let project = Project::load(cli.root, cli.seed)?;

    match cli.command {
        Some(Command::Generate { data, output }) => {
            let data_dir = data.unwrap_or_else(|| project.resolve(&project.config.paths.data_dir));
            generate_folder(&project, &data_dir, &project.output_dir(output))?;
        }
        Some(Command::GenerateFile { csv, output }) => {
            let output_dir = project.output_dir(output);
            let mut generator = project.generator()?;
            let report =
                generator.process_csv(&csv, &output_dir, project.config.csv.has_header)?;
            output::print_csv_report(&report);
            println!(
                "==> Generated {}, skipped {}",
                report.generated(),
                report.skipped()
            );
        }
        Some(Command::Adhoc { quote, speaker }) => {
            let mut editor = DefaultEditor::new()?;
            run_adhoc(&project, &mut editor, quote, speaker)?;
        }
        Some(Command::Rotate { dir }) => {
            rotate_dir(&project.output_dir(dir))?;
        }
        Some(Command::GenConfig) => unreachable!("handled before loading the project"),
        None => run_menu(&project)?,
    }

    Ok(())
}

fn generate_folder(
    project: &Project,
    data_dir: &Path,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Generating from {}", data_dir.display());
    let mut generator = project.generator()?;
    let summary =
        generator.generate_from_folder(data_dir, output_dir, project.config.csv.has_header)?;
    output::print_batch_summary(&summary);
    Ok(())
}

fn rotate_dir(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Rotating images in {}", dir.display());
    let report = rotate::rotate_all(dir)?;
    output::print_rotate_report(&report, dir);
    Ok(())
}

/// Read one trimmed line; `None` on Ctrl-C / Ctrl-D.
fn prompt(editor: &mut DefaultEditor, label: &str) -> Result<Option<String>, ReadlineError> {
    match editor.readline(label) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e),
    }
}

fn run_adhoc(
    project: &Project,
    editor: &mut DefaultEditor,
    quote: Option<String>,
    speaker: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match quote {
        Some(q) => q,
        None => match prompt(editor, "Enter the quote: ")? {
            Some(q) => q,
            None => return Ok(()),
        },
    };
    let speaker = match speaker {
        Some(s) => s,
        None => prompt(editor, "Enter the author/speaker (optional): ")?.unwrap_or_default(),
    };

    let quote = match Quote::new(&text, Some(&speaker)) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(());
        }
    };

    let mut generator = project.generator()?;
    let output_dir = project.output_dir(None);
    match generator.generate_adhoc(&quote, &output_dir) {
        Ok(generated) => output::print_generated(&generated),
        Err(e) => eprintln!("Error: {e}"),
    }
    Ok(())
}

/// Interactive menu, looping until the user exits.
fn run_menu(project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = DefaultEditor::new()?;
    loop {
        println!();
        println!("Quote Image Generator");
        println!("=====================");
        println!("1. Generate images from folder (CSV files)");
        println!("2. Rotate images");
        println!("3. Generate ad-hoc quote image");
        println!("4. Exit");

        let Some(choice) = prompt(&mut editor, "\nEnter your choice (1-4): ")? else {
            return Ok(());
        };
        // Per-action failures are reported and the menu keeps running.
        let result = match choice.as_str() {
            "1" => generate_folder(
                project,
                &project.resolve(&project.config.paths.data_dir),
                &project.output_dir(None),
            ),
            "2" => rotate_dir(&project.output_dir(None)),
            "3" => run_adhoc(project, &mut editor, None, None),
            "4" => {
                println!("Goodbye!");
                return Ok(());
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
    }
}
