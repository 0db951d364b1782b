use clap::{Parser, Subcommand};
use pavilion_site::interaction::{ViewportProfile, normalize};
use pavilion_site::{config, generate, output, process, scan};
use std::path::{Path, PathBuf};

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the processing cache and re-encode every image
    #[arg(long)]
    no_cache: bool,
}

/// Window measurements for the viewport normalizer.
#[derive(clap::Args, Clone)]
struct ViewportArgs {
    /// Viewport CSS width (window.innerWidth)
    #[arg(long)]
    inner: f64,
    /// Browser window width (window.outerWidth)
    #[arg(long)]
    outer: f64,
    /// Available screen width (screen.availWidth)
    #[arg(long)]
    screen: f64,
}

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
#[command(name = "pavilion-site")]
#[command(about = "Static site generator for the Pavilion Square KL marketing page")]
#[command(long_about = "\
Static site generator for the Pavilion Square KL marketing page

All copy lives in site.toml; pictures referenced by relative path are encoded
into responsive AVIF variants. The output is one index.html with inline CSS
and the runtime script that drives carousels, reveals and the lead form.

Content structure:

  content/
  ├── config.toml              # Theme, image sizes, timings (optional)
  ├── site.toml                # Sections: hero, location, units, facilities,
  │                            #   virtual_tour, concierge, contact, footer
  ├── gallery/                 # Contact gallery, ordered by number prefix
  │   ├── 010-Grand-Lobby.jpg
  │   ├── 020-Sky-Facilities.jpg
  │   └── lobby-draft.jpg      # No number prefix = not shown
  ├── images/                  # Pictures referenced from site.toml
  └── assets/                  # Copied verbatim (pano-viewer.html, favicon)

Image references:
  images/hero.jpg              Processed into srcset variants
  /media/renders/night.webp    Served through a rewrite rule
  https://cdn.example/a.webp   Used as-is

Run 'pavilion-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest, processed images)
    #[arg(long, default_value = ".pavilion-site-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Generate responsive image variants
    Process(CacheArgs),
    /// Produce the final page from processed images
    Generate,
    /// Run the full pipeline: scan → process → generate
    Build(CacheArgs),
    /// Validate content directory without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Show how the page normalizes font size and zoom for a window
    Normalize(ViewportArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_scan_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Process(cache_args) => {
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&scan_manifest_path)?;
            let manifest: scan::Manifest = serde_json::from_str(&manifest_content)?;
            run_process(
                &manifest.config,
                &scan_manifest_path,
                &cli.source,
                &cli.temp_dir,
                !cache_args.no_cache,
            )?;
        }
        Command::Generate => {
            run_generate(&cli.temp_dir, &cli.output, &cli.source)?;
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            let scan_manifest_path = write_scan_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Processing images");
            run_process(
                &manifest.config,
                &scan_manifest_path,
                &cli.source,
                &cli.temp_dir,
                !cache_args.no_cache,
            )?;

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            run_generate(&cli.temp_dir, &cli.output, &cli.source)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Normalize(args) => {
            let profile = ViewportProfile::new(args.inner, args.outer, args.screen);
            output::print_normalization(&profile, &normalize(&profile));
        }
    }

    Ok(())
}

fn write_scan_manifest(
    manifest: &scan::Manifest,
    temp_dir: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}

/// Stage 2, with progress printed from a dedicated thread.
fn run_process(
    site_config: &config::SiteConfig,
    scan_manifest_path: &Path,
    source: &Path,
    temp_dir: &Path,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&site_config.processing);
    let processed_dir = temp_dir.join("processed");
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(
        scan_manifest_path,
        source,
        &processed_dir,
        use_cache,
        Some(tx),
    );
    // The sender is dropped with `process`, so the printer drains and exits
    if printer.join().is_err() {
        eprintln!("warning: progress printer stopped early");
    }
    let result = result?;

    let output_manifest = processed_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&result.manifest)?;
    std::fs::write(&output_manifest, &json)?;
    println!("Cache: {}", result.cache_stats);
    Ok(())
}

/// Stage 3.
fn run_generate(
    temp_dir: &Path,
    output_dir: &Path,
    source: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let processed_dir = temp_dir.join("processed");
    let processed_manifest_path = processed_dir.join("manifest.json");
    generate::generate(
        &processed_manifest_path,
        &processed_dir,
        output_dir,
        source,
    )?;
    let manifest_content = std::fs::read_to_string(&processed_manifest_path)?;
    let manifest: generate::Manifest = serde_json::from_str(&manifest_content)?;
    output::print_generate_output(&manifest);
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
