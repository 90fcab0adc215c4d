use clap::{Parser, Subcommand};
use sitekit::imaging::RustBackend;
use sitekit::{assets, config, css, indexes, output, pages, process, recompress, watch};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sitekit")]
#[command(about = "Build pipeline for static marketing sites")]
#[command(long_about = "\
Build pipeline for static marketing sites

The source tree is the data source. HTML templates under src/ become pages,
SCSS partial directories get generated @forward indexes, and raster images
grow WebP/AVIF siblings next to them.

Project structure:

  site.toml                        # Site config (optional, all keys defaulted)
  src/
  ├── index.html                   # Page → dist/index.html
  ├── about/index.html             # Nested page → dist/about/index.html
  ├── includes/header.html         # Partial (excluded from page collection)
  └── assets/
      ├── styles/module/_nav.scss  # Partial → forwarded from _index.scss
      └── images/hero.jpg          # Source → hero.webp / hero.avif siblings
  public/                          # Copied verbatim into dist/

Per-page metadata lives in [pages.\"/about/index.html\"] tables and deep-merges
over the [site] defaults.

Run 'sitekit gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Path to the site config file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: indexes → images → pages → css → hash → recompress
    Build,
    /// Regenerate SCSS partial index files
    Indexes,
    /// Recompress source images and generate WebP/AVIF siblings
    Images,
    /// Render HTML pages and copy public assets into dist
    Pages,
    /// Losslessly shrink built images in place
    Recompress,
    /// Watch image directories and backfill missing derived siblings
    Watch,
    /// Validate config and render all pages without writing output
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // gen-config must work even with a broken site.toml in the way
    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    let root = Path::new(".");

    match cli.command {
        Command::Build => {
            let out_dir = root.join(&config.build.out_dir);

            println!("==> Stage 1: Partial indexes");
            let outcomes = indexes::generate_indexes(root, &config.styles.index_dirs)?;
            output::print_index_output(&outcomes);

            println!("==> Stage 2: Images");
            init_thread_pool(&config.processing);
            let summary = process::build_images(&RustBackend, root, &config.images);
            output::print_image_output(&summary);

            println!("==> Stage 3: Pages → {}", out_dir.display());
            let rendered = pages::render_pages(&config, root, &out_dir)?;
            pages::copy_public(&root.join(&config.build.public_dir), &out_dir)?;
            pages::write_runtime_scripts(&out_dir)?;
            output::print_page_output(&rendered);

            println!("==> Stage 4: CSS");
            let reports = css::process_css(
                &out_dir,
                config.build.purge_css,
                config.build.minify_css,
                &config.build.purge_safelist,
            )?;
            for report in &reports {
                output::print_css_output(
                    &report.path.display().to_string(),
                    report.before,
                    report.after,
                );
            }

            if config.build.hash_assets {
                println!("==> Stage 5: Asset hashing");
                let hashed = assets::hash_assets(&out_dir)?;
                output::print_hash_output(hashed.renamed());
            }

            println!("==> Stage 6: Recompress");
            let settings = process::EncodeSettings::from_config(&config.images);
            let summary = recompress::recompress_dirs(
                &RustBackend,
                root,
                &dist_image_dirs(&config),
                &settings,
            );
            output::print_recompress_output(&summary);

            println!("==> Build complete: {}", out_dir.display());
        }
        Command::Indexes => {
            let outcomes = indexes::generate_indexes(root, &config.styles.index_dirs)?;
            output::print_index_output(&outcomes);
        }
        Command::Images => {
            init_thread_pool(&config.processing);
            let summary = process::build_images(&RustBackend, root, &config.images);
            output::print_image_output(&summary);
        }
        Command::Pages => {
            let out_dir = root.join(&config.build.out_dir);
            let rendered = pages::render_pages(&config, root, &out_dir)?;
            pages::copy_public(&root.join(&config.build.public_dir), &out_dir)?;
            pages::write_runtime_scripts(&out_dir)?;
            output::print_page_output(&rendered);
        }
        Command::Recompress => {
            init_thread_pool(&config.processing);
            let settings = process::EncodeSettings::from_config(&config.images);
            let summary = recompress::recompress_dirs(
                &RustBackend,
                root,
                &dist_image_dirs(&config),
                &settings,
            );
            output::print_recompress_output(&summary);
        }
        Command::Watch => {
            watch::watch(&RustBackend, root, &config.images)?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let rendered = pages::check_pages(&config, root)?;
            output::print_page_output(&rendered);
            println!("==> Site is valid");
        }
        Command::GenConfig => unreachable!(),
    }

    Ok(())
}

/// Where built images end up, relative to the project root.
fn dist_image_dirs(config: &config::SiteConfig) -> Vec<String> {
    vec![format!("{}/assets/images", config.build.out_dir)]
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
