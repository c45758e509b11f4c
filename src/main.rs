use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use print_layers::{compose, flood_fill, replace_palette, Palette, Quantizer, Raster, Rgb};
use reduction_print::api;
use reduction_print::models::{self, AppConfig};
use reduction_print::rendering::{decode_upload, encode_png, encode_progression};
use reduction_print::server;
use reduction_print::services::{MAX_COLORS, MIN_COLORS};

#[derive(Parser)]
#[command(name = "reduction-print")]
#[command(about = "Turn photographs into layered plans for reduction printmaking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Reduce an image and write its layers to a directory (no server needed)
    Process(ProcessArgs),
}

#[derive(Args)]
struct ProcessArgs {
    /// Input image (PNG, JPEG, ...)
    input: PathBuf,

    /// Palette size including the paper white (2-12)
    #[arg(short, long, default_value_t = 4)]
    colors: usize,

    /// Print order as comma-separated palette indices (e.g. "3,1,0")
    #[arg(long)]
    order: Option<String>,

    /// Replacement palette as comma-separated hex colors (e.g. "#1a1a2e,#c0392b,#ffffff")
    #[arg(long)]
    palette: Option<String>,

    /// Speckle removal strength (0-100)
    #[arg(short, long, default_value_t = 0)]
    simplify: u8,

    /// Flood-fill the region at "x,y" (optionally "x,y,tolerance") before quantizing; repeatable
    #[arg(long = "fill", value_name = "X,Y[,TOLERANCE]")]
    fills: Vec<String>,

    /// Color used by --fill
    #[arg(long, default_value = "#ffffff")]
    fill_color: String,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,
}

/// A `--fill` seed
#[derive(Debug, Clone, Copy, PartialEq)]
struct FillSeed {
    x: usize,
    y: usize,
    tolerance: f64,
}

const DEFAULT_FILL_TOLERANCE: f64 = 32.0;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reduction Print API",
        description = "Color reduction and layer decomposition for reduction printmaking",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::list_projects,
        api::create_project,
        api::get_project,
        api::delete_project,
        api::get_image,
        api::export_project,
        api::crop_project,
        api::fill_project,
        api::quantize_project,
        api::update_palette,
        api::merge_palette,
        api::flip_project,
        api::build_layers,
    ),
    components(schemas(
        api::UploadForm,
        api::QuantizeRequest,
        api::FillRequest,
        api::PaletteUpdateRequest,
        api::ColorInput,
        api::MergeRequest,
        api::LayerRequest,
        models::ProjectSummary,
        models::ProjectDetail,
        models::ProjectState,
        models::CropRect,
        models::FlipFlags,
    )),
    tags(
        (name = "Projects", description = "Project upload, listing and artifacts"),
        (name = "Processing", description = "Crop, fill, quantize, palette edits and layers")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Process(args)) => run_process_command(&args),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Fill, quantize, optionally recolor, and compose layers straight to files
fn run_process_command(args: &ProcessArgs) -> anyhow::Result<()> {
    let ProcessArgs {
        input,
        colors,
        simplify,
        output,
        ..
    } = args;
    let (colors, simplify) = (*colors, *simplify);

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reduction_print=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    if !(MIN_COLORS..=MAX_COLORS).contains(&colors) {
        anyhow::bail!("--colors must be between {MIN_COLORS} and {MAX_COLORS}, got {colors}");
    }
    let order = args.order.as_deref().map(parse_order).transpose()?;
    let replacement = args.palette.as_deref().map(parse_palette).transpose()?;
    let fills = args
        .fills
        .iter()
        .map(|s| parse_fill(s))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let fill_color: Rgb = args
        .fill_color
        .parse()
        .with_context(|| format!("invalid --fill-color '{}'", args.fill_color))?;

    let config = AppConfig::from_env();
    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let source = apply_fills(decode_upload(&bytes)?, &fills, fill_color)?;

    let quantized = Quantizer::new(config.quantizer.options(simplify)).quantize(&source, colors)?;
    let (palette, raster) = match replacement {
        Some(replacement) => {
            let raster = replace_palette(&quantized.labels, &quantized.palette, &replacement)?;
            (replacement, raster)
        }
        None => (quantized.palette.clone(), quantized.raster.clone()),
    };
    let composition = compose(&palette, &quantized.labels, order.as_deref())?;

    let layers_dir = output.join("layers");
    std::fs::create_dir_all(&layers_dir)
        .with_context(|| format!("creating {}", layers_dir.display()))?;
    std::fs::write(output.join("quantized.png"), encode_png(&raster)?)?;
    for layer in &composition.layers {
        let path = layers_dir.join(format!("layer_{}.png", layer.position));
        std::fs::write(&path, encode_png(&layer.raster)?)?;
    }
    let rasters: Vec<Raster> = composition.layers.iter().map(|l| l.raster.clone()).collect();
    let paper = palette.color(palette.paper_index());
    std::fs::write(
        layers_dir.join("progression.gif"),
        encode_progression(&rasters, paper)?,
    )?;

    println!(
        "Quantized {} ({}x{}) to {} colors",
        input.display(),
        source.width(),
        source.height(),
        palette.len()
    );
    for (position, &index) in composition.order.as_slice().iter().enumerate() {
        println!("  layer {position}: palette[{index}] {}", palette.color(index));
    }
    println!("Wrote {}", output.display());

    Ok(())
}

fn apply_fills(mut raster: Raster, fills: &[FillSeed], color: Rgb) -> anyhow::Result<Raster> {
    for seed in fills {
        let filled = flood_fill(&raster, seed.x, seed.y, seed.tolerance, color)
            .with_context(|| format!("--fill {},{}", seed.x, seed.y))?;
        tracing::debug!(x = seed.x, y = seed.y, pixels = filled.pixels, "Filled region");
        raster = filled.raster;
    }
    Ok(raster)
}

fn parse_fill(s: &str) -> anyhow::Result<FillSeed> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let coord = |part: &str| {
        part.parse::<usize>()
            .with_context(|| format!("invalid coordinate '{part}' in --fill"))
    };
    match parts.as_slice() {
        [x, y] => Ok(FillSeed {
            x: coord(*x)?,
            y: coord(*y)?,
            tolerance: DEFAULT_FILL_TOLERANCE,
        }),
        [x, y, tolerance] => {
            let tolerance = tolerance
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .with_context(|| format!("invalid tolerance '{tolerance}' in --fill"))?;
            Ok(FillSeed {
                x: coord(*x)?,
                y: coord(*y)?,
                tolerance,
            })
        }
        _ => anyhow::bail!("--fill expects X,Y or X,Y,TOLERANCE, got '{s}'"),
    }
}

fn parse_order(s: &str) -> anyhow::Result<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .with_context(|| format!("invalid palette index '{part}' in --order"))
        })
        .collect()
}

fn parse_palette(s: &str) -> anyhow::Result<Palette> {
    let colors = s
        .split(',')
        .map(|part| {
            part.parse::<Rgb>()
                .with_context(|| format!("invalid color '{}' in --palette", part.trim()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Palette::new(&colors)?)
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let projects_dir = std::env::var("PROJECTS_DIR").ok();

    // Header
    println!("Reduction Print v{VERSION}");
    println!("Color reduction and layer decomposition for reduction printmaking\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR    = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE  = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  PROJECTS_DIR = {}",
        projects_dir.as_deref().unwrap_or("(not set)")
    );

    // Effective configuration
    let config = AppConfig::from_env();
    let project_count = std::fs::read_dir(&config.projects_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().join("project.json").is_file())
                .count()
        })
        .unwrap_or(0);

    println!("\nConfiguration:");
    println!(
        "  Projects:  {} ({project_count} {})",
        config.projects_dir.display(),
        if project_count == 1 { "project" } else { "projects" }
    );
    println!("  Upload:    max {} bytes", config.max_upload_bytes);
    println!(
        "  Quantizer: seed {}, {} restarts, {} iterations, {} samples",
        config.quantizer.seed,
        config.quantizer.restarts,
        config.quantizer.max_iterations,
        config.quantizer.sample_size
    );

    // Commands section
    println!("\nCommands:");
    println!("  reduction-print serve     Start the HTTP server");
    println!("  reduction-print process   Reduce an image to layers on disk");
    println!("\nRun 'reduction-print --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reduction_print=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = AppConfig::from_env();

    // Create application state using shared server module
    let state = server::create_app_state(config)?;

    // Build router: shared API routes plus OpenAPI documentation
    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Reduction print server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
