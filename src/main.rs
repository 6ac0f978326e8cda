use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use compostflow::diagram::{
    render_diagram, Canvas, DiagramStyle, FileBackend, MemoryBackend, PositionBackend,
    PositionStore,
};
use compostflow::fonts::CosmicTextMeasure;
use compostflow::model::engine::{derive, DerivedModel};
use compostflow::model::params::{ParamChange, ScenarioParams};
use compostflow::scenario::Scenario;
use compostflow::theme::Theme;

/// Render a composting co-op scenario as an annotated flow diagram
#[derive(Parser, Debug)]
#[command(name = "compostflow")]
#[command(about = "Render a composting co-op scenario to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Scenario file, TOML or YAML (omit for the built-in co-op)
    #[arg(value_name = "SCENARIO")]
    scenario: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Override the member household count
    #[arg(long, value_name = "N")]
    households: Option<f64>,

    /// Override the compost price per litre
    #[arg(long, value_name = "PRICE")]
    compost_price: Option<f64>,

    /// Override the tea concentrate price per litre
    #[arg(long, value_name = "PRICE")]
    tea_price: Option<f64>,

    /// Override the monthly subscription price per household
    #[arg(long, value_name = "PRICE")]
    subscription_price: Option<f64>,

    /// Override the compost give-back in litres per household per year
    #[arg(long, value_name = "LITRES")]
    giveback: Option<f64>,

    /// Leave the optional tea equipment out of the capital totals
    #[arg(long)]
    no_secondary: bool,

    /// Path to Alacritty theme file (YAML or TOML)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<PathBuf>,

    /// JSON file holding persisted node position overrides
    #[arg(long, value_name = "FILE")]
    positions: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 700.0)]
    height: f64,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print the derived business summary to stdout
    #[arg(long)]
    summary: bool,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "compostflow", &mut std::io::stdout());
        return Ok(());
    }

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin(),
    };

    let params = apply_levers(&args, &scenario);
    let model = derive(&params, &scenario);

    if args.summary {
        print_summary(&params, &model);
    }

    let Some(output) = &args.output else {
        if args.summary {
            return Ok(());
        }
        return Err("Nothing to do: pass -o OUTPUT and/or --summary".to_string());
    };

    let theme = load_theme(args.theme.as_deref())?;
    let canvas = Canvas::new(args.width, args.height);

    let svg = match &args.positions {
        Some(path) => {
            let store = PositionStore::open(FileBackend::new(path));
            render_document(&scenario, &params, &model, &store, &theme, canvas)?
        }
        None => {
            let store = PositionStore::open(MemoryBackend::new());
            render_document(&scenario, &params, &model, &store, &theme, canvas)?
        }
    };

    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}

/// Fold the command-line overrides into the scenario's default parameters.
/// Every override goes through the same clamp as an interactive edit would.
fn apply_levers(args: &Args, scenario: &Scenario) -> ScenarioParams {
    let limits = &scenario.limits;
    let mut params = scenario.params;

    if let Some(v) = args.households {
        params = params.apply(ParamChange::Households(v), limits);
    }
    if let Some(v) = args.compost_price {
        params = params.apply(ParamChange::CompostPrice(v), limits);
    }
    if let Some(v) = args.tea_price {
        params = params.apply(ParamChange::TeaPrice(v), limits);
    }
    if let Some(v) = args.subscription_price {
        params = params.apply(ParamChange::SubscriptionPrice(v), limits);
    }
    if let Some(v) = args.giveback {
        params = params.apply(ParamChange::GivebackPerYear(v), limits);
    }
    if args.no_secondary {
        params = params.apply(ParamChange::IncludeSecondary(false), limits);
    }

    params
}

fn load_theme(path: Option<&Path>) -> Result<Theme, String> {
    match path {
        Some(theme_path) => {
            if !theme_path.is_file() {
                return Err(format!("Theme file not found: {}", theme_path.display()));
            }
            let content = std::fs::read_to_string(theme_path)
                .map_err(|e| format!("Failed to read theme file: {}", e))?;
            Theme::from_alacritty(&content)
        }
        None => Ok(Theme::default()),
    }
}

fn render_document<B: PositionBackend>(
    scenario: &Scenario,
    params: &ScenarioParams,
    model: &DerivedModel,
    store: &PositionStore<B>,
    theme: &Theme,
    canvas: Canvas,
) -> Result<String, String> {
    let mut measure = CosmicTextMeasure::new()?;
    let style = DiagramStyle::from_theme(theme);
    let body = render_diagram(scenario, params, model, store, &style, canvas, &mut measure);

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}"><rect width="100%" height="100%" fill="{bg}" />{body}</svg>"#,
        w = canvas.width,
        h = canvas.height,
        bg = style.background,
        body = body,
    ))
}

fn print_summary(params: &ScenarioParams, model: &DerivedModel) {
    println!("Scenario: {} households", params.households);
    println!();
    println!("Volumes (per month)");
    println!("  cardboard collected   {:>8.0} L", model.inputs.cardboard_per_month);
    println!("  food scraps collected {:>8.0} L", model.inputs.food_waste_per_month);
    println!("  finished compost      {:>8.0} L", model.outputs.finished_compost_per_month);
    println!("  sellable compost      {:>8.1} L", model.sellable_compost_per_month);
    println!("  tea concentrate       {:>8.0} L", model.outputs.tea_concentrate_per_month);
    println!();
    println!("Revenue (per month)");
    println!("  subscriptions  ${:>8.2}", model.revenue.subscriptions);
    println!("  compost sales  ${:>8.2}", model.revenue.compost);
    println!("  tea sales      ${:>8.2}", model.revenue.tea);
    println!("  total          ${:>8.2}", model.revenue.total);
    println!();
    println!("Labor (hours per month)");
    for node in &model.task_breakdown {
        println!("  {} ({:.1} h)", node.node_label, node.total);
        for task in &node.tasks {
            println!("    {:<30} {:>6.1} h", task.name, task.hours_per_month);
        }
    }
    println!("  total {:.1} h, ${:.2} revenue per hour", model.labor.total, model.hourly_rate);
    println!();
    println!("Capital");
    for (category, cost) in &model.capital.by_category {
        println!("  {:<12} ${:>8.2}", category, cost);
    }
    println!(
        "  total ${:.2}, ${:.2}/yr depreciation",
        model.capital.total_cost, model.capital.annual_depreciation
    );
    println!();
    println!(
        "Annualized: ${:.2} revenue, {:.0} labor hours, ${:.2} net of depreciation",
        model.annual.revenue, model.annual.labor_hours, model.annual.net
    );
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks(fontdb);
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    let transform = Transform::from_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Keep text as paths for broader viewer/font compatibility.
    // This avoids PDFs with missing text when font embedding fails.
    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;
    let page_options = svg2pdf::PageOptions::default();

    svg2pdf::to_pdf(&tree, options, page_options)
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in fontdb.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
        fontdb.set_sans_serif_family(family);
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in fontdb.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
        fontdb.set_sans_serif_family(family);
    }
}
