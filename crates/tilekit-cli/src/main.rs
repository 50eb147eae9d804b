use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tilekit_core::config::{validate_pixel_value, validate_positive_pixel_value};
use tilekit_core::{
    DedupOptions, ScanConfig, Symmetry, TileRecord, TilingConfig, extrude_tileset, open_raster,
    parse_tiles, respace, save_raster, to_json_report,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tilekit",
    about = "Command line utility for tilesets",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv); -v also prints the tile frequency table
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,

    /// File name and format to output to (jpg, jpeg, png, gif, tif, tiff, bmp)
    #[arg(short, long, default_value = "tileset.png", global = true, help_heading = "Input/Output")]
    output: PathBuf,
    /// YAML config file path (overrides tiling options)
    #[arg(long, global = true, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, global = true, help_heading = "Input/Output")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], global = true, help_heading = "Input/Output")]
    print_config_format: String,

    /// Tile size to parse. Tiles are square
    #[arg(short, long, default_value_t = 16, global = true, help_heading = "Tiling")]
    size: u32,
    /// The tileset margin (parse: margin of the written tileset)
    #[arg(short, long, default_value_t = 0, global = true, help_heading = "Tiling")]
    margin: u32,
    /// The tile spacing (parse: spacing of the written tileset)
    #[arg(short = 'p', long, default_value_t = 0, global = true, help_heading = "Tiling")]
    spacing: u32,
    /// The 8 digit hex background colour to write (#RRGGBBAA)
    #[arg(short, long, default_value = "#00000000", global = true, help_heading = "Tiling")]
    color: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse the unique tiles out of an image and write them as a tileset.
    ///
    /// The image is scanned without margin or spacing; --margin, --spacing
    /// and --color only shape the tileset that is written.
    Parse(ParseArgs),
    /// Rewrite a tileset with a different margin, spacing and background
    Respace(RespaceArgs),
    /// Extrude the tiles of a tileset to mitigate texture bleeding
    Extrude(ExtrudeArgs),
}

#[derive(Parser, Debug, Clone)]
struct ParseArgs {
    /// Input image
    input: PathBuf,
    /// Start at this x coordinate
    #[arg(short, long, default_value_t = 0)]
    x_offset: u32,
    /// Start at this y coordinate
    #[arg(short, long, default_value_t = 0)]
    y_offset: u32,
    /// Allow tiles to match after being flipped and rotated
    #[arg(short, long, default_value_t = false)]
    transform: bool,
    /// Restrict the transform search, e.g. flipH-none,none-rotate90 (implies --transform)
    #[arg(long, value_delimiter = ',')]
    transforms: Vec<String>,
    /// Tiles per row in the output tileset
    #[arg(long, default_value_t = 10)]
    columns: u32,
    /// Write the frequency report (JSON) to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct RespaceArgs {
    /// Input tileset
    input: PathBuf,
    /// The output tileset margin
    #[arg(long, default_value_t = 0)]
    out_margin: u32,
    /// The output tile spacing
    #[arg(long, default_value_t = 0)]
    out_spacing: u32,
}

#[derive(Parser, Debug, Clone)]
struct ExtrudeArgs {
    /// Input tileset
    input: PathBuf,
    /// Extrusion thickness in pixels
    #[arg(long, default_value_t = 1)]
    thickness: u32,
}

/// Options after merging CLI flags with the optional YAML file.
#[derive(Debug, Clone, Serialize)]
struct Settings {
    output: PathBuf,
    size: u32,
    margin: u32,
    spacing: u32,
    color: String,
    columns: u32,
    x_offset: u32,
    y_offset: u32,
    transform: bool,
    transforms: Vec<String>,
    out_margin: u32,
    out_spacing: u32,
    thickness: u32,
}

impl Settings {
    fn from_cli(cli: &Cli) -> Self {
        let mut s = Settings {
            output: cli.output.clone(),
            size: cli.size,
            margin: cli.margin,
            spacing: cli.spacing,
            color: cli.color.clone(),
            columns: 10,
            x_offset: 0,
            y_offset: 0,
            transform: false,
            transforms: Vec::new(),
            out_margin: 0,
            out_spacing: 0,
            thickness: 1,
        };
        match &cli.command {
            Commands::Parse(a) => {
                s.columns = a.columns;
                s.x_offset = a.x_offset;
                s.y_offset = a.y_offset;
                s.transform = a.transform;
                s.transforms = a.transforms.clone();
            }
            Commands::Respace(a) => {
                s.out_margin = a.out_margin;
                s.out_spacing = a.out_spacing;
            }
            Commands::Extrude(a) => s.thickness = a.thickness,
        }
        s
    }

    /// Range checks shared by every command; nothing is read before these pass.
    fn validate(&self) -> anyhow::Result<()> {
        validate_positive_pixel_value("size", self.size)?;
        validate_pixel_value("margin", self.margin)?;
        validate_pixel_value("spacing", self.spacing)?;
        validate_pixel_value("x-offset", self.x_offset)?;
        validate_pixel_value("y-offset", self.y_offset)?;
        validate_pixel_value("out-margin", self.out_margin)?;
        validate_pixel_value("out-spacing", self.out_spacing)?;
        validate_pixel_value("thickness", self.thickness)?;
        if self.columns == 0 {
            anyhow::bail!("columns must be at least 1");
        }
        Ok(())
    }

    fn tiling(&self, background: [u8; 4]) -> TilingConfig {
        TilingConfig::builder()
            .tile_size(self.size, self.size)
            .margin(self.margin)
            .spacing(self.spacing)
            .columns(self.columns)
            .background(background)
            .build()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);

    let mut settings = Settings::from_cli(&cli);
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.apply(&mut settings);
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&settings)?),
            _ => println!("{}", serde_json::to_string_pretty(&settings)?),
        }
        return Ok(());
    }

    settings.validate()?;
    let background = parse_hex_color(&settings.color)?;
    info!(output = ?settings.output, "writing to output");

    match &cli.command {
        Commands::Parse(args) => run_parse(args, &settings, background, cli.verbose > 0 && !cli.quiet),
        Commands::Respace(args) => run_respace(args, &settings, background),
        Commands::Extrude(args) => run_extrude(args, &settings, background),
    }
}

fn run_parse(
    args: &ParseArgs,
    settings: &Settings,
    background: [u8; 4],
    print_table: bool,
) -> anyhow::Result<()> {
    let options = dedup_options(settings)?;
    let scan = ScanConfig {
        tile_width: settings.size,
        tile_height: settings.size,
        x_offset: settings.x_offset,
        y_offset: settings.y_offset,
    };
    let img = load(&args.input)?;
    let out = parse_tiles(&img, &scan, &options, &settings.tiling(background))?;

    if print_table {
        println!(
            "Parsed {} total tiles, {} unique",
            out.total_tiles,
            out.records.len()
        );
        print_frequency_table(&out.records, options.transform_search);
    }
    if let Some(report_path) = &args.report {
        let value = to_json_report(&out.records);
        fs::write(report_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", report_path.display()))?;
        info!(?report_path, "report exported");
    }
    store(&out.image, &settings.output)
}

fn run_respace(args: &RespaceArgs, settings: &Settings, background: [u8; 4]) -> anyhow::Result<()> {
    let img = load(&args.input)?;
    info!(
        reading = settings.margin,
        writing = settings.out_margin,
        "margin"
    );
    info!(
        reading = settings.spacing,
        writing = settings.out_spacing,
        "spacing"
    );
    info!(color = %settings.color, "background color");
    let read = settings.tiling(background);
    let image = respace(
        &img,
        &read,
        settings.out_margin,
        settings.out_spacing,
        background,
    )?;
    store(&image, &settings.output)
}

fn run_extrude(args: &ExtrudeArgs, settings: &Settings, background: [u8; 4]) -> anyhow::Result<()> {
    let img = load(&args.input)?;
    info!(thickness = settings.thickness, "extruding");
    let out = extrude_tileset(&img, &settings.tiling(background), settings.thickness)?;
    println!(
        "Extruded tileset has margin: {} and spacing: {}",
        out.effective_margin, out.effective_spacing
    );
    store(&out.image, &settings.output)
}

fn dedup_options(settings: &Settings) -> anyhow::Result<DedupOptions> {
    if !settings.transforms.is_empty() {
        let mut list = Vec::with_capacity(settings.transforms.len());
        for name in &settings.transforms {
            let sym: Symmetry = name
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown transform: {}", name))?;
            if sym.is_identity() {
                anyhow::bail!("the identity transform is always checked; remove {}", name);
            }
            list.push(sym);
        }
        return Ok(DedupOptions::restricted(list));
    }
    Ok(if settings.transform {
        DedupOptions::with_transforms()
    } else {
        DedupOptions::exact()
    })
}

fn load(path: &Path) -> anyhow::Result<image::RgbaImage> {
    info!(?path, "opening");
    open_raster(path).with_context(|| format!("open {}", path.display()))
}

fn store(img: &image::RgbaImage, path: &Path) -> anyhow::Result<()> {
    save_raster(img, path).with_context(|| format!("write {}", path.display()))?;
    info!(?path, width = img.width(), height = img.height(), "tileset written");
    Ok(())
}

fn print_frequency_table(records: &[TileRecord], with_transform: bool) {
    if with_transform {
        println!(
            "{:>13}  {:>6}  {:>14}  {}",
            "TILESET INDEX", "COUNT", "FIRST LOCATION", "TRANSFORMATION REQUIRED"
        );
    } else {
        println!("{:>13}  {:>6}  {:>14}", "TILESET INDEX", "COUNT", "FIRST LOCATION");
    }
    for (i, r) in records.iter().enumerate() {
        let loc = r.first_location.to_string();
        if with_transform {
            println!("{:>13}  {:>6}  {:>14}  {}", i, r.count, loc, r.transformed);
        } else {
            println!("{:>13}  {:>6}  {:>14}", i, r.count, loc);
        }
    }
}

/// Parses `#RRGGBBAA` (or `#RRGGBB`, opaque) into RGBA bytes.
fn parse_hex_color(s: &str) -> anyhow::Result<[u8; 4]> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) || !matches!(hex.len(), 6 | 8) {
        anyhow::bail!("invalid hex color {:?}: expected #RRGGBBAA", s);
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, alpha])
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "warn".into(),
            1 => "info".into(),
            2 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    output: Option<PathBuf>,
    size: Option<u32>,
    margin: Option<u32>,
    spacing: Option<u32>,
    color: Option<String>,
    columns: Option<u32>,
    x_offset: Option<u32>,
    y_offset: Option<u32>,
    transform: Option<bool>,
    transforms: Option<Vec<String>>,
    out_margin: Option<u32>,
    out_spacing: Option<u32>,
    thickness: Option<u32>,
}

impl YamlConfig {
    fn apply(self, s: &mut Settings) {
        if let Some(v) = self.output {
            s.output = v;
        }
        if let Some(v) = self.size {
            s.size = v;
        }
        if let Some(v) = self.margin {
            s.margin = v;
        }
        if let Some(v) = self.spacing {
            s.spacing = v;
        }
        if let Some(v) = self.color {
            s.color = v;
        }
        if let Some(v) = self.columns {
            s.columns = v;
        }
        if let Some(v) = self.x_offset {
            s.x_offset = v;
        }
        if let Some(v) = self.y_offset {
            s.y_offset = v;
        }
        if let Some(v) = self.transform {
            s.transform = v;
        }
        if let Some(v) = self.transforms {
            s.transforms = v;
        }
        if let Some(v) = self.out_margin {
            s.out_margin = v;
        }
        if let Some(v) = self.out_spacing {
            s.out_spacing = v;
        }
        if let Some(v) = self.thickness {
            s.thickness = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_for(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        Settings::from_cli(&cli)
    }

    #[test]
    fn hex_color_accepts_both_forms() {
        assert_eq!(parse_hex_color("#11223344").unwrap(), [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(parse_hex_color("#FF8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_hex_color(" ff800080 ").unwrap(), [255, 128, 0, 128]);
    }

    #[test]
    fn hex_color_rejects_malformed_input() {
        assert!(parse_hex_color("#zz000000").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("").is_err());
        assert!(parse_hex_color("#ééé").is_err());
    }

    #[test]
    fn transform_flags_select_search() {
        let exact = dedup_options(&settings_for(&["tilekit", "parse", "in.png"])).unwrap();
        assert!(!exact.transform_search);

        let full = dedup_options(&settings_for(&["tilekit", "parse", "in.png", "-t"])).unwrap();
        assert_eq!(full, DedupOptions::with_transforms());

        let list = settings_for(&[
            "tilekit",
            "parse",
            "in.png",
            "--transforms",
            "flipH-rotate90,none-rotate180",
        ]);
        let restricted = dedup_options(&list).unwrap();
        assert!(restricted.transform_search);
        assert_eq!(restricted.transforms.len(), 2);
        assert_eq!(restricted.transforms[0].to_string(), "flipH-rotate90");
    }

    #[test]
    fn transform_list_rejects_identity_and_unknown_names() {
        let identity = settings_for(&["tilekit", "parse", "in.png", "--transforms", "none-none"]);
        assert!(dedup_options(&identity).is_err());

        let unknown = settings_for(&["tilekit", "parse", "in.png", "--transforms", "spin-90"]);
        assert!(dedup_options(&unknown).is_err());
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let size = settings_for(&["tilekit", "-s", "0", "parse", "in.png"]);
        assert!(size.validate().is_err());

        let thickness = settings_for(&["tilekit", "extrude", "in.png", "--thickness", "70000"]);
        assert!(thickness.validate().is_err());

        let ok = settings_for(&["tilekit", "respace", "in.png", "--out-margin", "2"]);
        assert!(ok.validate().is_ok());
    }
}
