use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cpstool::{AssetManifest, CpsImage, ImageDefinition, PakArchive, Palette};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug)]
struct Arguments {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a CPS image to PNG
    Convert {
        input: PathBuf,

        /// PNG file to write, defaults to the input name with a .png extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: RenderArgs,
    },

    /// Print the header of a CPS image
    Info { input: PathBuf },

    /// Convert every image listed in an asset manifest
    Export {
        manifest: PathBuf,

        #[command(flatten)]
        args: ExportArgs,
    },

    /// Work with PAK archives
    Pak {
        #[command(subcommand)]
        command: PakCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PakCommands {
    /// List the entries of an archive
    List { archive: PathBuf },

    /// Extract one entry, or all of them if no name is given
    Extract {
        archive: PathBuf,

        name: Option<String>,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Build an archive from a list of files
    Create {
        archive: PathBuf,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct RenderArgs {
    /// 6-bit VGA palette (768 bytes). Falls back to the embedded palette, then greyscale
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Integer upscaling factor
    #[arg(short, long, default_value = "1")]
    scale: u32,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    /// The output directory to export the images to
    #[arg(short, long, default_value = "export")]
    out_dir: PathBuf,

    /// Overwrite the output directory if it already exists
    #[arg(long)]
    force: bool,

    /// Integer upscaling factor
    #[arg(short, long, default_value = "1")]
    scale: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    colog::init();

    match args.command {
        Commands::Convert {
            input,
            output,
            args,
        } => convert(&input, output, &args),
        Commands::Info { input } => info(&input),
        Commands::Export { manifest, args } => export(&manifest, &args),
        Commands::Pak { command } => pak(command),
    }
}

fn load_palette(path: Option<&Path>) -> anyhow::Result<Option<Palette>> {
    path.map(|path| {
        Palette::load(path)
            .with_context(|| format!("Failed to load palette {}", path.display()))
    })
    .transpose()
}

fn convert(input: &Path, output: Option<PathBuf>, args: &RenderArgs) -> anyhow::Result<()> {
    let image = CpsImage::open(input)
        .with_context(|| format!("Failed to load CPS image {}", input.display()))?;
    let palette = image.resolve_palette(load_palette(args.palette.as_deref())?);

    let output = output.unwrap_or_else(|| input.with_extension("png"));
    image
        .save_png(&output, &palette, args.scale)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    log::info!(
        "Converted {} ({}) to {}",
        input.display(),
        image.compression(),
        output.display()
    );

    Ok(())
}

fn info(input: &Path) -> anyhow::Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let header = cpstool::CpsHeader::parse(&data)?;

    println!("File size:         {}", header.file_size);
    println!(
        "Compression:       {} ({:#06x})",
        header.compression,
        u16::from(header.compression)
    );
    println!("Uncompressed size: {}", header.uncompressed_size);
    println!("Embedded palette:  {}", header.palette_size != 0);

    Ok(())
}

fn export(manifest_path: &Path, args: &ExportArgs) -> anyhow::Result<()> {
    use indicatif::ProgressBar;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let manifest = AssetManifest::load(manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    log::info!("Exporting {} images...", manifest.images.len());

    if args.force && args.out_dir.exists() {
        fs::remove_dir_all(&args.out_dir)
            .with_context(|| "Failed to clean up old export directory")?;
    }
    fs::create_dir(&args.out_dir).with_context(|| "Failed to create output directory")?;

    let progress = ProgressBar::new(manifest.images.len() as u64);
    let failed = AtomicUsize::new(0);

    manifest.images.par_iter().for_each(|image| {
        if let Err(err) = export_image(&manifest, image, &args.out_dir, args.scale) {
            progress.suspend(|| log::error!("Failed to export {}: {:#}", image.name, err));
            failed.fetch_add(1, Ordering::SeqCst);
        }
        progress.inc(1);
    });

    progress.finish_and_clear();

    let failed = failed.load(Ordering::SeqCst);
    log::info!(
        "Done! Exported {} images, {} failed",
        manifest.images.len() - failed,
        failed
    );

    Ok(())
}

fn export_image(
    manifest: &AssetManifest,
    image: &ImageDefinition,
    out_dir: &Path,
    scale: u32,
) -> anyhow::Result<()> {
    let data = fs::read(&image.path)
        .with_context(|| format!("Failed to read {}", image.path.display()))?;
    let cps = CpsImage::parse_with_size(&data, manifest.raster.width, manifest.raster.height)?;
    let palette = cps.resolve_palette(load_palette(manifest.palette_for(image))?);

    let path = image.output_path(out_dir)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| "Failed to create directory")?;
    }

    cps.save_png(&path, &palette, scale)?;

    log::debug!("Exported image: {}", path.display());
    Ok(())
}

fn pak(command: PakCommands) -> anyhow::Result<()> {
    match command {
        PakCommands::List { archive } => {
            let pak = PakArchive::open(&archive)
                .with_context(|| format!("Failed to open {}", archive.display()))?;

            for entry in pak.entries() {
                println!("{:#010x} {:>8} {}", entry.offset, entry.data.len(), entry.name);
            }
        }
        PakCommands::Extract {
            archive,
            name,
            out_dir,
        } => {
            let pak = PakArchive::open(&archive)
                .with_context(|| format!("Failed to open {}", archive.display()))?;
            fs::create_dir_all(&out_dir).with_context(|| "Failed to create output directory")?;

            let extracted = match name {
                Some(name) => vec![pak.extract(&name, &out_dir)?],
                None => pak.extract_all(&out_dir)?,
            };

            log::info!("Extracted {} files", extracted.len());
        }
        PakCommands::Create { archive, files } => {
            let mut pak = PakArchive::new();

            for file in &files {
                let name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .with_context(|| format!("Invalid file name {}", file.display()))?;
                let data =
                    fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

                pak.add(name, data)?;
            }

            pak.save(&archive)
                .with_context(|| format!("Failed to write {}", archive.display()))?;
            log::info!("Wrote {} entries to {}", files.len(), archive.display());
        }
    }

    Ok(())
}
