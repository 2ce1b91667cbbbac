use cpstool::{AssetManifest, ImageDefinition, ManifestError, RasterSize};
use std::{fs, path::Path};

const MANIFEST: &str = r#"
palette = "origpal.col"

[raster]
width = 160

[[image]]
name = "brandon"
path = "data/brandon.cps"
category = "portraits"

[[image]]
name = "title"
path = "/abs/title.cps"
palette = "title.col"
"#;

#[test]
fn test_parse() -> anyhow::Result<()> {
    let manifest = AssetManifest::parse(MANIFEST)?;

    assert_eq!(
        manifest.raster,
        RasterSize {
            width: 160,
            height: 200
        }
    );
    assert_eq!(manifest.images.len(), 2);
    assert_eq!(manifest.images[0].category.as_deref(), Some("portraits"));
    assert_eq!(
        manifest.palette_for(&manifest.images[0]),
        Some(Path::new("origpal.col"))
    );
    assert_eq!(
        manifest.palette_for(&manifest.images[1]),
        Some(Path::new("title.col"))
    );

    Ok(())
}

#[test]
fn test_defaults() -> anyhow::Result<()> {
    let manifest = AssetManifest::parse("")?;

    assert_eq!(manifest.raster, RasterSize::default());
    assert_eq!((manifest.raster.width, manifest.raster.height), (320, 200));
    assert!(manifest.palette.is_none());
    assert!(manifest.images.is_empty());

    Ok(())
}

#[test]
fn test_invalid() {
    assert!(matches!(
        AssetManifest::parse("[raster]\nheight = 0\n"),
        Err(ManifestError::EmptyRaster(320, 0))
    ));
    assert!(matches!(
        AssetManifest::parse("[[image]]\nname = \"x\"\n"),
        Err(ManifestError::Parse(_))
    ));
}

#[test]
fn test_load_rebases_paths() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assets.toml");
    fs::write(&path, MANIFEST)?;

    let manifest = AssetManifest::load(&path)?;

    assert_eq!(manifest.images[0].path, dir.path().join("data/brandon.cps"));
    assert_eq!(manifest.images[1].path, Path::new("/abs/title.cps"));
    assert_eq!(manifest.palette, Some(dir.path().join("origpal.col")));
    assert_eq!(
        manifest.images[1].palette,
        Some(dir.path().join("title.col"))
    );

    Ok(())
}

fn image(name: &str, category: Option<&str>) -> ImageDefinition {
    ImageDefinition {
        name: name.to_string(),
        path: "in.cps".into(),
        palette: None,
        category: category.map(str::to_string),
    }
}

#[test]
fn test_output_path() -> anyhow::Result<()> {
    let out = Path::new("export");

    assert_eq!(
        image("brandon", Some("portraits")).output_path(out)?,
        out.join("portraits").join("brandon.png")
    );
    assert_eq!(image("title", None).output_path(out)?, out.join("title.png"));

    Ok(())
}

#[test]
fn test_output_path_stays_inside_out_dir() {
    let out = Path::new("export");

    for (name, category) in [
        ("../x", None),
        ("a/b", None),
        ("", None),
        ("x", Some("..")),
        ("x", Some("../../etc")),
    ] {
        assert!(
            matches!(
                image(name, category).output_path(out),
                Err(ManifestError::InvalidName(_))
            ),
            "{:?} / {:?} should be rejected",
            name,
            category
        );
    }
}
