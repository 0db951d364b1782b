//! The production backend: `image` decoders in, rav1e AVIF out.
//!
//! Every variant the site serves is AVIF, so the output path must end in
//! `.avif`. Sources are the JPEG, PNG, TIFF and WebP renders kept under the
//! content root.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;

/// rav1e speed preset, 0 (slowest) to 10.
const AVIF_SPEED: u8 = 6;

/// Render formats accepted as sources, by file extension.
///
/// No AVIF: the `avif` feature only builds the encoder, even though
/// `ImageFormat::Avif.reading_enabled()` still answers `true`.
const SOURCE_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static DECODABLE: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SOURCE_FORMATS
        .iter()
        .filter_map(|&(ext, format)| format.reading_enabled().then_some(ext))
        .collect()
});

/// Extensions the scan stage accepts for local image references.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &DECODABLE
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AvifBackend;

impl AvifBackend {
    pub fn new() -> Self {
        Self
    }
}

fn decode_source(path: &Path) -> Result<DynamicImage, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("cannot decode {}: {e}", path.display()))
    })
}

fn encode_avif(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let is_avif = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("avif"));
    if !is_avif {
        return Err(BackendError::ProcessingFailed(format!(
            "variants are AVIF only, refusing to write {}",
            path.display()
        )));
    }

    let out = BufWriter::new(File::create(path)?);
    let quality = quality.min(100) as u8;
    img.write_with_encoder(AvifEncoder::new_with_speed_quality(out, AVIF_SPEED, quality))
        .map_err(|e| BackendError::ProcessingFailed(format!("{}: {e}", path.display())))
}

impl ImageBackend for AvifBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        image::image_dimensions(path)
            .map(|(width, height)| Dimensions { width, height })
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("cannot size {}: {e}", path.display()))
            })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let source = decode_source(&params.source)?;
        let target = (params.width, params.height);
        let variant = if source.width() == target.0 && source.height() == target.1 {
            source
        } else {
            source.resize_exact(target.0, target.1, FilterType::Lanczos3)
        };
        encode_avif(&variant, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::RgbImage;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A gradient render saved in whatever format the extension names.
    fn render(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]))
            .save(&path)
            .unwrap();
        path
    }

    fn params(source: PathBuf, output: PathBuf, width: u32, height: u32) -> ResizeParams {
        ResizeParams {
            source,
            output,
            width,
            height,
            quality: Quality::default(),
        }
    }

    #[test]
    fn accepts_render_formats_but_not_avif() {
        let exts = supported_input_extensions();
        assert_eq!(exts, ["jpg", "jpeg", "png", "tif", "tiff", "webp"]);
        assert!(!exts.contains(&"avif"));
    }

    #[test]
    fn identify_reads_header_dimensions() {
        let tmp = TempDir::new().unwrap();
        let facade = render(&tmp, "facade.jpg", 180, 120);
        assert_eq!(
            AvifBackend::new().identify(&facade).unwrap(),
            Dimensions { width: 180, height: 120 }
        );

        let hero = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content/images/hero.png");
        assert_eq!(
            AvifBackend::new().identify(&hero).unwrap(),
            Dimensions { width: 96, height: 64 }
        );
    }

    #[test]
    fn identify_missing_file_fails() {
        assert!(AvifBackend::new().identify(Path::new("/no/such/render.jpg")).is_err());
    }

    #[test]
    fn downscaled_variant_is_written() {
        let tmp = TempDir::new().unwrap();
        let source = render(&tmp, "pool-deck.png", 160, 120);
        let output = tmp.path().join("pool-deck-64.avif");

        AvifBackend::new()
            .resize(&params(source, output.clone(), 64, 48))
            .unwrap();
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn same_size_variant_is_still_encoded() {
        let tmp = TempDir::new().unwrap();
        let source = render(&tmp, "studio.jpg", 64, 48);
        let output = tmp.path().join("studio-64.avif");

        AvifBackend::new()
            .resize(&params(source, output.clone(), 64, 48))
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn uppercase_avif_extension_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let source = render(&tmp, "sky-lounge.jpg", 40, 40);
        let output = tmp.path().join("sky-lounge-32.AVIF");

        AvifBackend::new()
            .resize(&params(source, output.clone(), 32, 32))
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn non_avif_output_is_refused() {
        let tmp = TempDir::new().unwrap();
        let source = render(&tmp, "gym.jpg", 100, 100);
        let output = tmp.path().join("gym-50.webp");

        let result = AvifBackend::new().resize(&params(source, output.clone(), 50, 50));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
    }

    #[test]
    fn corrupt_source_fails_to_decode() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("lobby.jpg");
        std::fs::write(&source, "not really a jpeg").unwrap();

        let result = AvifBackend::new().resize(&params(
            source,
            tmp.path().join("lobby-64.avif"),
            64,
            64,
        ));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
