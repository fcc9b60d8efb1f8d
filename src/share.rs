use crate::card::{CardRenderer, LogoStatus, ShareCard};
use crate::config::{card_dir, AppConfig};
use crate::error::AppError;
use crate::format::compact_number;
use crate::models::{CostResult, LocalRates, VehicleProfile};
use async_trait::async_trait;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat, RgbaImage};
use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

pub const SHARE_TITLE: &str = "Bharat EV Cost";
pub const SHARE_TEXT: &str = "My EV running cost";

/// `{vehicle-id}-{km}km.png`, restricted to ASCII.
pub fn share_file_name(vehicle_id: &str, daily_km: f64) -> String {
    let id: String = sanitize_filename::sanitize(vehicle_id.trim())
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let id = if id.is_empty() { "ev-cost".to_string() } else { id };
    format!("{id}-{}km.png", compact_number(daily_km))
}

/// An encoded card ready to hand to a share target or write to disk.
pub struct ShareFile {
    pub file_name: String,
    pub title: String,
    pub text: String,
    pub png: Vec<u8>,
    pub pixels: RgbaImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    PrimaryEncodingFailed(String),
    ShareUnsupported { target: &'static str },
    ShareCheckFailed { target: &'static str, error: String },
    ShareFailed { target: &'static str, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shared { target: &'static str },
    /// Handed to a target that may not outlive this process, so also saved.
    SharedAndSaved { target: &'static str, path: PathBuf },
    Downloaded { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub file_name: String,
    pub delivery: Delivery,
    pub fallbacks: Vec<FallbackReason>,
    pub logo: LogoStatus,
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub vehicle: VehicleProfile,
    pub city: String,
    pub rates: LocalRates,
    pub daily_km: f64,
    pub result: CostResult,
    pub logo: Option<PathBuf>,
}

#[async_trait]
pub trait ShareTarget: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_share(&self, file: &ShareFile) -> Result<bool, AppError>;

    async fn share(&self, file: &ShareFile) -> Result<(), AppError>;

    /// Whether a shared card stays available after this process exits.
    fn persists(&self) -> bool {
        true
    }
}

/// Places the card on the system clipboard as an image.
pub struct ClipboardTarget;

#[async_trait]
impl ShareTarget for ClipboardTarget {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn can_share(&self, file: &ShareFile) -> Result<bool, AppError> {
        arboard::Clipboard::new().map_err(|e| AppError::Share(e.to_string()))?;
        Ok(file.pixels.width() > 0 && file.pixels.height() > 0)
    }

    async fn share(&self, file: &ShareFile) -> Result<(), AppError> {
        tracing::debug!("copying '{}' ({}) to clipboard", file.title, file.text);
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| AppError::Share(e.to_string()))?;
        clipboard
            .set_image(arboard::ImageData {
                width: file.pixels.width() as usize,
                height: file.pixels.height() as usize,
                bytes: Cow::Borrowed(file.pixels.as_raw()),
            })
            .map_err(|e| AppError::Share(e.to_string()))?;
        Ok(())
    }

    // X11 and Wayland clipboards are served by the owning process.
    fn persists(&self) -> bool {
        cfg!(any(target_os = "windows", target_os = "macos"))
    }
}

/// Saves cards into a directory, writing through a temporary file that is
/// renamed into place once complete.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    dir: PathBuf,
}

impl DownloadTarget {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn save(&self, file: &ShareFile) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(&file.file_name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&file.png)?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| AppError::Io(e.error))?;
        Ok(target)
    }
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Default, FilterType::Adaptive)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}

fn encode_png_plain(img: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Encodes with `primary`, switching to the plain PNG writer if it fails.
pub fn encode_with_fallback<F>(
    img: &RgbaImage,
    primary: F,
) -> Result<(Vec<u8>, Option<FallbackReason>), AppError>
where
    F: FnOnce(&RgbaImage) -> Result<Vec<u8>, ImageError>,
{
    match primary(img) {
        Ok(png) if !png.is_empty() => Ok((png, None)),
        Ok(_) => {
            tracing::warn!("primary PNG encoder produced no data, using plain encoder");
            let png = encode_png_plain(img)?;
            Ok((png, Some(FallbackReason::PrimaryEncodingFailed("empty output".into()))))
        }
        Err(e) => {
            tracing::warn!("primary PNG encoder failed, using plain encoder: {e}");
            let png = encode_png_plain(img)?;
            Ok((png, Some(FallbackReason::PrimaryEncodingFailed(e.to_string()))))
        }
    }
}

pub struct Exporter {
    renderer: CardRenderer,
    targets: Vec<Box<dyn ShareTarget>>,
    downloads: DownloadTarget,
    in_flight: Mutex<()>,
}

impl Exporter {
    pub fn new(renderer: CardRenderer, downloads: DownloadTarget) -> Self {
        Self {
            renderer,
            targets: Vec::new(),
            downloads,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_target(mut self, target: Box<dyn ShareTarget>) -> Self {
        self.targets.push(target);
        self
    }

    pub fn from_config(cfg: &AppConfig, out_dir: Option<PathBuf>, native_share: bool) -> Result<Self, AppError> {
        let dir = match out_dir {
            Some(dir) => dir,
            None => card_dir(cfg)?,
        };
        let exporter = Self::new(CardRenderer::from_config(cfg), DownloadTarget::new(dir));
        if native_share && cfg.native_share {
            Ok(exporter.with_target(Box::new(ClipboardTarget)))
        } else {
            Ok(exporter)
        }
    }

    /// Renders, encodes and delivers one card. Only one export runs at a
    /// time; a concurrent call gets `AppError::ExportBusy`.
    pub async fn export(&self, req: &ExportRequest) -> Result<ExportReport, AppError> {
        let _guard = self.in_flight.try_lock().map_err(|_| AppError::ExportBusy)?;

        let (logo_bytes, read_failure) = match &req.logo {
            None => (None, None),
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => (Some(bytes), None),
                Err(e) => {
                    tracing::warn!("logo {} unreadable, continuing without it: {e}", path.display());
                    (None, Some(LogoStatus::Skipped(e.to_string())))
                }
            },
        };

        let card = ShareCard {
            vehicle: &req.vehicle,
            city: &req.city,
            rates: req.rates,
            daily_km: req.daily_km,
            result: &req.result,
        };
        let rendered = self.renderer.render(&card, logo_bytes).await;
        let logo = read_failure.unwrap_or(rendered.logo);

        let mut fallbacks = Vec::new();
        let (png, encode_fallback) = encode_with_fallback(&rendered.image, encode_png)?;
        fallbacks.extend(encode_fallback);

        let file = ShareFile {
            file_name: share_file_name(&req.vehicle.id, req.daily_km),
            title: SHARE_TITLE.into(),
            text: SHARE_TEXT.into(),
            png,
            pixels: rendered.image,
        };

        for target in &self.targets {
            let name = target.name();
            match target.can_share(&file) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("{name} cannot share PNG files, trying next option");
                    fallbacks.push(FallbackReason::ShareUnsupported { target: name });
                    continue;
                }
                Err(e) => {
                    tracing::warn!("{name} capability check failed: {e}");
                    fallbacks.push(FallbackReason::ShareCheckFailed {
                        target: name,
                        error: e.to_string(),
                    });
                    continue;
                }
            }
            match target.share(&file).await {
                Ok(()) => {
                    tracing::info!("shared {} via {name}", file.file_name);
                    let delivery = if target.persists() {
                        Delivery::Shared { target: name }
                    } else {
                        let path = self.downloads.save(&file)?;
                        tracing::info!("{name} is tied to this process, also saved {}", path.display());
                        Delivery::SharedAndSaved { target: name, path }
                    };
                    return Ok(ExportReport {
                        file_name: file.file_name,
                        delivery,
                        fallbacks,
                        logo,
                    });
                }
                Err(e) => {
                    tracing::warn!("{name} share failed, falling back to download: {e}");
                    fallbacks.push(FallbackReason::ShareFailed {
                        target: name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let path = self.downloads.save(&file)?;
        tracing::info!("saved card to {}", path.display());
        Ok(ExportReport {
            file_name: file.file_name,
            delivery: Delivery::Downloaded { path },
            fallbacks,
            logo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::cost::compute_cost;
    use image::error::{EncodingError, ImageFormatHint};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    enum Behaviour {
        Accept,
        Unsupported,
        CheckErrors,
        ShareErrors,
        Slow,
        Transient,
    }

    struct FakeTarget {
        behaviour: Behaviour,
        shared: Arc<AtomicUsize>,
    }

    impl FakeTarget {
        fn boxed(behaviour: Behaviour) -> (Box<dyn ShareTarget>, Arc<AtomicUsize>) {
            let shared = Arc::new(AtomicUsize::new(0));
            let target = Box::new(FakeTarget {
                behaviour,
                shared: shared.clone(),
            });
            (target, shared)
        }
    }

    #[async_trait]
    impl ShareTarget for FakeTarget {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn can_share(&self, _file: &ShareFile) -> Result<bool, AppError> {
            match self.behaviour {
                Behaviour::Unsupported => Ok(false),
                Behaviour::CheckErrors => Err(AppError::Share("no share sheet".into())),
                _ => Ok(true),
            }
        }

        fn persists(&self) -> bool {
            !matches!(self.behaviour, Behaviour::Transient)
        }

        async fn share(&self, file: &ShareFile) -> Result<(), AppError> {
            match self.behaviour {
                Behaviour::ShareErrors => Err(AppError::Share("user cancelled".into())),
                Behaviour::Slow => {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    self.shared.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                _ => {
                    assert_eq!(file.title, SHARE_TITLE);
                    assert!(file.png.starts_with(b"\x89PNG"));
                    self.shared.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }
        }
    }

    fn request() -> ExportRequest {
        let vehicle = Catalog::default().vehicle("ola-s1-air").expect("ola").clone();
        let rates = LocalRates {
            tariff: 8.2,
            petrol: 96.0,
        };
        let result = compute_cost(Some(&vehicle), &rates, 50.0)
            .expect("valid")
            .expect("result");
        ExportRequest {
            vehicle,
            city: "Gurugram".into(),
            rates,
            daily_km: 50.0,
            result,
            logo: None,
        }
    }

    fn exporter(dir: &TempDir) -> Exporter {
        Exporter::new(
            CardRenderer::new(None),
            DownloadTarget::new(dir.path().join("cards")),
        )
    }

    #[test]
    fn file_name_combines_vehicle_and_distance() {
        assert_eq!(share_file_name("ola-s1-air", 50.0), "ola-s1-air-50km.png");
        assert_eq!(share_file_name("nexon-ev", 12.5), "nexon-ev-12.5km.png");
        assert_eq!(share_file_name("my bike/ü", 80.0), "my-bike--80km.png");
        assert_eq!(share_file_name("", 80.0), "ev-cost-80km.png");
    }

    #[test]
    fn failing_primary_encoder_falls_back_to_plain_png() {
        let img = RgbaImage::new(4, 4);
        let (png, reason) = encode_with_fallback(&img, |_| {
            Err(ImageError::Encoding(EncodingError::new(
                ImageFormatHint::Exact(ImageFormat::Png),
                "boom",
            )))
        })
        .expect("fallback encode");
        assert!(matches!(reason, Some(FallbackReason::PrimaryEncodingFailed(_))));
        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!(decoded.width(), 4);
    }

    #[tokio::test]
    async fn without_native_share_card_is_downloaded() {
        let tmp = TempDir::new().expect("tempdir");
        let report = exporter(&tmp).export(&request()).await.expect("export");

        let expected = tmp.path().join("cards").join("ola-s1-air-50km.png");
        assert_eq!(
            report.delivery,
            Delivery::Downloaded {
                path: expected.clone()
            }
        );
        assert!(report.fallbacks.is_empty());
        let img = image::open(&expected).expect("open downloaded card");
        assert_eq!((img.width(), img.height()), (1200, 630));

        let leftovers = std::fs::read_dir(tmp.path().join("cards"))
            .expect("read dir")
            .count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn successful_native_share_skips_download() {
        let tmp = TempDir::new().expect("tempdir");
        let (target, shared) = FakeTarget::boxed(Behaviour::Accept);
        let report = exporter(&tmp)
            .with_target(target)
            .export(&request())
            .await
            .expect("export");
        assert_eq!(report.delivery, Delivery::Shared { target: "fake" });
        assert_eq!(shared.load(Ordering::SeqCst), 1);
        assert!(!tmp.path().join("cards").exists());
    }

    #[tokio::test]
    async fn share_tied_to_process_also_saves_card() {
        let tmp = TempDir::new().expect("tempdir");
        let (target, shared) = FakeTarget::boxed(Behaviour::Transient);
        let report = exporter(&tmp)
            .with_target(target)
            .export(&request())
            .await
            .expect("export");

        let expected = tmp.path().join("cards").join("ola-s1-air-50km.png");
        assert_eq!(
            report.delivery,
            Delivery::SharedAndSaved {
                target: "fake",
                path: expected.clone()
            }
        );
        assert_eq!(shared.load(Ordering::SeqCst), 1);
        assert!(expected.exists());
    }

    #[test]
    fn clipboard_persistence_depends_on_platform() {
        let expected = cfg!(any(target_os = "windows", target_os = "macos"));
        assert_eq!(ClipboardTarget.persists(), expected);
    }

    #[test]
    fn file_name_stays_short_for_extreme_distances() {
        let tiny = share_file_name("ola-s1-air", crate::format::parse_amount("1e-300"));
        assert_eq!(tiny, "ola-s1-air-1e-300km.png");
        let huge = share_file_name("ola-s1-air", 1e300);
        assert!(huge.len() < 64);
    }

    #[tokio::test]
    async fn every_share_failure_falls_through_to_download() {
        for (behaviour, expect) in [
            (
                Behaviour::Unsupported,
                FallbackReason::ShareUnsupported { target: "fake" },
            ),
            (
                Behaviour::CheckErrors,
                FallbackReason::ShareCheckFailed {
                    target: "fake",
                    error: "share failed: no share sheet".into(),
                },
            ),
            (
                Behaviour::ShareErrors,
                FallbackReason::ShareFailed {
                    target: "fake",
                    error: "share failed: user cancelled".into(),
                },
            ),
        ] {
            let tmp = TempDir::new().expect("tempdir");
            let (target, _) = FakeTarget::boxed(behaviour);
            let report = exporter(&tmp)
                .with_target(target)
                .export(&request())
                .await
                .expect("export");
            assert!(matches!(report.delivery, Delivery::Downloaded { .. }));
            assert_eq!(report.fallbacks, vec![expect]);
        }
    }

    #[tokio::test]
    async fn unreadable_logo_is_reported_but_not_fatal() {
        let tmp = TempDir::new().expect("tempdir");
        let mut req = request();
        req.logo = Some(tmp.path().join("missing.png"));
        let report = exporter(&tmp).export(&req).await.expect("export");
        assert!(matches!(report.logo, LogoStatus::Skipped(_)));
        assert!(matches!(report.delivery, Delivery::Downloaded { .. }));
    }

    #[tokio::test]
    async fn concurrent_export_is_rejected_while_one_is_running() {
        let tmp = TempDir::new().expect("tempdir");
        let (target, shared) = FakeTarget::boxed(Behaviour::Slow);
        let exporter = exporter(&tmp).with_target(target);
        let req = request();

        let (first, second) = tokio::join!(exporter.export(&req), exporter.export(&req));
        assert!(first.is_ok());
        assert!(matches!(second, Err(AppError::ExportBusy)));
        assert_eq!(shared.load(Ordering::SeqCst), 1);

        assert!(exporter.export(&req).await.is_ok());
    }
}
