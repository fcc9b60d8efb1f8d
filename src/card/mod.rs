pub mod canvas;
pub mod text;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::format::{compact_number, rupees};
use crate::models::{BreakEven, CostResult, LocalRates, VehicleProfile};
use canvas::{
    composite_in_circle, fill_diagonal_gradient, fill_rect, CARD_HEIGHT, CARD_WIDTH, WHITE,
};
use image::{Rgba, RgbaImage};
use text::{FontWeight, Typesetter};

pub const BRAND_FROM: Rgba<u8> = Rgba([0x0D, 0x3B, 0x66, 255]);
pub const BRAND_TO: Rgba<u8> = Rgba([0xEF, 0x47, 0x6F, 255]);

const PANEL_ALPHA: f32 = 0.08;
const WATERMARK_ALPHA: f32 = 0.13;
const FOOTER_ALPHA: f32 = 0.85;

const LOGO_X: u32 = 48;
const LOGO_Y: u32 = 40;
const LOGO_SIZE: u32 = 72;
const LOGO_CENTER: (f32, f32) = (74.0, 58.0);
const LOGO_RADIUS: f32 = 26.0;

/// What the card summarizes.
#[derive(Debug, Clone, Copy)]
pub struct ShareCard<'a> {
    pub vehicle: &'a VehicleProfile,
    pub city: &'a str,
    pub rates: LocalRates,
    pub daily_km: f64,
    pub result: &'a CostResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoStatus {
    Absent,
    Composited,
    Skipped(String),
}

pub struct RenderedCard {
    pub image: RgbaImage,
    pub logo: LogoStatus,
}

pub async fn decode_logo(bytes: Vec<u8>) -> Result<RgbaImage, AppError> {
    let decoded =
        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|i| i.to_rgba8()))
            .await??;
    Ok(decoded)
}

pub struct CardRenderer {
    typesetter: Option<Typesetter>,
}

impl CardRenderer {
    pub fn new(typesetter: Option<Typesetter>) -> Self {
        Self { typesetter }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        match Typesetter::discover(cfg.font_path.as_deref(), cfg.bold_font_path.as_deref()) {
            Ok(ts) => Self::new(Some(ts)),
            Err(e) => {
                tracing::warn!("no usable font, cards will be rendered without text: {e}");
                Self::new(None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &self,
        img: &mut RgbaImage,
        line: &str,
        x: f32,
        baseline: f32,
        px: f32,
        weight: FontWeight,
        alpha: f32,
    ) {
        if let Some(ts) = &self.typesetter {
            ts.draw(img, line, x, baseline, px, weight, WHITE, alpha);
        }
    }

    /// Paints the card back to front. The logo, when given, is decoded and
    /// composited before any later layer is drawn.
    pub async fn render(&self, card: &ShareCard<'_>, logo: Option<Vec<u8>>) -> RenderedCard {
        let (w, h) = (CARD_WIDTH as f32, CARD_HEIGHT as f32);
        let mut img = RgbaImage::new(CARD_WIDTH, CARD_HEIGHT);

        fill_diagonal_gradient(&mut img, BRAND_FROM, BRAND_TO);

        let panel_x = (w * 0.58).round() as u32;
        fill_rect(&mut img, panel_x, 0, CARD_WIDTH - panel_x, CARD_HEIGHT, WHITE, PANEL_ALPHA);

        let initials = card.vehicle.initials();
        self.text(&mut img, &initials, w * 0.63, h * 0.65, 300.0, FontWeight::Bold, WATERMARK_ALPHA);

        self.text(&mut img, "⚡ Bharat EV Cost", 48.0, 80.0, 46.0, FontWeight::Bold, 1.0);
        self.text(&mut img, "BharatEVCost.in • BEV", 52.0, 108.0, 20.0, FontWeight::Regular, 1.0);

        let logo_status = match logo {
            None => LogoStatus::Absent,
            Some(bytes) => match decode_logo(bytes).await {
                Ok(decoded) => {
                    composite_in_circle(
                        &mut img,
                        &decoded,
                        LOGO_X,
                        LOGO_Y,
                        LOGO_SIZE,
                        LOGO_CENTER,
                        LOGO_RADIUS,
                    );
                    LogoStatus::Composited
                }
                Err(e) => {
                    tracing::warn!("logo could not be decoded, continuing without it: {e}");
                    LogoStatus::Skipped(e.to_string())
                }
            },
        };

        let km = compact_number(card.daily_km);
        let regular = FontWeight::Regular;
        self.text(&mut img, &card.vehicle.display_name(), 48.0, 160.0, 28.0, regular, 1.0);
        self.text(&mut img, &format!("City: {}", card.city), 48.0, 196.0, 28.0, regular, 1.0);
        let inputs = format!(
            "Daily: {km} km  •  Tariff: ₹{}/kWh  •  Petrol: ₹{}/L",
            compact_number(card.rates.tariff),
            compact_number(card.rates.petrol)
        );
        self.text(&mut img, &inputs, 48.0, 230.0, 28.0, regular, 1.0);

        let daily = format!("₹{}", rupees(card.result.daily_cost));
        self.text(&mut img, &daily, 48.0, 320.0, 88.0, FontWeight::Bold, 1.0);
        self.text(&mut img, "per day", 48.0, 360.0, 28.0, regular, 1.0);

        let monthly = format!("₹{} / month", rupees(card.result.monthly_cost));
        self.text(&mut img, &monthly, 48.0, 450.0, 64.0, FontWeight::Bold, 1.0);

        self.text(&mut img, &break_even_line(card.result.break_even), 48.0, 490.0, 28.0, regular, 1.0);

        self.text(
            &mut img,
            "Made with ❤️ in India • BharatEVCost.in • BEV",
            48.0,
            600.0,
            20.0,
            regular,
            FOOTER_ALPHA,
        );

        RenderedCard {
            image: img,
            logo: logo_status,
        }
    }
}

pub fn break_even_line(break_even: BreakEven) -> String {
    match break_even {
        BreakEven::Months(m) => format!("Break-even: {m} months"),
        BreakEven::Unreachable => "Break-even: not reached".to_string(),
    }
}
