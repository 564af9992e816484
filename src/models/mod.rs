// ============================================================================
// Module : models
// ============================================================================
// Contient toutes les structures de données de l'application
// ============================================================================

pub mod asset;
pub mod de;
pub mod indicators;
pub mod news;
pub mod ohlc;

// Re-exports pour simplifier les imports
pub use asset::{prepare_asset_list, Asset};
pub use indicators::{IndicatorSnapshot, RoundedIndicators, VolumeIndicator};
pub use news::NewsItem;
pub use ohlc::{price_points, Candle, PricePoint};
