//! Join of normalized price books into premium records.

use std::collections::{BTreeSet, HashMap};

use crate::{AssetId, DomesticLeg, ExchangeRate, ListingBook, PriceBook, PremiumRecord};

/// Included assets keyed by uppercase identifier.
pub type PremiumTable = HashMap<AssetId, PremiumRecord>;

/// Everything the join reads. All fetches have completed before this exists.
#[derive(Debug, Clone, Copy)]
pub struct JoinInputs<'a> {
    pub exchange_rate: ExchangeRate,
    pub universe: &'a BTreeSet<AssetId>,
    pub upbit: &'a PriceBook,
    pub bithumb: &'a PriceBook,
    pub binance: &'a PriceBook,
    pub upbit_listing: &'a ListingBook,
    pub bithumb_listing: &'a ListingBook,
}

/// One record per asset in the universe with a positive Binance price and a
/// positive price on at least one domestic exchange. Other assets are dropped
/// silently.
pub fn join_premiums(inputs: &JoinInputs<'_>) -> PremiumTable {
    inputs
        .universe
        .iter()
        .filter_map(|id| build_record(inputs, id).map(|record| (id.clone(), record)))
        .collect()
}

fn build_record(inputs: &JoinInputs<'_>, id: &AssetId) -> Option<PremiumRecord> {
    let rate = inputs.exchange_rate.value();
    let international = inputs
        .binance
        .get(id)
        .map(|point| point.price)
        .filter(|price| *price > 0.0)?;

    let leg = |book: &PriceBook| {
        book.get(id)
            .filter(|point| point.price > 0.0)
            .and_then(|point| {
                DomesticLeg::priced(point.price, point.volume_24h, international, rate).ok()
            })
    };
    let upbit = leg(inputs.upbit);
    let bithumb = leg(inputs.bithumb);
    if upbit.is_none() && bithumb.is_none() {
        return None;
    }

    let metadata = inputs
        .upbit_listing
        .get(id)
        .or_else(|| inputs.bithumb_listing.get(id))
        .cloned();

    PremiumRecord::new(id.clone(), international, rate, upbit, bithumb)
        .ok()
        .map(|record| record.with_metadata(metadata))
}
