use serde::Serialize;

use super::forms::{CoverType, PrintedPublicationForm};

pub const PER_PAGE: u64 = 400;
pub const HARD_COVER: u64 = 25_000;
pub const SOFT_COVER: u64 = 10_000;
pub const ISBN: u64 = 600_000;
pub const MINIMUM: u64 = 4_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub per_copy: u64,
    pub quantity: u32,
    pub total: u64,
    pub currency: &'static str,
}

/// Estimate for a printed publication, in UZS. The backend computes the billed amount the same way.
pub fn printed_publication(form: &PrintedPublicationForm) -> PriceQuote {
    let cover = match form.cover_type {
        CoverType::Hard => HARD_COVER,
        CoverType::Soft => SOFT_COVER,
    };
    let isbn = if form.include_isbn { ISBN } else { 0 };
    let per_copy = u64::from(form.book_pages) * PER_PAGE + cover + isbn;
    let quantity = form.quantity.max(1);
    PriceQuote {
        per_copy,
        quantity,
        total: (per_copy * u64::from(quantity)).max(MINIMUM),
        currency: "UZS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pages: u32, quantity: u32, cover_type: CoverType, include_isbn: bool) -> PrintedPublicationForm {
        PrintedPublicationForm {
            book_pages: pages,
            quantity,
            cover_type,
            include_isbn,
            ..Default::default()
        }
    }

    #[test]
    fn hard_cover_with_isbn() {
        let quote = printed_publication(&form(100, 2, CoverType::Hard, true));
        assert_eq!(quote.per_copy, 40_000 + 25_000 + 600_000);
        assert_eq!(quote.total, 1_330_000);
    }

    #[test]
    fn soft_cover_single_copy() {
        assert_eq!(printed_publication(&form(10, 1, CoverType::Soft, false)).total, 14_000);
    }

    #[test]
    fn zero_quantity_counts_as_one() {
        assert_eq!(printed_publication(&form(0, 0, CoverType::Soft, false)).total, 10_000);
    }
}
