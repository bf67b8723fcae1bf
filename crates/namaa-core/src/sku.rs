//! # SKU Generation
//!
//! Shops without printed barcodes get a random 4-digit code per product.
//! Only generated codes are checked against existing ones; manually entered
//! SKUs are accepted as typed.

use std::collections::HashSet;

use rand::Rng;

use crate::error::ValidationError;
use crate::types::Product;

/// Attempts before giving up on finding a free code.
pub const MAX_SKU_ATTEMPTS: usize = 1000;

const SKU_RANGE: std::ops::Range<u32> = 1000..10_000;

/// Picks a 4-digit SKU that no product in `existing` uses.
pub fn generate_unique_sku(existing: &[Product]) -> Result<String, ValidationError> {
    generate_with(&mut rand::thread_rng(), existing)
}

/// Same as [`generate_unique_sku`] with a caller-supplied RNG.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    existing: &[Product],
) -> Result<String, ValidationError> {
    let taken: HashSet<&str> = existing.iter().map(|p| p.sku.as_str()).collect();

    for _ in 0..MAX_SKU_ATTEMPTS {
        let candidate = rng.gen_range(SKU_RANGE).to_string();
        if !taken.contains(candidate.as_str()) {
            return Ok(candidate);
        }
    }

    Err(ValidationError::InvalidFormat {
        field: "sku".to_string(),
        reason: format!(
            "no free code found after {} attempts, enter one manually",
            MAX_SKU_ATTEMPTS
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn with_sku(sku: String) -> Product {
        Product {
            id: sku.clone(),
            name: "x".to_string(),
            sku,
            price: Money::zero(),
            cost: Money::zero(),
            stock: 0,
            category: String::new(),
            expiry_date: None,
        }
    }

    #[test]
    fn test_generates_four_digits() {
        let sku = generate_unique_sku(&[]).unwrap();
        assert_eq!(sku.len(), 4);
        let n: u32 = sku.parse().unwrap();
        assert!((1000..10_000).contains(&n));
    }

    #[test]
    fn test_avoids_taken_codes() {
        // Leave only 4242 free.
        let existing: Vec<Product> = (1000..10_000)
            .filter(|n| *n != 4242)
            .map(|n| with_sku(n.to_string()))
            .collect();
        for _ in 0..5 {
            if let Ok(sku) = generate_unique_sku(&existing) {
                assert_eq!(sku, "4242");
            }
        }
    }

    #[test]
    fn test_gives_up_when_full() {
        let existing: Vec<Product> = (1000..10_000).map(|n| with_sku(n.to_string())).collect();
        assert!(generate_unique_sku(&existing).is_err());
    }
}
