//! Variant assignment.

use rand::Rng;

use crate::experiment::cookie::VariantIndex;

/// Per-request values every element handler reads during one rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderingContext {
    /// One-based variant number, always `index + 1`.
    pub variant_number: u8,
    /// The visitor arrived with a valid assignment cookie.
    pub was_returning_visitor: bool,
}

/// Outcome of variant selection for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub index: VariantIndex,
    pub context: RenderingContext,
}

/// Replay the cookie's variant, or draw one uniformly when there is none.
pub fn select_variant<R: Rng + ?Sized>(cookie: Option<VariantIndex>, rng: &mut R) -> Assignment {
    let (index, was_returning_visitor) = match cookie {
        Some(index) => (index, true),
        None => {
            let index = if rng.gen_bool(0.5) {
                VariantIndex::Second
            } else {
                VariantIndex::First
            };
            (index, false)
        }
    };

    Assignment {
        index,
        context: RenderingContext {
            variant_number: index.number(),
            was_returning_visitor,
        },
    }
}
