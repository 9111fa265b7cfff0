//! Ownership rule for mutating products.
//!
//! A principal may update or delete a product only when it is present and its
//! id equals the product's `owner_id`. The rule holds no state and is checked
//! on every mutation attempt.

use crate::auth::Principal;
use crate::database::models::Product;
use crate::error::ApiError;

/// Mutating abilities on a product. Both share the same ownership predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    Update,
    Delete,
}

impl Ability {
    fn as_str(self) -> &'static str {
        match self {
            Ability::Update => "update",
            Ability::Delete => "delete",
        }
    }
}

pub fn can_mutate(principal: Option<&Principal>, product: &Product) -> bool {
    matches!(principal, Some(p) if p.id == product.owner_id)
}

pub fn allows(ability: Ability, principal: Option<&Principal>, product: &Product) -> bool {
    match ability {
        Ability::Update | Ability::Delete => can_mutate(principal, product),
    }
}

/// Fails with 403 unless `principal` may perform `ability` on `product`.
/// Callers must invoke this before issuing any write.
pub fn authorize(
    ability: Ability,
    principal: Option<&Principal>,
    product: &Product,
) -> Result<(), ApiError> {
    if allows(ability, principal, product) {
        return Ok(());
    }

    tracing::warn!(
        "Denied {} on product {} (owner {}) for principal {:?}",
        ability.as_str(),
        product.id,
        product.owner_id,
        principal.map(|p| p.id)
    );
    Err(ApiError::forbidden("This action is unauthorized."))
}
