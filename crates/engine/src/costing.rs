//! Recipe cost aggregation.
//!
//! The cost of a recipe is the sum of `quantity × cost_per_unit` over its
//! ingredient lines. Lines whose ingredient is absent from the catalog are
//! skipped silently: the catalog is the source of truth and a dangling line
//! simply contributes nothing until the ingredient reappears.

use std::collections::HashMap;

use uuid::Uuid;

use crate::Money;

/// One ingredient line of a recipe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IngredientUsage {
    pub ingredient_id: Uuid,
    /// Quantity in the ingredient's own unit (kg, l, pieces).
    pub quantity: f64,
}

/// Total cost of a usage list against a unit-cost catalog.
///
/// Each line is rounded to the nearest cent before summing, so the result is
/// independent of the order of the lines.
pub fn recipe_cost(usages: &[IngredientUsage], catalog: &HashMap<Uuid, Money>) -> Money {
    let mut total = Money::ZERO;
    for usage in usages {
        let Some(cost_per_unit) = catalog.get(&usage.ingredient_id) else {
            continue;
        };
        let line = (usage.quantity * cost_per_unit.minor() as f64).round() as i64;
        total += Money::new(line);
    }
    total
}

type CostObserver = Box<dyn FnMut(Money) + Send>;

/// Tracks the running cost of an ingredient selection.
///
/// Holds a unit-cost catalog and a usage list; an optional observer is
/// invoked with the new total whenever a mutation actually changes it. This
/// is a plain value-observer, not an event bus.
pub struct CostTracker {
    catalog: HashMap<Uuid, Money>,
    usages: Vec<IngredientUsage>,
    last_total: Money,
    on_change: Option<CostObserver>,
}

impl CostTracker {
    pub fn new(catalog: HashMap<Uuid, Money>) -> Self {
        Self {
            catalog,
            usages: Vec::new(),
            last_total: Money::ZERO,
            on_change: None,
        }
    }

    /// Registers the observer called with the new total on every change.
    pub fn set_observer(&mut self, observer: impl FnMut(Money) + Send + 'static) {
        self.on_change = Some(Box::new(observer));
    }

    /// Sets (or replaces) the quantity for an ingredient.
    pub fn set_usage(&mut self, ingredient_id: Uuid, quantity: f64) {
        match self
            .usages
            .iter_mut()
            .find(|u| u.ingredient_id == ingredient_id)
        {
            Some(usage) => usage.quantity = quantity,
            None => self.usages.push(IngredientUsage {
                ingredient_id,
                quantity,
            }),
        }
        self.recompute();
    }

    /// Removes an ingredient line. Unknown ids are a no-op.
    pub fn remove_usage(&mut self, ingredient_id: Uuid) {
        self.usages.retain(|u| u.ingredient_id != ingredient_id);
        self.recompute();
    }

    /// Updates the unit cost of a catalog entry.
    pub fn set_unit_cost(&mut self, ingredient_id: Uuid, cost_per_unit: Money) {
        self.catalog.insert(ingredient_id, cost_per_unit);
        self.recompute();
    }

    /// Current total cost.
    pub fn total(&self) -> Money {
        self.last_total
    }

    fn recompute(&mut self) {
        let total = recipe_cost(&self.usages, &self.catalog);
        if total != self.last_total {
            self.last_total = total;
            if let Some(observer) = &mut self.on_change {
                observer(total);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn catalog(entries: &[(Uuid, i64)]) -> HashMap<Uuid, Money> {
        entries
            .iter()
            .map(|(id, minor)| (*id, Money::new(*minor)))
            .collect()
    }

    #[test]
    fn sums_quantity_times_unit_cost() {
        let flour = Uuid::new_v4();
        let butter = Uuid::new_v4();
        let catalog = catalog(&[(flour, 80), (butter, 1_250)]);

        let usages = [
            IngredientUsage {
                ingredient_id: flour,
                quantity: 2.5,
            },
            IngredientUsage {
                ingredient_id: butter,
                quantity: 0.4,
            },
        ];

        // 2.5 × 0.80 + 0.4 × 12.50 = 2.00 + 5.00
        assert_eq!(recipe_cost(&usages, &catalog), Money::new(700));
    }

    #[test]
    fn skips_ingredients_missing_from_catalog() {
        let known = Uuid::new_v4();
        let catalog = catalog(&[(known, 100)]);

        let usages = [
            IngredientUsage {
                ingredient_id: known,
                quantity: 3.0,
            },
            IngredientUsage {
                ingredient_id: Uuid::new_v4(),
                quantity: 99.0,
            },
        ];

        assert_eq!(recipe_cost(&usages, &catalog), Money::new(300));
    }

    #[test]
    fn order_independent() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let catalog = catalog(&[
            (ids[0], 123),
            (ids[1], 4_567),
            (ids[2], 89),
            (ids[3], 10_000),
        ]);
        let mut usages: Vec<IngredientUsage> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| IngredientUsage {
                ingredient_id: *id,
                quantity: 0.3 + i as f64,
            })
            .collect();

        let forward = recipe_cost(&usages, &catalog);
        usages.reverse();
        assert_eq!(recipe_cost(&usages, &catalog), forward);
        usages.swap(0, 2);
        assert_eq!(recipe_cost(&usages, &catalog), forward);
    }

    #[test]
    fn observer_fires_only_on_actual_change() {
        let flour = Uuid::new_v4();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut tracker = CostTracker::new(catalog(&[(flour, 100)]));
        tracker.set_observer(move |total| sink.lock().unwrap().push(total.minor()));

        tracker.set_usage(flour, 2.0);
        tracker.set_usage(flour, 2.0); // same total, no callback
        tracker.remove_usage(flour);
        tracker.remove_usage(flour); // already gone, no callback

        assert_eq!(*seen.lock().unwrap(), vec![200, 0]);
        assert_eq!(tracker.total(), Money::ZERO);
    }

    #[test]
    fn unit_cost_update_recomputes() {
        let flour = Uuid::new_v4();
        let mut tracker = CostTracker::new(catalog(&[(flour, 100)]));
        tracker.set_usage(flour, 1.5);
        assert_eq!(tracker.total(), Money::new(150));

        tracker.set_unit_cost(flour, Money::new(200));
        assert_eq!(tracker.total(), Money::new(300));
    }
}
