//! Property-based invariant tests for measure pricing and the page reducer.
//!
//! 1. Reverse quantity calculation recovers the priced quantity (to 2 dp).
//! 2. `add wall` strictly increases `max_id` and never repeats an id.
//! 3. Deleting walls never lowers `max_id`.
//! 4. Applying a measure to one wall creates no bulk measure; applying it to
//!    several creates exactly one covering exactly those walls.

use proptest::prelude::*;
use retrofit_fabric::fabric::{Action, FabricElement, MeasureElement, State, WallType, reduce};
use retrofit_fabric::measures::{
    CostUnits, QuantityBasis, calc_measure_qty_and_cost, reverse_calc_quantity,
};
use std::collections::BTreeSet;

// ── Helpers ─────────────────────────────────────────────────────────────

fn element(tag: &str) -> FabricElement {
    FabricElement {
        wall_type: WallType::ExternalWall,
        tag: tag.to_string(),
        name: String::new(),
        description: String::new(),
        source: String::new(),
        uvalue: 1.0,
        kvalue: 100.0,
    }
}

fn measure(cost: f64) -> MeasureElement {
    MeasureElement {
        base: element("M"),
        associated_work: String::new(),
        benefits: String::new(),
        cost,
        min_cost: None,
        cost_units: CostUnits::Unit,
        disruption: String::new(),
        is_external_wall_insulation: false,
        key_risks: String::new(),
        maintenance: String::new(),
        notes: String::new(),
        performance: String::new(),
        who_by: String::new(),
    }
}

fn add(state: &mut State) {
    reduce(state, Action::AddWall { item: element("W") }).unwrap();
}

/// Base costs are whole pence, as entered in the measures library.
fn base_cost_strategy() -> impl Strategy<Value = f64> {
    (0u32..1_000_000).prop_map(|pence| f64::from(pence) / 100.0)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Cost inverse law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reverse_quantity_recovers_quantity(
        base_cost in base_cost_strategy(),
        cost_per_unit in 1.0f64..1000.0,
        area in 0.0f64..1000.0,
        is_ewi in any::<bool>(),
    ) {
        let basis = QuantityBasis::for_units(CostUnits::SquareMetre, area, 0.0, is_ewi);
        let cost = calc_measure_qty_and_cost(basis, base_cost, cost_per_unit);
        let recovered = reverse_calc_quantity(base_cost, cost_per_unit, cost.total_cost);
        prop_assert!(
            (recovered - cost.quantity).abs() < 0.01,
            "quantity {} recovered as {} (base {}, per unit {}, total {})",
            cost.quantity, recovered, base_cost, cost_per_unit, cost.total_cost
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Id monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn add_wall_ids_are_monotonic_and_unique(n in 1usize..40) {
        let mut state = State::initial();
        for _ in 0..n {
            let before = state.max_id;
            add(&mut state);
            prop_assert!(state.max_id > before, "max_id did not increase past {}", before);
            prop_assert_eq!(state.just_inserted, Some(state.max_id));
        }
        let ids: BTreeSet<u32> = state.walls.iter().map(|w| w.id).collect();
        prop_assert_eq!(ids.len(), state.walls.len(), "duplicate wall ids");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Deletes never lower max_id
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn interleaved_deletes_keep_ids_fresh(ops in prop::collection::vec(any::<bool>(), 1..60)) {
        let mut state = State::initial();
        let mut seen = BTreeSet::new();
        for is_add in ops {
            let before = state.max_id;
            if is_add || state.walls.is_empty() {
                add(&mut state);
                prop_assert!(seen.insert(state.max_id), "id {} reused", state.max_id);
            } else {
                let id = state.walls[0].id;
                reduce(&mut state, Action::DeleteWall { id }).unwrap();
                prop_assert_eq!(state.max_id, before);
                prop_assert_eq!(state.deleted_element, Some(id));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Bulk measure cardinality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bulk_measure_only_for_several_walls(
        walls in 1u32..10,
        picks in prop::collection::btree_set(0u32..10, 1..6),
        cost in 1.0f64..500.0,
    ) {
        let mut state = State::initial();
        for _ in 0..walls {
            add(&mut state);
        }
        let ids: Vec<u32> = picks.into_iter().filter(|i| *i < walls).map(|i| i + 1).collect();
        prop_assume!(!ids.is_empty());

        let bulk_before = state.bulk_measures.len();
        let max_before = state.max_id;
        reduce(&mut state, Action::ApplyWallMeasures { ids: ids.clone(), item: measure(cost) })
            .unwrap();

        if ids.len() == 1 {
            prop_assert_eq!(state.bulk_measures.len(), bulk_before);
            prop_assert_eq!(state.max_id, max_before);
        } else {
            prop_assert_eq!(state.bulk_measures.len(), bulk_before + 1);
            let bulk = state.bulk_measures.last().unwrap();
            prop_assert_eq!(&bulk.applies_to, &ids);
            prop_assert_eq!(bulk.id, max_before + 1);
        }
        for id in &ids {
            prop_assert!(state.wall(*id).unwrap().is_measure());
        }
    }
}
