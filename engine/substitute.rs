use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    catalog::SubstitutionCatalog,
    knowledge::ImpactClass,
    plan::{MealEntry, WeekPlan, Weekday},
};

/// Meal slots per day (breakfast, lunch, dinner).
pub const SLOTS_PER_DAY: usize = 3;

/// Result of applying the substitution policy.
#[derive(Debug, Clone)]
pub struct SubstitutionReport {
    /// Mutated copy of the plan.
    pub plan: WeekPlan,
    /// Days actually rewritten, deduplicated, in first-touch order.
    pub touched: Vec<Weekday>,
    /// Recoverable warnings (identity preservation skips, empty pools).
    pub warnings: Vec<String>,
}

/// Rewrites each target day present in `plan` with meals drawn from the pool
/// serving `class`.
///
/// Draws are independent per slot, with replacement: the same meal may land
/// in more than one slot of a day. Target days absent from the plan are
/// skipped silently. With `preserve_identity`, a day carrying three existing
/// entries keeps its store identifiers slot-for-slot; a shorter day skips
/// identity preservation and yields a warning instead of failing.
#[must_use]
pub fn substitute(
    plan: &WeekPlan,
    target_days: &[Weekday],
    class: ImpactClass,
    catalog: &SubstitutionCatalog,
    preserve_identity: bool,
) -> SubstitutionReport {
    let mut rng = SmallRng::from_entropy();
    let mut updated = plan.clone();
    let mut touched = Vec::new();
    let mut warnings = Vec::new();
    let pool = catalog.pool_for(class);

    for &day in target_days {
        let Some(existing) = plan.get(&day) else {
            continue;
        };
        if pool.is_empty() {
            warnings.push(format!("no candidate meals for {}; day untouched", day.name()));
            continue;
        }
        let mut replacements: Vec<MealEntry> = (0..SLOTS_PER_DAY)
            .map(|_| {
                let meal = &pool[rng.gen_range(0..pool.len())];
                MealEntry::new(meal.name.clone(), meal.calories, meal.category.clone())
            })
            .collect();
        if preserve_identity {
            if existing.len() >= SLOTS_PER_DAY {
                for (slot, replacement) in replacements.iter_mut().enumerate() {
                    replacement.identifier = existing[slot].identifier.clone();
                }
            } else {
                warnings.push(format!(
                    "{} has {} meal slot(s), expected {}; identifiers not preserved",
                    day.name(),
                    existing.len(),
                    SLOTS_PER_DAY
                ));
            }
        }
        updated.insert(day, replacements);
        if !touched.contains(&day) {
            touched.push(day);
        }
    }

    SubstitutionReport {
        plan: updated,
        touched,
        warnings,
    }
}
