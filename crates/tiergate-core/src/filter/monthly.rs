//! Month-grouped itinerary reduction for the anonymous tier.
//!
//! Itinerary optimization returns `normal.monthly_options`: one record per
//! month, each with up to three timing alternatives (`start_month`,
//! `mid_month`, `end_month`). Capping that list to one element would show the
//! first month instead of the best option, so anonymous callers instead get
//! every month listed with all alternatives nulled except a single nearest one.

use serde_json::{json, Map, Value};

use crate::tier::Tier;

/// One of the three timing alternatives within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Start,
    Mid,
    End,
}

impl Slot {
    /// Scan order within a month; also the tie-break order on equal dates.
    pub const ALL: [Slot; 3] = [Slot::Start, Slot::Mid, Slot::End];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Start => "start_month",
            Slot::Mid => "mid_month",
            Slot::End => "end_month",
        }
    }

    fn short(self) -> &'static str {
        match self {
            Slot::Start => "start",
            Slot::Mid => "mid",
            Slot::End => "end",
        }
    }
}

/// The single option an anonymous caller gets to see.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestOption {
    pub month_index: usize,
    pub slot: Slot,
    pub option: Value,
    /// Valid alternatives across every month.
    pub total_options: usize,
}

/// An alternative exists when it carries a non-null `total_cost`.
fn is_valid_option(option: &Value) -> bool {
    option
        .get("total_cost")
        .is_some_and(|cost| !cost.is_null())
}

fn start_date(option: &Value) -> &str {
    option.get("start_date").and_then(Value::as_str).unwrap_or("")
}

/// Pick the nearest option: the first month (in given order) holding any
/// valid alternative wins, then the earliest `start_date` within that month.
///
/// Later months are only counted, never compared; an earlier date in a later
/// month does not displace the first populated month.
pub fn find_nearest(months: &[Value]) -> Option<NearestOption> {
    let mut nearest: Option<(usize, Slot, &Value)> = None;
    let mut total_options = 0;

    for (month_index, month) in months.iter().enumerate() {
        let mut valid: Vec<(Slot, &Value)> = Slot::ALL
            .into_iter()
            .filter_map(|slot| month.get(slot.key()).map(|opt| (slot, opt)))
            .filter(|(_, opt)| is_valid_option(opt))
            .collect();
        total_options += valid.len();

        if nearest.is_none() {
            // stable: equal dates keep start/mid/end order
            valid.sort_by(|a, b| start_date(a.1).cmp(start_date(b.1)));
            if let Some((slot, opt)) = valid.first() {
                nearest = Some((month_index, *slot, *opt));
            }
        }
    }

    nearest.map(|(month_index, slot, option)| NearestOption {
        month_index,
        slot,
        option: option.clone(),
        total_options,
    })
}

/// Collapse `normal.monthly_options` to the nearest option.
///
/// No-op unless `tier` is anonymous, `cap` is exactly 1, and there is at
/// least one valid alternative.
pub fn reduce_to_nearest(data: Value, tier: Tier, cap: u32) -> Value {
    if tier != Tier::Anonymous || cap != 1 {
        return data;
    }
    let Value::Object(mut root) = data else {
        return data;
    };

    let months = match root
        .get("normal")
        .and_then(|normal| normal.get("monthly_options"))
        .and_then(Value::as_array)
    {
        Some(months) if !months.is_empty() => months,
        _ => return Value::Object(root),
    };

    let Some(nearest) = find_nearest(months) else {
        return Value::Object(root);
    };

    let limited: Vec<Value> = months
        .iter()
        .enumerate()
        .map(|(i, month)| {
            let mut out = Map::new();
            out.insert("month".into(), month_name(month));
            for slot in Slot::ALL {
                let value = if i == nearest.month_index && slot == nearest.slot {
                    nearest.option.clone()
                } else {
                    Value::Null
                };
                out.insert(slot.key().into(), value);
            }
            Value::Object(out)
        })
        .collect();

    let home_month = months
        .get(nearest.month_index)
        .map(month_name)
        .unwrap_or(Value::Null);
    let label = match nearest.option.get("label").and_then(Value::as_str) {
        Some(label) => label.to_string(),
        None => format!("{} {}", home_month.as_str().unwrap_or(""), nearest.slot.short()),
    };

    tracing::info!(
        option = %label,
        total = nearest.total_options,
        "limited monthly options to single nearest option for anonymous caller"
    );

    root.insert("normal".into(), json!({ "monthly_options": limited }));
    root.insert("best_itinerary".into(), nearest.option);
    root.insert(
        "access_message".into(),
        Value::String(format!(
            "Showing nearest option ({label}). Login to see all {} timing options across available months.",
            nearest.total_options
        )),
    );
    Value::Object(root)
}

fn month_name(month: &Value) -> Value {
    month
        .get("month")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}
